//! Inspect command handler

use super::utils::{parse_inline_json, Engine};
use crate::cli::InspectArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use crate::report::{InspectionReport, Selection};
use propmap_core::{PropertyMappingConfiguration, TargetType, Value};

/// Handle the inspect command
pub fn handle_inspect(args: InspectArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let engine = Engine::load(args.types.as_deref(), config)?;
    let target = TargetType::parse(&args.target)?;
    let source = args
        .source
        .as_deref()
        .map(|text| parse_inline_json("--source", text))
        .transpose()?
        .map(Value::from);

    let report = InspectionReport::build(
        &engine.selector(),
        &target,
        source.as_ref(),
        &PropertyMappingConfiguration::new(),
    )?;
    if let Some(Selection::Failed { kind, .. }) = &report.selection {
        output.warning(&format!("⚠ No converter would be selected for this source ({:?})", kind))?;
    }
    output.inspection(&report)
}
