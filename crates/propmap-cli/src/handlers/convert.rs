//! Convert command handler

use super::utils::{read_input, Engine};
use crate::cli::ConvertArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use propmap_core::Value;

/// Handle the convert command
pub fn handle_convert(args: ConvertArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let max_depth = args.max_depth.unwrap_or(config.max_depth);
    if max_depth == 0 {
        return Err(Error::invalid_args("--max-depth must be at least 1"));
    }

    output.info(&format!("Converting to {}", args.target))?;
    let engine = Engine::load(args.types.as_deref(), config)?;
    let configuration = engine.configuration(args.mapping.as_deref(), config)?;
    let mapper = engine.mapper(max_depth);

    match &args.input {
        Some(path) => output.debug(&format!("Reading {}", path.display()))?,
        None => output.debug("Reading JSON from stdin")?,
    }
    let source = Value::from(read_input(args.input.as_deref())?);

    let timer = Timer::with_details("convert", &args.target);
    let result = mapper.convert_with(&source, &args.target, &configuration);
    let elapsed = timer.finish();
    let converted = result?;

    output.success(&format!(
        "✓ Converted {} to {} in {}ms",
        source.kind_name(),
        args.target,
        elapsed.as_millis()
    ))?;
    output.section("Result")?;
    output.value(&converted)
}
