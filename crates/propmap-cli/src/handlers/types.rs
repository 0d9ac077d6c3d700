//! Types command handler

use super::utils::Engine;
use crate::cli::TypesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use crate::report::TypeListing;

/// Handle the types command
pub fn handle_types(args: TypesArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let engine = Engine::load(args.types.as_deref(), config)?;
    let listing = TypeListing::build(&engine.hierarchy, &engine.registry);
    output.type_listing(&listing)
}
