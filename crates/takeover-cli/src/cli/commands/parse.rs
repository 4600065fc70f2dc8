//! `takeover parse` - Export the fingerprint table without probing.

use anyhow::Result;
use takeover_core::Registry;
use tracing::{info, warn};

use super::{load_document, parse_records, Context};
use crate::cli::args::ParseArgs;
use crate::education::Explain;
use crate::output::OutputFormat;

pub fn execute(ctx: &Context, args: ParseArgs) -> Result<()> {
    let readme = ctx.config.readme_or(args.readme);

    if ctx.explain {
        Explain::parse(&readme).print();
    }

    let document = load_document(&readme)?;
    let records = parse_records(&document)?;
    let registry = Registry::build(&records);

    for engine in &registry.duplicates {
        warn!(engine = %engine, "duplicate engine, keeping the last row");
    }
    info!(engines = registry.entries.len(), "parsed fingerprint table");

    match ctx.output_format {
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&registry.entries)?),
        // The export is JSON; pretty output is indented JSON
        OutputFormat::Json | OutputFormat::Pretty | OutputFormat::Markdown => {
            println!("{}", serde_json::to_string_pretty(&registry.entries)?);
        }
    }

    Ok(())
}
