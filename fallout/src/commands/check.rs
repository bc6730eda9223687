use std::{path::PathBuf, sync::Arc};

use clap::Args;
use eyre::{Context, Result};
use fallout_engine::{GatherOptions, ObjectGraph, registry_from_manifest};
use fallout_manifest::FalloutToml;
use tracing::debug;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct CheckCommand {
    /// Path to fallout.toml (defaults to ./fallout.toml)
    #[arg(short, long, default_value = "fallout.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let fallout_toml = FalloutToml::open(&self.config).unwrap_or_exit();
        let manifest = fallout_toml.manifest();

        // Build every rule handler to catch registration errors
        let registry = registry_from_manifest(manifest, Arc::new(ObjectGraph::new()))
            .wrap_err("Failed to register handlers")?;
        let options = GatherOptions::from(&manifest.engine);
        debug!(?options, "resolved gather options");

        println!("✓ {} is valid\n", self.config.display());

        let handler_count = registry.len();
        let type_count = registry.types().count();
        println!(
            "  {} handler{} across {} deleted type{}",
            handler_count,
            plural(handler_count),
            type_count,
            plural(type_count)
        );

        println!(
            "  max depth {}, max deleted objects {}",
            limit(options.max_depth),
            limit(options.max_deleted)
        );

        Ok(())
    }
}

fn limit(value: Option<usize>) -> String {
    value.map_or_else(|| "unlimited".to_string(), |limit| limit.to_string())
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
