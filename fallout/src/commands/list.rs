use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use fallout_manifest::FalloutToml;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct ListCommand {
    /// Path to fallout.toml (defaults to ./fallout.toml)
    #[arg(short, long, default_value = "fallout.toml")]
    pub config: PathBuf,
}

impl ListCommand {
    pub fn run(&self) -> Result<()> {
        let fallout_toml = FalloutToml::open(&self.config).unwrap_or_exit();
        let manifest = fallout_toml.manifest();

        let types = manifest.deleted_types();
        if types.is_empty() {
            println!("No handlers defined");
            return Ok(());
        }

        for (i, ty) in types.into_iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{}:", ty);
            for (name, spec) in manifest.handlers_for(ty) {
                match &spec.description {
                    Some(desc) => println!("  {} - {}", name, desc),
                    None => println!("  {}", name),
                }
                if let Some(relation) = &spec.affected {
                    println!("    affected: {}", relation);
                }
                if spec.cascades() {
                    println!("    cascade:  {}", spec.cascade.join(", "));
                }
                println!("    message:  {}", spec.message);
            }
        }

        Ok(())
    }
}
