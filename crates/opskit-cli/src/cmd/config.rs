use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use opskit_core::config::Config;
use opskit_core::paths;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (file values over defaults)
    Show,
    /// Report configuration warnings
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => {
            if json {
                return print_json(&config);
            }
            let yaml = config.to_yaml()?;
            println!("# {}", paths::config_path(root).display());
            print!("{yaml}");
            Ok(())
        }
        ConfigSubcommand::Validate => {
            let warnings = config.validate();
            if json {
                return print_json(&serde_json::json!({
                    "ok": warnings.is_empty(),
                    "warnings": warnings,
                }));
            }
            if warnings.is_empty() {
                println!("config ok");
            }
            for w in &warnings {
                println!("warning: {}: {}", w.field, w.message);
            }
            Ok(())
        }
    }
}
