use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use opskit_core::config::Config;
use opskit_core::mcp_config::ensure;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum McpSubcommand {
    /// Add any missing required MCP server entries (existing ones are kept)
    Ensure {
        /// JSON file to update (default: mcp.config_path, else ~/.claude.json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: McpSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        McpSubcommand::Ensure { config: explicit } => {
            let config = Config::load(root).context("failed to load config")?;
            let target = match explicit {
                Some(p) => p,
                None => config.mcp.target_path()?,
            };
            let report = ensure(&target, &config.mcp.servers)
                .with_context(|| format!("cannot update {}", target.display()))?;

            if json {
                return print_json(&report);
            }
            for name in &report.added {
                println!("  + {name}");
            }
            for name in &report.already_present {
                println!("  = {name}");
            }
            match &report.backup {
                Some(backup) => println!(
                    "Updated {} (backup: {}).",
                    target.display(),
                    backup.display()
                ),
                None => println!("{} already has every entry.", target.display()),
            }
            Ok(())
        }
    }
}
