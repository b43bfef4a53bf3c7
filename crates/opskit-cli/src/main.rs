mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, mcp::McpSubcommand, pbx::PbxSubcommand,
    workshop::WorkshopSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "opskit",
    about = "Operator tools: Xcode project file edits, workshop log, doc hygiene",
    version,
    propagate_version = true
)]
struct Cli {
    /// Working root (default: auto-detect from .opskit/ or .git/)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, remove, and check Swift file references in a project.pbxproj
    Pbx {
        #[command(subcommand)]
        subcommand: PbxSubcommand,
    },

    /// Record and inspect workshop finalize outcomes
    Workshop {
        #[command(subcommand)]
        subcommand: WorkshopSubcommand,
    },

    /// Scrub user-identifying strings from documentation files
    Sanitize {
        /// Files or directories (directories are walked for configured extensions)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Search the configured UI source roots for a substring
    Refs {
        /// Text to search for
        #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new())]
        query: String,

        /// Match without regard to case
        #[arg(long, short = 'i')]
        ignore_case: bool,
    },

    /// Maintain MCP server entries in ~/.claude.json
    Mcp {
        #[command(subcommand)]
        subcommand: McpSubcommand,
    },

    /// Inspect the .opskit/config.yaml in effect
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Pbx { subcommand } => cmd::pbx::run(subcommand, cli.json),
        Commands::Workshop { subcommand } => cmd::workshop::run(&root, subcommand, cli.json),
        Commands::Sanitize { paths, dry_run } => {
            cmd::sanitize::run(&root, &paths, dry_run, cli.json)
        }
        Commands::Refs { query, ignore_case } => {
            cmd::refs::run(&root, &query, ignore_case, cli.json)
        }
        Commands::Mcp { subcommand } => cmd::mcp::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
