use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use opskit_core::config::Config;
use opskit_core::workshop::{curate, FinalizeOutcome, WorkshopLog};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum WorkshopSubcommand {
    /// Append one finalize outcome
    Finalize {
        /// Outcome status (e.g. PASS, FAIL)
        #[arg(long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
        status: String,
        #[arg(long)]
        score: Option<i64>,
        /// Build result
        #[arg(long)]
        build: Option<String>,
        /// Test result
        #[arg(long)]
        tests: Option<String>,
        #[arg(long)]
        zero_tag: Option<String>,
        /// Number of screenshots captured
        #[arg(long)]
        screenshots: Option<i64>,
        #[arg(long)]
        design_guard_violations: Option<i64>,
        #[arg(long)]
        profile: Option<String>,
        /// Path or URL of the full report
        #[arg(long)]
        report: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show the most recent outcomes, newest first
    Query {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Append a per-status summary line to the curator log
    Curate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: WorkshopSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let db_path = config.workshop_db(root);
    let log = WorkshopLog::open(&db_path)
        .with_context(|| format!("cannot open workshop log {}", db_path.display()))?;

    match subcmd {
        WorkshopSubcommand::Finalize {
            status,
            score,
            build,
            tests,
            zero_tag,
            screenshots,
            design_guard_violations,
            profile,
            report,
            notes,
        } => {
            let outcome = FinalizeOutcome {
                status,
                score,
                build,
                tests,
                zero_tag,
                screenshots,
                design_guard_violations,
                profile,
                report,
                notes,
            };
            finalize(&log, &outcome, json)
        }
        WorkshopSubcommand::Query { limit } => query(&log, limit, json),
        WorkshopSubcommand::Curate => {
            let log_path = config.curator_log(root);
            let summary = curate(&log, &log_path, config.workshop.curator_max_bytes)
                .with_context(|| format!("cannot write {}", log_path.display()))?;
            if json {
                return print_json(&summary);
            }
            println!("{}", summary.line);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// finalize
// ---------------------------------------------------------------------------

fn finalize(log: &WorkshopLog, outcome: &FinalizeOutcome, json: bool) -> anyhow::Result<()> {
    let id = log.finalize(outcome)?;
    if json {
        return print_json(&serde_json::json!({ "id": id, "status": outcome.status }));
    }
    println!("Recorded outcome #{id}: {}", outcome.status);
    Ok(())
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

fn query(log: &WorkshopLog, limit: usize, json: bool) -> anyhow::Result<()> {
    let rows = log.query(limit)?;
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No outcomes recorded.");
        return Ok(());
    }
    let table = rows
        .into_iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                or_dash(r.ts),
                r.status,
                or_dash(r.score),
                or_dash(r.build),
                or_dash(r.tests),
                or_dash(r.screenshots),
                or_dash(r.design_guard_violations),
            ]
        })
        .collect();
    print_table(
        &["ID", "TS", "STATUS", "SCORE", "BUILD", "TESTS", "SHOTS", "GUARD"],
        table,
    );
    Ok(())
}
