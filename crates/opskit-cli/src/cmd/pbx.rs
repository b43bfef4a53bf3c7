use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use opskit_core::pbxproj::{
    verify, AddFile, AddFileOp, AddReport, PbxSession, RemoveFileOp, StepStatus,
};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PbxSubcommand {
    /// Add Swift files to a group and a sources build phase
    Add {
        /// Path to project.pbxproj
        project: PathBuf,
        /// Group-relative paths of the files to add (e.g. Core/Color+Hex.swift)
        #[arg(required = true)]
        paths: Vec<String>,
        /// Existing file in the target group, by name
        #[arg(long)]
        group_sibling: String,
        /// Existing file in the target sources phase, by name
        #[arg(long)]
        sources_sibling: String,
        /// Only accept the group sibling inside the group with this name
        #[arg(long)]
        group: Option<String>,
        /// Seed for reproducible identifiers
        #[arg(long)]
        seed: Option<u64>,
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete every line containing any of the given fragments
    Remove {
        /// Path to project.pbxproj
        project: PathBuf,
        /// Identifiers (or unambiguous file names) to remove
        #[arg(required = true)]
        fragments: Vec<String>,
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Check cross-references and section markers
    Verify {
        /// Path to project.pbxproj
        project: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(subcmd: PbxSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PbxSubcommand::Add {
            project,
            paths,
            group_sibling,
            sources_sibling,
            group,
            seed,
            dry_run,
        } => {
            let template = AddFile {
                relative_path: String::new(),
                group_sibling,
                sources_sibling,
                group,
            };
            add(&project, &paths, &template, seed, dry_run, json)
        }
        PbxSubcommand::Remove {
            project,
            fragments,
            dry_run,
        } => remove(&project, fragments, dry_run, json),
        PbxSubcommand::Verify { project } => verify_project(&project, json),
    }
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

fn add(
    project: &Path,
    paths: &[String],
    template: &AddFile,
    seed: Option<u64>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let request = |rel: &str| AddFile {
        relative_path: rel.to_string(),
        ..template.clone()
    };

    // Several paths share one session so the project is written once.
    let (reports, written) = if let [rel] = paths {
        let mut op = AddFileOp::new(project, request(rel));
        op.seed = seed;
        op.dry_run = dry_run;
        let applied = op.run().with_context(|| format!("cannot add {rel}"))?;
        (vec![applied.report], applied.written)
    } else {
        let mut session = PbxSession::open_with(project, seed)
            .with_context(|| format!("cannot open {}", project.display()))?;
        let mut reports: Vec<AddReport> = Vec::with_capacity(paths.len());
        for rel in paths {
            let report = session
                .add(&request(rel))
                .with_context(|| format!("cannot add {rel}"))?;
            reports.push(report);
        }
        let written = if dry_run { false } else { session.commit()? };
        (reports, written)
    };

    if json {
        return print_json(&serde_json::json!({
            "project": project,
            "written": written,
            "dry_run": dry_run,
            "files": reports,
        }));
    }

    for r in &reports {
        println!("{} (file {}, build {})", r.relative_path, r.file_id, r.build_id);
        for step in &r.steps {
            let mark = match step.status {
                StepStatus::Inserted => "+",
                StepStatus::AlreadyPresent => "=",
            };
            println!("  {mark} {:<22} {}", step.section.label(), step.status);
        }
    }
    print_outcome(project, written, dry_run);
    Ok(())
}

// ---------------------------------------------------------------------------
// remove
// ---------------------------------------------------------------------------

fn remove(project: &Path, fragments: Vec<String>, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let mut op = RemoveFileOp::new(project, fragments);
    op.dry_run = dry_run;
    let applied = op
        .run()
        .with_context(|| format!("cannot remove from {}", project.display()))?;

    if json {
        return print_json(&applied);
    }

    for f in &applied.report.fragments {
        if f.deleted == 0 {
            println!("  {:<26} no match", f.fragment);
        } else {
            println!("  {:<26} {} line(s)", f.fragment, f.deleted);
        }
    }
    println!("Deleted {} line(s).", applied.report.deleted);
    print_outcome(project, applied.written, dry_run);
    Ok(())
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

fn verify_project(project: &Path, json: bool) -> anyhow::Result<()> {
    let content = opskit_core::io::read_existing(project)?;
    let violations = verify(&content);

    if json {
        print_json(&serde_json::json!({
            "project": project,
            "ok": violations.is_empty(),
            "violations": violations,
        }))?;
    } else if violations.is_empty() {
        println!("{}: ok", project.display());
    } else {
        for v in &violations {
            println!("{}: {v}", project.display());
        }
    }

    if !violations.is_empty() {
        anyhow::bail!("{} violation(s) in {}", violations.len(), project.display());
    }
    Ok(())
}

fn print_outcome(project: &Path, written: bool, dry_run: bool) {
    if dry_run {
        println!("Dry run: {} not written.", project.display());
    } else if written {
        println!("Updated {}.", project.display());
    } else {
        println!("No changes to {}.", project.display());
    }
}
