use crate::output::print_json;
use anyhow::Context;
use opskit_core::config::Config;
use opskit_core::sanitize::{candidate_files, needs_sanitizing, sanitize};
use std::path::{Path, PathBuf};

pub fn run(root: &Path, paths: &[PathBuf], dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    let mut files = Vec::new();
    for p in paths {
        if p.is_dir() {
            files.extend(candidate_files(p, &config.sanitize.extensions));
        } else {
            files.push(p.clone());
        }
    }

    let mut modified = Vec::new();
    for file in &files {
        let changed = if dry_run {
            needs_sanitizing(file)
        } else {
            sanitize(file)
        }
        .with_context(|| format!("cannot sanitize {}", file.display()))?;
        if changed {
            modified.push(file.clone());
        }
    }

    if json {
        return print_json(&serde_json::json!({
            "checked": files.len(),
            "modified": modified,
            "dry_run": dry_run,
        }));
    }

    let verb = if dry_run { "would modify" } else { "modified" };
    for file in &modified {
        println!("{verb}: {}", file.display());
    }
    println!(
        "{} of {} file(s) {verb}.",
        modified.len(),
        files.len()
    );
    Ok(())
}
