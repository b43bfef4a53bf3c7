//! Substring search across the configured UI source roots.

use crate::config::RefGrepConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefMatch {
    pub path: PathBuf,
    /// One-based.
    pub line_number: usize,
    pub snippet: String,
}

impl std::fmt::Display for RefMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.path.display(),
            self.line_number,
            self.snippet
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefQuery {
    pub needle: String,
    pub ignore_case: bool,
}

impl RefQuery {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_case = yes;
        self
    }

    fn matches(&self, line: &str) -> bool {
        if self.ignore_case {
            line.to_lowercase().contains(&self.needle.to_lowercase())
        } else {
            line.contains(&self.needle)
        }
    }
}

/// Trim `line` and cap it at `max` characters.
pub fn snippet(line: &str, max: usize) -> String {
    let trimmed = line.trim();
    match trimmed.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x == e))
}

fn matches_in_file(path: &Path, query: &RefQuery, max_snippet: usize) -> Vec<RefMatch> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
            return Vec::new();
        }
    };
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| query.matches(line))
        .map(|(i, line)| RefMatch {
            path: path.to_path_buf(),
            line_number: i + 1,
            snippet: snippet(line, max_snippet),
        })
        .collect()
}

/// Lazily walk every configured root under `root` and yield matching lines.
/// Roots that do not exist are skipped. An empty needle matches nothing.
pub fn find<'a>(
    root: &'a Path,
    config: &'a RefGrepConfig,
    query: &'a RefQuery,
) -> impl Iterator<Item = RefMatch> + 'a {
    let enabled = !query.needle.is_empty();
    config
        .roots
        .iter()
        .filter(move |_| enabled)
        .map(move |r| root.join(r))
        .filter(|dir| {
            let present = dir.is_dir();
            if !present {
                tracing::debug!(root = %dir.display(), "search root missing, skipping");
            }
            present
        })
        .flat_map(|dir| WalkDir::new(dir).sort_by_file_name().into_iter())
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(move |entry| has_extension(entry.path(), &config.extensions))
        .flat_map(move |entry| matches_in_file(entry.path(), query, config.max_snippet))
}
