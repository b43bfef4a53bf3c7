//! Scrub user-identifying strings from documentation before it is shared.

use crate::error::Result;
use crate::io;
use regex::Regex;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Ordered (pattern, replacement) pairs. Order matters: the path rules must
/// run before the bare-name rule swallows the user name.
const RULES: &[(&str, &str)] = &[
    (r"/Users/ramakrishnan[a-z]*/projects/", "/Users/YOUR_USERNAME/projects/"),
    (r"/Users/ramakrishnan[a-z]*/", "/Users/YOUR_USERNAME/"),
    (r"ramakrishnan[a-z]*", "YOUR_USERNAME"),
    (r"/cc-enhance\b", "/your-project"),
    (
        r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
        "user@example.com",
    ),
];

static COMPILED: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn rules() -> &'static [(Regex, &'static str)] {
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .map(|(pat, rep)| (Regex::new(pat).unwrap(), *rep))
            .collect()
    })
}

/// Apply every rule in order.
pub fn sanitize_str(input: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(input);
    for (re, rep) in rules() {
        let replaced = match re.replace_all(&out, *rep) {
            Cow::Owned(s) => Some(s),
            Cow::Borrowed(_) => None,
        };
        if let Some(s) = replaced {
            out = Cow::Owned(s);
        }
    }
    out
}

/// Sanitize one file in place. Returns whether the file changed.
pub fn sanitize(path: &Path) -> Result<bool> {
    let content = io::read_existing(path)?;
    match sanitize_str(&content) {
        Cow::Borrowed(_) => Ok(false),
        Cow::Owned(updated) if updated == content => Ok(false),
        Cow::Owned(updated) => {
            io::atomic_write(path, updated.as_bytes())?;
            tracing::info!(path = %path.display(), "sanitized");
            Ok(true)
        }
    }
}

/// Would `sanitize(path)` change the file?
pub fn needs_sanitizing(path: &Path) -> Result<bool> {
    let content = io::read_existing(path)?;
    Ok(sanitize_str(&content) != content.as_str())
}

/// Files under `dir` whose extension is in `extensions`, in walk order.
pub fn candidate_files(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_extension(p, extensions))
        .collect()
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Sanitize every matching file under `dir`; returns the modified paths.
pub fn sanitize_tree(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut modified = Vec::new();
    for path in candidate_files(dir, extensions) {
        if sanitize(&path)? {
            modified.push(path);
        }
    }
    Ok(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rules_apply_in_order() {
        let input = "See /Users/ramakrishnanx/projects/app and /Users/ramakrishnan/tmp, ping ramakrishnanab.";
        assert_eq!(
            sanitize_str(input),
            "See /Users/YOUR_USERNAME/projects/app and /Users/YOUR_USERNAME/tmp, ping YOUR_USERNAME."
        );
    }

    #[test]
    fn project_name_and_email() {
        assert_eq!(
            sanitize_str("cd ~/code/cc-enhance && mail dev.person@corp.io"),
            "cd ~/code/your-project && mail user@example.com"
        );
        // Word boundary: a longer name is left alone.
        assert_eq!(sanitize_str("/cc-enhancer"), "/cc-enhancer");
    }

    #[test]
    fn clean_input_is_borrowed() {
        assert!(matches!(sanitize_str("nothing here"), Cow::Borrowed(_)));
    }

    #[test]
    fn sanitize_reports_modification() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, "path: /Users/ramakrishnan/projects/x\n").unwrap();
        assert!(needs_sanitizing(&path).unwrap());
        assert!(sanitize(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "path: /Users/YOUR_USERNAME/projects/x\n"
        );
        assert!(!sanitize(&path).unwrap());
    }

    #[test]
    fn already_sanitized_email_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "contact user@example.com\n").unwrap();
        assert!(!sanitize(&path).unwrap());
    }

    #[test]
    fn tree_walk_respects_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/a.md"), "ramakrishnan").unwrap();
        std::fs::write(dir.path().join("docs/b.txt"), "ramakrishnan").unwrap();
        std::fs::write(dir.path().join("c.MD"), "clean").unwrap();
        let modified = sanitize_tree(dir.path(), &["md".to_string()]).unwrap();
        assert_eq!(modified, vec![dir.path().join("docs/a.md")]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("docs/b.txt")).unwrap(),
            "ramakrishnan"
        );
    }
}
