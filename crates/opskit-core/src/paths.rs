use crate::error::{OpsError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const OPSKIT_DIR: &str = ".opskit";
pub const CONFIG_FILE: &str = ".opskit/config.yaml";
pub const WORKSHOP_DB: &str = ".opskit/workshop.db";
pub const CURATOR_LOG: &str = ".opskit/logs/workshop_curator.log";

pub const CLAUDE_JSON: &str = ".claude.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn opskit_dir(root: &Path) -> PathBuf {
    root.join(OPSKIT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path: absolute paths win, relative ones hang off `root`.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

/// `~/.claude.json`, the default target of the MCP config merger.
pub fn claude_json_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(OpsError::HomeNotFound)?;
    Ok(home.join(CLAUDE_JSON))
}
