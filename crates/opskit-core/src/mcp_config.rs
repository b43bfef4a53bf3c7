//! Ensure required MCP server entries exist in a Claude JSON config.
//!
//! Entries live under the top-level `mcpServers` object. Existing keys are
//! never overwritten; the document's key order is preserved.

use crate::error::{OpsError, Result};
use crate::io;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SERVERS_KEY: &str = "mcpServers";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnsureReport {
    pub config_path: PathBuf,
    pub added: Vec<String>,
    pub already_present: Vec<String>,
    pub backup: Option<PathBuf>,
}

impl EnsureReport {
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Insert each missing entry into `doc`. Returns (added, already present).
pub fn merge_entries(
    doc: &mut Value,
    required: &BTreeMap<String, Value>,
) -> Result<(Vec<String>, Vec<String>)> {
    let root = doc
        .as_object_mut()
        .ok_or_else(|| OpsError::InvalidConfig("top-level JSON value is not an object".into()))?;
    let servers = root
        .entry(SERVERS_KEY)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| OpsError::InvalidConfig(format!("'{SERVERS_KEY}' is not an object")))?;

    let mut added = Vec::new();
    let mut present = Vec::new();
    for (name, entry) in required {
        if servers.contains_key(name) {
            present.push(name.clone());
        } else {
            servers.insert(name.clone(), entry.clone());
            added.push(name.clone());
        }
    }
    Ok((added, present))
}

/// Read `config_path`, add missing entries, back the original up next to it
/// and write the result. Nothing is written when every entry is present.
pub fn ensure(config_path: &Path, required: &BTreeMap<String, Value>) -> Result<EnsureReport> {
    let content = io::read_existing(config_path)?;
    let mut doc: Value = serde_json::from_str(&content)?;
    let (added, already_present) = merge_entries(&mut doc, required)?;

    let mut report = EnsureReport {
        config_path: config_path.to_path_buf(),
        added,
        already_present,
        backup: None,
    };
    if !report.changed() {
        tracing::debug!(path = %config_path.display(), "all MCP entries present");
        return Ok(report);
    }

    let backup = io::write_backup(config_path, Utc::now())?;
    let mut out = serde_json::to_string_pretty(&doc)?;
    out.push('\n');
    io::atomic_write(config_path, out.as_bytes())?;
    tracing::info!(
        path = %config_path.display(),
        added = ?report.added,
        backup = %backup.display(),
        "MCP config updated"
    );
    report.backup = Some(backup);
    Ok(report)
}
