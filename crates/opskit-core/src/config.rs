use crate::error::{OpsError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// WorkshopConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopConfig {
    #[serde(default = "default_workshop_db")]
    pub db: PathBuf,
    #[serde(default = "default_curator_log")]
    pub curator_log: PathBuf,
    #[serde(default = "default_curator_max_bytes")]
    pub curator_max_bytes: u64,
}

fn default_workshop_db() -> PathBuf {
    PathBuf::from(paths::WORKSHOP_DB)
}

fn default_curator_log() -> PathBuf {
    PathBuf::from(paths::CURATOR_LOG)
}

fn default_curator_max_bytes() -> u64 {
    1024 * 1024
}

impl Default for WorkshopConfig {
    fn default() -> Self {
        Self {
            db: default_workshop_db(),
            curator_log: default_curator_log(),
            curator_max_bytes: default_curator_max_bytes(),
        }
    }
}

// ---------------------------------------------------------------------------
// RefGrepConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefGrepConfig {
    #[serde(default = "default_refgrep_roots")]
    pub roots: Vec<PathBuf>,
    #[serde(default = "default_refgrep_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_max_snippet")]
    pub max_snippet: usize,
}

fn default_refgrep_roots() -> Vec<PathBuf> {
    ["Core", "Features", "Sources", "Views"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn default_refgrep_extensions() -> Vec<String> {
    vec!["swift".to_string()]
}

fn default_max_snippet() -> usize {
    160
}

impl Default for RefGrepConfig {
    fn default() -> Self {
        Self {
            roots: default_refgrep_roots(),
            extensions: default_refgrep_extensions(),
            max_snippet: default_max_snippet(),
        }
    }
}

// ---------------------------------------------------------------------------
// SanitizeConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    #[serde(default = "default_sanitize_extensions")]
    pub extensions: Vec<String>,
}

fn default_sanitize_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            extensions: default_sanitize_extensions(),
        }
    }
}

// ---------------------------------------------------------------------------
// McpConfig
// ---------------------------------------------------------------------------

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Target JSON file. `None` means `~/.claude.json`.
    #[serde(default)]
    pub config_path: Option<PathBuf>,
    #[serde(default = "default_mcp_servers")]
    pub servers: BTreeMap<String, Value>,
}

fn default_mcp_servers() -> BTreeMap<String, Value> {
    let qdrant_url =
        std::env::var("QDRANT_URL").unwrap_or_else(|_| DEFAULT_QDRANT_URL.to_string());
    let mut servers = BTreeMap::new();
    servers.insert(
        "semantic-memory".to_string(),
        serde_json::json!({
            "type": "stdio",
            "command": "uvx",
            "args": ["mcp-server-qdrant"],
            "env": {
                "QDRANT_URL": qdrant_url,
                "COLLECTION_NAME": "semantic-memory",
            },
        }),
    );
    servers
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            servers: default_mcp_servers(),
        }
    }
}

impl McpConfig {
    pub fn target_path(&self) -> Result<PathBuf> {
        match &self.config_path {
            Some(p) => Ok(p.clone()),
            None => paths::claude_json_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workshop: WorkshopConfig,
    #[serde(default)]
    pub refgrep: RefGrepConfig,
    #[serde(default)]
    pub sanitize: SanitizeConfig,
    #[serde(default)]
    pub mcp: McpConfig,
}

impl Config {
    /// Load `.opskit/config.yaml` under `root`. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| OpsError::InvalidConfig(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.refgrep.roots.is_empty() {
            warnings.push(ConfigWarning {
                field: "refgrep.roots".to_string(),
                message: "no search roots configured; `refs` will never match".to_string(),
            });
        }
        if self.refgrep.extensions.is_empty() {
            warnings.push(ConfigWarning {
                field: "refgrep.extensions".to_string(),
                message: "no extensions configured; `refs` will never match".to_string(),
            });
        }
        if self.sanitize.extensions.is_empty() {
            warnings.push(ConfigWarning {
                field: "sanitize.extensions".to_string(),
                message: "directory walks will skip every file".to_string(),
            });
        }
        if self.workshop.curator_max_bytes == 0 {
            warnings.push(ConfigWarning {
                field: "workshop.curator_max_bytes".to_string(),
                message: "0 rotates the curator log on every run".to_string(),
            });
        }
        for (name, entry) in &self.mcp.servers {
            if !entry.is_object() {
                warnings.push(ConfigWarning {
                    field: format!("mcp.servers.{name}"),
                    message: "entry is not a JSON object".to_string(),
                });
            }
        }
        warnings
    }

    pub fn workshop_db(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.workshop.db)
    }

    pub fn curator_log(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.workshop.curator_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.refgrep.extensions, vec!["swift"]);
        assert_eq!(cfg.workshop.curator_max_bytes, 1024 * 1024);
        assert!(cfg.mcp.servers.contains_key("semantic-memory"));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = Config::parse("refgrep:\n  roots: [App]\n").unwrap();
        assert_eq!(cfg.refgrep.roots, vec![PathBuf::from("App")]);
        assert_eq!(cfg.refgrep.extensions, vec!["swift"]);
        assert_eq!(cfg.workshop.db, PathBuf::from(paths::WORKSHOP_DB));
    }

    #[test]
    fn malformed_file_is_invalid_config() {
        let err = Config::parse("refgrep: [unclosed").unwrap_err();
        assert!(matches!(err, OpsError::InvalidConfig(_)));
    }

    #[test]
    fn validate_flags_empty_lists() {
        let cfg = Config::parse("refgrep:\n  roots: []\n  extensions: []\n").unwrap();
        let fields: Vec<_> = cfg.validate().into_iter().map(|w| w.field).collect();
        assert!(fields.contains(&"refgrep.roots".to_string()));
        assert!(fields.contains(&"refgrep.extensions".to_string()));
    }

    #[test]
    fn relative_paths_resolve_under_root() {
        let cfg = Config::default();
        let root = Path::new("/proj");
        assert_eq!(
            cfg.workshop_db(root),
            PathBuf::from("/proj/.opskit/workshop.db")
        );
    }
}
