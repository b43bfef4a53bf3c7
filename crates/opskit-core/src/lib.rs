pub mod config;
pub mod error;
pub mod io;
pub mod mcp_config;
pub mod paths;
pub mod pbxproj;
pub mod refgrep;
pub mod sanitize;
pub mod workshop;

pub use error::{OpsError, Result};
