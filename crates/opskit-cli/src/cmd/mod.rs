pub mod config;
pub mod mcp;
pub mod pbx;
pub mod refs;
pub mod sanitize;
pub mod workshop;
