use std::path::PathBuf;

pub const ENV_SCRIPT_URL: &str = "LIFESKILLS_SCRIPT_URL";
pub const ENV_WORKSPACE: &str = "LIFESKILLS_WORKSPACE";
pub const ENV_LOG: &str = "LIFESKILLS_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Spreadsheet web-app endpoint; `None` disables remote sync.
    pub script_url: Option<String>,
    /// Workspace opened at startup, before any `workspace.select`.
    pub workspace: Option<PathBuf>,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            script_url: non_empty(ENV_SCRIPT_URL),
            workspace: non_empty(ENV_WORKSPACE).map(PathBuf::from),
            log_filter: non_empty(ENV_LOG).unwrap_or_else(|| "info".to_string()),
        }
    }
}
