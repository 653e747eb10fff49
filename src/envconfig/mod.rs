use crate::converter::DEFAULT_TOOL;
use std::env;
use std::path::PathBuf;

pub const SOURCE_VAR: &str = "HTML2MD_SOURCE";
pub const DEST_VAR: &str = "HTML2MD_DEST";
pub const TOOL_VAR: &str = "HTML2MD_TOOL";
pub const JOBS_VAR: &str = "HTML2MD_JOBS";
pub const LOG_VAR: &str = "HTML2MD_LOG";

/// Settings read from `HTML2MD_*` variables. Command-line values take
/// precedence; see [`EnvConfig::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub tool: String,
    pub jobs: usize,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            source: non_empty(SOURCE_VAR).map(|p| expand_home(&p)),
            destination: non_empty(DEST_VAR).map(|p| expand_home(&p)),
            tool: non_empty(TOOL_VAR).unwrap_or_else(|| DEFAULT_TOOL.to_string()),
            jobs: non_empty(JOBS_VAR)
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(1),
        }
    }

    /// Fills in whatever the command line left unset.
    pub fn merge(
        self,
        source: Option<PathBuf>,
        destination: Option<PathBuf>,
        tool: Option<String>,
        jobs: Option<usize>,
    ) -> Self {
        Self {
            source: source.or(self.source),
            destination: destination.or(self.destination),
            tool: tool.unwrap_or(self.tool),
            jobs: jobs.unwrap_or(self.jobs).max(1),
        }
    }
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
