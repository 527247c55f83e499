//! Configuration management for chesync
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (CHE_*, CHESYNC_*)
//! 3. Config file (~/.config/chesync/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default root under which workspace projects are checked out
pub const DEFAULT_PROJECTS_ROOT: &str = "/projects";

/// Default glob for the git files whose changes are reflected in the workspace
pub const DEFAULT_WATCH_PATTERN: &str = "**/.git/{HEAD,config}";

/// Projects layout configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectsConfig {
    /// Directory holding the checked-out projects
    pub root: PathBuf,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_PROJECTS_ROOT),
        }
    }
}

/// Che workspace master API settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Internal API base URL (e.g. `http://che-host:8080/api`)
    pub url: Option<String>,

    /// Machine token sent as a bearer credential
    pub token: Option<String>,

    /// Id of the workspace this process runs in
    pub workspace_id: Option<String>,
}

/// Git executable settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    /// Path to the git executable
    pub path: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            path: "git".to_string(),
        }
    }
}

/// Filesystem watch settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Glob (relative to the projects root) of files whose events are tracked
    pub pattern: String,

    /// Delay between two scans of the projects root
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Maximum directory depth scanned below the projects root
    pub max_depth: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_WATCH_PATTERN.to_string(),
            poll_interval: Duration::from_secs(2),
            max_depth: 4,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Projects layout
    pub projects: ProjectsConfig,

    /// Che API access
    pub api: ApiConfig,

    /// Git executable
    pub git: GitConfig,

    /// Filesystem watch
    pub watch: WatchConfig,
}

/// Overrides coming from command line flags
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub projects_root: Option<PathBuf>,
    pub api_url: Option<String>,
    pub git_path: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/chesync/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chesync").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - CHE_PROJECTS_ROOT: Projects root directory
    /// - CHE_API_INTERNAL: Che API base URL
    /// - CHE_MACHINE_TOKEN: Bearer token for the Che API
    /// - CHE_WORKSPACE_ID: Current workspace id
    /// - CHESYNC_GIT_PATH: Path to git executable
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by variable name
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(root) = non_empty("CHE_PROJECTS_ROOT") {
            self.projects.root = PathBuf::from(root);
        }

        if let Some(url) = non_empty("CHE_API_INTERNAL") {
            self.api.url = Some(url);
        }

        if let Some(token) = non_empty("CHE_MACHINE_TOKEN") {
            self.api.token = Some(token.trim().to_string());
        }

        if let Some(id) = non_empty("CHE_WORKSPACE_ID") {
            self.api.workspace_id = Some(id);
        }

        if let Some(git) = non_empty("CHESYNC_GIT_PATH") {
            self.git.path = git;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(root) = overrides.projects_root {
            self.projects.root = root;
        }

        if let Some(url) = overrides.api_url {
            self.api.url = Some(url);
        }

        if let Some(git) = overrides.git_path {
            self.git.path = git;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: CliOverrides) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.projects.root, PathBuf::from("/projects"));
        assert_eq!(config.git.path, "git");
        assert_eq!(config.watch.pattern, "**/.git/{HEAD,config}");
        assert_eq!(config.watch.poll_interval, Duration::from_secs(2));
        assert!(config.api.url.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_overrides_from(|key| match key {
            "CHE_PROJECTS_ROOT" => Some("/workspace/projects".to_string()),
            "CHE_API_INTERNAL" => Some("http://che:8080/api".to_string()),
            "CHE_MACHINE_TOKEN" => Some("secret\n".to_string()),
            "CHE_WORKSPACE_ID" => Some("workspace42".to_string()),
            _ => None,
        });

        assert_eq!(config.projects.root, PathBuf::from("/workspace/projects"));
        assert_eq!(config.api.url.as_deref(), Some("http://che:8080/api"));
        assert_eq!(config.api.token.as_deref(), Some("secret"));
        assert_eq!(config.api.workspace_id.as_deref(), Some("workspace42"));
        assert_eq!(config.git.path, "git");
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let config = Config::default()
            .with_overrides_from(|key| (key == "CHE_PROJECTS_ROOT").then(String::new));
        assert_eq!(config.projects.root, PathBuf::from("/projects"));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            projects_root: Some(PathBuf::from("/tmp/projects")),
            api_url: None,
            git_path: Some("/usr/local/bin/git".to_string()),
        });

        assert_eq!(config.projects.root, PathBuf::from("/tmp/projects"));
        assert_eq!(config.git.path, "/usr/local/bin/git");
        assert!(config.api.url.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[projects]
root = "/home/user/projects"

[api]
url = "http://localhost:8080/api"
workspace_id = "workspaceabc"

[watch]
poll_interval = "500ms"
max_depth = 2
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.projects.root, PathBuf::from("/home/user/projects"));
        assert_eq!(config.api.url.as_deref(), Some("http://localhost:8080/api"));
        assert_eq!(config.api.workspace_id.as_deref(), Some("workspaceabc"));
        assert_eq!(config.watch.poll_interval, Duration::from_millis(500));
        assert_eq!(config.watch.max_depth, 2);
        // pattern should use default
        assert_eq!(config.watch.pattern, DEFAULT_WATCH_PATTERN);
    }
}
