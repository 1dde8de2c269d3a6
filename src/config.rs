//! Configuration for the operator console.
//!
//! Settings come from `opsdesk.toml`, then environment variables, then CLI
//! flags, each layer overriding the one before.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:3000"
//! timeout_secs = 30
//!
//! [display]
//! view = "table"
//! page_size = 20
//! color = true
//!
//! [logging]
//! level = "warn"
//! format = "text"
//! dir = "/var/log/opsdesk"
//! ```
//!
//! The file is looked up at `--config`, then `./.opsdesk/opsdesk.toml`,
//! then `<user config dir>/opsdesk/opsdesk.toml`. A missing file means
//! defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::desk::ViewMode;
use crate::logging::LogFormat;

pub const CONFIG_DIR: &str = ".opsdesk";
pub const CONFIG_FILE: &str = "opsdesk.toml";
pub const API_URL_ENV: &str = "OPSDESK_API_URL";
pub const LOG_ENV: &str = "OPSDESK_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSection {
    /// Root URL of the operations backend; `/api/...` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySection {
    #[serde(default)]
    pub view: ViewMode,
    /// Rows per page for paged listings (users).
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_page_size() -> u64 {
    20
}

fn default_color() -> bool {
    true
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            view: ViewMode::default(),
            page_size: default_page_size(),
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Directory for a daily rolling log file. Stderr only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            dir: None,
        }
    }
}

/// The complete opsdesk.toml structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeskToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl DeskToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse opsdesk.toml")
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize opsdesk.toml")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Human-readable problems with the configuration. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        warnings.extend(validate_api_url(&self.api.base_url));
        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0; every request would time out".to_string());
        }
        if self.display.page_size == 0 {
            warnings.push("display.page_size must be at least 1".to_string());
        }
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            warnings.push(format!(
                "Invalid logging.level '{}': {}",
                self.logging.level, e
            ));
        }
        warnings
    }
}

fn validate_api_url(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => None,
        Ok(parsed) => Some(format!(
            "api.base_url '{}' must use http or https, not '{}'",
            url,
            parsed.scheme()
        )),
        Err(e) => Some(format!("api.base_url '{}' is not a valid URL: {}", url, e)),
    }
}

/// Where `config init` writes by default.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(CONFIG_DIR).join(CONFIG_FILE)
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("opsdesk").join(CONFIG_FILE))
}

/// Pick the config file to read: explicit path, project file, user file.
pub fn locate(explicit: Option<&Path>, cwd: &Path, user: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let project = project_config_path(cwd);
    if project.exists() {
        return Some(project);
    }
    user.filter(|p| p.exists()).map(Path::to_path_buf)
}

/// Values read from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub log: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            api_url: read(API_URL_ENV),
            log: read(LOG_ENV),
        }
    }
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub api_url: Option<String>,
    pub cards: bool,
    pub yes: bool,
    pub verbose: bool,
    pub log_format: Option<LogFormat>,
}

/// Effective configuration after layering file, environment and CLI.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// The file that was read, if any.
    pub path: Option<PathBuf>,
    pub toml: DeskToml,
    pub api_url: String,
    pub log_filter: String,
    pub log_format: LogFormat,
    pub view: ViewMode,
    pub yes: bool,
    pub verbose: bool,
}

impl DeskConfig {
    /// Load `.env`, find and read the config file, then apply overrides.
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        dotenvy::dotenv().ok();
        let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
        let user = user_config_path();
        let path = locate(cli.config.as_deref(), &cwd, user.as_deref());
        if let (Some(explicit), Some(path)) = (&cli.config, &path) {
            if !path.exists() {
                bail!("Config file not found: {}", explicit.display());
            }
        }
        let toml = DeskToml::load_or_default(path.as_deref())?;
        Ok(Self::resolve(path, toml, EnvOverrides::from_env(), cli))
    }

    /// Layer environment and CLI values over the file.
    pub fn resolve(
        path: Option<PathBuf>,
        toml: DeskToml,
        env: EnvOverrides,
        cli: &CliOverrides,
    ) -> Self {
        let api_url = cli
            .api_url
            .clone()
            .or(env.api_url)
            .unwrap_or_else(|| toml.api.base_url.clone());
        let log_filter = if cli.verbose {
            "debug".to_string()
        } else {
            env.log.unwrap_or_else(|| toml.logging.level.clone())
        };
        let view = if cli.cards {
            ViewMode::Cards
        } else {
            toml.display.view
        };
        Self {
            path,
            api_url,
            log_filter,
            log_format: cli.log_format.unwrap_or(toml.logging.format),
            view,
            yes: cli.yes,
            verbose: cli.verbose,
            toml,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.toml.api.timeout_secs.max(1))
    }

    pub fn page_size(&self) -> u64 {
        self.toml.display.page_size.max(1)
    }

    pub fn log_dir(&self) -> Option<&Path> {
        self.toml.logging.dir.as_deref()
    }

    /// Warnings for the file plus the effective API URL.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        if self.api_url != self.toml.api.base_url {
            warnings.extend(validate_api_url(&self.api_url));
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let toml = DeskToml::parse("").unwrap();
        assert_eq!(toml, DeskToml::default());
        assert_eq!(toml.api.base_url, "http://localhost:3000");
        assert_eq!(toml.display.page_size, 20);
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_parse_sections() {
        let toml = DeskToml::parse(
            r#"
[api]
base_url = "https://ops.example.com"

[display]
view = "cards"

[logging]
level = "opsdesk=debug"
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(toml.api.base_url, "https://ops.example.com");
        assert_eq!(toml.api.timeout_secs, 30);
        assert_eq!(toml.display.view, ViewMode::Cards);
        assert_eq!(toml.logging.format, LogFormat::Json);
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_view() {
        assert!(DeskToml::parse("[display]\nview = \"grid\"\n").is_err());
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let mut toml = DeskToml::default();
        toml.api.base_url = "ftp://ops.example.com".into();
        toml.api.timeout_secs = 0;
        toml.display.page_size = 0;
        toml.logging.level = "opsdesk=loud".into();
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 4, "{:?}", warnings);
        assert!(warnings[0].contains("http or https"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = project_config_path(dir.path());
        let mut toml = DeskToml::default();
        toml.display.page_size = 50;
        toml.save(&path).unwrap();
        assert_eq!(DeskToml::load(&path).unwrap(), toml);
    }

    #[test]
    fn test_locate_precedence() {
        let dir = tempdir().unwrap();
        let user_dir = tempdir().unwrap();
        let user = user_dir.path().join(CONFIG_FILE);

        assert_eq!(locate(None, dir.path(), Some(&user)), None);

        std::fs::write(&user, "").unwrap();
        assert_eq!(locate(None, dir.path(), Some(&user)), Some(user.clone()));

        let project = project_config_path(dir.path());
        DeskToml::default().save(&project).unwrap();
        assert_eq!(locate(None, dir.path(), Some(&user)), Some(project));

        let explicit = dir.path().join("other.toml");
        assert_eq!(
            locate(Some(&explicit), dir.path(), Some(&user)),
            Some(explicit)
        );
    }

    #[test]
    fn test_resolve_layers_env_then_cli() {
        let toml = DeskToml::default();
        let env = EnvOverrides {
            api_url: Some("http://env:4000".into()),
            log: Some("info".into()),
        };

        let config = DeskConfig::resolve(None, toml.clone(), env.clone(), &CliOverrides::default());
        assert_eq!(config.api_url, "http://env:4000");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.view, ViewMode::Table);

        let cli = CliOverrides {
            api_url: Some("http://cli:5000".into()),
            cards: true,
            verbose: true,
            log_format: Some(LogFormat::Json),
            ..Default::default()
        };
        let config = DeskConfig::resolve(None, toml, env, &cli);
        assert_eq!(config.api_url, "http://cli:5000");
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.view, ViewMode::Cards);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_effective_url_is_validated() {
        let cli = CliOverrides {
            api_url: Some("not a url".into()),
            ..Default::default()
        };
        let config =
            DeskConfig::resolve(None, DeskToml::default(), EnvOverrides::default(), &cli);
        assert_eq!(config.validate().len(), 1);
    }
}
