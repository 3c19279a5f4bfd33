//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.salam/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ClientOptions;
use crate::api::client::DEFAULT_GET_RETRIES;
use crate::core::state::{DEFAULT_MOBILE_BREAKPOINT, Theme};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SalamConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub get_retries: Option<u32>,
    pub theme: Option<Theme>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LayoutConfig {
    pub mobile_breakpoint: Option<u16>,
    pub sidebar_width: Option<u16>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
pub const DEFAULT_SIDEBAR_WIDTH: u16 = 34;
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub get_retries: u32,
    pub theme: Theme,
    pub log_level: LevelFilter,
    /// `None` when no home directory is available.
    pub log_file: Option<PathBuf>,
    pub mobile_breakpoint: u16,
    pub sidebar_width: u16,
    /// Problems found while resolving. Logging is not up yet at that point,
    /// so the caller reports them once it is.
    pub warnings: Vec<String>,
}

impl ResolvedConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.request_timeout,
            get_retries: self.get_retries,
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.salam/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".salam").join("config.toml"))
}

/// Load config from `~/.salam/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `SalamConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<SalamConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(SalamConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<SalamConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(SalamConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: SalamConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Salam Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# base_url = "http://localhost:8000"   # Or set SALAM_API_URL, or pass --base-url
# request_timeout_secs = 30
# get_retries = 1                       # Extra attempts for GET requests only
# theme = "light"                       # "light" or "dark"
# log_level = "info"                    # Or set SALAM_LOG
# log_file = "salam.log"                # Path relative to ~/.salam/

# [layout]
# mobile_breakpoint = 100               # Below this many columns the sidebar becomes an overlay
# sidebar_width = 34
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` is the `--base-url` flag (None = not specified).
pub fn resolve(config: &SalamConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    resolve_with(config, cli_base_url, |key| std::env::var(key).ok())
}

/// [`resolve`] with an injectable environment lookup.
pub fn resolve_with(
    config: &SalamConfig,
    cli_base_url: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| env("SALAM_API_URL"))
        .or_else(|| config.general.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let mut warnings = Vec::new();

    // Log level: env → config → default
    let log_level = env("SALAM_LOG")
        .or_else(|| config.general.log_level.clone())
        .and_then(|raw| match raw.parse::<LevelFilter>() {
            Ok(level) => Some(level),
            Err(_) => {
                warnings.push(format!("Unknown log level {:?}, using {}", raw, DEFAULT_LOG_LEVEL));
                None
            }
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    // A zero timeout would fail every request
    let timeout_secs = match config.general.request_timeout_secs {
        Some(0) => {
            warnings.push(format!(
                "request_timeout_secs must be at least {}s, using {}s",
                MIN_REQUEST_TIMEOUT_SECS, MIN_REQUEST_TIMEOUT_SECS
            ));
            MIN_REQUEST_TIMEOUT_SECS
        }
        Some(secs) => secs,
        None => DEFAULT_REQUEST_TIMEOUT_SECS,
    };

    // Log file: relative paths live under ~/.salam/
    let log_file = dirs::home_dir().map(|home| {
        let dir = home.join(".salam");
        match config.general.log_file.as_deref() {
            Some(file) => dir.join(file),
            None => dir.join("salam.log"),
        }
    });

    ResolvedConfig {
        base_url,
        request_timeout: Duration::from_secs(timeout_secs),
        get_retries: config.general.get_retries.unwrap_or(DEFAULT_GET_RETRIES),
        theme: config.general.theme.unwrap_or_default(),
        log_level,
        log_file,
        mobile_breakpoint: config
            .layout
            .mobile_breakpoint
            .unwrap_or(DEFAULT_MOBILE_BREAKPOINT),
        sidebar_width: config.layout.sidebar_width.unwrap_or(DEFAULT_SIDEBAR_WIDTH),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with(&SalamConfig::default(), None, no_env);
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.request_timeout, Duration::from_secs(30));
        assert_eq!(resolved.get_retries, 1);
        assert_eq!(resolved.theme, Theme::Light);
        assert_eq!(resolved.log_level, LevelFilter::Info);
        assert_eq!(resolved.mobile_breakpoint, DEFAULT_MOBILE_BREAKPOINT);
        assert_eq!(resolved.sidebar_width, DEFAULT_SIDEBAR_WIDTH);
    }

    #[test]
    fn test_base_url_precedence() {
        let config = SalamConfig {
            general: GeneralConfig {
                base_url: Some("http://from-config:8000".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| (key == "SALAM_API_URL").then(|| "http://from-env:8000/".to_string());

        assert_eq!(resolve_with(&config, None, no_env).base_url, "http://from-config:8000");
        assert_eq!(resolve_with(&config, None, env).base_url, "http://from-env:8000");
        assert_eq!(
            resolve_with(&config, Some("http://from-cli"), env).base_url,
            "http://from-cli"
        );
    }

    #[test]
    fn test_log_level_from_env_and_bad_values() {
        let config = SalamConfig {
            general: GeneralConfig {
                log_level: Some("debug".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve_with(&config, None, no_env).log_level, LevelFilter::Debug);

        let env = |key: &str| (key == "SALAM_LOG").then(|| "trace".to_string());
        assert_eq!(resolve_with(&config, None, env).log_level, LevelFilter::Trace);

        let env = |key: &str| (key == "SALAM_LOG").then(|| "loud".to_string());
        let resolved = resolve_with(&config, None, env);
        assert_eq!(resolved.log_level, LevelFilter::Info);
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("\"loud\""));
    }

    #[test]
    fn test_zero_timeout_is_raised_to_minimum() {
        let config: SalamConfig = toml::from_str("[general]\nrequest_timeout_secs = 0\n").unwrap();
        let resolved = resolve_with(&config, None, no_env);
        assert_eq!(resolved.request_timeout, Duration::from_secs(1));
        assert_eq!(resolved.warnings.len(), 1);

        let clean = resolve_with(&SalamConfig::default(), None, no_env);
        assert!(clean.warnings.is_empty());
    }

    #[test]
    fn test_toml_parses_all_sections() {
        let toml_str = r#"
[general]
base_url = "https://api.example.org"
request_timeout_secs = 10
get_retries = 0
theme = "dark"
log_level = "warn"

[layout]
mobile_breakpoint = 80
sidebar_width = 40
"#;
        let config: SalamConfig = toml::from_str(toml_str).unwrap();
        let resolved = resolve_with(&config, None, no_env);
        assert_eq!(resolved.base_url, "https://api.example.org");
        assert_eq!(resolved.request_timeout, Duration::from_secs(10));
        assert_eq!(resolved.get_retries, 0);
        assert_eq!(resolved.theme, Theme::Dark);
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        assert_eq!(resolved.mobile_breakpoint, 80);
        assert_eq!(resolved.sidebar_width, 40);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: SalamConfig = toml::from_str("[layout]\nsidebar_width = 28\n").unwrap();
        assert_eq!(config.layout.sidebar_width, Some(28));
        assert!(config.general.base_url.is_none());
        assert!(config.layout.mobile_breakpoint.is_none());
    }

    #[test]
    fn test_bad_theme_is_parse_error() {
        let dir = scratch_dir("config-bad");
        let path = dir.join("config.toml");
        fs::write(&path, "[general]\ntheme = \"sepia\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = scratch_dir("config-new");
        let path = dir.join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.general.base_url.is_none());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("# base_url"));
        // The generated file is all comments, so it loads as defaults
        let reparsed = load_config_from(&path).unwrap();
        assert!(reparsed.general.theme.is_none());
    }

    #[test]
    fn test_client_options_follow_config() {
        let config = SalamConfig {
            general: GeneralConfig {
                request_timeout_secs: Some(5),
                get_retries: Some(3),
                ..Default::default()
            },
            ..Default::default()
        };
        let options = resolve_with(&config, None, no_env).client_options();
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.get_retries, 3);
    }
}
