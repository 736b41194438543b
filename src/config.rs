// Configuration loading and parsing (app.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fpl::client::FPL_BASE_URL;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing config file: {path}")]
    FileNotFound { path: PathBuf },

    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to seed config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub advisory: AdvisoryConfig,
    pub server: ServerConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// app.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for app.toml. Sections are optional and fall
/// back to defaults so a minimal file still works.
#[derive(Debug, Clone, Deserialize)]
struct AppFile {
    #[serde(default)]
    upstream: UpstreamConfig,
    #[serde(default)]
    advisory: AdvisoryConfig,
    #[serde(default)]
    server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_advisory_timeout")]
    pub timeout_secs: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_advisory_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_base_url() -> String {
    FPL_BASE_URL.to_string()
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_advisory_timeout() -> u64 {
    60
}

fn default_port() -> u16 {
    5000
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/app.toml` and (optionally)
/// `config/credentials.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // app.toml is required; credentials.toml is optional and absent in
    // advisory-disabled deployments.
    let app: AppFile = parse_toml(&config_dir.join("app.toml"))?;

    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        parse_toml(&credentials_path)?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        upstream: app.upstream,
        advisory: app.advisory,
        server: app.server,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` from `defaults/` on first run. Files already present in
/// `config/` are left alone, and `.example` templates are never copied.
/// Returns the files that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        // A repo checkout always ships defaults/; a deployment may ship
        // only a pre-built config/. Both directories missing means we are
        // running from the wrong place.
        if config_dir.is_dir() {
            return Ok(vec![]);
        }
        return Err(copy_error(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the project root or ensure defaults/ is present",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create config directory: {e}")))?;

    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("failed to read defaults directory: {e}")))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("failed to read defaults entry: {e}")))?
            .path();
        let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !source.is_file() || name.ends_with(".example") {
            continue;
        }

        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&source, &target)
            .map_err(|e| copy_error(format!("failed to copy {name} into config/: {e}")))?;
        copied.push(target);
    }

    Ok(copied)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Load config relative to the current working directory, seeding missing
/// files from defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.upstream.base_url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "upstream.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    if config.upstream.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "upstream.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.advisory.model.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "advisory.model".into(),
            message: "must not be empty".into(),
        });
    }

    if config.advisory.max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "advisory.max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.advisory.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "advisory.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.port".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
