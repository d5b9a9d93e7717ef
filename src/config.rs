//! qrmint runtime configuration handling

use crate::allocator::{DEFAULT_ID_LENGTH, DEFAULT_MAX_ATTEMPTS};
use crate::error::{Error, Result};
use crate::store::FirestoreStore;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrmintConfig {
    /// Remote document store connection settings
    pub store: StoreOptions,
    /// Batch minting parameters
    pub mint: MintSettings,
    /// Artifact output settings
    pub output: OutputOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl QrmintConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrmint.toml / qrmint.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrmint.toml", "qrmint.yaml", "qrmint.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrmint");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.store.apply_env_overrides();
        self.mint.apply_env_overrides();
        self.output.apply_env_overrides();
        self.logging.apply_env_overrides();
    }
}

/// Remote document store connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Cloud project the Firestore collections live in
    pub project: Option<String>,
    /// Named database; `(default)` when unset
    pub database: Option<String>,
    /// REST endpoint override, e.g. a local emulator
    pub base_url: Option<String>,
    /// OAuth bearer token (usually injected via `QRMINT_STORE_TOKEN`)
    pub token: Option<String>,
}

impl StoreOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(project) = env::var("QRMINT_STORE_PROJECT") {
            self.project = Some(project);
        }
        if let Ok(database) = env::var("QRMINT_STORE_DATABASE") {
            self.database = Some(database);
        }
        if let Ok(base_url) = env::var("QRMINT_STORE_BASE_URL") {
            self.base_url = Some(base_url);
        }
        if let Ok(token) = env::var("QRMINT_STORE_TOKEN") {
            self.token = Some(token);
        }
    }

    /// Build the live Firestore adapter from these settings.
    pub fn to_store(&self) -> Result<FirestoreStore> {
        let project = self.project.as_ref().ok_or_else(|| {
            Error::Config(
                "No store project configured; set [store].project or QRMINT_STORE_PROJECT"
                    .to_string(),
            )
        })?;

        let mut store = FirestoreStore::new(project);
        if let Some(database) = &self.database {
            store = store.with_database(database);
        }
        if let Some(base_url) = &self.base_url {
            store = store.with_base_url(base_url);
        }
        if let Some(token) = &self.token {
            store = store.with_token(token);
        }
        Ok(store)
    }
}

/// Batch minting parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MintSettings {
    /// Number of codes to mint per invocation
    pub count: u32,
    /// Identifier length in characters
    pub id_length: usize,
    /// Candidate attempts before the allocator gives up
    pub max_attempts: u32,
    /// Frontend base URL the codes point at
    pub base_url: String,
    /// Origin tag written into label records
    pub created_for: String,
}

impl Default for MintSettings {
    fn default() -> Self {
        Self {
            count: 1,
            id_length: DEFAULT_ID_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_url: "https://frontend-230228655056.asia-south1.run.app".to_string(),
            created_for: "carevego".to_string(),
        }
    }
}

impl MintSettings {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(count) = env::var("QRMINT_COUNT") {
            if let Ok(parsed) = count.parse::<u32>() {
                self.count = parsed;
            }
        }
        if let Ok(length) = env::var("QRMINT_ID_LENGTH") {
            if let Ok(parsed) = length.parse::<usize>() {
                self.id_length = parsed.max(1);
            }
        }
        if let Ok(attempts) = env::var("QRMINT_MAX_ATTEMPTS") {
            if let Ok(parsed) = attempts.parse::<u32>() {
                self.max_attempts = parsed.max(1);
            }
        }
        if let Ok(base_url) = env::var("QRMINT_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(created_for) = env::var("QRMINT_CREATED_FOR") {
            self.created_for = created_for;
        }
    }
}

/// Artifact output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Directory PNG artifacts are written into
    pub dir: PathBuf,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl OutputOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("QRMINT_OUTPUT_DIR") {
            self.dir = PathBuf::from(dir);
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRMINT_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stdout logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("QRMINT_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("QRMINT_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("QRMINT_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("QRMINT_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
