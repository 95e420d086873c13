//! Catalog runtime configuration.
//!
//! # Responsibility
//! - Turn a connection string into a concrete [`StorageTarget`].
//! - Collect logging options next to the storage selection.
//!
//! # Invariants
//! - Only [`CatalogConfig::from_env`] touches the process environment.
//! - Empty variables count as unset.
//! - Unsupported connection strings are rejected, never silently defaulted.

use crate::logging::default_log_level;
use config::{Config, Environment};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const LOG_LEVEL_VAR: &str = "BOOKSHELF_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "BOOKSHELF_LOG_DIR";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///./books.db";

// `config::Environment` lowercases variable names into keys.
const DATABASE_URL_KEY: &str = "database_url";
const LOG_LEVEL_KEY: &str = "bookshelf_log_level";

const SQLITE_PREFIX: &str = "sqlite://";

/// Configuration loading or parsing error.
#[derive(Debug)]
pub enum ConfigError {
    /// Variables could not be collected or deserialized.
    Load(config::ConfigError),
    /// Connection string was empty or whitespace-only.
    EmptyConnectionString,
    /// Scheme is recognized but not backed by an implementation.
    UnsupportedBackend(String),
    /// Connection string does not follow any accepted form.
    InvalidConnectionString(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load configuration: {err}"),
            Self::EmptyConnectionString => write!(f, "connection string cannot be empty"),
            Self::UnsupportedBackend(scheme) => {
                write!(f, "unsupported storage backend `{scheme}`; expected sqlite or memory")
            }
            Self::InvalidConnectionString(value) => {
                write!(f, "invalid connection string `{value}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Load(value)
    }
}

/// Storage backend selected by a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// Vector-backed repository; contents vanish with the process.
    InMemory,
    /// SQLite in-memory database.
    SqliteMemory,
    /// SQLite database file (relative paths resolve against the working dir).
    SqliteFile(PathBuf),
}

impl StorageTarget {
    /// Parses a connection string.
    ///
    /// Accepted forms:
    /// - `memory`, `memory://`
    /// - `sqlite://`, `sqlite:///:memory:`, `sqlite::memory:`
    /// - `sqlite:///relative/path.db`, `sqlite:////absolute/path.db`
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::EmptyConnectionString);
        }

        match value {
            "memory" | "memory://" => return Ok(Self::InMemory),
            "sqlite://" | "sqlite:///:memory:" | "sqlite::memory:" => {
                return Ok(Self::SqliteMemory)
            }
            _ => {}
        }

        if let Some(rest) = value.strip_prefix(SQLITE_PREFIX) {
            let path = rest
                .strip_prefix('/')
                .filter(|path| !path.is_empty())
                .ok_or_else(|| ConfigError::InvalidConnectionString(value.to_string()))?;
            return Ok(Self::SqliteFile(PathBuf::from(path)));
        }

        match value.split_once("://") {
            Some((scheme, _)) if !scheme.is_empty() => {
                Err(ConfigError::UnsupportedBackend(scheme.to_string()))
            }
            _ => Err(ConfigError::InvalidConnectionString(value.to_string())),
        }
    }

    /// Short backend label used in logs and CLI output.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::InMemory => "memory",
            Self::SqliteMemory => "sqlite_memory",
            Self::SqliteFile(_) => "sqlite_file",
        }
    }
}

/// Runtime configuration passed explicitly into catalog construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub storage: StorageTarget,
    pub log_level: String,
    /// Absolute log directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

/// Raw variables as collected from the environment.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    database_url: String,
    bookshelf_log_level: String,
    #[serde(default)]
    bookshelf_log_dir: Option<PathBuf>,
}

impl CatalogConfig {
    /// Builds a config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    /// Builds a config from an explicit variable map instead of the process
    /// environment. Keys use the environment names, e.g. `DATABASE_URL`.
    pub fn from_vars(vars: config::Map<String, String>) -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().source(Some(vars)))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let settings: EnvSettings = Config::builder()
            .set_default(DATABASE_URL_KEY, DEFAULT_DATABASE_URL)?
            .set_default(LOG_LEVEL_KEY, default_log_level())?
            .add_source(environment.ignore_empty(true))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            storage: StorageTarget::parse(&settings.database_url)?,
            log_level: settings.bookshelf_log_level,
            log_dir: settings.bookshelf_log_dir,
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            storage: StorageTarget::SqliteFile(PathBuf::from("./books.db")),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}
