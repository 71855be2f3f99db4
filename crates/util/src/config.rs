use std::{env, fmt, str::FromStr};

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Where the binary is running. Only used to pick a default [`LogFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    fn default_log_format(self) -> LogFormat {
        match self {
            Self::Production => LogFormat::Json,
            Self::Development | Self::Test => LogFormat::Pretty,
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Rendering of diagnostic log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human readable output.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Logging setup for the self-test binary.
///
/// | variable | default |
/// |---|---|
/// | `APP_ENV` | `development` |
/// | `APP_LOG_FORMAT` | `json` in production, `pretty` otherwise |
/// | `RUST_LOG` | [`DEFAULT_LOG_FILTER`] |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub environment: Environment,
    pub log_format: LogFormat,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves the configuration from an arbitrary key lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = match read("APP_ENV") {
            Some(value) => value.trim().parse()?,
            None => Environment::Development,
        };
        let log_format = match read("APP_LOG_FORMAT") {
            Some(value) => value.trim().parse()?,
            None => environment.default_log_format(),
        };
        let log_filter = read("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            environment,
            log_format,
            log_filter,
        })
    }

    /// Configuration with every setting at its default for `environment`.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            log_format: environment.default_log_format(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidEnvironment(String),
    InvalidLogFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironment(value) => {
                write!(f, "unknown APP_ENV '{value}' (expected development, production or test)")
            }
            Self::InvalidLogFormat(value) => {
                write!(f, "unknown APP_LOG_FORMAT '{value}' (expected pretty or json)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
