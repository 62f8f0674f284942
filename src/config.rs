use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::constants::{DEFAULT_FORUM_BASE_URL, DEFAULT_PAGE_ENCODING};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
    #[error("failed to parse {name} as URL: {source}")]
    ParseUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    // Credentials
    pub username: String,
    pub password: String,

    // Forum
    pub base_url: Url,
    pub board_url: Url,
    pub page_encoding: String,
    pub http_timeout: Duration,

    // Moderation
    pub word_list_path: PathBuf,
    pub confirm_deletions: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("board_url", &self.board_url.as_str())
            .field("page_encoding", &self.page_encoding)
            .field("http_timeout", &self.http_timeout)
            .field("word_list_path", &self.word_list_path)
            .field("confirm_deletions", &self.confirm_deletions)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Credentials
            username: required_env("FORUM_USERNAME")?,
            password: required_env("FORUM_PASSWORD")?,

            // Forum
            base_url: parse_base_url(&env_or_default("FORUM_BASE_URL", DEFAULT_FORUM_BASE_URL))?,
            board_url: parse_url("BOARD_URL", &required_env("BOARD_URL")?)?,
            page_encoding: env_or_default("PAGE_ENCODING", DEFAULT_PAGE_ENCODING),
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // Moderation
            word_list_path: PathBuf::from(env_or_default("WORD_LIST_PATH", "wordDict.txt")),
            confirm_deletions: parse_env_bool("CONFIRM_DELETIONS", true)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "FORUM_USERNAME".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.page_encoding.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "PAGE_ENCODING".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        for (name, url) in [("FORUM_BASE_URL", &self.base_url), ("BOARD_URL", &self.board_url)] {
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: format!("must be an http(s) URL with a host, got '{url}'"),
                });
            }
        }
        Ok(())
    }

    /// Configuration pointing at a local forum, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        let base_url = Url::parse("http://127.0.0.1/").expect("valid test URL");
        Self {
            username: "moderator".to_string(),
            password: "secret".to_string(),
            board_url: base_url.join("bbsdoc/Test.html").expect("valid test URL"),
            base_url,
            page_encoding: "utf-8".to_string(),
            http_timeout: Duration::from_secs(10),
            word_list_path: PathBuf::from("wordDict.txt"),
            confirm_deletions: false,
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::ParseUrl {
        name: name.to_string(),
        source: e,
    })
}

/// Thread links and endpoints are joined onto the base, so it must end in `/`.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    if value.ends_with('/') {
        parse_url("FORUM_BASE_URL", value)
    } else {
        parse_url("FORUM_BASE_URL", &format!("{value}/"))
    }
}
