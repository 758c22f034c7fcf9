//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_COOKIE_NAME: &str = "token";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const TOKEN_DIR: &str = "murales";
const TOKEN_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
    #[error("no token path configured and no user config directory found")]
    NoTokenPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub cookie_name: String,
    pub token_path: Option<PathBuf>,
    pub timeouts: ClientTimeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            token_path: None,
            timeouts: ClientTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `MURALES_BASE_URL`: default `http://localhost:4000`
    /// - `MURALES_COOKIE_NAME`: default `token`
    /// - `MURALES_TOKEN_PATH`: default `<config dir>/murales/session.json`
    /// - `MURALES_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MURALES_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or cookie name is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. `from_env` delegates here.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or cookie name resolves to an empty string.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("MURALES_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();
        if base_url.is_empty() {
            return Err(ConfigError::Empty { var: "MURALES_BASE_URL" });
        }

        let cookie_name = lookup("MURALES_COOKIE_NAME")
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_owned())
            .trim()
            .to_owned();
        if cookie_name.is_empty() {
            return Err(ConfigError::Empty { var: "MURALES_COOKIE_NAME" });
        }

        let token_path = lookup("MURALES_TOKEN_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let timeouts = ClientTimeouts {
            request_secs: parse_u64(lookup("MURALES_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("MURALES_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, cookie_name, token_path, timeouts })
    }

    /// Resolve where the session token file lives.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoTokenPath`] when no explicit path is set and the
    /// platform has no user config directory.
    pub fn resolved_token_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.token_path {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(TOKEN_DIR).join(TOKEN_FILE))
            .ok_or(ConfigError::NoTokenPath)
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
