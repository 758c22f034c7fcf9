//! Persisted session token: the native stand-in for the browser cookie jar.
//!
//! SYSTEM CONTEXT
//! ==============
//! The service issues an opaque session cookie on login/registration and
//! expects it back on every request. [`HttpApi`](super::api::HttpApi) owns
//! reading and writing the value; the session manager only asks whether one
//! exists and removes it on logout.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token store I/O failed: {0}")]
    Io(String),
    #[error("token file is corrupt: {0}")]
    Corrupt(String),
    #[error("token store lock poisoned")]
    Poisoned,
}

/// Storage for the single opaque session token.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>, TokenError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &str) -> Result<(), TokenError>;

    /// Remove the stored token. Removing an absent token succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be modified.
    fn clear(&self) -> Result<(), TokenError>;

    /// Whether a token is present. Unreadable storage counts as absent.
    fn exists(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }

    /// Apply a `Set-Cookie` outcome to the store.
    ///
    /// # Errors
    ///
    /// Propagates the save/clear failure.
    fn apply(&self, update: &CookieUpdate) -> Result<(), TokenError> {
        match update {
            CookieUpdate::Set(token) => self.save(token),
            CookieUpdate::Clear => self.clear(),
        }
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store. Used by tests and by embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        let guard = self.token.lock().map_err(|_| TokenError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenError> {
        let mut guard = self.token.lock().map_err(|_| TokenError::Poisoned)?;
        *guard = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenError> {
        let mut guard = self.token.lock().map_err(|_| TokenError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

#[derive(Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// JSON file holding `{"token": "..."}`. Parent directories are created on save.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| "session".into(), |name| name.to_string_lossy());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

fn io_error(e: std::io::Error) -> TokenError {
    TokenError::Io(e.to_string())
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TokenError::Io(e.to_string())),
        };
        let file: TokenFile = serde_json::from_str(&raw).map_err(|e| TokenError::Corrupt(e.to_string()))?;
        if file.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(file.token))
    }

    fn save(&self, token: &str) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let body = serde_json::to_string(&TokenFile { token: token.to_owned() })
            .map_err(|e| TokenError::Corrupt(e.to_string()))?;

        // Sibling temp file, then rename over the target.
        let tmp_path = self.temp_path();
        let mut tmp_file = File::create(&tmp_path).map_err(io_error)?;
        tmp_file.write_all(body.as_bytes()).map_err(io_error)?;
        tmp_file.sync_all().map_err(io_error)?;
        drop(tmp_file);
        restrict_permissions(&tmp_path)?;
        std::fs::rename(&tmp_path, &self.path).map_err(io_error)
    }

    fn clear(&self) -> Result<(), TokenError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TokenError::Io(e.to_string())),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), TokenError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| TokenError::Io(e.to_string()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), TokenError> {
    Ok(())
}

// =============================================================================
// SET-COOKIE HANDLING
// =============================================================================

/// What a `Set-Cookie` header means for the stored token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieUpdate {
    Set(String),
    Clear,
}

/// Interpret one `Set-Cookie` header value for `cookie_name`.
///
/// Returns `None` for other cookies and unparseable headers. An empty value,
/// a non-positive `Max-Age`, or an `Expires` at or before `now` clears.
#[must_use]
pub fn cookie_update(header: &str, cookie_name: &str, now: OffsetDateTime) -> Option<CookieUpdate> {
    let parsed = cookie::Cookie::parse(header).ok()?;
    if parsed.name() != cookie_name {
        return None;
    }
    let expired_by_age = parsed.max_age().is_some_and(|age| age <= time::Duration::ZERO);
    let expired_by_date = parsed.expires_datetime().is_some_and(|at| at <= now);
    if parsed.value().is_empty() || expired_by_age || expired_by_date {
        return Some(CookieUpdate::Clear);
    }
    Some(CookieUpdate::Set(parsed.value().to_owned()))
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
