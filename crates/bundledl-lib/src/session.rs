use crate::error::BundleDlError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How long a session supplied on the command line is cached.
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSession {
    pub session: String,
    /// Unix timestamp, in seconds.
    pub expiry: u64,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The per-user session cache file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("bundledl").join("session.json"))
            .unwrap_or_else(|| PathBuf::from(".bundledl-session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached token, unless the cache is missing, unreadable or expired.
    pub fn load(&self) -> Option<String> {
        self.load_at(now_unix())
    }

    pub fn load_at(&self, now: u64) -> Option<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), "No session cache: {}", e);
                return None;
            }
        };

        let cached: CachedSession = match serde_json::from_str(&content) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable session cache: {}", e);
                return None;
            }
        };

        if cached.expiry <= now {
            tracing::info!("Cached session has expired");
            return None;
        }
        Some(cached.session)
    }

    pub fn save(&self, session: &str) -> Result<(), BundleDlError> {
        self.save_with_expiry(session, now_unix() + SESSION_TTL.as_secs())
    }

    pub fn save_with_expiry(&self, session: &str, expiry: u64) -> Result<(), BundleDlError> {
        let cache_error = |reason: String| BundleDlError::SessionCache {
            path: self.path.clone(),
            reason,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| cache_error(e.to_string()))?;
        }

        let cached = CachedSession {
            session: session.to_string(),
            expiry,
        };
        let json = serde_json::to_string_pretty(&cached)
            .map_err(|e| cache_error(format!("JSON serialization failed: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| cache_error(e.to_string()))
    }
}
