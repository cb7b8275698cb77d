//! Persisted bearer credential with an explicit lifecycle: created at login, dropped at logout.

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    access_token: String,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            created_at: Utc::now(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_config(config: &AppConfig) -> Self {
        Self::new(config.session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when no session has been saved or the file cannot be used.
    pub fn load(&self) -> Option<Session> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read session file");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&data) {
            Ok(session) if !session.access_token.is_empty() => Some(session),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to parse session file");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory at {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(session)?;
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .with_context(|| format!("Failed to open session file {}", self.path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // `mode` only applies on creation; tighten a file left over from an older save.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            if let Err(err) = fs::set_permissions(&self.path, perms) {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to restrict session file permissions");
            }
        }

        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove session at {}", self.path.display())),
        }
    }
}
