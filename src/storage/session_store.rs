// Persistent player credentials, one JSON record per username
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Registration;
use crate::o_debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub username: String,
    #[serde(rename = "playerId")]
    pub player_id: u64,
    pub key: String,
    pub registered_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn from_registration(username: &str, registration: Registration) -> Self {
        Self {
            username: username.to_string(),
            player_id: registration.player_id,
            key: registration.key,
            registered_at: Utc::now(),
        }
    }
}

/// Keep ASCII letters and digits, lowercased
pub fn sanitize_username(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_username(username)))
    }

    /// Stored record for `username`, `None` if it was never saved
    pub fn load(&self, username: &str) -> Result<Option<SessionRecord>, Box<dyn std::error::Error>> {
        let path = self.path_for(username);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let record: SessionRecord = serde_json::from_str(&content)?;
        o_debug!("💾 Loaded session for {} from {}", record.username, path.display());
        Ok(Some(record))
    }

    pub fn save(&self, record: &SessionRecord) -> Result<(), Box<dyn std::error::Error>> {
        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir)?;
        }

        let path = self.path_for(&record.username);
        let content = serde_json::to_string_pretty(record)?;
        fs::write(&path, content)?;
        o_debug!("💾 Saved session for {} to {}", record.username, path.display());
        Ok(())
    }
}
