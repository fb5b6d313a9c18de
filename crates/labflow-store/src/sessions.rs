use crate::layout::StoreLayout;
use crate::{fsync_dir, StoreError};
use labflow_schema::types::{SessionToken, UserId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::NamedTempFile;

/// Process-local counter folded into tokens so two logins in the same
/// clock tick still differ.
static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    user_id: UserId,
    created_at: String,
}

/// Opaque-token session records backing identity resolution.
///
/// Tokens are unguessable blake3 digests over the user id and the
/// creation instant; the record file is named by the token itself.
pub struct SessionStore {
    layout: StoreLayout,
}

impl SessionStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn open(&self, user_id: &UserId) -> Result<SessionToken, StoreError> {
        let now = chrono::Utc::now();
        let nanos = now.timestamp_nanos_opt().unwrap_or_default();
        let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        let token = SessionToken::new(
            blake3::hash(format!("{user_id}:{nanos}:{seq}").as_bytes())
                .to_hex()
                .to_string(),
        );

        let record = SessionRecord {
            user_id: user_id.clone(),
            created_at: now.to_rfc3339(),
        };
        let content = serde_json::to_string_pretty(&record)?;

        let dir = self.layout.sessions_dir();
        let dest = dir.join(&token);
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;

        Ok(token)
    }

    /// Resolve a token back to the user it was opened for. Unknown or
    /// revoked tokens resolve to `None`; the core maps that to its
    /// not-authenticated error.
    pub fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, StoreError> {
        let path = self.layout.sessions_dir().join(token);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let record: SessionRecord = serde_json::from_str(&content)?;
        Ok(Some(record.user_id))
    }

    pub fn revoke(&self, token: &SessionToken) -> Result<(), StoreError> {
        let path = self.layout.sessions_dir().join(token);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
