use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Current store format version. Incremented on incompatible layout changes.
pub const STORE_FORMAT_VERSION: u32 = 1;
const VERSION_FILE: &str = "version";

/// Directory layout for the Labflow document store.
///
/// Manages paths for requests, reservations, users, labs, sessions, lock
/// files, and the store version marker. All subdirectories are created
/// lazily on [`initialize`](Self::initialize).
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreVersion {
    format_version: u32,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn requests_dir(&self) -> PathBuf {
        self.root.join("store").join("requests")
    }

    #[inline]
    pub fn reservations_dir(&self) -> PathBuf {
        self.root.join("store").join("reservations")
    }

    #[inline]
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("store").join("users")
    }

    #[inline]
    pub fn labs_dir(&self) -> PathBuf {
        self.root.join("store").join("labs")
    }

    #[inline]
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("store").join("sessions")
    }

    #[inline]
    pub fn locks_dir(&self) -> PathBuf {
        self.root.join("store").join("locks")
    }

    /// Store-wide lock, held while WAL recovery mutates the store.
    #[inline]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join("store").join(".lock")
    }

    /// Per-lab lock serializing terminal approvals for one lab.
    #[inline]
    pub fn lab_lock_file(&self, lab_id: &str) -> PathBuf {
        self.locks_dir().join(format!("lab-{lab_id}.lock"))
    }

    /// Lock guarding the designation assignment write path.
    #[inline]
    pub fn designation_lock_file(&self) -> PathBuf {
        self.locks_dir().join("designations.lock")
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.requests_dir())?;
        fs::create_dir_all(self.reservations_dir())?;
        fs::create_dir_all(self.users_dir())?;
        fs::create_dir_all(self.labs_dir())?;
        fs::create_dir_all(self.sessions_dir())?;
        fs::create_dir_all(self.locks_dir())?;

        let version_path = self.root.join("store").join(VERSION_FILE);
        if version_path.exists() {
            self.verify_version()?;
        } else {
            let ver = StoreVersion {
                format_version: STORE_FORMAT_VERSION,
            };
            let content = serde_json::to_string_pretty(&ver)?;
            let store_dir = self.root.join("store");
            let mut tmp = NamedTempFile::new_in(&store_dir)?;
            tmp.write_all(content.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&version_path)
                .map_err(|e| StoreError::Io(e.error))?;
            crate::fsync_dir(&store_dir)?;
        }

        Ok(())
    }

    pub fn verify_version(&self) -> Result<(), StoreError> {
        let version_path = self.root.join("store").join(VERSION_FILE);
        let content = fs::read_to_string(&version_path)?;
        let ver: StoreVersion = serde_json::from_str(&content)?;

        if ver.format_version != STORE_FORMAT_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: STORE_FORMAT_VERSION,
                found: ver.format_version,
            });
        }
        Ok(())
    }
}
