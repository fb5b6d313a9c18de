use crate::layout::StoreLayout;
use crate::requests::{RequestStatus, RequestStore};
use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

fn parse_request_status(s: &str) -> Option<RequestStatus> {
    match s {
        "pending" => Some(RequestStatus::Pending),
        "forwarded_to_hod" => Some(RequestStatus::ForwardedToHod),
        "forwarded_to_principal" => Some(RequestStatus::ForwardedToPrincipal),
        "approved" => Some(RequestStatus::Approved),
        "sent_back" => Some(RequestStatus::SentBack),
        _ => None,
    }
}

/// A single rollback step that can undo part of an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RollbackStep {
    /// Remove a single file (e.g. a reservation written by a torn approval).
    RemoveFile(PathBuf),
    /// Restore a request to an earlier status, clearing the principal's
    /// stage record written by the interrupted approval.
    ResetRequest {
        request_id: String,
        target_status: String,
    },
}

/// The type of mutating operation being tracked.
///
/// The terminal approval is the only operation that spans multiple
/// writes (one reservation per slot, then the request record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalOpKind {
    Approve,
}

impl std::fmt::Display for WalOpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalOpKind::Approve => write!(f, "approve"),
        }
    }
}

/// A WAL entry representing an in-flight operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub op_id: String,
    pub kind: WalOpKind,
    pub request_id: String,
    pub timestamp: String,
    pub rollback_steps: Vec<RollbackStep>,
}

/// Write-ahead log for crash recovery.
///
/// The approval path creates a WAL entry before starting work, appends
/// rollback steps as side effects occur, and removes the entry on
/// successful completion. On startup, incomplete entries are rolled back.
pub struct WriteAheadLog {
    wal_dir: PathBuf,
}

impl WriteAheadLog {
    pub fn new(layout: &StoreLayout) -> Self {
        let wal_dir = layout.root().join("store").join("wal");
        Self { wal_dir }
    }

    /// Ensure the WAL directory exists.
    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.wal_dir)?;
        Ok(())
    }

    /// Begin a new WAL entry for an operation. Returns the op_id.
    pub fn begin(&self, kind: WalOpKind, request_id: &str) -> Result<String, StoreError> {
        let op_id = format!(
            "{}-{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S%3f"),
            &blake3::hash(request_id.as_bytes()).to_hex()[..8]
        );
        let entry = WalEntry {
            op_id: op_id.clone(),
            kind,
            request_id: request_id.to_owned(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            rollback_steps: Vec::new(),
        };
        self.write_entry(&entry)?;
        debug!("WAL begin: {} for {request_id} (op_id={op_id})", entry.kind);
        Ok(op_id)
    }

    /// Append a rollback step to an existing WAL entry.
    pub fn add_rollback_step(&self, op_id: &str, step: RollbackStep) -> Result<(), StoreError> {
        let mut entry = self.read_entry(op_id)?;
        entry.rollback_steps.push(step);
        self.write_entry(&entry)?;
        Ok(())
    }

    /// Commit (remove) a WAL entry after successful completion.
    pub fn commit(&self, op_id: &str) -> Result<(), StoreError> {
        let path = self.entry_path(op_id);
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("WAL commit: {op_id}");
        }
        Ok(())
    }

    /// List all incomplete WAL entries.
    pub fn list_incomplete(&self) -> Result<Vec<WalEntry>, StoreError> {
        if !self.wal_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.wal_dir)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                match fs::read_to_string(&path) {
                    Ok(content) => match serde_json::from_str::<WalEntry>(&content) {
                        Ok(entry) => entries.push(entry),
                        Err(e) => {
                            warn!("corrupt WAL entry {}: {e}", path.display());
                            // Remove corrupt entries
                            let _ = fs::remove_file(&path);
                        }
                    },
                    Err(e) => {
                        warn!("unreadable WAL entry {}: {e}", path.display());
                        let _ = fs::remove_file(&path);
                    }
                }
            }
        }
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(entries)
    }

    /// Roll back all incomplete WAL entries.
    /// Returns the number of entries rolled back.
    pub fn recover(&self) -> Result<usize, StoreError> {
        let entries = self.list_incomplete()?;
        let count = entries.len();
        for entry in &entries {
            info!(
                "WAL recovery: rolling back {} on {} (op_id={})",
                entry.kind, entry.request_id, entry.op_id
            );
            self.rollback_entry(entry);
            // Remove the WAL entry after rollback
            let _ = fs::remove_file(self.entry_path(&entry.op_id));
        }
        if count > 0 {
            info!("WAL recovery complete: {count} entries rolled back");
        }
        Ok(count)
    }

    fn rollback_entry(&self, entry: &WalEntry) {
        // Execute rollback steps in reverse order
        for step in entry.rollback_steps.iter().rev() {
            match step {
                RollbackStep::RemoveFile(path) => {
                    if path.exists() {
                        if let Err(e) = fs::remove_file(path) {
                            warn!(
                                "WAL rollback: failed to remove file {}: {e}",
                                path.display()
                            );
                        } else {
                            debug!("WAL rollback: removed file {}", path.display());
                        }
                    }
                }
                RollbackStep::ResetRequest {
                    request_id,
                    target_status,
                } => {
                    let Some(new_status) = parse_request_status(target_status) else {
                        warn!("WAL rollback: unknown target status '{target_status}' for {request_id}");
                        continue;
                    };

                    // wal_dir = <root>/store/wal
                    let Some(store_dir) = self.wal_dir.parent() else {
                        continue;
                    };
                    let Some(root_dir) = store_dir.parent() else {
                        continue;
                    };

                    let layout = StoreLayout::new(root_dir);
                    let requests = RequestStore::new(layout);
                    let mut request = match requests.get(request_id) {
                        Ok(r) => r,
                        Err(e) => {
                            warn!("WAL rollback: failed to load request {request_id}: {e}");
                            continue;
                        }
                    };

                    request.status = new_status;
                    request.trail.principal = None;

                    if let Err(e) = requests.put(&request) {
                        warn!("WAL rollback: failed to persist request {request_id}: {e}");
                    } else {
                        debug!("WAL rollback: reset {request_id} to {target_status}");
                    }
                }
            }
        }
    }

    fn entry_path(&self, op_id: &str) -> PathBuf {
        self.wal_dir.join(format!("{op_id}.json"))
    }

    fn write_entry(&self, entry: &WalEntry) -> Result<(), StoreError> {
        fs::create_dir_all(&self.wal_dir)?;
        let content = serde_json::to_string_pretty(entry)?;
        let mut tmp = NamedTempFile::new_in(&self.wal_dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        let dest = self.entry_path(&entry.op_id);
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        crate::fsync_dir(&self.wal_dir)?;
        Ok(())
    }

    fn read_entry(&self, op_id: &str) -> Result<WalEntry, StoreError> {
        let path = self.entry_path(op_id);
        let content = fs::read_to_string(&path)?;
        let entry: WalEntry = serde_json::from_str(&content)?;
        Ok(entry)
    }
}
