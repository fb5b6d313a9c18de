//! Durable collaborators for the Labflow approval engine.
//!
//! This crate provides the storage layer: a `RequestStore` for booking
//! requests with embedded blake3 checksums, the append-only `SlotLedger`
//! of confirmed reservations, directory stores for users, labs, and
//! sessions, `StoreLayout` for directory structure management, and a
//! `WriteAheadLog` so the terminal approval commits atomically.

pub mod labs;
pub mod layout;
pub mod ledger;
pub mod requests;
pub mod sessions;
pub mod users;
pub mod wal;

pub use labs::LabStore;
pub use layout::{StoreLayout, STORE_FORMAT_VERSION};
pub use ledger::{SlotLedger, SlotReservation};
pub use requests::{
    ApprovalTrail, BookingRequest, RequestFilter, RequestStatus, RequestStore, StageRecord,
};
pub use sessions::SessionStore;
pub use users::UserStore;
pub use wal::{RollbackStep, WalOpKind, WriteAheadLog};

use std::path::Path;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// On Linux with ext4 `data=ordered` (the default), renames are usually
/// durable without an explicit dir fsync, but POSIX does not guarantee this.
/// Calling `fsync()` on the parent directory makes the rename durable on
/// all filesystems and mount configurations.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("integrity check failed for request '{id}': expected {expected}, got {actual}")]
    IntegrityFailure {
        id: String,
        expected: String,
        actual: String,
    },
    #[error("request not found: {0}")]
    RequestNotFound(String),
    #[error("reservation not found: {0}")]
    ReservationNotFound(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("lab not found: {0}")]
    LabNotFound(String),
    #[error("lock acquisition failed: {0}")]
    LockFailed(String),
    #[error("store format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
