//! Core approval engine for Labflow lab bookings.
//!
//! This crate ties together the schema layer and the document stores into
//! the `Engine` — the central API for submitting booking requests, walking
//! them through the tutor → HOD → principal approval chain, and committing
//! slot reservations atomically at the terminal approval. It also provides
//! the pure conflict checker and file-lock based concurrency control.

pub mod concurrency;
pub mod conflict;
pub mod engine;
pub mod workflow;

pub use concurrency::StoreLock;
pub use conflict::find_conflict;
pub use engine::{DecisionOutcome, Engine};
pub use workflow::{
    actionable_status, next_status, stage_for, validate_transition, ApprovalStage, Decision,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(#[from] labflow_schema::SchemaError),
    #[error("store error: {0}")]
    Store(#[from] labflow_store::StoreError),
    /// Wrong actor/status pair — the action is not available, as opposed
    /// to the input being wrong.
    #[error("not eligible: {actor} cannot act on a request in status '{status}'")]
    NotEligible { actor: String, status: String },
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("designation '{designation}' is already held by '{holder}'")]
    DesignationHeld { designation: String, holder: String },
    #[error("lab '{0}' is referenced by reservations or live requests")]
    LabInUse(String),
    #[error("request '{0}' is approved and can no longer be deleted")]
    RequestImmutable(String),
    #[error("user '{0}' already exists")]
    UserExists(String),
    #[error("lab '{0}' already exists")]
    LabExists(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
