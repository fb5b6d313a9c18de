//! Domain vocabulary and submission validation for Labflow.
//!
//! This crate defines the schema layer: typed identifiers, reservable
//! slots (`Slot`, `TimeOfDay`), user roles and designations, labs,
//! resolved caller identities, the validated submission payload
//! (`RequestDraft`), and the TOML institution config (`InstitutionConfig`).

pub mod draft;
pub mod identity;
pub mod institution;
pub mod lab;
pub mod slot;
pub mod types;
pub mod user;

pub use draft::RequestDraft;
pub use identity::Identity;
pub use institution::{
    parse_institution_file, parse_institution_str, ConfigError, InstitutionConfig,
    InstitutionSection,
};
pub use lab::Lab;
pub use slot::{Slot, TimeOfDay};
pub use types::{LabId, RequestId, ReservationId, SessionToken, UserId};
pub use user::{Designation, Role, User};

use thiserror::Error;

/// Validation failures, surfaced to the caller before anything persists.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("department must not be empty")]
    EmptyDepartment,
    #[error("at least one slot must be requested")]
    EmptySlotList,
    #[error("requested slots overlap each other: {first} and {second}")]
    OverlappingSlots { first: String, second: String },
    #[error("full name must not be empty")]
    EmptyFullName,
    #[error("staff user '{0}' must have a department")]
    MissingDepartment(String),
    #[error("lab name must not be empty")]
    EmptyLabName,
    #[error("lab '{0}' must have capacity of at least 1")]
    ZeroCapacity(String),
    #[error("department '{0}' is not listed in the institution config")]
    UnknownDepartment(String),
}
