use crate::layout::StoreLayout;
use crate::{fsync_dir, StoreError};
use labflow_schema::types::{LabId, RequestId, UserId};
use labflow_schema::Slot;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Where a booking request sits in the approval chain.
///
/// The wire form matches the historical status strings, so records written
/// by earlier deployments deserialize unchanged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    ForwardedToHod,
    ForwardedToPrincipal,
    Approved,
    SentBack,
}

impl RequestStatus {
    /// An approved request is immutable: it can no longer be deleted or acted on.
    pub fn is_approved(self) -> bool {
        self == RequestStatus::Approved
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::ForwardedToHod => write!(f, "forwarded_to_hod"),
            RequestStatus::ForwardedToPrincipal => write!(f, "forwarded_to_principal"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::SentBack => write!(f, "sent_back"),
        }
    }
}

/// One stage's entry in the approval trail: who acted, and what they said.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageRecord {
    pub remark: String,
    pub actor_id: UserId,
    pub actor_name: String,
    pub decided_at: String,
}

/// Accumulated per-stage records. A stage's record is only ever set, never
/// cleared by later stages, so the full chain stays auditable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalTrail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor: Option<StageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hod: Option<StageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<StageRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingRequest {
    pub id: RequestId,
    pub student_id: UserId,
    pub student_name: String,
    pub lab_id: LabId,
    pub lab_name: String,
    /// Tutor assigned at submission time from the staff snapshot then.
    pub staff_id: UserId,
    pub department: String,
    pub subject: String,
    pub description: String,
    pub slots: Vec<Slot>,
    pub status: RequestStatus,
    #[serde(default)]
    pub trail: ApprovalTrail,
    pub created_at: String,
    /// blake3 checksum for integrity verification. `None` for legacy records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl BookingRequest {
    /// Compute the checksum over the record content (excluding the checksum field itself).
    fn compute_checksum(&self) -> Result<String, StoreError> {
        let mut copy = self.clone();
        copy.checksum = None;
        // Serialize without the checksum field (skip_serializing_if = None)
        let json = serde_json::to_string_pretty(&copy)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// Predicate over `(status, department, staff, student)` used by the
/// role-scoped listings.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub department: Option<String>,
    pub staff_id: Option<UserId>,
    pub student_id: Option<UserId>,
}

impl RequestFilter {
    pub fn matches(&self, request: &BookingRequest) -> bool {
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(ref department) = self.department {
            if request.department != *department {
                return false;
            }
        }
        if let Some(ref staff_id) = self.staff_id {
            if request.staff_id != *staff_id {
                return false;
            }
        }
        if let Some(ref student_id) = self.student_id {
            if request.student_id != *student_id {
                return false;
            }
        }
        true
    }
}

pub struct RequestStore {
    layout: StoreLayout,
}

impl RequestStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn put(&self, request: &BookingRequest) -> Result<(), StoreError> {
        let dest = self.layout.requests_dir().join(&request.id);

        // Compute and embed checksum before writing
        let mut with_checksum = request.clone();
        with_checksum.checksum = Some(with_checksum.compute_checksum()?);
        let content = serde_json::to_string_pretty(&with_checksum)?;

        let dir = self.layout.requests_dir();
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;

        Ok(())
    }

    pub fn get(&self, request_id: &str) -> Result<BookingRequest, StoreError> {
        let path = self.layout.requests_dir().join(request_id);
        if !path.exists() {
            return Err(StoreError::RequestNotFound(request_id.to_owned()));
        }
        let content = fs::read_to_string(&path)?;
        let request: BookingRequest = serde_json::from_str(&content)?;

        // Verify checksum if present (backward-compatible: legacy files have None)
        if let Some(ref expected) = request.checksum {
            let actual = request.compute_checksum()?;
            if actual != *expected {
                return Err(StoreError::IntegrityFailure {
                    id: request_id.to_owned(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(request)
    }

    pub fn exists(&self, request_id: &str) -> bool {
        self.layout.requests_dir().join(request_id).exists()
    }

    pub fn remove(&self, request_id: &str) -> Result<(), StoreError> {
        let path = self.layout.requests_dir().join(request_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// All stored requests, newest first. Corrupt entries are skipped with
    /// a warning so one bad record cannot hide the rest.
    pub fn list(&self) -> Result<Vec<BookingRequest>, StoreError> {
        let dir = self.layout.requests_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut results = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let name = entry.file_name();
                let name_str = name.to_str().unwrap_or("");
                if !name_str.starts_with('.') {
                    match self.get(name_str) {
                        Ok(request) => results.push(request),
                        Err(e) => {
                            tracing::warn!("skipping corrupted request entry '{name_str}': {e}");
                        }
                    }
                }
            }
        }
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(results)
    }

    pub fn query(&self, filter: &RequestFilter) -> Result<Vec<BookingRequest>, StoreError> {
        let all = self.list()?;
        Ok(all.into_iter().filter(|r| filter.matches(r)).collect())
    }
}
