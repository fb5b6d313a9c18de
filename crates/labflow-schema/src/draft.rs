use crate::slot::Slot;
use crate::types::{LabId, UserId};
use crate::SchemaError;
use serde::{Deserialize, Serialize};

/// The payload a student submits to open a booking request.
///
/// Validation runs before anything is persisted: a draft that fails here
/// produces no side effect anywhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestDraft {
    pub lab_id: LabId,
    /// Tutor the request is routed to first, chosen from the staff
    /// available at submission time.
    pub staff_id: UserId,
    pub department: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub slots: Vec<Slot>,
}

impl RequestDraft {
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.subject.trim().is_empty() {
            return Err(SchemaError::EmptySubject);
        }
        if self.department.trim().is_empty() {
            return Err(SchemaError::EmptyDepartment);
        }
        if self.slots.is_empty() {
            return Err(SchemaError::EmptySlotList);
        }
        // A draft colliding with itself would book the same span twice.
        for (i, a) in self.slots.iter().enumerate() {
            for b in &self.slots[i + 1..] {
                if a.overlaps(b) {
                    return Err(SchemaError::OverlappingSlots {
                        first: a.to_string(),
                        second: b.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
