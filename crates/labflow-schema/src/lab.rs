use crate::types::LabId;
use crate::SchemaError;
use serde::{Deserialize, Serialize};

/// A physical laboratory that can be booked by the slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lab {
    pub id: LabId,
    pub name: String,
    pub capacity: u32,
    pub location: String,
}

impl Lab {
    pub fn new(
        id: impl Into<LabId>,
        name: impl Into<String>,
        capacity: u32,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
            location: location.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyLabName);
        }
        if self.capacity == 0 {
            return Err(SchemaError::ZeroCapacity(self.id.to_string()));
        }
        Ok(())
    }
}
