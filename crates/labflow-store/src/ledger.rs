use crate::layout::StoreLayout;
use crate::{fsync_dir, StoreError};
use chrono::NaiveDate;
use labflow_schema::types::{LabId, RequestId, ReservationId};
use labflow_schema::{Slot, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// A confirmed claim on one lab slot, written only by the terminal
/// approval transition. Immutable once created; the conflict checker
/// reads these, nothing updates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotReservation {
    pub id: ReservationId,
    pub lab_id: LabId,
    pub lab_name: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub request_id: RequestId,
    pub created_at: String,
}

impl SlotReservation {
    pub fn slot(&self) -> Slot {
        Slot::new(self.date, self.time)
    }
}

/// Append-only ledger of confirmed reservations.
///
/// There is deliberately no update or delete API: the only way a
/// reservation disappears is WAL rollback of a torn approval, which
/// removes the file directly.
pub struct SlotLedger {
    layout: StoreLayout,
}

impl SlotLedger {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    /// Path a reservation will occupy, exposed so the approval path can
    /// register a WAL rollback step before the file exists.
    pub fn reservation_path(&self, reservation_id: &str) -> PathBuf {
        self.layout.reservations_dir().join(reservation_id)
    }

    pub fn append(&self, reservation: &SlotReservation) -> Result<(), StoreError> {
        let dir = self.layout.reservations_dir();
        let dest = dir.join(&reservation.id);
        let content = serde_json::to_string_pretty(reservation)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;

        Ok(())
    }

    pub fn get(&self, reservation_id: &str) -> Result<SlotReservation, StoreError> {
        let path = self.reservation_path(reservation_id);
        if !path.exists() {
            return Err(StoreError::ReservationNotFound(reservation_id.to_owned()));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Every reservation held against one lab, in date then band order.
    /// This is the conflict checker's read path.
    pub fn list_by_lab(&self, lab_id: &str) -> Result<Vec<SlotReservation>, StoreError> {
        let mut hits: Vec<SlotReservation> = self
            .list()?
            .into_iter()
            .filter(|r| *r.lab_id == *lab_id)
            .collect();
        hits.sort_by(|a, b| a.date.cmp(&b.date).then(a.time.cmp(&b.time)));
        Ok(hits)
    }

    pub fn list(&self) -> Result<Vec<SlotReservation>, StoreError> {
        let dir = self.layout.reservations_dir();
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
                        Ok(reservation) => results.push(reservation),
                        Err(e) => {
                            tracing::warn!(
                                "skipping corrupted reservation entry '{name_str}': {e}"
                            );
                        }
                    }
                }
            }
        }
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }
}
