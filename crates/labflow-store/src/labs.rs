use crate::layout::StoreLayout;
use crate::{fsync_dir, StoreError};
use labflow_schema::Lab;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

pub struct LabStore {
    layout: StoreLayout,
}

impl LabStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn put(&self, lab: &Lab) -> Result<(), StoreError> {
        let dir = self.layout.labs_dir();
        let dest = dir.join(&lab.id);
        let content = serde_json::to_string_pretty(lab)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;

        Ok(())
    }

    pub fn get(&self, lab_id: &str) -> Result<Lab, StoreError> {
        let path = self.layout.labs_dir().join(lab_id);
        if !path.exists() {
            return Err(StoreError::LabNotFound(lab_id.to_owned()));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn exists(&self, lab_id: &str) -> bool {
        self.layout.labs_dir().join(lab_id).exists()
    }

    pub fn remove(&self, lab_id: &str) -> Result<(), StoreError> {
        let path = self.layout.labs_dir().join(lab_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Lab>, StoreError> {
        let dir = self.layout.labs_dir();
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
                        Ok(lab) => results.push(lab),
                        Err(e) => {
                            tracing::warn!("skipping corrupted lab entry '{name_str}': {e}");
                        }
                    }
                }
            }
        }
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }
}
