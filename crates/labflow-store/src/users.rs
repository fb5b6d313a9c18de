use crate::layout::StoreLayout;
use crate::{fsync_dir, StoreError};
use labflow_schema::user::{Designation, User};
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

pub struct UserStore {
    layout: StoreLayout,
}

impl UserStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    pub fn put(&self, user: &User) -> Result<(), StoreError> {
        let dir = self.layout.users_dir();
        let dest = dir.join(&user.id);
        let content = serde_json::to_string_pretty(user)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest).map_err(|e| StoreError::Io(e.error))?;
        fsync_dir(&dir)?;

        Ok(())
    }

    pub fn get(&self, user_id: &str) -> Result<User, StoreError> {
        let path = self.layout.users_dir().join(user_id);
        if !path.exists() {
            return Err(StoreError::UserNotFound(user_id.to_owned()));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn exists(&self, user_id: &str) -> bool {
        self.layout.users_dir().join(user_id).exists()
    }

    pub fn list(&self) -> Result<Vec<User>, StoreError> {
        let dir = self.layout.users_dir();
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
                        Ok(user) => results.push(user),
                        Err(e) => {
                            tracing::warn!("skipping corrupted user entry '{name_str}': {e}");
                        }
                    }
                }
            }
        }
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }

    /// The sitting principal, if one has been designated.
    pub fn find_principal(&self) -> Result<Option<User>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|u| u.designation == Designation::Principal))
    }

    /// The sitting head of the given department, if one has been designated.
    pub fn find_hod(&self, department: &str) -> Result<Option<User>, StoreError> {
        Ok(self.list()?.into_iter().find(|u| {
            u.designation == Designation::Hod && u.department.as_deref() == Some(department)
        }))
    }
}
