use crate::types::UserId;
use crate::user::{Designation, Role, User};
use serde::{Deserialize, Serialize};

/// The resolved identity of an authenticated caller.
///
/// Resolution happens once, at the adapter boundary; every core operation
/// takes the resolved identity as an explicit argument instead of
/// re-deriving it from a session, keeping the engine free of session I/O.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub full_name: String,
    pub role: Role,
    pub designation: Designation,
    pub department: Option<String>,
}

impl Identity {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            designation: user.designation,
            department: user.department.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}
