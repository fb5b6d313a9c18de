use crate::types::UserId;
use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Staff,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Staff => write!(f, "staff"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}', expected student, staff, or admin")),
        }
    }
}

/// Elevated approval authority held by a staff member.
///
/// Plain tutors carry `None`. At most one `Principal` may be active across
/// the institution, and at most one `Hod` per department; the admin write
/// path enforces both before persisting an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Designation {
    #[default]
    None,
    Hod,
    Principal,
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Designation::None => write!(f, "none"),
            Designation::Hod => write!(f, "hod"),
            Designation::Principal => write!(f, "principal"),
        }
    }
}

impl FromStr for Designation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Designation::None),
            "hod" => Ok(Designation::Hod),
            "principal" => Ok(Designation::Principal),
            other => Err(format!(
                "unknown designation '{other}', expected none, hod, or principal"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub designation: Designation,
    pub created_at: String,
}

impl User {
    /// Build a user record for registration. Designation always starts at
    /// `None`; only the admin assignment path may raise it.
    pub fn new(
        id: impl Into<UserId>,
        full_name: impl Into<String>,
        role: Role,
        department: Option<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            role,
            department,
            designation: Designation::None,
            created_at: created_at.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.full_name.trim().is_empty() {
            return Err(SchemaError::EmptyFullName);
        }
        if self.role == Role::Staff && self.department.as_deref().is_none_or(|d| d.trim().is_empty())
        {
            return Err(SchemaError::MissingDepartment(self.id.to_string()));
        }
        Ok(())
    }
}
