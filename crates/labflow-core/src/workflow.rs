use crate::CoreError;
use labflow_schema::{Designation, Identity, Role};
use labflow_store::RequestStatus;
use std::str::FromStr;

/// Position in the approval chain, derived from a staff member's designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStage {
    Tutor,
    Hod,
    Principal,
}

impl std::fmt::Display for ApprovalStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStage::Tutor => write!(f, "tutor"),
            ApprovalStage::Hod => write!(f, "hod"),
            ApprovalStage::Principal => write!(f, "principal"),
        }
    }
}

/// The stage an identity acts at, or `None` for students and admins, who
/// hold no approval authority.
pub fn stage_for(identity: &Identity) -> Option<ApprovalStage> {
    if identity.role != Role::Staff {
        return None;
    }
    Some(match identity.designation {
        Designation::None => ApprovalStage::Tutor,
        Designation::Hod => ApprovalStage::Hod,
        Designation::Principal => ApprovalStage::Principal,
    })
}

/// The single status a stage may act on.
pub fn actionable_status(stage: ApprovalStage) -> RequestStatus {
    match stage {
        ApprovalStage::Tutor => RequestStatus::Pending,
        ApprovalStage::Hod => RequestStatus::ForwardedToHod,
        ApprovalStage::Principal => RequestStatus::ForwardedToPrincipal,
    }
}

/// Where a forward from the given stage lands.
pub fn next_status(stage: ApprovalStage) -> RequestStatus {
    match stage {
        ApprovalStage::Tutor => RequestStatus::ForwardedToHod,
        ApprovalStage::Hod => RequestStatus::ForwardedToPrincipal,
        ApprovalStage::Principal => RequestStatus::Approved,
    }
}

/// Check that a stage is allowed to act on a request in the given status.
///
/// This single gate is what makes a double-submitted decision safe: the
/// first call advances the status, so the replay finds an ineligible pair
/// and is rejected without side effects.
pub fn validate_transition(stage: ApprovalStage, status: RequestStatus) -> Result<(), CoreError> {
    let valid = matches!(
        (stage, status),
        (ApprovalStage::Tutor, RequestStatus::Pending)
            | (ApprovalStage::Hod, RequestStatus::ForwardedToHod)
            | (ApprovalStage::Principal, RequestStatus::ForwardedToPrincipal)
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::NotEligible {
            actor: stage.to_string(),
            status: status.to_string(),
        })
    }
}

/// The two actions an approver can take on an eligible request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Forward,
    Reject,
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" | "approve" => Ok(Decision::Forward),
            "reject" | "send-back" => Ok(Decision::Reject),
            other => Err(format!(
                "unknown decision '{other}', expected forward or send-back"
            )),
        }
    }
}
