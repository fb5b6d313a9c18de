use crate::concurrency::StoreLock;
use crate::conflict::find_conflict;
use crate::workflow::{next_status, stage_for, validate_transition, ApprovalStage, Decision};
use crate::CoreError;
use labflow_schema::types::{RequestId, ReservationId, SessionToken};
use labflow_schema::{
    Designation, Identity, InstitutionConfig, Lab, RequestDraft, Role, SchemaError, Slot, User,
};
use labflow_store::{
    BookingRequest, LabStore, RequestFilter, RequestStatus, RequestStore, RollbackStep,
    SessionStore, SlotLedger, SlotReservation, StageRecord, StoreLayout, UserStore, WalOpKind,
    WriteAheadLog,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Process-local counter folded into generated ids so records created in
/// the same clock tick still differ.
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Central engine for the booking approval workflow.
///
/// Coordinates identity resolution, submission validation, the approval
/// state machine, conflict checking against the slot ledger, and the
/// atomic terminal-approval commit.
pub struct Engine {
    layout: StoreLayout,
    requests: RequestStore,
    ledger: SlotLedger,
    users: UserStore,
    labs: LabStore,
    sessions: SessionStore,
    wal: WriteAheadLog,
    institution: Option<InstitutionConfig>,
}

/// What an approval decision produced.
///
/// A detected conflict is an actionable result for the approver, not a
/// failure: nothing was persisted and the request is untouched.
#[derive(Debug)]
pub enum DecisionOutcome {
    Applied(BookingRequest),
    Conflict(Slot),
}

fn new_id(salt: &str) -> String {
    let now = chrono::Utc::now();
    let nanos = now.timestamp_nanos_opt().unwrap_or_default();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let hash = blake3::hash(format!("{salt}:{nanos}:{seq}").as_bytes()).to_hex();
    format!("{}-{}", now.format("%Y%m%d%H%M%S"), &hash.as_str()[..12])
}

impl Engine {
    /// Create a new engine rooted at the given store directory.
    ///
    /// On construction, the WAL is scanned for incomplete entries from
    /// previous runs and any torn terminal approval is rolled back.
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self::with_institution(store_root, None)
    }

    /// Like [`new`](Self::new), with an institution config whose department
    /// list registration and submission are validated against.
    pub fn with_institution(
        store_root: impl Into<PathBuf>,
        institution: Option<InstitutionConfig>,
    ) -> Self {
        let root: PathBuf = store_root.into();
        let layout = StoreLayout::new(&root);
        if let Err(e) = layout.initialize() {
            warn!("store initialization failed: {e}");
        }
        let requests = RequestStore::new(layout.clone());
        let ledger = SlotLedger::new(layout.clone());
        let users = UserStore::new(layout.clone());
        let labs = LabStore::new(layout.clone());
        let sessions = SessionStore::new(layout.clone());
        let wal = WriteAheadLog::new(&layout);

        // Recovery mutates the store; avoid running it while another
        // process holds the store lock.
        match StoreLock::try_acquire(&layout.lock_file()) {
            Ok(Some(_lock)) => {
                if let Err(e) = wal.recover() {
                    warn!("WAL recovery failed: {e}");
                }
            }
            Ok(None) => {
                debug!("store lock held; skipping WAL recovery");
            }
            Err(e) => {
                warn!("store lock check failed; skipping WAL recovery: {e}");
            }
        }

        Self {
            layout,
            requests,
            ledger,
            users,
            labs,
            sessions,
            wal,
            institution,
        }
    }

    fn check_department(&self, department: &str) -> Result<(), CoreError> {
        if let Some(ref config) = self.institution {
            if !config.has_department(department) {
                return Err(CoreError::Validation(SchemaError::UnknownDepartment(
                    department.to_owned(),
                )));
            }
        }
        Ok(())
    }

    // ---- identity -------------------------------------------------------

    /// Register a user. Designation always starts at `none`; only
    /// [`assign_designation`](Self::assign_designation) may raise it.
    pub fn register_user(&self, user: User) -> Result<User, CoreError> {
        user.validate()?;
        if let Some(ref department) = user.department {
            self.check_department(department)?;
        }
        if self.users.exists(&user.id) {
            return Err(CoreError::UserExists(user.id.to_string()));
        }
        let mut user = user;
        user.designation = Designation::None;
        self.users.put(&user)?;
        info!("registered {} user {}", user.role, user.id);
        Ok(user)
    }

    /// Open a session for a registered user and hand back its token.
    pub fn open_session(&self, user_id: &str) -> Result<SessionToken, CoreError> {
        let user = self.users.get(user_id)?;
        let token = self.sessions.open(&user.id)?;
        debug!("opened session for {}", user.id);
        Ok(token)
    }

    pub fn close_session(&self, token: &SessionToken) -> Result<(), CoreError> {
        self.sessions.revoke(token)?;
        Ok(())
    }

    /// Resolve a session token to the caller's identity. This runs once at
    /// the adapter boundary; every other operation takes the resolved
    /// identity explicitly.
    pub fn resolve_identity(&self, token: &SessionToken) -> Result<Identity, CoreError> {
        let Some(user_id) = self.sessions.resolve(token)? else {
            return Err(CoreError::NotAuthenticated);
        };
        let user = self.users.get(&user_id)?;
        Ok(Identity::from_user(&user))
    }

    pub fn get_user(&self, user_id: &str) -> Result<User, CoreError> {
        Ok(self.users.get(user_id)?)
    }

    /// Assign or clear a staff designation, upholding the singleton
    /// constraints: at most one principal institution-wide, at most one
    /// HOD per department.
    ///
    /// The check-then-write runs under the designation lock, so two admins
    /// racing to fill the same seat serialize.
    pub fn assign_designation(
        &self,
        admin: &Identity,
        user_id: &str,
        designation: Designation,
    ) -> Result<User, CoreError> {
        if !admin.is_admin() {
            return Err(CoreError::Forbidden(
                "only an admin may assign designations".to_owned(),
            ));
        }

        let _lock = StoreLock::acquire(&self.layout.designation_lock_file())?;

        let mut user = self.users.get(user_id)?;
        if user.role != Role::Staff {
            return Err(CoreError::Forbidden(
                "designations apply to staff members only".to_owned(),
            ));
        }

        match designation {
            Designation::Principal => {
                if let Some(holder) = self.users.find_principal()? {
                    if holder.id != user.id {
                        return Err(CoreError::DesignationHeld {
                            designation: "principal".to_owned(),
                            holder: holder.full_name,
                        });
                    }
                }
            }
            Designation::Hod => {
                // validate() guarantees staff carry a department
                let department = user.department.clone().unwrap_or_default();
                if let Some(holder) = self.users.find_hod(&department)? {
                    if holder.id != user.id {
                        return Err(CoreError::DesignationHeld {
                            designation: format!("hod of {department}"),
                            holder: holder.full_name,
                        });
                    }
                }
            }
            Designation::None => {}
        }

        user.designation = designation;
        self.users.put(&user)?;
        info!("designated {} as {}", user.id, user.designation);
        Ok(user)
    }

    // ---- labs -----------------------------------------------------------

    pub fn add_lab(&self, admin: &Identity, lab: Lab) -> Result<(), CoreError> {
        if !admin.is_admin() {
            return Err(CoreError::Forbidden("only an admin may add labs".to_owned()));
        }
        lab.validate()?;
        if self.labs.exists(&lab.id) {
            return Err(CoreError::LabExists(lab.id.to_string()));
        }
        self.labs.put(&lab)?;
        info!("added lab {} ({})", lab.id, lab.name);
        Ok(())
    }

    pub fn update_lab(&self, admin: &Identity, lab: Lab) -> Result<(), CoreError> {
        if !admin.is_admin() {
            return Err(CoreError::Forbidden(
                "only an admin may edit labs".to_owned(),
            ));
        }
        lab.validate()?;
        // get() turns an unknown id into LabNotFound
        let _existing = self.labs.get(&lab.id)?;
        self.labs.put(&lab)?;
        Ok(())
    }

    /// Remove a lab, refusing while reservations or live requests still
    /// reference it. Sent-back requests do not block removal.
    pub fn remove_lab(&self, admin: &Identity, lab_id: &str) -> Result<(), CoreError> {
        if !admin.is_admin() {
            return Err(CoreError::Forbidden(
                "only an admin may remove labs".to_owned(),
            ));
        }
        let _existing = self.labs.get(lab_id)?;

        if !self.ledger.list_by_lab(lab_id)?.is_empty() {
            return Err(CoreError::LabInUse(lab_id.to_owned()));
        }
        let referencing = self
            .requests
            .list()?
            .into_iter()
            .any(|r| *r.lab_id == *lab_id && r.status != RequestStatus::SentBack);
        if referencing {
            return Err(CoreError::LabInUse(lab_id.to_owned()));
        }

        self.labs.remove(lab_id)?;
        info!("removed lab {lab_id}");
        Ok(())
    }

    pub fn get_lab(&self, lab_id: &str) -> Result<Lab, CoreError> {
        Ok(self.labs.get(lab_id)?)
    }

    pub fn list_labs(&self) -> Result<Vec<Lab>, CoreError> {
        Ok(self.labs.list()?)
    }

    // ---- requests -------------------------------------------------------

    /// Submit a new booking request. Validation runs before anything
    /// persists; a rejected draft leaves no side effect.
    ///
    /// The tutor is chosen from the staff snapshot at submission time and
    /// is not re-validated on later transitions.
    pub fn submit_request(
        &self,
        student: &Identity,
        draft: RequestDraft,
    ) -> Result<BookingRequest, CoreError> {
        if !student.is_student() {
            return Err(CoreError::Forbidden(
                "only students may submit booking requests".to_owned(),
            ));
        }
        draft.validate()?;
        self.check_department(&draft.department)?;

        let lab = self.labs.get(&draft.lab_id)?;
        let tutor = self.users.get(&draft.staff_id)?;
        if tutor.role != Role::Staff {
            return Err(CoreError::Forbidden(
                "the assigned tutor must be a staff member".to_owned(),
            ));
        }

        let request = BookingRequest {
            id: RequestId::new(new_id(student.user_id.as_str())),
            student_id: student.user_id.clone(),
            student_name: student.full_name.clone(),
            lab_id: lab.id.clone(),
            lab_name: lab.name.clone(),
            staff_id: tutor.id.clone(),
            department: draft.department,
            subject: draft.subject,
            description: draft.description,
            slots: draft.slots,
            status: RequestStatus::Pending,
            trail: labflow_store::ApprovalTrail::default(),
            created_at: chrono::Utc::now().to_rfc3339(),
            checksum: None,
        };
        self.requests.put(&request)?;
        info!(
            "request {} submitted by {} for lab {} ({} slots)",
            request.id,
            request.student_id,
            request.lab_id,
            request.slots.len()
        );
        Ok(request)
    }

    pub fn get_request(&self, request_id: &str) -> Result<BookingRequest, CoreError> {
        Ok(self.requests.get(request_id)?)
    }

    /// Every stored request, newest first. Adapters use this for id
    /// resolution and tooling; role-scoped views go through
    /// [`list_requests_for`](Self::list_requests_for).
    pub fn list_requests(&self) -> Result<Vec<BookingRequest>, CoreError> {
        Ok(self.requests.list()?)
    }

    /// Delete a request. Only its creator (or an admin) may, and an
    /// approved request is immutable.
    pub fn delete_request(&self, request_id: &str, actor: &Identity) -> Result<(), CoreError> {
        let request = self.requests.get(request_id)?;
        if request.status.is_approved() {
            return Err(CoreError::RequestImmutable(request_id.to_owned()));
        }
        if request.student_id != actor.user_id && !actor.is_admin() {
            return Err(CoreError::Forbidden(
                "only the request's creator may delete it".to_owned(),
            ));
        }
        self.requests.remove(request_id)?;
        info!("request {request_id} deleted by {}", actor.user_id);
        Ok(())
    }

    /// Apply one approver's decision to a request.
    ///
    /// The eligibility gate runs first and fails without side effects; a
    /// replayed decision therefore yields `NotEligible` instead of a
    /// duplicate transition. The principal's forward runs the conflict
    /// check under the lab's lock and, when clear, commits reservations
    /// and the status flip as a unit through the WAL.
    pub fn apply_decision(
        &self,
        request_id: &str,
        actor: &Identity,
        decision: Decision,
        remark: &str,
    ) -> Result<DecisionOutcome, CoreError> {
        let mut request = self.requests.get(request_id)?;

        let Some(stage) = stage_for(actor) else {
            return Err(CoreError::NotEligible {
                actor: actor.role.to_string(),
                status: request.status.to_string(),
            });
        };
        validate_transition(stage, request.status)?;

        let record = StageRecord {
            remark: remark.to_owned(),
            actor_id: actor.user_id.clone(),
            actor_name: actor.full_name.clone(),
            decided_at: chrono::Utc::now().to_rfc3339(),
        };

        match decision {
            Decision::Reject => {
                request.status = RequestStatus::SentBack;
                set_stage_record(&mut request, stage, record);
                self.requests.put(&request)?;
                info!("request {} sent back by {}", request.id, actor.user_id);
                Ok(DecisionOutcome::Applied(request))
            }
            Decision::Forward if stage != ApprovalStage::Principal => {
                request.status = next_status(stage);
                set_stage_record(&mut request, stage, record);
                self.requests.put(&request)?;
                info!(
                    "request {} forwarded to {} by {}",
                    request.id, request.status, actor.user_id
                );
                Ok(DecisionOutcome::Applied(request))
            }
            Decision::Forward => self.approve_terminal(request, record),
        }
    }

    /// The principal's terminal approval: conflict check, then an atomic
    /// reservations-plus-status commit.
    fn approve_terminal(
        &self,
        mut request: BookingRequest,
        record: StageRecord,
    ) -> Result<DecisionOutcome, CoreError> {
        // Serialize against other approvals for the same lab, so both see
        // each other's reservations and a double-booking race cannot pass
        // the conflict check twice.
        let _lab_lock = StoreLock::acquire(&self.layout.lab_lock_file(&request.lab_id))?;

        let existing = self.ledger.list_by_lab(&request.lab_id)?;
        if let Some(slot) = find_conflict(&existing, &request.slots) {
            info!(
                "request {} conflicts with an existing reservation at {slot}",
                request.id
            );
            return Ok(DecisionOutcome::Conflict(slot));
        }

        self.wal.initialize()?;
        let wal_op = self.wal.begin(WalOpKind::Approve, &request.id)?;

        let mut created: Vec<PathBuf> = Vec::new();
        let mut write_reservations = || -> Result<(), CoreError> {
            for slot in &request.slots {
                let reservation = SlotReservation {
                    id: ReservationId::new(new_id(request.id.as_str())),
                    lab_id: request.lab_id.clone(),
                    lab_name: request.lab_name.clone(),
                    date: slot.date,
                    time: slot.time,
                    request_id: request.id.clone(),
                    created_at: chrono::Utc::now().to_rfc3339(),
                };
                let path = self.ledger.reservation_path(&reservation.id);
                // Register rollback before creating the side effect.
                self.wal
                    .add_rollback_step(&wal_op, RollbackStep::RemoveFile(path.clone()))?;
                self.ledger.append(&reservation)?;
                created.push(path);
            }
            Ok(())
        };

        if let Err(e) = write_reservations() {
            warn!("reservation write failed, cleaning up: {e}");
            for path in &created {
                let _ = std::fs::remove_file(path);
            }
            let _ = self.wal.commit(&wal_op);
            return Err(e);
        }

        // If we crash after the request record lands but before the WAL
        // commit, recovery reverts both halves together.
        self.wal.add_rollback_step(
            &wal_op,
            RollbackStep::ResetRequest {
                request_id: request.id.to_string(),
                target_status: RequestStatus::ForwardedToPrincipal.to_string(),
            },
        )?;

        request.status = RequestStatus::Approved;
        request.trail.principal = Some(record);

        if let Err(e) = self.requests.put(&request) {
            warn!("post-approval finalization failed, cleaning up reservations: {e}");
            for path in &created {
                let _ = std::fs::remove_file(path);
            }
            let _ = self.wal.commit(&wal_op);
            return Err(e.into());
        }

        // Approval succeeded — commit WAL (removes entry)
        self.wal.commit(&wal_op)?;

        info!(
            "request {} approved; {} reservations committed for lab {}",
            request.id,
            request.slots.len(),
            request.lab_id
        );
        Ok(DecisionOutcome::Applied(request))
    }

    /// The requests visible to an identity, scoped by role: students see
    /// their own, tutors what is assigned to them, HODs their department's
    /// queue plus what they already handled, the principal their queue plus
    /// what they already decided, admins everything.
    pub fn list_requests_for(&self, identity: &Identity) -> Result<Vec<BookingRequest>, CoreError> {
        let requests = match identity.role {
            Role::Student => self.requests.query(&RequestFilter {
                student_id: Some(identity.user_id.clone()),
                ..RequestFilter::default()
            })?,
            Role::Admin => self.requests.list()?,
            Role::Staff => match identity.designation {
                Designation::None => self.requests.query(&RequestFilter {
                    staff_id: Some(identity.user_id.clone()),
                    ..RequestFilter::default()
                })?,
                Designation::Hod => {
                    let department = identity.department.clone().unwrap_or_default();
                    self.requests
                        .query(&RequestFilter {
                            department: Some(department),
                            ..RequestFilter::default()
                        })?
                        .into_iter()
                        .filter(|r| {
                            r.status == RequestStatus::ForwardedToHod || r.trail.hod.is_some()
                        })
                        .collect()
                }
                Designation::Principal => self
                    .requests
                    .list()?
                    .into_iter()
                    .filter(|r| {
                        r.status == RequestStatus::ForwardedToPrincipal
                            || r.trail.principal.is_some()
                    })
                    .collect(),
            },
        };
        Ok(requests)
    }

    /// Every reservation held against a lab, for calendar-rendering
    /// collaborators.
    pub fn list_reservations(&self, lab_id: &str) -> Result<Vec<SlotReservation>, CoreError> {
        Ok(self.ledger.list_by_lab(lab_id)?)
    }
}

fn set_stage_record(request: &mut BookingRequest, stage: ApprovalStage, record: StageRecord) {
    // Appends to the trail: earlier stages' records are never overwritten
    // because each stage writes only its own field, exactly once.
    match stage {
        ApprovalStage::Tutor => request.trail.tutor = Some(record),
        ApprovalStage::Hod => request.trail.hod = Some(record),
        ApprovalStage::Principal => request.trail.principal = Some(record),
    }
}
