use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::warn;

use super::catalog::{ArchiveReason, RejectionReason, Stage};
use super::domain::{
    Actor, ApplicationId, ApplicationRecord, ApplicationStatus, CandidateIntake, HiringDetails,
    HiringValidationError, IntakeValidationError, StageEvent,
};
use super::repository::{
    ApplicationRepository, NotificationPublisher, PipelineEvent, RepositoryError,
};

/// Engine tunables. `max_stage_skip` caps how many ranks a single advance may
/// jump for a non-elevated actor.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub max_stage_skip: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_stage_skip: 2 }
    }
}

/// Error taxonomy surfaced by every pipeline operation. All synchronous, all
/// caller-correctable or permanent; the engine never retries.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("application not found")]
    NotFound,
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for PipelineError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => PipelineError::NotFound,
            RepositoryError::VersionConflict => {
                PipelineError::Conflict("application was modified concurrently".to_string())
            }
            other => PipelineError::Repository(other),
        }
    }
}

impl From<IntakeValidationError> for PipelineError {
    fn from(value: IntakeValidationError) -> Self {
        PipelineError::Validation(value.to_string())
    }
}

impl From<HiringValidationError> for PipelineError {
    fn from(value: HiringValidationError) -> Self {
        PipelineError::Validation(value.to_string())
    }
}

/// Result of an intake attempt. On a duplicate, `record` is the pre-existing
/// canonical application and the shadow audit record stays behind in storage.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub record: ApplicationRecord,
    pub duplicate: bool,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// The hiring-stage state machine. Each operation is a single atomic
/// read-modify-write against one application; writes go through the
/// repository's version check, so a losing concurrent writer surfaces
/// `Conflict` instead of clobbering history.
pub struct PipelineEngine<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    config: PipelineConfig,
}

impl<R, N> PipelineEngine<R, N>
where
    R: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, config: PipelineConfig) -> Self {
        Self {
            repository,
            notifier,
            config,
        }
    }

    /// Read-only duplicate lookup used by intake and the check endpoint.
    pub fn check_duplicate(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<ApplicationRecord>, PipelineError> {
        Ok(self.repository.find_by_contact(email, phone)?)
    }

    /// Create an application, or record a shadow duplicate when the candidate
    /// already has one. The caller keeps operating on the original record;
    /// the shadow preserves a trace of the repeat attempt without disturbing
    /// the active pipeline.
    pub fn intake(&self, intake: CandidateIntake) -> Result<IntakeOutcome, PipelineError> {
        let intake = intake.validate()?;

        if let Some(original) = self.repository.find_by_contact(&intake.email, &intake.phone)? {
            let mut shadow = Self::fresh_record(&intake);
            shadow.archived = true;
            shadow.archive_reason = Some(ArchiveReason::DuplicateProfile);
            shadow.is_duplicate = true;
            shadow.stage_history = vec![StageEvent::now(
                Stage::first(),
                intake.created_by.clone(),
                format!("[DUPLICATE] Repeat application; original is {}", original.id.0),
            )];
            self.repository.insert(shadow)?;

            return Ok(IntakeOutcome {
                record: original,
                duplicate: true,
            });
        }

        let stored = self.repository.insert(Self::fresh_record(&intake))?;
        Ok(IntakeOutcome {
            record: stored,
            duplicate: false,
        })
    }

    /// Forward-only stage transition. Same-stage annotation goes through
    /// `add_note`; backward correction goes through `rollback`.
    pub fn advance(
        &self,
        id: &ApplicationId,
        next_stage: Stage,
        notes: &str,
        actor: &Actor,
    ) -> Result<ApplicationRecord, PipelineError> {
        let mut record = self.fetch_existing(id)?;
        Self::guard_not_terminal(&record)?;

        let from = record.current_stage;
        if next_stage.rank() <= from.rank() || next_stage.is_post_offer() {
            return Err(PipelineError::InvalidTransition {
                from,
                to: next_stage,
            });
        }

        let skip = next_stage.rank() - from.rank();
        if skip > self.config.max_stage_skip && !actor.can_bypass_skip_limit() {
            return Err(PipelineError::Forbidden(format!(
                "advancing {skip} stages at once requires elevated access"
            )));
        }

        record.current_stage = next_stage;
        record
            .stage_history
            .push(StageEvent::now(next_stage, actor.user_id.clone(), notes));
        Ok(self.repository.update(record)?)
    }

    /// Annotate the current stage without transitioning. Allowed on terminal
    /// records.
    pub fn add_note(
        &self,
        id: &ApplicationId,
        notes: &str,
        actor: &Actor,
    ) -> Result<ApplicationRecord, PipelineError> {
        let notes = notes.trim();
        if notes.len() < 2 {
            return Err(PipelineError::Validation(
                "stage note must be at least 2 characters".to_string(),
            ));
        }

        let mut record = self.fetch_existing(id)?;
        record.stage_history.push(StageEvent::now(
            record.current_stage,
            actor.user_id.clone(),
            notes,
        ));
        Ok(self.repository.update(record)?)
    }

    /// Terminal failure transition: marks the application not hired and
    /// archives it under the reason mapped to its current stage.
    pub fn reject(
        &self,
        id: &ApplicationId,
        reason: RejectionReason,
        notes: &str,
        actor: &Actor,
    ) -> Result<ApplicationRecord, PipelineError> {
        let mut record = self.fetch_existing(id)?;
        match record.status {
            ApplicationStatus::Hired => {
                return Err(PipelineError::Conflict(
                    "cannot reject a hired candidate".to_string(),
                ))
            }
            ApplicationStatus::NotHired => {
                return Err(PipelineError::Conflict(
                    "application is already rejected".to_string(),
                ))
            }
            ApplicationStatus::InProgress => {}
        }

        record.status = ApplicationStatus::NotHired;
        record.rejection_reason = Some(reason);
        record.archived = true;
        record.archive_reason = Some(record.current_stage.archive_reason());
        record.stage_history.push(StageEvent::now(
            record.current_stage,
            actor.user_id.clone(),
            format!("[REJECTED] {notes}"),
        ));

        let stored = self.repository.update(record)?;
        self.dispatch(PipelineEvent::CandidateRejected {
            application_id: stored.id.clone(),
            email: stored.email.clone(),
            full_name: stored.full_name.clone(),
            reason,
        });
        Ok(stored)
    }

    /// One-step backward correction: pops the most recent recorded stage and
    /// appends a rollback audit entry at the stage it reverted to. The only
    /// operation permitted to decrease the stage rank. Terminal status flags
    /// are untouched; this corrects the stage pointer, nothing more.
    pub fn rollback(
        &self,
        id: &ApplicationId,
        reason: &str,
        actor: &Actor,
    ) -> Result<ApplicationRecord, PipelineError> {
        let mut record = self.fetch_existing(id)?;

        if record.created_by != actor.user_id && !actor.can_rollback_others() {
            return Err(PipelineError::Forbidden(
                "only the record creator or an elevated actor may roll back".to_string(),
            ));
        }
        if record.stage_history.len() < 2 {
            return Err(PipelineError::Validation(
                "only one stage in history; nothing to roll back".to_string(),
            ));
        }

        record.stage_history.pop();
        // After the pop the last entry is the stage being reverted to.
        let previous_stage = match record.last_event() {
            Some(event) => event.stage,
            None => Stage::first(),
        };
        record.current_stage = previous_stage;
        record.stage_history.push(StageEvent::now(
            previous_stage,
            actor.user_id.clone(),
            format!("[ROLLBACK] {reason}"),
        ));
        Ok(self.repository.update(record)?)
    }

    /// Terminal success transition. Emits `CandidateHired` so the external
    /// collaborator can provision an account and send the welcome e-mail.
    pub fn mark_hired(
        &self,
        id: &ApplicationId,
        details: HiringDetails,
        actor: &Actor,
    ) -> Result<ApplicationRecord, PipelineError> {
        details.validate()?;

        let mut record = self.fetch_existing(id)?;
        Self::guard_not_terminal(&record)?;

        record.status = ApplicationStatus::Hired;
        record.current_stage = Stage::Hired;
        record.stage_history.push(StageEvent::now(
            Stage::Hired,
            actor.user_id.clone(),
            format!("[HIRED] {} / {}", details.department, details.designation),
        ));

        let stored = self.repository.update(record)?;
        self.dispatch(PipelineEvent::CandidateHired {
            application_id: stored.id.clone(),
            email: stored.email.clone(),
            full_name: stored.full_name.clone(),
            department: details.department,
            designation: details.designation,
            annual_compensation: details.annual_compensation,
        });
        Ok(stored)
    }

    /// Fetch an application for API responses.
    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, PipelineError> {
        self.fetch_existing(id)
    }

    fn fetch_existing(&self, id: &ApplicationId) -> Result<ApplicationRecord, PipelineError> {
        self.repository.fetch(id)?.ok_or(PipelineError::NotFound)
    }

    fn guard_not_terminal(record: &ApplicationRecord) -> Result<(), PipelineError> {
        if record.status.is_terminal() {
            return Err(PipelineError::Conflict(format!(
                "application is already {}",
                record.status.label()
            )));
        }
        Ok(())
    }

    fn fresh_record(intake: &CandidateIntake) -> ApplicationRecord {
        ApplicationRecord {
            id: next_application_id(),
            full_name: intake.full_name.clone(),
            email: intake.email.clone(),
            phone: intake.phone.clone(),
            location: intake.location.clone(),
            source: intake.source,
            resume_ref: intake.resume_ref.clone(),
            current_stage: Stage::first(),
            stage_history: vec![StageEvent::now(
                Stage::first(),
                intake.created_by.clone(),
                "Application submitted",
            )],
            status: ApplicationStatus::InProgress,
            rejection_reason: None,
            archived: false,
            archive_reason: None,
            is_duplicate: false,
            created_by: intake.created_by.clone(),
            created_at: chrono::Utc::now(),
            version: 0,
        }
    }

    /// Fire-and-forget: dispatch failures are logged, never propagated, and
    /// never roll back the transition that produced the event.
    fn dispatch(&self, event: PipelineEvent) {
        if let Err(err) = self.notifier.publish(event) {
            warn!(error = %err, "notification dispatch failed");
        }
    }
}
