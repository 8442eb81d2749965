use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{ApplicationSource, ArchiveReason, RejectionReason, Stage};

/// Identifier wrapper for candidate applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier for the acting user, resolved by the external identity layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Resolved caller identity. `elevated` is a single capability bit supplied by
/// the session collaborator; the engine never inspects roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub elevated: bool,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, elevated: bool) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            elevated,
        }
    }

    pub fn can_bypass_skip_limit(&self) -> bool {
        self.elevated
    }

    pub fn can_rollback_others(&self) -> bool {
        self.elevated
    }
}

/// Append-only audit entry recording a stage, the actor, and free-text notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    pub stage: Stage,
    pub updated_by: UserId,
    pub notes: String,
    pub recorded_at: DateTime<Utc>,
}

impl StageEvent {
    pub fn now(stage: Stage, updated_by: UserId, notes: impl Into<String>) -> Self {
        Self {
            stage,
            updated_by,
            notes: notes.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Lifecycle status of an application. `Hired` and `NotHired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    InProgress,
    Hired,
    NotHired,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::NotHired => "not_hired",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Hired | ApplicationStatus::NotHired)
    }
}

/// Validated intake payload. The resume itself is uploaded by an external
/// collaborator; intake only receives the opaque reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIntake {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub source: ApplicationSource,
    pub resume_ref: String,
    pub created_by: UserId,
}

impl CandidateIntake {
    /// Trim identity fields and require the mandatory ones to be non-empty.
    pub fn validate(mut self) -> Result<Self, IntakeValidationError> {
        self.full_name = self.full_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.location = self.location.trim().to_string();
        self.resume_ref = self.resume_ref.trim().to_string();

        for (field, value) in [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("resume_ref", &self.resume_ref),
        ] {
            if value.is_empty() {
                return Err(IntakeValidationError::MissingField(field));
            }
        }

        Ok(self)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum IntakeValidationError {
    #[error("required intake field '{0}' is empty")]
    MissingField(&'static str),
}

/// Data the hire operation must carry; reaching the hired stage without it is
/// not allowed through the generic advance path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiringDetails {
    pub avatar_ref: String,
    pub offer_letter_ref: String,
    pub annual_compensation: u64,
    pub department: String,
    pub designation: String,
}

impl HiringDetails {
    pub fn validate(&self) -> Result<(), HiringValidationError> {
        for (field, value) in [
            ("avatar_ref", &self.avatar_ref),
            ("offer_letter_ref", &self.offer_letter_ref),
            ("department", &self.department),
            ("designation", &self.designation),
        ] {
            if value.trim().is_empty() {
                return Err(HiringValidationError::MissingField(field));
            }
        }
        if self.annual_compensation == 0 {
            return Err(HiringValidationError::ZeroCompensation);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HiringValidationError {
    #[error("required hiring field '{0}' is empty")]
    MissingField(&'static str),
    #[error("annual compensation must be non-zero")]
    ZeroCompensation,
}

/// One candidate application and its audit trail. Never physically deleted;
/// archival is a flag. `version` backs the optimistic write check in the
/// repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub source: ApplicationSource,
    pub resume_ref: String,
    pub current_stage: Stage,
    pub stage_history: Vec<StageEvent>,
    pub status: ApplicationStatus,
    pub rejection_reason: Option<RejectionReason>,
    pub archived: bool,
    pub archive_reason: Option<ArchiveReason>,
    pub is_duplicate: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

impl ApplicationRecord {
    pub fn current_rank(&self) -> u8 {
        self.current_stage.rank()
    }

    pub fn last_event(&self) -> Option<&StageEvent> {
        self.stage_history.last()
    }

    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            current_stage: self.current_stage,
            status: self.status.label(),
            stage_history_len: self.stage_history.len(),
            rejection_reason: self.rejection_reason,
            archived: self.archived,
            archive_reason: self.archive_reason,
            is_duplicate: self.is_duplicate,
            version: self.version,
        }
    }
}

/// Sanitized projection of an application for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub current_stage: Stage,
    pub status: &'static str,
    pub stage_history_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_reason: Option<ArchiveReason>,
    pub is_duplicate: bool,
    pub version: u64,
}
