use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::catalog::RejectionReason;
use super::domain::{ApplicationId, ApplicationRecord};

/// Storage abstraction so the engine can be exercised in isolation.
///
/// `update` enforces optimistic concurrency: the write only lands when the
/// incoming record's `version` matches the stored one, and the stored version
/// increments on success. Operations on different ids never contend on the
/// contract level; serialization is per record.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;

    /// Duplicate-resolver lookup: case-insensitive exact match on email OR
    /// exact match on phone, considering only canonical (non-duplicate)
    /// records. Read-only.
    fn find_by_contact(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record was modified concurrently")]
    VersionConflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Map-backed repository. The default backend for the service binary and the
/// test suites; a database-backed implementation would live behind the same
/// trait.
#[derive(Default)]
pub struct InMemoryRepository {
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of every stored record, shadow duplicates included.
    pub fn snapshot(&self) -> Vec<ApplicationRecord> {
        match self.records.lock() {
            Ok(guard) => guard.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl ApplicationRepository for InMemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, mut record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        let stored = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != record.version {
            return Err(RepositoryError::VersionConflict);
        }
        record.version += 1;
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn find_by_contact(
        &self,
        email: &str,
        phone: &str,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        let email = email.trim().to_ascii_lowercase();
        let phone = phone.trim();
        Ok(guard
            .values()
            .filter(|record| !record.is_duplicate)
            .find(|record| {
                record.email.eq_ignore_ascii_case(&email)
                    || (!phone.is_empty() && record.phone == phone)
            })
            .cloned())
    }
}

/// Trait describing the outbound notification hook (e-mail dispatcher,
/// account provisioning). Fire-and-forget: the engine logs failures and never
/// rolls back the transition that triggered the event.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, event: PipelineEvent) -> Result<(), NotifyError>;
}

/// Terminal pipeline outcomes observed by downstream collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineEvent {
    CandidateRejected {
        application_id: ApplicationId,
        email: String,
        full_name: String,
        reason: RejectionReason,
    },
    /// Carries enough data for the provisioning collaborator to create a
    /// login account and send the welcome e-mail.
    CandidateHired {
        application_id: ApplicationId,
        email: String,
        full_name: String,
        department: String,
        designation: String,
        annual_compensation: u64,
    },
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Default publisher: records the event in the service log and nothing else.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

impl NotificationPublisher for LoggingNotifier {
    fn publish(&self, event: PipelineEvent) -> Result<(), NotifyError> {
        match &event {
            PipelineEvent::CandidateRejected {
                application_id,
                reason,
                ..
            } => info!(id = %application_id.0, reason = reason.label(), "candidate rejected"),
            PipelineEvent::CandidateHired {
                application_id,
                department,
                ..
            } => info!(id = %application_id.0, %department, "candidate hired"),
        }
        Ok(())
    }
}
