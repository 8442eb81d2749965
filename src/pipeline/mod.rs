//! The hiring-stage pipeline: an ordered state machine governing how a
//! candidate application moves through recruiting stages, with guarded
//! transitions, an append-only audit history, rejection/archival semantics,
//! duplicate detection at intake, and a bounded one-step rollback.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use catalog::{ApplicationSource, ArchiveReason, RejectionReason, Stage, UnknownCatalogValue};
pub use domain::{
    Actor, ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationView, CandidateIntake,
    HiringDetails, StageEvent, UserId,
};
pub use engine::{IntakeOutcome, PipelineConfig, PipelineEngine, PipelineError};
pub use repository::{
    ApplicationRepository, InMemoryRepository, LoggingNotifier, NotificationPublisher,
    NotifyError, PipelineEvent, RepositoryError,
};
pub use router::pipeline_router;
