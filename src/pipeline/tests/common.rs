use std::sync::{Arc, Mutex};

use crate::pipeline::catalog::ApplicationSource;
use crate::pipeline::domain::{Actor, ApplicationRecord, CandidateIntake, HiringDetails, UserId};
use crate::pipeline::engine::{PipelineConfig, PipelineEngine};
use crate::pipeline::repository::{
    InMemoryRepository, NotificationPublisher, NotifyError, PipelineEvent,
};

#[derive(Default, Clone)]
pub(super) struct CapturingNotifier {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl CapturingNotifier {
    pub(super) fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().expect("lock").clone()
    }
}

impl NotificationPublisher for CapturingNotifier {
    fn publish(&self, event: PipelineEvent) -> Result<(), NotifyError> {
        self.events.lock().expect("lock").push(event);
        Ok(())
    }
}

/// Always-failing publisher used to prove dispatch is fire-and-forget.
pub(super) struct FailingNotifier;

impl NotificationPublisher for FailingNotifier {
    fn publish(&self, _event: PipelineEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay down".to_string()))
    }
}

pub(super) fn recruiter() -> Actor {
    Actor::new("recruiter-1", false)
}

pub(super) fn other_recruiter() -> Actor {
    Actor::new("recruiter-2", false)
}

pub(super) fn admin() -> Actor {
    Actor::new("admin-1", true)
}

pub(super) fn intake(email: &str, phone: &str) -> CandidateIntake {
    CandidateIntake {
        full_name: "Asha Rao".to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        location: "Des Moines".to_string(),
        source: ApplicationSource::JobBoard,
        resume_ref: "s3://talentflow/resumes/asha-rao.pdf".to_string(),
        created_by: UserId("recruiter-1".to_string()),
    }
}

pub(super) fn hiring_details() -> HiringDetails {
    HiringDetails {
        avatar_ref: "s3://talentflow/avatars/asha-rao.png".to_string(),
        offer_letter_ref: "s3://talentflow/offers/asha-rao.pdf".to_string(),
        annual_compensation: 92_000,
        department: "Engineering".to_string(),
        designation: "Backend Engineer".to_string(),
    }
}

pub(super) type TestEngine = PipelineEngine<InMemoryRepository, CapturingNotifier>;

pub(super) fn build_engine() -> (Arc<TestEngine>, Arc<InMemoryRepository>, CapturingNotifier) {
    let repository = Arc::new(InMemoryRepository::new());
    let notifier = CapturingNotifier::default();
    let engine = Arc::new(PipelineEngine::new(
        repository.clone(),
        Arc::new(notifier.clone()),
        PipelineConfig::default(),
    ));
    (engine, repository, notifier)
}

/// Intake a candidate and return the stored record.
pub(super) fn submit(engine: &TestEngine, email: &str, phone: &str) -> ApplicationRecord {
    engine
        .intake(intake(email, phone))
        .expect("intake succeeds")
        .record
}
