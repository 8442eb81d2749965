use super::common::*;
use crate::pipeline::catalog::Stage;
use crate::pipeline::engine::PipelineError;
use crate::pipeline::repository::ApplicationRepository;

#[test]
fn advance_moves_one_stage_forward_and_appends_history() {
    let (engine, _, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");

    let updated = engine
        .advance(&record.id, Stage::PhoneScreen, "passed resume review", &recruiter())
        .expect("advance succeeds");

    assert_eq!(updated.current_stage, Stage::PhoneScreen);
    assert_eq!(updated.stage_history.len(), 2);
    let last = updated.last_event().expect("history non-empty");
    assert_eq!(last.stage, Stage::PhoneScreen);
    assert_eq!(last.notes, "passed resume review");
}

#[test]
fn advance_rejects_backward_and_same_stage_moves() {
    let (engine, _, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");
    engine
        .advance(&record.id, Stage::VirtualInterview, "skipped phone", &recruiter())
        .expect("two-stage skip is within the limit");

    for target in [Stage::ApplicationReview, Stage::PhoneScreen, Stage::VirtualInterview] {
        match engine.advance(&record.id, target, "", &recruiter()) {
            Err(PipelineError::InvalidTransition { from, to }) => {
                assert_eq!(from, Stage::VirtualInterview);
                assert_eq!(to, target);
            }
            other => panic!("expected invalid transition to {target}, got {other:?}"),
        }
    }
}

#[test]
fn skip_limit_binds_unelevated_actors_only() {
    let (engine, _, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");

    // application_review -> offered is a jump of 4 ranks.
    match engine.advance(&record.id, Stage::Offered, "", &recruiter()) {
        Err(PipelineError::Forbidden(message)) => assert!(message.contains("elevated")),
        other => panic!("expected forbidden, got {other:?}"),
    }

    let updated = engine
        .advance(&record.id, Stage::Offered, "fast-tracked by VP", &admin())
        .expect("elevated actor may skip");
    assert_eq!(updated.current_stage, Stage::Offered);
}

#[test]
fn advance_cannot_enter_post_offer_stages() {
    let (engine, _, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");

    for target in [Stage::Onboarding, Stage::Hired] {
        assert!(
            matches!(
                engine.advance(&record.id, target, "", &admin()),
                Err(PipelineError::InvalidTransition { .. })
            ),
            "generic advance must not reach {target}"
        );
    }
}

#[test]
fn advance_on_unknown_id_is_not_found() {
    let (engine, _, _) = build_engine();
    let missing = crate::pipeline::domain::ApplicationId("app-999999".to_string());
    assert!(matches!(
        engine.advance(&missing, Stage::PhoneScreen, "", &recruiter()),
        Err(PipelineError::NotFound)
    ));
}

#[test]
fn add_note_annotates_without_transitioning() {
    let (engine, _, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");

    let updated = engine
        .add_note(&record.id, "  follow up next week  ", &recruiter())
        .expect("note accepted");

    assert_eq!(updated.current_stage, record.current_stage);
    assert_eq!(updated.stage_history.len(), 2);
    assert_eq!(
        updated.last_event().expect("history").notes,
        "follow up next week"
    );

    match engine.add_note(&record.id, " x ", &recruiter()) {
        Err(PipelineError::Validation(message)) => assert!(message.contains("2 characters")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn rollback_reverts_exactly_one_recorded_stage() {
    let (engine, _, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");
    engine
        .advance(&record.id, Stage::PhoneScreen, "passed screen", &recruiter())
        .expect("advance");

    let rolled = engine
        .rollback(&record.id, "mistaken update", &recruiter())
        .expect("rollback succeeds");

    assert_eq!(rolled.current_stage, Stage::ApplicationReview);
    // One popped, one pushed: net history length unchanged.
    assert_eq!(rolled.stage_history.len(), 2);
    let last = rolled.last_event().expect("history");
    assert_eq!(last.stage, Stage::ApplicationReview);
    assert!(last.notes.starts_with("[ROLLBACK] mistaken update"));
}

#[test]
fn rollback_requires_two_history_entries() {
    let (engine, _, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");

    match engine.rollback(&record.id, "oops", &recruiter()) {
        Err(PipelineError::Validation(message)) => {
            assert!(message.contains("only one stage in history"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn rollback_is_restricted_to_creator_or_elevated_actor() {
    let (engine, _, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");
    engine
        .advance(&record.id, Stage::PhoneScreen, "", &recruiter())
        .expect("advance");

    assert!(matches!(
        engine.rollback(&record.id, "not mine", &other_recruiter()),
        Err(PipelineError::Forbidden(_))
    ));

    let rolled = engine
        .rollback(&record.id, "admin correction", &admin())
        .expect("elevated actor may roll back records they did not create");
    assert_eq!(rolled.current_stage, Stage::ApplicationReview);
}

#[test]
fn stale_writer_surfaces_conflict() {
    let (engine, repository, _) = build_engine();
    let record = submit(&engine, "asha@example.com", "+1-515-555-0101");

    // Simulate a racing writer landing first: the stored version moves on.
    let fresh = repository
        .fetch(&record.id)
        .expect("fetch")
        .expect("present");
    repository.update(fresh).expect("first write wins");

    let mut stale = record.clone();
    stale.location = "Ames".to_string();
    assert!(matches!(
        repository.update(stale),
        Err(crate::pipeline::repository::RepositoryError::VersionConflict)
    ));
}
