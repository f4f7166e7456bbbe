use hivemark_core::{
    FormValues, SaveOutcome, SavePayload, SavePhase, SaveTracker, SubmitError, FIELD_COMMENT,
    FIELD_EMAIL, FIELD_FIRSTNAME, FIELD_SURNAME,
};

fn payload() -> SavePayload {
    let mut values = FormValues::new();
    values.set(FIELD_FIRSTNAME, "A");
    values.set(FIELD_SURNAME, "B");
    values.set(FIELD_EMAIL, "a@b.com");
    SavePayload::from_values(&values)
}

#[test]
fn payload_encodes_to_flat_json() {
    let body = payload().to_json().expect("payload encodes");
    let parsed: serde_json::Value = serde_json::from_str(&body).expect("body is json");
    assert_eq!(
        parsed,
        serde_json::json!({"firstname": "A", "surname": "B", "email": "a@b.com"})
    );
}

#[test]
fn optional_fields_appear_when_present() {
    let mut values = FormValues::new();
    values.set(FIELD_FIRSTNAME, "A");
    values.set(FIELD_SURNAME, "B");
    values.set(FIELD_EMAIL, "a@b.com");
    values.set(FIELD_COMMENT, "two supers, strong colony");
    let body = SavePayload::from_values(&values).to_json().expect("encodes");
    let parsed: serde_json::Value = serde_json::from_str(&body).expect("json");
    assert_eq!(parsed["comment"], "two supers, strong colony");
    assert!(parsed.get("file").is_none());
}

#[test]
fn accepted_outcome_confirms() {
    let mut tracker = SaveTracker::new();
    assert_eq!(tracker.phase(), SavePhase::Idle);

    tracker.begin("{}".to_string()).expect("idle accepts submit");
    assert_eq!(tracker.phase(), SavePhase::Submitting);
    assert!(tracker.in_flight());

    assert!(tracker.finish(&SaveOutcome::from_status(200)));
    assert_eq!(tracker.phase(), SavePhase::Confirmed);
}

#[test]
fn confirmation_requires_acknowledgment() {
    let mut tracker = SaveTracker::new();
    tracker.begin("{}".to_string()).expect("submit");
    // Still submitting until the response lands; nothing is confirmed yet.
    assert_ne!(tracker.phase(), SavePhase::Confirmed);

    assert!(tracker.finish(&SaveOutcome::from_status(500)));
    assert_eq!(tracker.phase(), SavePhase::Failed);
}

#[test]
fn transport_failure_is_a_failure_not_a_confirmation() {
    let mut tracker = SaveTracker::new();
    tracker.begin("{}".to_string()).expect("submit");
    let outcome = SaveOutcome::TransportError {
        message: "connection refused".to_string(),
    };
    assert!(!outcome.is_accepted());
    assert!(tracker.finish(&outcome));
    assert_eq!(tracker.phase(), SavePhase::Failed);
}

#[test]
fn second_submit_refused_while_in_flight() {
    let mut tracker = SaveTracker::new();
    tracker.begin("first".to_string()).expect("submit");
    let err = tracker.begin("second".to_string()).unwrap_err();
    assert_eq!(err, SubmitError::AlreadyInFlight);
    assert_eq!(tracker.submitted_body(), Some("first"));
}

#[test]
fn resubmit_allowed_after_terminal_phase() {
    let mut tracker = SaveTracker::new();
    tracker.begin("first".to_string()).expect("submit");
    tracker.finish(&SaveOutcome::from_status(503));
    assert_eq!(tracker.phase(), SavePhase::Failed);

    tracker.begin("second".to_string()).expect("failed accepts resubmit");
    tracker.finish(&SaveOutcome::from_status(201));
    assert_eq!(tracker.phase(), SavePhase::Confirmed);
    assert_eq!(tracker.submitted_body(), Some("second"));
}

#[test]
fn stray_outcome_is_dropped() {
    let mut tracker = SaveTracker::new();
    assert!(!tracker.finish(&SaveOutcome::from_status(200)));
    assert_eq!(tracker.phase(), SavePhase::Idle);
}

#[test]
fn status_boundaries_split_accepted_from_rejected() {
    assert!(SaveOutcome::from_status(200).is_accepted());
    assert!(SaveOutcome::from_status(204).is_accepted());
    assert!(SaveOutcome::from_status(299).is_accepted());
    assert!(!SaveOutcome::from_status(199).is_accepted());
    assert!(!SaveOutcome::from_status(301).is_accepted());
    assert!(!SaveOutcome::from_status(404).is_accepted());
}
