//! Tests for user-facing notifications.
use flowboard::error::ParameterError;
use flowboard::prelude::*;

#[test]
fn test_push_and_dismiss() {
    let mut center = NotificationCenter::default();
    let saved = center.success("Workflow saved");
    let failed = center.error("Could not reach the server");

    let messages: Vec<_> = center.active().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["Workflow saved", "Could not reach the server"]);
    assert_ne!(saved, failed);

    assert!(center.dismiss(saved));
    assert!(!center.dismiss(saved));
    assert_eq!(center.active().count(), 1);

    center.clear();
    assert_eq!(center.active().count(), 0);
}

#[test]
fn test_oldest_notification_is_dropped_at_capacity() {
    let mut center = NotificationCenter::with_capacity(2);
    center.info("one");
    center.info("two");
    center.info("three");
    let messages: Vec<_> = center.active().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["two", "three"]);
}

#[test]
fn test_errors_are_reported_with_severity() {
    let mut center = NotificationCenter::default();
    center.report(&Error::Api(ApiError::from_status(401, String::new())));
    center.report(&Error::Parameter(ParameterError::UnknownKey {
        step_id: StepId::Saved(1),
        key: "to".to_string(),
    }));

    let reported: Vec<_> = center.active().map(|n| (n.severity, n.message.clone())).collect();
    assert_eq!(reported[0].0, Severity::Error);
    assert_eq!(reported[0].1, "You are not authorized to perform this action");
    assert_eq!(reported[1].0, Severity::Error);
}

#[test]
fn test_schema_failures_become_warnings() {
    let mut center = NotificationCenter::default();
    assert!(
        center
            .report_schema(&SchemaOutcome::Applied { parameters: 2 })
            .is_none()
    );
    let id = center
        .report_schema(&SchemaOutcome::Failed {
            warning: "Could not load the parameters of 'send'".to_string(),
        })
        .unwrap();
    let note = center.active().find(|n| n.id == id).unwrap();
    assert_eq!(note.severity, Severity::Warning);
}
