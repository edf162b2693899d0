//! Tests for backend payloads, record conversion and error classification.
mod common;
use common::*;
use flowboard::api::{Credentials, NewWorkflow, Statistics, WorkflowLogs, WorkflowPayload};
use flowboard::error::ValidationError;
use flowboard::prelude::*;
use serde_json::json;
use validator::Validate;

fn record_json() -> serde_json::Value {
    json!({
        "id": 12,
        "name": "Standup reminder",
        "status": "deployed",
        "steps": [
            {
                "id": 31,
                "type": "action",
                "serviceId": 4,
                "serviceActionId": "post-message",
                "status": "tested",
                "executionOrder": 5,
                "parameters": [
                    {"key": "channel", "name": "Channel", "type": "string", "value": "#team"},
                    {"key": "count", "type": "number", "value": "3"}
                ]
            },
            {
                "id": 30,
                "type": "trigger",
                "serviceId": "calendar",
                "serviceActionId": "event-created",
                "status": "configured",
                "executionOrder": 0,
                "parameters": [
                    {"key": "starts", "type": "date", "value": "2024-03-01"},
                    {"key": "blob", "type": "binary", "value": "abc"}
                ]
            }
        ]
    })
}

#[test]
fn test_record_converts_in_execution_order() {
    let record: WorkflowRecord = serde_json::from_value(record_json()).unwrap();
    assert!(record.is_deployed());

    let workflow = record.into_workflow().unwrap();

    assert_eq!(workflow.id, Some(12));
    assert!(workflow.is_active);
    assert_eq!(ids(&workflow.steps), vec![StepId::Saved(30), StepId::Saved(31)]);
    assert_eq!(workflow.steps[1].order, 1);
    assert_eq!(workflow.steps[1].service, Some(ServiceRef::new("4")));
    assert_eq!(workflow.steps[1].status, StepStatus::Tested);

    let count = workflow.steps[1].parameter("count").unwrap();
    assert_eq!(count.value, Some(ParameterValue::Number(3.0)));
    let starts = workflow.steps[0].parameter("starts").unwrap();
    assert_eq!(starts.kind, ParameterKind::DateTime);
    assert!(starts.value.is_some());
    // Unknown wire types fall back to text.
    let blob = workflow.steps[0].parameter("blob").unwrap();
    assert_eq!(blob.kind, ParameterKind::Text);
}

#[test]
fn test_record_without_leading_trigger_is_rejected() {
    let mut value = record_json();
    value["steps"][1]["executionOrder"] = json!(9);
    let record: WorkflowRecord = serde_json::from_value(value).unwrap();

    assert!(matches!(
        record.into_workflow(),
        Err(WorkflowError::MissingTrigger { .. })
    ));
}

#[test]
fn test_payload_requires_a_valid_workflow() {
    let mut workflow = saved_workflow(1);
    workflow.steps[1].capability = None;
    assert!(matches!(
        WorkflowPayload::try_from(&workflow),
        Err(WorkflowError::Unconfigured(StepId::Saved(2)))
    ));

    workflow.name = "  ".to_string();
    assert_eq!(
        WorkflowPayload::try_from(&workflow),
        Err(WorkflowError::EmptyName)
    );
}

#[test]
fn test_payload_carries_order_and_status() {
    let mut workflow = saved_workflow(1);
    workflow.steps.push(configured(WorkflowStep::action(), "chat", "post-message"));
    let workflow = workflow.into_workflow().unwrap();

    let payload = WorkflowPayload::try_from(&workflow).unwrap();
    assert_eq!(payload.status, "draft");
    assert_eq!(payload.steps.len(), 3);
    assert_eq!(payload.steps[2].id, None);
    assert_eq!(payload.steps[2].execution_order, 2);

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["id"], 100);
    assert_eq!(json["steps"][0]["service_action_id"], "event-created");
    assert!(json["steps"][2].get("id").is_none());
}

#[test]
fn test_forms_are_validated_locally() {
    let credentials = Credentials {
        email: "not-an-email".to_string(),
        password: "short".to_string(),
    };
    let errors = credentials.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));

    assert!(
        NewWorkflow {
            name: String::new()
        }
        .validate()
        .is_err()
    );
    assert!(
        NewWorkflow {
            name: "Nightly backup".to_string()
        }
        .validate()
        .is_ok()
    );

    let error: Error = ValidationError::from(errors).into();
    assert_eq!(error.user_message(), "Please fill in all required fields");
}

#[test]
fn test_status_codes_are_classified() {
    assert!(matches!(
        ApiError::from_status(400, "bad id".to_string()),
        ApiError::InvalidIdentifier(_)
    ));
    assert!(matches!(
        ApiError::from_status(403, String::new()),
        ApiError::Unauthorized { status: 403 }
    ));
    assert_eq!(ApiError::from_status(404, String::new()).status(), Some(404));
    assert_eq!(
        ApiError::from_status(502, String::new()).user_message(),
        "Something went wrong, please try again"
    );
}

#[test]
fn test_logs_and_statistics_decode() {
    let logs: WorkflowLogs = serde_json::from_value(json!({
        "workflowId": 12,
        "name": "Standup reminder",
        "logs": [{
            "id": 1,
            "actionId": 31,
            "actionName": "Post message",
            "serviceName": "Chat",
            "status": "error",
            "httpCode": 500,
            "exception": "timeout",
            "executedAt": "2024-03-01T08:00:00Z",
            "type": "action"
        }]
    }))
    .unwrap();
    assert_eq!(logs.logs.len(), 1);
    assert_eq!(logs.logs[0].http_code, Some(500));

    let stats: Statistics = serde_json::from_value(json!({
        "countsByStatus": {"deployed": 2, "draft": 5},
        "monthly": [{"month": "2024-03", "count": 40}]
    }))
    .unwrap();
    assert_eq!(stats.counts_by_status.get("draft"), Some(&5));
    assert_eq!(stats.monthly[0].count, 40);
    assert!(stats.used_services.is_empty());
}

#[test]
fn test_client_builds_from_config() {
    let config = ClientConfig::default();
    let session = SessionStore::new();
    let client = ApiClient::new(&config, session.clone()).unwrap();

    session.sign_in("abc");
    assert_eq!(client.session().token().as_deref(), Some("abc"));
    client.logout();
    assert!(!session.has_cookie());
}

#[test]
fn test_io_failures_keep_their_own_variant() {
    fn read(path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    let err = read("/nonexistent/flowboard/workflow.json").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.user_message().starts_with("I/O error"));
}
