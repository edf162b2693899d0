use crate::workflow::{ParameterKind, ParameterSchema, ParameterValue, StepKind, StepStatus};
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// An external service the user can subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub identifier: String,
    pub name: String,
}

/// A trigger or action exposed by a service, with its parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    #[serde(deserialize_with = "string_or_number")]
    pub identifier: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default)]
    pub parameters: Vec<SchemaRecord>,
}

impl CapabilityDescriptor {
    /// The typed schema. Entries with an unknown type are skipped.
    pub fn schema(&self) -> Vec<ParameterSchema> {
        self.parameters
            .iter()
            .filter_map(|record| {
                let Some(kind) = ParameterKind::from_wire(&record.kind) else {
                    tracing::warn!(
                        capability = %self.identifier,
                        key = %record.key,
                        wire_type = %record.kind,
                        "Skipping schema entry with unknown type"
                    );
                    return None;
                };
                Some(ParameterSchema {
                    key: record.key.clone(),
                    name: record.name.clone().unwrap_or_else(|| record.key.clone()),
                    kind,
                    required: record.required,
                    default: record
                        .default
                        .as_ref()
                        .and_then(|v| ParameterValue::from_json(kind, v)),
                })
            })
            .collect()
    }
}

/// One schema entry as the backend sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRecord {
    #[serde(alias = "id")]
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

/// Parameter record as stored on a persisted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: u64,
    #[serde(rename = "type", alias = "kind")]
    pub kind: StepKind,
    #[serde(default, alias = "serviceId", deserialize_with = "opt_string_or_number")]
    pub service_id: Option<String>,
    #[serde(
        default,
        alias = "serviceActionId",
        deserialize_with = "opt_string_or_number"
    )]
    pub service_action_id: Option<String>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default, alias = "executionOrder")]
    pub execution_order: usize,
    #[serde(default)]
    pub parameters: Vec<ParameterRecord>,
}

/// A workflow as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "isActive")]
    pub is_active: bool,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default, alias = "savedAt")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "deployedAt")]
    pub deployed_at: Option<DateTime<Utc>>,
}

impl WorkflowRecord {
    pub fn is_deployed(&self) -> bool {
        self.is_active || self.status.as_deref() == Some("deployed")
    }
}

/// Create/update request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub status: String,
    pub steps: Vec<StepPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub service_action_id: String,
    pub status: StepStatus,
    pub execution_order: usize,
    pub parameters: Vec<ParameterRecord>,
}

/// Body of the "create empty workflow" form.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewWorkflow {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

/// Login and registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthToken {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TestReport {
    #[serde(rename = "isOk")]
    pub is_ok: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowLogs {
    pub workflow_id: u64,
    pub name: String,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: u64,
    pub action_id: u64,
    pub action_name: String,
    pub service_name: String,
    pub status: String,
    pub http_code: Option<u16>,
    #[serde(default)]
    pub exception: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub parameters: serde_json::Value,
    pub executed_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectStart {
    /// Where the user authorizes the subscription, when the service needs it.
    #[serde(default, alias = "authorizeUrl", alias = "url")]
    pub authorize_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConnectionStatus {
    #[serde(alias = "isConnected", alias = "connected")]
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub counts_by_status: AHashMap<String, u64>,
    pub monthly: Vec<MonthlyCount>,
    pub last_errors: Vec<LogEntry>,
    pub used_services: Vec<ServiceUsage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceUsage {
    pub name: String,
    pub count: u64,
}

/// Reads a JSON array leniently: a non-array payload becomes an empty list
/// and undecodable items are skipped, each with a warning.
pub fn decode_list<T: DeserializeOwned>(value: serde_json::Value, what: &str) -> Vec<T> {
    let serde_json::Value::Array(items) = value else {
        tracing::warn!(payload = what, "Expected an array payload, using an empty list");
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(payload = what, index, error = %e, "Skipping malformed item");
                None
            }
        })
        .collect()
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_array_payload_degrades_to_empty() {
        let services: Vec<ServiceSummary> = decode_list(json!({"error": "oops"}), "services");
        assert!(services.is_empty());
    }

    #[test]
    fn malformed_items_are_skipped() {
        let services: Vec<ServiceSummary> = decode_list(
            json!([
                {"identifier": 1, "name": "Calendar"},
                {"name": "missing identifier"},
                {"identifier": "mail", "name": "Mail"}
            ]),
            "services",
        );
        let ids: Vec<_> = services.iter().map(|s| s.identifier.as_str()).collect();
        assert_eq!(ids, vec!["1", "mail"]);
    }

    #[test]
    fn schema_skips_unknown_types_and_reads_defaults() {
        let descriptor: CapabilityDescriptor = serde_json::from_value(json!({
            "identifier": 9,
            "name": "Create event",
            "type": "action",
            "parameters": [
                {"key": "title", "name": "Title", "type": "string", "required": true},
                {"key": "all_day", "type": "boolean", "default": "true"},
                {"key": "blob", "type": "binary"}
            ]
        }))
        .unwrap();

        let schema = descriptor.schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[1].name, "all_day");
        assert_eq!(schema[1].default, Some(ParameterValue::Bool(true)));
    }
}
