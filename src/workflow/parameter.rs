use crate::error::ParameterError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a capability parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Text,
    Number,
    Boolean,
    DateTime,
}

impl ParameterKind {
    /// Parses the type names the backend uses in capability schemas.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" | "text" | "email" | "url" => Some(ParameterKind::Text),
            "number" | "int" | "integer" | "float" => Some(ParameterKind::Number),
            "boolean" | "bool" => Some(ParameterKind::Boolean),
            "date" | "datetime" | "timestamp" => Some(ParameterKind::DateTime),
            _ => None,
        }
    }

    /// The type name sent back to the backend.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ParameterKind::Text => "string",
            ParameterKind::Number => "number",
            ParameterKind::Boolean => "boolean",
            ParameterKind::DateTime => "date",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ParameterValue {
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(DateTime<Utc>),
}

impl ParameterValue {
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::Text(_) => ParameterKind::Text,
            ParameterValue::Number(_) => ParameterKind::Number,
            ParameterValue::Bool(_) => ParameterKind::Boolean,
            ParameterValue::DateTime(_) => ParameterKind::DateTime,
        }
    }

    /// Reads a loosely typed JSON value as the given kind.
    ///
    /// Numbers and booleans are also accepted in their string form, and dates
    /// either as RFC 3339 timestamps or as plain `YYYY-MM-DD` days (midnight
    /// UTC). Returns `None` for `null` or anything that does not fit the kind.
    pub fn from_json(kind: ParameterKind, value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;

        match (kind, value) {
            (_, Json::Null) => None,
            (ParameterKind::Text, Json::String(s)) => Some(ParameterValue::Text(s.clone())),
            (ParameterKind::Text, Json::Number(n)) => Some(ParameterValue::Text(n.to_string())),
            (ParameterKind::Text, Json::Bool(b)) => Some(ParameterValue::Text(b.to_string())),
            (ParameterKind::Number, Json::Number(n)) => n.as_f64().map(ParameterValue::Number),
            (ParameterKind::Number, Json::String(s)) => {
                s.trim().parse().ok().map(ParameterValue::Number)
            }
            (ParameterKind::Boolean, Json::Bool(b)) => Some(ParameterValue::Bool(*b)),
            (ParameterKind::Boolean, Json::String(s)) => match s.as_str() {
                "true" => Some(ParameterValue::Bool(true)),
                "false" => Some(ParameterValue::Bool(false)),
                _ => None,
            },
            (ParameterKind::DateTime, Json::String(s)) => parse_datetime(s),
            _ => None,
        }
    }

    /// The JSON form sent to the backend.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParameterValue::Text(s) => serde_json::Value::String(s.clone()),
            ParameterValue::Number(n) => serde_json::json!(n),
            ParameterValue::Bool(b) => serde_json::Value::Bool(*b),
            ParameterValue::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
        }
    }
}

fn parse_datetime(raw: &str) -> Option<ParameterValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParameterValue::DateTime(dt.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| ParameterValue::DateTime(naive.and_utc()))
}

/// One entry of a capability's parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub key: String,
    pub name: String,
    pub kind: ParameterKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<ParameterValue>,
}

/// A parameter record attached to a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub name: String,
    pub kind: ParameterKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: Option<ParameterValue>,
}

impl Parameter {
    /// Replaces the value, rejecting values of the wrong kind.
    pub fn set(&mut self, value: ParameterValue) -> Result<(), ParameterError> {
        if value.kind() != self.kind {
            return Err(ParameterError::TypeMismatch {
                key: self.key.clone(),
                expected: self.kind,
                found: value.kind(),
            });
        }
        self.value = Some(value);
        Ok(())
    }

    /// True when the parameter is required but has no value.
    pub fn is_missing(&self) -> bool {
        self.required && self.value.is_none()
    }
}

impl From<&ParameterSchema> for Parameter {
    fn from(schema: &ParameterSchema) -> Self {
        Parameter {
            key: schema.key.clone(),
            name: schema.name.clone(),
            kind: schema.kind,
            required: schema.required,
            value: schema.default.clone(),
        }
    }
}

/// Builds the default parameter set for a capability schema.
pub fn defaults_from_schema(schema: &[ParameterSchema]) -> Vec<Parameter> {
    schema.iter().map(Parameter::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_json_reads() {
        assert_eq!(
            ParameterValue::from_json(ParameterKind::Number, &json!("42.5")),
            Some(ParameterValue::Number(42.5))
        );
        assert_eq!(
            ParameterValue::from_json(ParameterKind::Boolean, &json!("false")),
            Some(ParameterValue::Bool(false))
        );
        assert_eq!(
            ParameterValue::from_json(ParameterKind::Number, &json!(true)),
            None
        );
        assert_eq!(
            ParameterValue::from_json(ParameterKind::Text, &serde_json::Value::Null),
            None
        );
    }

    #[test]
    fn plain_days_read_as_midnight_utc() {
        let value = ParameterValue::from_json(ParameterKind::DateTime, &json!("2024-03-01"));
        match value {
            Some(ParameterValue::DateTime(dt)) => {
                assert_eq!(dt.to_rfc3339(), "2024-03-01T00:00:00+00:00")
            }
            other => panic!("Expected a date value, got {:?}", other),
        }
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let mut param = Parameter {
            key: "title".to_string(),
            name: "Title".to_string(),
            kind: ParameterKind::Text,
            required: true,
            value: None,
        };
        assert!(param.is_missing());

        let err = param.set(ParameterValue::Number(1.0)).unwrap_err();
        assert_eq!(
            err,
            ParameterError::TypeMismatch {
                key: "title".to_string(),
                expected: ParameterKind::Text,
                found: ParameterKind::Number,
            }
        );

        param.set(ParameterValue::Text("Standup".to_string())).unwrap();
        assert!(!param.is_missing());
    }
}
