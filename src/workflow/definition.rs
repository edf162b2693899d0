use super::parameter::Parameter;
use super::status::StepStatus;
use crate::error::WorkflowError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies a step. Saved steps carry the backend id; unsaved steps get a
/// random draft id so they can still be addressed while the user edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepId {
    Saved(u64),
    Draft(Uuid),
}

impl StepId {
    pub fn draft() -> Self {
        StepId::Draft(Uuid::new_v4())
    }

    pub fn saved_id(&self) -> Option<u64> {
        match self {
            StepId::Saved(id) => Some(*id),
            StepId::Draft(_) => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepId::Saved(id) => write!(f, "{}", id),
            StepId::Draft(uuid) => write!(f, "draft-{}", uuid),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Trigger,
    Action,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Trigger => f.write_str("trigger"),
            StepKind::Action => f.write_str("action"),
        }
    }
}

/// Identifier of an external service (e.g. a calendar provider).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceRef(pub String);

/// Identifier of a trigger or action exposed by a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityRef(pub String);

impl ServiceRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl CapabilityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CapabilityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: StepId,
    pub kind: StepKind,
    #[serde(default)]
    pub service: Option<ServiceRef>,
    /// `None` until the user selects a capability.
    #[serde(default)]
    pub capability: Option<CapabilityRef>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub order: usize,
}

impl WorkflowStep {
    /// A fresh, unconfigured step with a draft id.
    pub fn new(kind: StepKind) -> Self {
        Self {
            id: StepId::draft(),
            kind,
            service: None,
            capability: None,
            parameters: Vec::new(),
            status: StepStatus::Draft,
            order: 0,
        }
    }

    pub fn trigger() -> Self {
        Self::new(StepKind::Trigger)
    }

    pub fn action() -> Self {
        Self::new(StepKind::Action)
    }

    pub fn with_id(mut self, id: StepId) -> Self {
        self.id = id;
        self
    }

    pub fn with_service(mut self, service: ServiceRef) -> Self {
        self.service = Some(service);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some() && self.capability.is_some()
    }

    pub fn parameter(&self, key: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.key == key)
    }

    /// Label shown on the step's node.
    pub fn label(&self) -> String {
        match (&self.service, &self.capability) {
            (Some(service), Some(capability)) => format!("{}: {}", service, capability),
            (Some(service), None) => service.to_string(),
            (None, _) => match self.kind {
                StepKind::Trigger => "Choose a Trigger".to_string(),
                StepKind::Action => "Choose an Action".to_string(),
            },
        }
    }
}

/// A named, ordered collection of steps plus its activation state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deployed_at: Option<DateTime<Utc>>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Checks the structural invariants: the first step is the only trigger
    /// and every `order` matches its array position.
    pub fn check_structure(&self) -> Result<(), WorkflowError> {
        if let Some(first) = self.steps.first() {
            if first.kind != StepKind::Trigger {
                return Err(WorkflowError::MissingTrigger { found: first.kind });
            }
        }
        for (position, step) in self.steps.iter().enumerate() {
            if position > 0 && step.kind == StepKind::Trigger {
                return Err(WorkflowError::MisplacedTrigger { position });
            }
            if step.order != position {
                return Err(WorkflowError::OrderMismatch {
                    position,
                    order: step.order,
                });
            }
        }
        Ok(())
    }

    /// Full pre-save validation: structure, a name, and a capability on
    /// every step.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::EmptyName);
        }
        self.check_structure()?;
        if let Some(step) = self.steps.iter().find(|s| !s.is_configured()) {
            return Err(WorkflowError::Unconfigured(step.id.clone()));
        }
        Ok(())
    }

    /// Activates the workflow. Step statuses are left as they are.
    pub fn deploy(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.deployed_at = Some(now);
    }

    pub fn undeploy(&mut self) {
        self.is_active = false;
    }

    /// Records a successful save, adopting the ids the backend assigned.
    ///
    /// `step_ids` are matched to steps by position; extra ids are ignored.
    pub fn mark_saved(&mut self, id: u64, step_ids: &[u64], now: DateTime<Utc>) {
        self.id = Some(id);
        self.saved_at = Some(now);
        for (step, saved) in self.steps.iter_mut().zip(step_ids) {
            step.id = StepId::Saved(*saved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_id_display() {
        assert_eq!(StepId::Saved(7).to_string(), "7");
        assert!(StepId::draft().to_string().starts_with("draft-"));
    }

    #[test]
    fn labels_fall_back_to_prompts() {
        assert_eq!(WorkflowStep::trigger().label(), "Choose a Trigger");
        assert_eq!(WorkflowStep::action().label(), "Choose an Action");
    }
}
