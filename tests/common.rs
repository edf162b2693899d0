//! Common test utilities for building workflows and backend doubles.
use ahash::AHashMap;
use async_trait::async_trait;
use flowboard::api::{CapabilityCatalog, StepExecutor};
use flowboard::error::ApiError;
use flowboard::prelude::*;
use std::sync::Mutex;

/// A saved trigger followed by `actions` saved actions, ids `1..=actions+1`.
///
/// Every step is bound to a capability and sits in `configured`.
#[allow(dead_code)]
pub fn saved_workflow(actions: u64) -> Workflow {
    let mut workflow = Workflow::new("Morning digest");
    workflow.id = Some(100);
    workflow.steps.push(
        configured(WorkflowStep::trigger(), "calendar", "event-created").with_id(StepId::Saved(1)),
    );
    for id in 2..=actions + 1 {
        workflow
            .steps
            .push(configured(WorkflowStep::action(), "mail", "send").with_id(StepId::Saved(id)));
    }
    workflow.into_workflow().expect("fixture is structurally valid")
}

#[allow(dead_code)]
pub fn configured(mut step: WorkflowStep, service: &str, capability: &str) -> WorkflowStep {
    step.service = Some(ServiceRef::new(service));
    step.capability = Some(CapabilityRef::new(capability));
    step.status = StepStatus::Configured;
    step
}

#[allow(dead_code)]
pub fn text_param(key: &str, required: bool) -> ParameterSchema {
    ParameterSchema {
        key: key.to_string(),
        name: key.to_string(),
        kind: ParameterKind::Text,
        required,
        default: None,
    }
}

#[allow(dead_code)]
pub fn ids(steps: &[WorkflowStep]) -> Vec<StepId> {
    steps.iter().map(|s| s.id.clone()).collect()
}

/// A capability catalog serving canned schemas. Unknown capabilities answer
/// with a 404.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeCatalog {
    schemas: AHashMap<String, Vec<ParameterSchema>>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeCatalog {
    pub fn with_schema(mut self, capability: &str, schema: Vec<ParameterSchema>) -> Self {
        self.schemas.insert(capability.to_string(), schema);
        self
    }

    /// The capability answers with a 500.
    pub fn with_failure(mut self, capability: &str) -> Self {
        self.failing.push(capability.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CapabilityCatalog for FakeCatalog {
    async fn parameter_schema(
        &self,
        _service: &ServiceRef,
        capability: &CapabilityRef,
    ) -> Result<Vec<ParameterSchema>, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(capability.0.clone());
        }
        if self.failing.contains(&capability.0) {
            return Err(ApiError::from_status(500, "boom".to_string()));
        }
        self.schemas
            .get(&capability.0)
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, capability.0.clone()))
    }
}

/// Executes steps, failing the ones listed with the given HTTP status.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeExecutor {
    failures: AHashMap<StepId, u16>,
}

#[allow(dead_code)]
impl FakeExecutor {
    pub fn failing(mut self, step_id: StepId, status: u16) -> Self {
        self.failures.insert(step_id, status);
        self
    }
}

#[async_trait]
impl StepExecutor for FakeExecutor {
    async fn execute_step(&self, step: &WorkflowStep) -> Result<(), ApiError> {
        match self.failures.get(&step.id) {
            Some(status) => Err(ApiError::from_status(*status, "execution failed".to_string())),
            None => Ok(()),
        }
    }
}

/// A render surface that keeps every graph it was handed.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSurface {
    pub frames: Vec<VisualGraph>,
}

impl RenderSurface for RecordingSurface {
    fn render(&mut self, graph: &VisualGraph) {
        self.frames.push(graph.clone());
    }
}
