use super::definition::{CapabilityRef, ServiceRef, StepId, Workflow, WorkflowStep};
use super::parameter::{Parameter, ParameterKind, ParameterValue};
use crate::api::{ParameterRecord, StepPayload, StepRecord, WorkflowPayload, WorkflowRecord};
use crate::error::WorkflowError;

/// A trait for backend or fixture representations that can be loaded into
/// the editor as a [`Workflow`].
///
/// # Example
///
/// ```rust,no_run
/// use flowboard::prelude::*;
/// use flowboard::error::WorkflowError;
///
/// struct Fixture { name: String, trigger_service: String }
///
/// impl IntoWorkflow for Fixture {
///     fn into_workflow(self) -> Result<Workflow, WorkflowError> {
///         let mut workflow = Workflow::new(self.name);
///         workflow.steps.push(
///             WorkflowStep::trigger().with_service(ServiceRef::new(self.trigger_service)),
///         );
///         Ok(workflow)
///     }
/// }
/// ```
pub trait IntoWorkflow {
    /// Consumes the object and converts it into a workflow whose steps are
    /// ordered and renumbered.
    fn into_workflow(self) -> Result<Workflow, WorkflowError>;
}

impl IntoWorkflow for Workflow {
    fn into_workflow(mut self) -> Result<Workflow, WorkflowError> {
        self.steps = crate::editor::renumber_and_compact(self.steps);
        self.check_structure()?;
        Ok(self)
    }
}

impl IntoWorkflow for WorkflowRecord {
    fn into_workflow(self) -> Result<Workflow, WorkflowError> {
        let is_active = self.is_deployed();
        let mut records = self.steps;
        records.sort_by_key(|s| s.execution_order);

        let steps = records.into_iter().map(step_from_record).collect();
        let workflow = Workflow {
            id: Some(self.id),
            name: self.name,
            steps: crate::editor::renumber_and_compact(steps),
            is_active,
            saved_at: self.saved_at,
            deployed_at: self.deployed_at,
        };
        workflow.check_structure()?;
        Ok(workflow)
    }
}

fn step_from_record(record: StepRecord) -> WorkflowStep {
    let step_id = StepId::Saved(record.id);
    let parameters = record
        .parameters
        .into_iter()
        .map(|p| parameter_from_record(&step_id, p))
        .collect();

    WorkflowStep {
        id: step_id,
        kind: record.kind,
        service: record.service_id.map(ServiceRef),
        capability: record.service_action_id.map(CapabilityRef),
        parameters,
        status: record.status,
        order: record.execution_order,
    }
}

fn parameter_from_record(step_id: &StepId, record: ParameterRecord) -> Parameter {
    let kind = ParameterKind::from_wire(&record.kind).unwrap_or_else(|| {
        tracing::warn!(
            step_id = %step_id,
            key = %record.key,
            wire_type = %record.kind,
            "Unknown parameter type, treating it as text"
        );
        ParameterKind::Text
    });
    let value = ParameterValue::from_json(kind, &record.value);
    if value.is_none() && !record.value.is_null() {
        tracing::warn!(
            step_id = %step_id,
            key = %record.key,
            "Parameter value does not match its declared type, dropping it"
        );
    }

    Parameter {
        key: record.key,
        name: record.name,
        kind,
        required: record.required,
        value,
    }
}

impl Workflow {
    /// Builds the create/update request body. Fails if [`Workflow::validate`]
    /// does.
    pub fn to_payload(&self) -> Result<WorkflowPayload, WorkflowError> {
        WorkflowPayload::try_from(self)
    }
}

impl TryFrom<&Workflow> for WorkflowPayload {
    type Error = WorkflowError;

    fn try_from(workflow: &Workflow) -> Result<Self, Self::Error> {
        workflow.validate()?;

        let steps = workflow
            .steps
            .iter()
            .map(|step| {
                let service_action_id = step
                    .capability
                    .as_ref()
                    .map(|c| c.0.clone())
                    .ok_or_else(|| WorkflowError::Unconfigured(step.id.clone()))?;
                Ok(StepPayload {
                    id: step.id.saved_id(),
                    service_action_id,
                    status: step.status,
                    execution_order: step.order,
                    parameters: step.parameters.iter().map(ParameterRecord::from).collect(),
                })
            })
            .collect::<Result<Vec<_>, WorkflowError>>()?;

        Ok(WorkflowPayload {
            id: workflow.id,
            name: workflow.name.clone(),
            status: if workflow.is_active { "deployed" } else { "draft" }.to_string(),
            steps,
        })
    }
}

impl From<&Parameter> for ParameterRecord {
    fn from(param: &Parameter) -> Self {
        ParameterRecord {
            key: param.key.clone(),
            name: param.name.clone(),
            kind: param.kind.wire_name().to_string(),
            required: param.required,
            value: param
                .value
                .as_ref()
                .map(ParameterValue::to_json)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}
