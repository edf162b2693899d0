//! The linear workflow graph model.
//!
//! [`WorkflowEditor`] owns the step list of one workflow and keeps its
//! visual projection in sync. All mutations are synchronous; network work
//! (schema fetches, step test runs) is split into a request and a later,
//! id-keyed application of its result so that concurrent completions can
//! arrive in any order.

use crate::api::{CapabilityCatalog, CapabilityDescriptor, StepExecutor};
use crate::error::{Error, GraphError, ParameterError};
use crate::graph::{GraphLayout, InsertAnchor, InsertSlot, RenderSurface, VisualGraph};
use crate::workflow::{
    CapabilityRef, ParameterSchema, ParameterValue, ServiceRef, StatusEvent, StepId, StepKind,
    StepStatus, Workflow, WorkflowStep, defaults_from_schema,
};

mod commands;
mod fetch;
mod ops;

pub use commands::*;
pub use fetch::{FetchTicket, SchemaOutcome};
pub use ops::*;

use fetch::PendingFetches;
use ops::{apply_capability, position_of};

/// Result of a dispatched [`EditorCommand`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    Inserted(StepId),
    Removed(StepId),
    Moved { step_id: StepId, to_index: usize },
}

pub struct WorkflowEditor {
    workflow: Workflow,
    layout: GraphLayout,
    graph: VisualGraph,
    pending: PendingFetches,
}

impl WorkflowEditor {
    /// Loads a workflow, renumbering its steps.
    pub fn new(mut workflow: Workflow, layout: GraphLayout) -> Self {
        workflow.steps = renumber_and_compact(std::mem::take(&mut workflow.steps));
        let graph = crate::graph::derive_visual_graph(&workflow.steps, &layout);
        Self {
            workflow,
            layout,
            graph,
            pending: PendingFetches::default(),
        }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn meta(&mut self) -> WorkflowMeta<'_> {
        WorkflowMeta {
            workflow: &mut self.workflow,
        }
    }

    pub fn into_workflow(self) -> Workflow {
        self.workflow
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.workflow.steps
    }

    pub fn step(&self, step_id: &StepId) -> Option<&WorkflowStep> {
        self.workflow.steps.iter().find(|s| &s.id == step_id)
    }

    pub fn graph(&self) -> &VisualGraph {
        &self.graph
    }

    pub fn layout(&self) -> &GraphLayout {
        &self.layout
    }

    pub fn has_pending_fetch(&self, step_id: &StepId) -> bool {
        self.pending.is_pending(step_id)
    }

    pub fn pending_fetches(&self) -> usize {
        self.pending.len()
    }

    pub fn render_to<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        surface.render(&self.graph);
    }

    /// Records a successful save and adopts the backend-assigned step ids.
    /// Outstanding schema fetches follow their step to its new id.
    pub fn mark_saved(&mut self, id: u64, step_ids: &[u64], now: chrono::DateTime<chrono::Utc>) {
        let previous: Vec<StepId> = self.workflow.steps.iter().map(|s| s.id.clone()).collect();
        self.workflow.mark_saved(id, step_ids, now);
        let renames: Vec<(StepId, StepId)> = previous
            .into_iter()
            .zip(&self.workflow.steps)
            .filter(|(old, step)| old != &step.id)
            .map(|(old, step)| (old, step.id.clone()))
            .collect();
        self.pending.rename_all(&renames);
        self.rebuild();
        tracing::info!(workflow_id = id, "Workflow saved");
    }

    // ---- structural edits ----

    /// Inserts `new_step` into the gap described by `slot`.
    pub fn insert_between(
        &mut self,
        slot: &InsertSlot,
        new_step: WorkflowStep,
    ) -> Result<StepId, GraphError> {
        let step_id = new_step.id.clone();
        let steps = insert_step_between(
            &self.workflow.steps,
            &slot.before,
            slot.after.as_ref(),
            new_step,
        )?;
        self.replace_steps(steps);
        tracing::info!(step_id = %step_id, before = %slot.before, "Inserted step");
        Ok(step_id)
    }

    /// Inserts a blank step of the kind the slot calls for.
    pub fn request_insert(&mut self, slot: &InsertSlot) -> Result<StepId, GraphError> {
        let kind = match slot.before {
            InsertAnchor::Start => StepKind::Trigger,
            InsertAnchor::After(_) => StepKind::Action,
        };
        self.insert_between(slot, WorkflowStep::new(kind))
    }

    pub fn remove(&mut self, step_id: &StepId) -> Result<(), GraphError> {
        let steps = remove_step(&self.workflow.steps, step_id)?;
        self.replace_steps(steps);
        // A late schema result for this step must not bring it back.
        self.pending.forget(step_id);
        tracing::info!(step_id = %step_id, "Removed step");
        Ok(())
    }

    pub fn move_to(&mut self, step_id: &StepId, to_index: usize) -> Result<(), GraphError> {
        let steps = move_step(&self.workflow.steps, step_id, to_index)?;
        self.replace_steps(steps);
        tracing::info!(step_id = %step_id, to_index, "Moved step");
        Ok(())
    }

    /// Applies one command from a node component.
    pub fn dispatch(&mut self, command: EditorCommand) -> Result<EditorOutcome, GraphError> {
        match command {
            EditorCommand::RequestInsert(slot) => {
                self.request_insert(&slot).map(EditorOutcome::Inserted)
            }
            EditorCommand::Remove(step_id) => {
                self.remove(&step_id)?;
                Ok(EditorOutcome::Removed(step_id))
            }
            EditorCommand::Move { step_id, to_index } => {
                self.move_to(&step_id, to_index)?;
                Ok(EditorOutcome::Moved { step_id, to_index })
            }
        }
    }

    /// Applies every command queued so far, in arrival order.
    pub fn drain_commands(
        &mut self,
        receiver: &mut CommandReceiver,
    ) -> Vec<Result<EditorOutcome, GraphError>> {
        std::iter::from_fn(|| receiver.try_next())
            .map(|command| self.dispatch(command))
            .collect()
    }

    // ---- capability selection ----

    /// Selects a capability described by the catalog, checking that its kind
    /// matches the step, and starts the schema fetch.
    pub fn choose_capability(
        &mut self,
        step_id: &StepId,
        service: ServiceRef,
        descriptor: &CapabilityDescriptor,
    ) -> Result<FetchTicket, GraphError> {
        let step = self
            .step(step_id)
            .ok_or_else(|| GraphError::StepNotFound(step_id.clone()))?;
        if step.kind != descriptor.kind {
            return Err(GraphError::CapabilityKindMismatch {
                step_id: step_id.clone(),
                expected: step.kind,
                found: descriptor.kind,
            });
        }
        self.begin_capability_change(
            step_id,
            service,
            CapabilityRef::new(descriptor.identifier.clone()),
        )
    }

    /// Points the step at a new capability right away and issues a ticket for
    /// the schema fetch that fills in its parameters.
    pub fn begin_capability_change(
        &mut self,
        step_id: &StepId,
        service: ServiceRef,
        capability: CapabilityRef,
    ) -> Result<FetchTicket, GraphError> {
        let index = position_of(&self.workflow.steps, step_id)?;
        apply_capability(
            &mut self.workflow.steps[index],
            service.clone(),
            capability.clone(),
        );
        self.rebuild();
        tracing::info!(
            step_id = %step_id,
            service = %service,
            capability = %capability,
            "Capability selected"
        );
        Ok(self.pending.issue(step_id.clone(), service, capability))
    }

    /// Applies the result of a schema fetch to the step that requested it.
    pub fn apply_schema(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<ParameterSchema>, crate::error::ApiError>,
    ) -> SchemaOutcome {
        let Some(current_id) = self.pending.redeem(ticket) else {
            tracing::debug!(step_id = %ticket.step_id, "Discarding stale schema result");
            return SchemaOutcome::Discarded;
        };
        let Some(step) = self
            .workflow
            .steps
            .iter_mut()
            .find(|s| s.id == current_id)
        else {
            tracing::debug!(step_id = %ticket.step_id, "Step is gone, discarding schema result");
            return SchemaOutcome::Discarded;
        };

        match result {
            Ok(schema) => {
                step.parameters = defaults_from_schema(&schema);
                tracing::debug!(
                    step_id = %ticket.step_id,
                    parameters = schema.len(),
                    "Applied parameter schema"
                );
                SchemaOutcome::Applied {
                    parameters: schema.len(),
                }
            }
            Err(e) => {
                step.parameters.clear();
                tracing::warn!(
                    step_id = %ticket.step_id,
                    capability = %ticket.capability,
                    error = %e,
                    "Parameter schema fetch failed"
                );
                SchemaOutcome::Failed {
                    warning: format!(
                        "Could not load the parameters of '{}': {}",
                        ticket.capability,
                        e.user_message()
                    ),
                }
            }
        }
    }

    /// Selects a capability and fills in its parameters from `catalog`.
    pub async fn reassign_with<C: CapabilityCatalog + ?Sized>(
        &mut self,
        catalog: &C,
        step_id: &StepId,
        service: ServiceRef,
        capability: CapabilityRef,
    ) -> Result<SchemaOutcome, GraphError> {
        let ticket = self.begin_capability_change(step_id, service, capability)?;
        let result = catalog
            .parameter_schema(&ticket.service, &ticket.capability)
            .await;
        Ok(self.apply_schema(&ticket, result))
    }

    // ---- parameters and status ----

    pub fn set_parameter(
        &mut self,
        step_id: &StepId,
        key: &str,
        value: ParameterValue,
    ) -> Result<(), Error> {
        let index = position_of(&self.workflow.steps, step_id)?;
        let step = &mut self.workflow.steps[index];
        let param = step
            .parameters
            .iter_mut()
            .find(|p| p.key == key)
            .ok_or_else(|| ParameterError::UnknownKey {
                step_id: step_id.clone(),
                key: key.to_string(),
            })?;
        param.set(value)?;
        let status = step.status.on(StatusEvent::ParametersEdited)?;
        self.set_status(index, status);
        Ok(())
    }

    /// Records the outcome of a single-step test run. Other steps are not
    /// touched.
    pub fn record_test_result(&mut self, step_id: &StepId, ok: bool) -> Result<StepStatus, Error> {
        let index = position_of(&self.workflow.steps, step_id)?;
        let event = if ok {
            StatusEvent::TestSucceeded
        } else {
            StatusEvent::TestFailed
        };
        let status = self.workflow.steps[index].status.on(event)?;
        self.set_status(index, status);
        tracing::info!(step_id = %step_id, status = %status, "Recorded step test result");
        Ok(status)
    }

    /// Runs a single step against the backend and records the outcome.
    ///
    /// A failed execution is not an error of this call: it is recorded as the
    /// step's `error` status.
    pub async fn run_step_test<E: StepExecutor + ?Sized>(
        &mut self,
        executor: &E,
        step_id: &StepId,
    ) -> Result<StepStatus, Error> {
        let index = position_of(&self.workflow.steps, step_id)?;
        let step = self.workflow.steps[index].clone();
        // Reject draft steps before touching the network.
        step.status.on(StatusEvent::TestSucceeded)?;

        let ok = match executor.execute_step(&step).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(step_id = %step_id, error = %e, "Step test run failed");
                false
            }
        };
        self.record_test_result(step_id, ok)
    }

    // ---- internals ----

    fn set_status(&mut self, index: usize, status: StepStatus) {
        if self.workflow.steps[index].status != status {
            self.workflow.steps[index].status = status;
            self.rebuild();
        }
    }

    fn replace_steps(&mut self, steps: Vec<WorkflowStep>) {
        self.workflow.steps = steps;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.graph = crate::graph::derive_visual_graph(&self.workflow.steps, &self.layout);
        tracing::debug!(
            steps = self.workflow.steps.len(),
            nodes = self.graph.nodes.len(),
            "Rebuilt workflow graph"
        );
    }
}

/// Access to the non-structural workflow fields, so the step list can only
/// change through the editor's own operations.
pub struct WorkflowMeta<'a> {
    workflow: &'a mut Workflow,
}

impl WorkflowMeta<'_> {
    pub fn rename(&mut self, name: impl Into<String>) {
        self.workflow.name = name.into();
    }

    pub fn deploy(&mut self, now: chrono::DateTime<chrono::Utc>) {
        self.workflow.deploy(now);
    }

    pub fn undeploy(&mut self) {
        self.workflow.undeploy();
    }
}
