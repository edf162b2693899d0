//! Pure edits of an ordered step sequence. Every function returns a new,
//! renumbered sequence and leaves its input untouched.

use crate::error::GraphError;
use crate::graph::InsertAnchor;
use crate::workflow::{
    CapabilityRef, ParameterSchema, ServiceRef, StatusEvent, StepId, StepKind, StepStatus,
    WorkflowStep, defaults_from_schema,
};

/// Rewrites every `order` to match the step's index.
pub fn renumber_and_compact(mut steps: Vec<WorkflowStep>) -> Vec<WorkflowStep> {
    for (index, step) in steps.iter_mut().enumerate() {
        step.order = index;
    }
    steps
}

pub(crate) fn position_of(steps: &[WorkflowStep], id: &StepId) -> Result<usize, GraphError> {
    steps
        .iter()
        .position(|s| &s.id == id)
        .ok_or_else(|| GraphError::StepNotFound(id.clone()))
}

/// Places `new_step` directly after `before`.
///
/// `after` must name the step currently following `before` (`None` when
/// `before` is last). [`InsertAnchor::Start`] is only accepted on an empty
/// sequence and only for a trigger; everywhere else only actions can be
/// inserted. The new step always starts as a draft.
pub fn insert_step_between(
    steps: &[WorkflowStep],
    before: &InsertAnchor,
    after: Option<&StepId>,
    mut new_step: WorkflowStep,
) -> Result<Vec<WorkflowStep>, GraphError> {
    new_step.status = StepStatus::Draft;

    let position = match before {
        InsertAnchor::Start => {
            if !steps.is_empty() {
                return Err(GraphError::TriggerPositionFixed);
            }
            expect_kind(0, StepKind::Trigger, new_step.kind)?;
            0
        }
        InsertAnchor::After(before_id) => {
            let index = position_of(steps, before_id)?;
            let next = steps.get(index + 1).map(|s| &s.id);
            if next != after {
                return Err(GraphError::NotAdjacent {
                    before: before_id.to_string(),
                    after: after.map_or_else(|| "end".to_string(), |id| id.to_string()),
                });
            }
            expect_kind(index + 1, StepKind::Action, new_step.kind)?;
            index + 1
        }
    };

    let mut updated = steps.to_vec();
    updated.insert(position, new_step);
    Ok(renumber_and_compact(updated))
}

fn expect_kind(position: usize, expected: StepKind, found: StepKind) -> Result<(), GraphError> {
    if expected == found {
        Ok(())
    } else {
        Err(GraphError::KindMismatch {
            position,
            expected,
            found,
        })
    }
}

/// Points a step at a new service capability.
///
/// The parameter list is replaced wholesale by the schema defaults, so
/// nothing from the previous capability survives, and the status becomes
/// `configured`.
pub fn reassign_service_capability(
    steps: &[WorkflowStep],
    step_id: &StepId,
    service: ServiceRef,
    capability: CapabilityRef,
    schema: &[ParameterSchema],
) -> Result<Vec<WorkflowStep>, GraphError> {
    let index = position_of(steps, step_id)?;
    let mut updated = steps.to_vec();
    apply_capability(&mut updated[index], service, capability);
    updated[index].parameters = defaults_from_schema(schema);
    Ok(renumber_and_compact(updated))
}

pub(crate) fn apply_capability(
    step: &mut WorkflowStep,
    service: ServiceRef,
    capability: CapabilityRef,
) {
    step.service = Some(service);
    step.capability = Some(capability);
    step.parameters.clear();
    // Choosing a capability is accepted from every status.
    step.status = step
        .status
        .on(StatusEvent::CapabilityChosen)
        .unwrap_or(StepStatus::Configured);
}

/// Removes a step.
///
/// The trigger can only be removed when it is the last remaining step, which
/// returns the workflow to its empty bootstrap state.
pub fn remove_step(
    steps: &[WorkflowStep],
    step_id: &StepId,
) -> Result<Vec<WorkflowStep>, GraphError> {
    let index = position_of(steps, step_id)?;
    if steps[index].kind == StepKind::Trigger && steps.len() > 1 {
        return Err(GraphError::TriggerRequired {
            remaining: steps.len() - 1,
        });
    }
    let mut updated = steps.to_vec();
    updated.remove(index);
    Ok(renumber_and_compact(updated))
}

/// Moves an action to `to_index`. The trigger never moves and nothing moves
/// in front of it.
pub fn move_step(
    steps: &[WorkflowStep],
    step_id: &StepId,
    to_index: usize,
) -> Result<Vec<WorkflowStep>, GraphError> {
    let from = position_of(steps, step_id)?;
    if steps[from].kind == StepKind::Trigger || to_index == 0 {
        return Err(GraphError::TriggerPositionFixed);
    }
    if to_index >= steps.len() {
        return Err(GraphError::IndexOutOfRange {
            index: to_index,
            len: steps.len(),
        });
    }
    let mut updated = steps.to_vec();
    let step = updated.remove(from);
    updated.insert(to_index, step);
    Ok(renumber_and_compact(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(actions: usize) -> Vec<WorkflowStep> {
        let mut steps = vec![WorkflowStep::trigger()];
        steps.extend((0..actions).map(|_| WorkflowStep::action()));
        renumber_and_compact(steps)
    }

    #[test]
    fn renumber_restores_order_after_corruption() {
        let mut steps = chain(3);
        steps[0].order = 9;
        steps[2].order = 9;
        steps[3].order = 1;
        let steps = renumber_and_compact(steps);
        let orders: Vec<_> = steps.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn move_keeps_trigger_first() {
        let steps = chain(3);
        let last = steps[3].id.clone();
        let moved = move_step(&steps, &last, 1).unwrap();
        assert_eq!(moved[1].id, last);
        assert_eq!(moved[0].kind, StepKind::Trigger);

        assert_eq!(
            move_step(&steps, &last, 0),
            Err(GraphError::TriggerPositionFixed)
        );
        assert_eq!(
            move_step(&steps, &steps[0].id, 2),
            Err(GraphError::TriggerPositionFixed)
        );
        assert_eq!(
            move_step(&steps, &last, 4),
            Err(GraphError::IndexOutOfRange { index: 4, len: 4 })
        );
    }

    #[test]
    fn only_a_lone_trigger_can_be_removed() {
        let steps = chain(2);
        assert_eq!(
            remove_step(&steps, &steps[0].id),
            Err(GraphError::TriggerRequired { remaining: 2 })
        );

        let lone = chain(0);
        assert!(remove_step(&lone, &lone[0].id).unwrap().is_empty());
    }

    #[test]
    fn reassignment_drops_previous_parameters() {
        use crate::workflow::{ParameterKind, ParameterValue};

        let mut steps = chain(1);
        let target = steps[1].id.clone();
        steps[1].status = StepStatus::Tested;
        steps[1].parameters = defaults_from_schema(&[ParameterSchema {
            key: "to".to_string(),
            name: "To".to_string(),
            kind: ParameterKind::Text,
            required: true,
            default: None,
        }]);

        let schema = [ParameterSchema {
            key: "channel".to_string(),
            name: "Channel".to_string(),
            kind: ParameterKind::Text,
            required: false,
            default: Some(ParameterValue::Text("#general".to_string())),
        }];
        let updated = reassign_service_capability(
            &steps,
            &target,
            ServiceRef::new("chat"),
            CapabilityRef::new("post-message"),
            &schema,
        )
        .unwrap();

        let step = &updated[1];
        assert_eq!(step.status, StepStatus::Configured);
        assert!(step.parameter("to").is_none());
        assert_eq!(
            step.parameter("channel").and_then(|p| p.value.clone()),
            Some(ParameterValue::Text("#general".to_string()))
        );
        assert_eq!(steps[1].parameters.len(), 1);
    }
}
