//! Projection of the step list onto a positioned node/edge graph.
//!
//! The projection is a pure function of the steps and the layout. It is
//! rebuilt wholesale after every mutation and never edited in place.

use crate::workflow::WorkflowStep;
use itertools::Itertools;

mod layout;
mod types;

pub use layout::*;
pub use types::*;

pub const TRIGGER_PLACEHOLDER_ID: &str = "placeholder-trigger";
pub const ACTION_PLACEHOLDER_ID: &str = "placeholder-action";

/// The rendering collaborator. It draws whatever graph it is handed and
/// reports user interaction back through the editor's command channel.
pub trait RenderSurface {
    fn render(&mut self, graph: &VisualGraph);
}

/// Derives the visual graph for a step sequence.
///
/// For `n > 0` steps this yields `n` step nodes, `n - 1` insert nodes between
/// neighbours and one trailing append node, so `2n` nodes in total, joined by
/// `2(n - 1) + 1` edges. An empty sequence yields the [`bootstrap_graph`].
pub fn derive_visual_graph(steps: &[WorkflowStep], layout: &GraphLayout) -> VisualGraph {
    if steps.is_empty() {
        return bootstrap_graph(layout);
    }

    let mut graph = VisualGraph::default();

    for (index, step) in steps.iter().enumerate() {
        graph.nodes.push(VisualNode {
            id: step_node_id(step),
            position: Position {
                x: layout.x,
                y: layout.row_y(index),
            },
            kind: VisualNodeKind::Step {
                step_id: step.id.clone(),
                step_kind: step.kind,
                status: step.status,
                label: step.label(),
            },
        });
    }

    for (index, (current, next)) in steps.iter().tuple_windows().enumerate() {
        let slot = InsertSlot::between(current.id.clone(), next.id.clone());
        let insert_id = slot.node_id();
        graph.nodes.push(insert_node(insert_id.clone(), slot, layout, index));
        graph
            .edges
            .push(VisualEdge::connect(&step_node_id(current), &insert_id));
        graph
            .edges
            .push(VisualEdge::connect(&insert_id, &step_node_id(next)));
    }

    // `steps` is non-empty here.
    let last_index = steps.len() - 1;
    let last = &steps[last_index];
    let slot = InsertSlot::append_after(last.id.clone());
    let append_id = slot.node_id();
    graph
        .nodes
        .push(insert_node(append_id.clone(), slot, layout, last_index));
    graph
        .edges
        .push(VisualEdge::connect(&step_node_id(last), &append_id));

    graph
}

/// The fixed seed state of an empty workflow: "Choose a Trigger" and
/// "Choose an Action" placeholders joined through one insert node.
pub fn bootstrap_graph(layout: &GraphLayout) -> VisualGraph {
    let slot = InsertSlot {
        before: InsertAnchor::Start,
        after: None,
    };
    let insert_id = slot.node_id();

    let nodes = vec![
        VisualNode {
            id: TRIGGER_PLACEHOLDER_ID.to_string(),
            position: Position {
                x: layout.x,
                y: layout.row_y(0),
            },
            kind: VisualNodeKind::Placeholder {
                role: PlaceholderRole::Trigger,
                label: "Choose a Trigger".to_string(),
            },
        },
        VisualNode {
            id: ACTION_PLACEHOLDER_ID.to_string(),
            position: Position {
                x: layout.x,
                y: layout.row_y(1),
            },
            kind: VisualNodeKind::Placeholder {
                role: PlaceholderRole::Action,
                label: "Choose an Action".to_string(),
            },
        },
        insert_node(insert_id.clone(), slot, layout, 0),
    ];
    let edges = vec![
        VisualEdge::connect(TRIGGER_PLACEHOLDER_ID, &insert_id),
        VisualEdge::connect(&insert_id, ACTION_PLACEHOLDER_ID),
    ];

    VisualGraph { nodes, edges }
}

/// Expected node count for `n` steps (excluding the bootstrap case).
pub fn expected_node_count(n: usize) -> usize {
    n + n.saturating_sub(1) + usize::from(n > 0)
}

fn step_node_id(step: &WorkflowStep) -> String {
    format!("step-{}", step.id)
}

fn insert_node(id: String, slot: InsertSlot, layout: &GraphLayout, index: usize) -> VisualNode {
    VisualNode {
        id,
        position: Position {
            x: layout.x,
            y: layout.gap_y(index),
        },
        kind: VisualNodeKind::Insert { slot },
    }
}
