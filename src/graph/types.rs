use crate::workflow::{StepId, StepKind, StepStatus};
use serde::Serialize;
use std::fmt;

/// A 2-D node position in renderer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Where a new step would be inserted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "stepId")]
pub enum InsertAnchor {
    /// The synthetic start of the workflow. Only valid while it is empty.
    Start,
    After(StepId),
}

impl fmt::Display for InsertAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertAnchor::Start => f.write_str("start"),
            InsertAnchor::After(id) => write!(f, "{}", id),
        }
    }
}

/// The gap an insert-affordance node stands for. `after == None` is the
/// "no next step" sentinel of the trailing append slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertSlot {
    pub before: InsertAnchor,
    pub after: Option<StepId>,
}

impl InsertSlot {
    pub fn append_after(id: StepId) -> Self {
        Self {
            before: InsertAnchor::After(id),
            after: None,
        }
    }

    pub fn between(before: StepId, after: StepId) -> Self {
        Self {
            before: InsertAnchor::After(before),
            after: Some(after),
        }
    }

    pub(crate) fn node_id(&self) -> String {
        match &self.after {
            Some(after) => format!("insert-{}-{}", self.before, after),
            None => format!("insert-{}-end", self.before),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderRole {
    Trigger,
    Action,
}

/// What a visual node stands for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "data")]
pub enum VisualNodeKind {
    #[serde(rename_all = "camelCase")]
    Step {
        step_id: StepId,
        step_kind: StepKind,
        status: StepStatus,
        label: String,
    },
    Insert { slot: InsertSlot },
    Placeholder { role: PlaceholderRole, label: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub id: String,
    pub position: Position,
    #[serde(flatten)]
    pub kind: VisualNodeKind,
}

impl VisualNode {
    pub fn is_insert(&self) -> bool {
        matches!(self.kind, VisualNodeKind::Insert { .. })
    }

    pub fn step_id(&self) -> Option<&StepId> {
        match &self.kind {
            VisualNodeKind::Step { step_id, .. } => Some(step_id),
            _ => None,
        }
    }

    pub fn slot(&self) -> Option<&InsertSlot> {
        match &self.kind {
            VisualNodeKind::Insert { slot } => Some(slot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl VisualEdge {
    pub(crate) fn connect(source: &str, target: &str) -> Self {
        Self {
            id: format!("edge-{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// The positioned projection handed to the renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VisualGraph {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

impl VisualGraph {
    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn step_node(&self, step_id: &StepId) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.step_id() == Some(step_id))
    }

    pub fn insert_nodes(&self) -> impl Iterator<Item = &VisualNode> {
        self.nodes.iter().filter(|n| n.is_insert())
    }

    /// True for the empty-workflow seed state.
    pub fn is_bootstrap(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| matches!(n.kind, VisualNodeKind::Placeholder { .. }))
    }
}
