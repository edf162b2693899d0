//! Prelude module for convenient imports
//!
//! Re-exports the types most callers need to load, edit and save a workflow.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowboard::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/workflow.json")?;
//! let workflow: Workflow = serde_json::from_str(&json).map_err(ApiError::from)?;
//! let graph = derive_visual_graph(&workflow.into_workflow()?.steps, &GraphLayout::default());
//! println!("{} nodes", graph.nodes.len());
//! # Ok(())
//! # }
//! ```

// Workflow model
pub use crate::workflow::{
    CapabilityRef, IntoWorkflow, Parameter, ParameterKind, ParameterSchema, ParameterValue,
    ServiceRef, StepId, StepKind, StepStatus, Workflow, WorkflowStep,
};

// Graph projection
pub use crate::graph::{
    GraphLayout, InsertAnchor, InsertSlot, RenderSurface, VisualGraph, VisualNode,
    VisualNodeKind, derive_visual_graph,
};

// Editing
pub use crate::editor::{
    CommandReceiver, CommandSender, EditorCommand, SchemaOutcome, WorkflowEditor, command_channel,
};

// Backend access
pub use crate::api::{ApiClient, CapabilityCatalog, StepExecutor, WorkflowRecord};
pub use crate::config::ClientConfig;
pub use crate::session::{RouteDecision, RouteGuard, SessionStore};

// Notifications
pub use crate::notify::{NotificationCenter, Severity};

// Error types
pub use crate::error::{ApiError, ConfigError, Error, GraphError, WorkflowError};

// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;
