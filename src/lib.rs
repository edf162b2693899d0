//! # Flowboard - Workflow Automation Client Core
//!
//! **Flowboard** is the client-side core of a trigger/action automation
//! dashboard. A workflow is a linear pipeline: one trigger followed by any
//! number of actions, each bound to a capability of an external service.
//! The crate keeps that pipeline consistent while the user edits it, projects
//! it onto a positioned node/edge graph for a renderer, and talks to the
//! workflow backend over REST.
//!
//! ## Core Workflow
//!
//! 1.  **Load**: Fetch a [`api::WorkflowRecord`] (or build a [`workflow::Workflow`])
//!     and convert it with the [`workflow::IntoWorkflow`] trait.
//! 2.  **Edit**: Wrap it in an [`editor::WorkflowEditor`]. Every structural
//!     edit renumbers the steps and rebuilds the [`graph::VisualGraph`].
//! 3.  **Configure**: Pick a capability per step; its parameter schema is
//!     fetched and applied by step id, so late results never land on the
//!     wrong step.
//! 4.  **Save and test**: Persist through [`api::ApiClient`] and run single
//!     steps to move them to `tested` or `error`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowboard::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let config = ClientConfig::from_env()?;
//! let session = SessionStore::new();
//! let client = ApiClient::new(&config, session)?;
//!
//! let record = client.get_workflow(42).await?;
//! let mut editor = WorkflowEditor::new(record.into_workflow()?, config.layout);
//!
//! // Append an action after the last step and point it at a capability.
//! let Some(last) = editor.steps().last().map(|s| s.id.clone()) else {
//!     return Ok(());
//! };
//! let action = editor.request_insert(&InsertSlot::append_after(last))?;
//! editor
//!     .reassign_with(
//!         &client,
//!         &action,
//!         ServiceRef::new("mail"),
//!         CapabilityRef::new("send"),
//!     )
//!     .await?;
//!
//! let saved = client.save_workflow(editor.workflow()).await?;
//! let ids: Vec<u64> = saved.steps.iter().map(|s| s.id).collect();
//! editor.mark_saved(saved.id, &ids, chrono::Utc::now());
//! let json = serde_json::to_string_pretty(editor.graph()).map_err(ApiError::from)?;
//! println!("{}", json);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod connect;
pub mod editor;
pub mod error;
pub mod graph;
pub mod notify;
pub mod prelude;
pub mod session;
pub mod workflow;
