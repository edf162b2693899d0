use crate::workflow::{ParameterKind, StatusEvent, StepId, StepKind, StepStatus};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by structural edits of the step sequence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Step '{0}' not found in the workflow")]
    StepNotFound(StepId),

    #[error("Step '{after}' does not immediately follow '{before}'")]
    NotAdjacent { before: String, after: String },

    #[error("The trigger is fixed at position 0 and nothing can be placed before it")]
    TriggerPositionFixed,

    #[error("The trigger cannot be removed while {remaining} action(s) follow it")]
    TriggerRequired { remaining: usize },

    #[error("Position {position} requires a {expected} step, but a {found} step was given")]
    KindMismatch {
        position: usize,
        expected: StepKind,
        found: StepKind,
    },

    #[error("Capability for step '{step_id}' is a {found}, but the step is a {expected}")]
    CapabilityKindMismatch {
        step_id: StepId,
        expected: StepKind,
        found: StepKind,
    },

    #[error("Index {index} is out of range for a workflow of {len} steps")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised by the step status state machine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatusError {
    #[error("Step status '{from}' does not accept event '{event}'")]
    InvalidTransition { from: StepStatus, event: StatusEvent },
}

/// Errors raised while editing step parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Step '{step_id}' has no parameter named '{key}'")]
    UnknownKey { step_id: StepId, key: String },

    #[error("Parameter '{key}' expects a {expected} value, but received a {found} value")]
    TypeMismatch {
        key: String,
        expected: ParameterKind,
        found: ParameterKind,
    },
}

/// Violations of the workflow invariants checked before a save.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Workflow name must not be empty")]
    EmptyName,

    #[error("The first step must be a trigger, found a {found}")]
    MissingTrigger { found: StepKind },

    #[error("Only the first step may be a trigger, found another at position {position}")]
    MisplacedTrigger { position: usize },

    #[error("Step at position {position} carries order {order}")]
    OrderMismatch { position: usize, order: usize },

    #[error("Step '{0}' has no service capability selected")]
    Unconfigured(StepId),
}

/// Errors returned by the backend client.
///
/// HTTP statuses are classified the way the dashboard reports them: 400 as an
/// invalid identifier, 401/403 as unauthorized, 404 as not found and anything
/// else as a generic status failure.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unauthorized ({status})")]
    Unauthorized { status: u16 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode backend payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Step '{0}' has not been saved yet")]
    UnsavedStep(StepId),
}

impl ApiError {
    /// Classifies a non-success HTTP status into an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => ApiError::InvalidIdentifier(body),
            401 | 403 => ApiError::Unauthorized { status },
            404 => ApiError::NotFound(body),
            _ => ApiError::Status { status, body },
        }
    }

    /// The HTTP status behind this error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidIdentifier(_) => Some(400),
            ApiError::Unauthorized { status } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) | ApiError::UnsavedStep(_) => None,
        }
    }

    /// A short message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidIdentifier(_) => "Invalid identifier".to_string(),
            ApiError::Unauthorized { .. } => {
                "You are not authorized to perform this action".to_string()
            }
            ApiError::NotFound(_) => "The requested resource was not found".to_string(),
            ApiError::UnsavedStep(_) => "Save the workflow before running this step".to_string(),
            ApiError::Request(_) | ApiError::Status { .. } | ApiError::Decode(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

/// Errors from the subscription connect flow.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Connecting '{service}' timed out after {after:?}")]
    TimedOut { service: String, after: Duration },

    #[error("Connecting '{service}' was cancelled")]
    Cancelled { service: String },

    #[error("The authorization window for '{service}' closed without reporting back")]
    Abandoned { service: String },

    #[error("Service '{service}' still reports no connection")]
    NotConnected { service: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors raised while loading client configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

/// Local form validation failures. These block only the submission they
/// belong to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Form validation failed: {0}")]
    Form(#[from] validator::ValidationErrors),
}

/// Crate-level error aggregating every subsystem.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// A short message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(e) | Error::Connect(ConnectError::Api(e)) => e.user_message(),
            Error::Validation(_) => "Please fill in all required fields".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
