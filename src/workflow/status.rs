use crate::error::StatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single step.
///
/// `Draft` is initial and there is no terminal state. Deploying a workflow
/// never changes the status of its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Draft,
    Configured,
    Tested,
    Error,
}

/// Events that move a step between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEvent {
    /// A service capability was selected (or re-selected).
    CapabilityChosen,
    /// A parameter value was edited.
    ParametersEdited,
    /// A single-step test run succeeded.
    TestSucceeded,
    /// A single-step test run failed.
    TestFailed,
}

impl StepStatus {
    /// Applies an event and returns the resulting status.
    pub fn on(self, event: StatusEvent) -> Result<StepStatus, StatusError> {
        use StatusEvent::*;
        use StepStatus::*;

        match (self, event) {
            (_, CapabilityChosen) => Ok(Configured),
            (Draft, ParametersEdited) => Ok(Draft),
            (Configured | Tested | Error, ParametersEdited) => Ok(Configured),
            (Configured | Tested | Error, TestSucceeded) => Ok(Tested),
            (Configured | Tested | Error, TestFailed) => Ok(Error),
            (Draft, TestSucceeded | TestFailed) => {
                Err(StatusError::InvalidTransition { from: self, event })
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Draft => "draft",
            StepStatus::Configured => "configured",
            StepStatus::Tested => "tested",
            StepStatus::Error => "error",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusEvent::CapabilityChosen => "capability chosen",
            StatusEvent::ParametersEdited => "parameters edited",
            StatusEvent::TestSucceeded => "test succeeded",
            StatusEvent::TestFailed => "test failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_requires_a_capability() {
        let err = StepStatus::Draft.on(StatusEvent::TestSucceeded).unwrap_err();
        assert!(err.to_string().contains("draft"));
    }

    #[test]
    fn edits_return_tested_and_failed_steps_to_configured() {
        assert_eq!(
            StepStatus::Tested.on(StatusEvent::ParametersEdited),
            Ok(StepStatus::Configured)
        );
        assert_eq!(
            StepStatus::Error.on(StatusEvent::CapabilityChosen),
            Ok(StepStatus::Configured)
        );
        assert_eq!(
            StepStatus::Draft.on(StatusEvent::ParametersEdited),
            Ok(StepStatus::Draft)
        );
    }
}
