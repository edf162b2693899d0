//! User-facing notifications.
//!
//! The [`NotificationCenter`] is an explicit service with its own id counter;
//! create one per application and drop it on logout.

use crate::editor::SchemaOutcome;
use crate::error::Error;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NotificationCenter {
    next_id: u64,
    capacity: usize,
    active: VecDeque<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_capacity(5)
    }
}

impl NotificationCenter {
    /// Keeps at most `capacity` notifications; the oldest is dropped first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            next_id: 1,
            capacity: capacity.max(1),
            active: VecDeque::new(),
        }
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.active.len() == self.capacity {
            self.active.pop_front();
        }
        self.active.push_back(Notification {
            id,
            severity,
            message: message.into(),
            created_at: Utc::now(),
        });
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Success, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Error, message)
    }

    /// Surfaces an error. Validation problems are warnings; everything else
    /// is shown as an error.
    pub fn report(&mut self, error: &Error) -> u64 {
        let severity = match error {
            Error::Validation(_) => Severity::Warning,
            _ => Severity::Error,
        };
        tracing::debug!(error = %error, "Reporting error to the user");
        self.push(severity, error.user_message())
    }

    /// Surfaces a failed schema fetch. Other outcomes are silent.
    pub fn report_schema(&mut self, outcome: &SchemaOutcome) -> Option<u64> {
        match outcome {
            SchemaOutcome::Failed { warning } => Some(self.warning(warning.clone())),
            SchemaOutcome::Applied { .. } | SchemaOutcome::Discarded => None,
        }
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
