//! Subscription connect flow.
//!
//! Some services need the user to authorize the subscription in a separate
//! window. [`begin`] splits that into a [`ConnectHandle`] for whatever hosts
//! the window, which reports completion or cancellation, and a
//! [`PendingConnect`] the caller awaits with a bounded timeout.

use crate::error::ConnectError;
use crate::workflow::ServiceRef;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectSignal {
    Completed,
    Cancelled,
}

/// Reporting side, owned by the authorization window.
#[derive(Debug)]
pub struct ConnectHandle {
    service: ServiceRef,
    tx: oneshot::Sender<ConnectSignal>,
}

/// Waiting side of a connect flow.
#[derive(Debug)]
pub struct PendingConnect {
    service: ServiceRef,
    timeout: Duration,
    rx: oneshot::Receiver<ConnectSignal>,
}

pub fn begin(service: ServiceRef, timeout: Duration) -> (ConnectHandle, PendingConnect) {
    let (tx, rx) = oneshot::channel();
    tracing::debug!(service = %service, timeout = ?timeout, "Connect flow started");
    (
        ConnectHandle {
            service: service.clone(),
            tx,
        },
        PendingConnect {
            service,
            timeout,
            rx,
        },
    )
}

impl ConnectHandle {
    pub fn service(&self) -> &ServiceRef {
        &self.service
    }

    /// The user finished authorizing.
    pub fn complete(self) {
        self.signal(ConnectSignal::Completed);
    }

    /// The user closed or declined the authorization window.
    pub fn cancel(self) {
        self.signal(ConnectSignal::Cancelled);
    }

    fn signal(self, signal: ConnectSignal) {
        if self.tx.send(signal).is_err() {
            tracing::debug!(service = %self.service, "Nobody is waiting on this connect flow");
        }
    }
}

impl PendingConnect {
    pub fn service(&self) -> &ServiceRef {
        &self.service
    }

    /// Waits for the window to report back, at most for the configured
    /// timeout. Dropping the handle without a signal counts as abandoned.
    pub async fn wait(self) -> Result<ServiceRef, ConnectError> {
        let service = self.service;
        match tokio::time::timeout(self.timeout, self.rx).await {
            Ok(Ok(ConnectSignal::Completed)) => Ok(service),
            Ok(Ok(ConnectSignal::Cancelled)) => {
                tracing::info!(service = %service, "Connect flow cancelled");
                Err(ConnectError::Cancelled {
                    service: service.to_string(),
                })
            }
            Ok(Err(_)) => Err(ConnectError::Abandoned {
                service: service.to_string(),
            }),
            Err(_) => {
                tracing::warn!(service = %service, timeout = ?self.timeout, "Connect flow timed out");
                Err(ConnectError::TimedOut {
                    service: service.to_string(),
                    after: self.timeout,
                })
            }
        }
    }
}
