//! REST client for the workflow backend.
//!
//! Every request carries the session token in the configured auth header.
//! Non-success statuses are classified into [`ApiError`] variants; list
//! endpoints degrade to an empty list when the payload is not an array.

use crate::config::ClientConfig;
use crate::connect::PendingConnect;
use crate::error::{ApiError, ConnectError, Error, ValidationError};
use crate::session::SessionStore;
use crate::workflow::{CapabilityRef, ParameterSchema, ServiceRef, Workflow, WorkflowStep};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use validator::Validate;

mod types;

pub use types::*;

/// Source of capability parameter schemas.
#[async_trait]
pub trait CapabilityCatalog: Send + Sync {
    async fn parameter_schema(
        &self,
        service: &ServiceRef,
        capability: &CapabilityRef,
    ) -> Result<Vec<ParameterSchema>, ApiError>;
}

/// Runs a single step against the backend.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute_step(&self, step: &WorkflowStep) -> Result<(), ApiError>;
}

/// HTTP client for the workflow backend.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config, session))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig, session: SessionStore) -> Self {
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header: config.auth_header.clone(),
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // ---- authentication ----

    /// Signs in and stores the returned token in the session.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), Error> {
        credentials.validate().map_err(ValidationError::from)?;
        let token: AuthToken = self
            .send_json(Method::POST, "/auth/login", Some(credentials))
            .await?;
        self.session.sign_in(token.token);
        tracing::info!("Signed in");
        Ok(())
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<(), Error> {
        credentials.validate().map_err(ValidationError::from)?;
        let token: AuthToken = self
            .send_json(Method::POST, "/auth/register", Some(credentials))
            .await?;
        self.session.sign_in(token.token);
        tracing::info!("Registered and signed in");
        Ok(())
    }

    pub fn logout(&self) {
        self.session.sign_out();
        tracing::info!("Signed out");
    }

    // ---- services ----

    pub async fn list_services(&self) -> Result<Vec<ServiceSummary>, ApiError> {
        let value = self.get_value("/services").await?;
        Ok(decode_list(value, "services"))
    }

    pub async fn list_capabilities(
        &self,
        service: &ServiceRef,
    ) -> Result<Vec<CapabilityDescriptor>, ApiError> {
        let value = self.get_value(&format!("/services/{}/actions", service)).await?;
        Ok(decode_list(value, "capabilities"))
    }

    /// Starts a subscription. Services that need the user's consent return an
    /// authorization URL to open.
    pub async fn connect_service(&self, service: &ServiceRef) -> Result<ConnectStart, ApiError> {
        self.send_json::<(), _>(
            Method::POST,
            &format!("/subscriptions/{}", service),
            None,
        )
        .await
    }

    pub async fn disconnect_service(&self, service: &ServiceRef) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/subscriptions/{}", service))
            .await
    }

    pub async fn connection_status(&self, service: &ServiceRef) -> Result<bool, ApiError> {
        let status: ConnectionStatus = self
            .send_json::<(), _>(
                Method::GET,
                &format!("/subscriptions/{}/status", service),
                None,
            )
            .await?;
        Ok(status.connected)
    }

    /// Waits for the authorization window to report back, then confirms the
    /// subscription with the backend.
    pub async fn finish_connect(&self, pending: PendingConnect) -> Result<ServiceRef, ConnectError> {
        let service = pending.wait().await?;
        if self.connection_status(&service).await? {
            tracing::info!(service = %service, "Service connected");
            Ok(service)
        } else {
            Err(ConnectError::NotConnected {
                service: service.to_string(),
            })
        }
    }

    // ---- workflows ----

    pub async fn create_workflow(&self, form: &NewWorkflow) -> Result<WorkflowRecord, Error> {
        form.validate().map_err(ValidationError::from)?;
        let record: WorkflowRecord = self
            .send_json(Method::POST, "/workflows", Some(form))
            .await?;
        Ok(record)
    }

    /// Creates or updates a workflow. The workflow must pass
    /// [`Workflow::validate`] first.
    pub async fn save_workflow(&self, workflow: &Workflow) -> Result<WorkflowRecord, Error> {
        let payload = workflow.to_payload()?;
        let record: WorkflowRecord = match payload.id {
            Some(id) => {
                self.send_json(Method::PUT, &format!("/workflows/{}", id), Some(&payload))
                    .await?
            }
            None => {
                self.send_json(Method::POST, "/workflows", Some(&payload))
                    .await?
            }
        };
        tracing::info!(workflow_id = record.id, steps = record.steps.len(), "Saved workflow");
        Ok(record)
    }

    pub async fn delete_workflow(&self, id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &format!("/workflows/{}", id))
            .await
    }

    pub async fn get_workflow(&self, id: u64) -> Result<WorkflowRecord, ApiError> {
        self.send_json::<(), _>(Method::GET, &format!("/workflows/{}", id), None)
            .await
    }

    pub async fn list_workflows(&self) -> Result<Vec<WorkflowRecord>, ApiError> {
        let value = self.get_value("/workflows").await?;
        Ok(decode_list(value, "workflows"))
    }

    pub async fn test_workflow(&self, id: u64) -> Result<TestReport, ApiError> {
        self.send_json::<(), _>(Method::POST, &format!("/workflows/{}/test", id), None)
            .await
    }

    /// Executes one saved step. Any non-success status is an execution
    /// failure.
    pub async fn execute_step_by_id(&self, step_id: u64) -> Result<(), ApiError> {
        self.send_empty(Method::POST, &format!("/steps/{}/execute", step_id))
            .await
    }

    pub async fn workflow_logs(&self, workflow_id: u64) -> Result<WorkflowLogs, ApiError> {
        self.send_json::<(), _>(Method::GET, &format!("/logs/{}", workflow_id), None)
            .await
    }

    pub async fn statistics(&self) -> Result<Statistics, ApiError> {
        self.send_json::<(), _>(Method::GET, "/statistics", None)
            .await
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, url = %url, "Backend request");
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.header(self.auth_header.as_str(), token),
            None => builder,
        }
    }

    async fn send_json<B: serde::Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = Self::ensure_success(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_empty(&self, method: Method, path: &str) -> Result<(), ApiError> {
        let response = self.request(method, path).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn get_value(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.send_json::<(), _>(Method::GET, path, None).await
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        tracing::warn!(status = status.as_u16(), "Backend request failed");
        Err(ApiError::from_status(status.as_u16(), body))
    }
}

#[async_trait]
impl CapabilityCatalog for ApiClient {
    async fn parameter_schema(
        &self,
        service: &ServiceRef,
        capability: &CapabilityRef,
    ) -> Result<Vec<ParameterSchema>, ApiError> {
        self.list_capabilities(service)
            .await?
            .into_iter()
            .find(|c| c.identifier == capability.0)
            .map(|c| c.schema())
            .ok_or_else(|| ApiError::NotFound(format!("capability '{}' of '{}'", capability, service)))
    }
}

#[async_trait]
impl StepExecutor for ApiClient {
    async fn execute_step(&self, step: &WorkflowStep) -> Result<(), ApiError> {
        let id = step
            .id
            .saved_id()
            .ok_or_else(|| ApiError::UnsavedStep(step.id.clone()))?;
        self.execute_step_by_id(id).await
    }
}
