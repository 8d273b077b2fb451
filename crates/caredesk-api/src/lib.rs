#![cfg_attr(test, allow(clippy::expect_used, clippy::panic))]

//! Typed client for the patient-supervisor support backend.
//!
//! Every request carries the session's bearer token; transport failures are
//! retried a bounded number of times and non-success statuses map to typed
//! errors. The availability policy (which reads degrade to the datasets in
//! [`fallback`]) is decided by the caller, not here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub mod fallback;
pub mod types;

pub use types::{
    CommonIssues, CreateTicketRequest, CreatedTicket, HistoryEvent, IssueCategory,
    KnowledgeArticle, KnowledgeBase, OverviewStats, PasswordResetReceipt, Patient, PatientHistory,
    PatientQuery, PatientStatus, SupervisorSettings, SupportMetrics, SupportReports, Ticket,
    TicketPriority, TicketStatus, TrendDirection, TrendingIssue, UpdatePatientRequest,
};

pub const DEFAULT_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_REQUEST_ATTEMPTS: usize = 2;
/// All support operations live under this base path.
pub const API_BASE_PATH: &str = "/api/patient-supervisor";

#[derive(Debug, Clone)]
pub struct SupportApiConfig {
    pub base_url: String,
    pub access_token: String,
    pub timeout_ms: u64,
    pub request_attempts: usize,
}

impl SupportApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            request_attempts: DEFAULT_REQUEST_ATTEMPTS,
        }
    }
}

#[derive(Debug, Error)]
pub enum SupportApiError {
    #[error("support_api_base_url_missing")]
    BaseUrlMissing,
    #[error("support_api_invalid_path")]
    InvalidPath,
    #[error("support_api_request_failed:{message}")]
    Request { message: String },
    #[error("support_api_read_failed:{message}")]
    Read { message: String },
    #[error("support_api_http_{status}:{body}")]
    Http { status: StatusCode, body: String },
    #[error("support_api_json_decode_failed:{message}")]
    Decode { message: String },
}

impl SupportApiError {
    /// True when the backend answered but the record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status, .. } if status.as_u16() == 404)
    }
}

/// The remote operations the dashboard drives, one method per endpoint.
/// Implemented by [`SupportApiClient`] for the real backend and by in-memory
/// fakes in tests.
#[async_trait]
pub trait SupportBackend: Send + Sync {
    async fn search_patient(&self, query: &PatientQuery) -> Result<Patient, SupportApiError>;
    async fn create_ticket(
        &self,
        request: &CreateTicketRequest,
    ) -> Result<CreatedTicket, SupportApiError>;
    async fn patient_history(&self, patient_id: &str) -> Result<PatientHistory, SupportApiError>;
    async fn patient_info(&self, patient_id: &str) -> Result<Patient, SupportApiError>;
    async fn update_patient(
        &self,
        patient_id: &str,
        request: &UpdatePatientRequest,
    ) -> Result<(), SupportApiError>;
    async fn reset_password(
        &self,
        patient_id: &str,
    ) -> Result<PasswordResetReceipt, SupportApiError>;
    async fn overview(&self) -> Result<OverviewStats, SupportApiError>;
    async fn active_tickets(&self) -> Result<Vec<Ticket>, SupportApiError>;
    async fn resolved_tickets(&self) -> Result<Vec<Ticket>, SupportApiError>;
    async fn resolve_ticket(&self, ticket_id: &str) -> Result<(), SupportApiError>;
    async fn escalate_ticket(&self, ticket_id: &str) -> Result<(), SupportApiError>;
    async fn common_issues(&self) -> Result<CommonIssues, SupportApiError>;
    async fn knowledge_base(&self) -> Result<KnowledgeBase, SupportApiError>;
    async fn reports(&self) -> Result<SupportReports, SupportApiError>;
    async fn save_settings(&self, settings: &SupervisorSettings) -> Result<(), SupportApiError>;
}

#[derive(Debug, Clone)]
pub struct SupportApiClient {
    base_url: String,
    access_token: String,
    timeout: Duration,
    request_attempts: usize,
    http: reqwest::Client,
}

impl SupportApiClient {
    pub fn new(config: SupportApiConfig) -> Result<Self, SupportApiError> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self {
            base_url,
            access_token: config.access_token,
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            request_attempts: config.request_attempts.max(1),
            http: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> Option<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(format!("{}{}{}", self.base_url, API_BASE_PATH, trimmed))
        } else {
            Some(format!("{}{}/{}", self.base_url, API_BASE_PATH, trimmed))
        }
    }

    #[must_use]
    pub fn search_patient_path() -> &'static str {
        "/search-patient"
    }

    #[must_use]
    pub fn create_ticket_path() -> &'static str {
        "/create-ticket"
    }

    #[must_use]
    pub fn patient_history_path(patient_id: &str) -> String {
        format!("/patient-history/{}", patient_id.trim())
    }

    #[must_use]
    pub fn patient_info_path(patient_id: &str) -> String {
        format!("/patient-info/{}", patient_id.trim())
    }

    #[must_use]
    pub fn update_patient_path(patient_id: &str) -> String {
        format!("/update-patient/{}", patient_id.trim())
    }

    #[must_use]
    pub fn reset_password_path(patient_id: &str) -> String {
        format!("/reset-password/{}", patient_id.trim())
    }

    #[must_use]
    pub fn overview_path() -> &'static str {
        "/overview"
    }

    #[must_use]
    pub fn active_tickets_path() -> &'static str {
        "/active-tickets"
    }

    #[must_use]
    pub fn resolved_tickets_path() -> &'static str {
        "/resolved-tickets"
    }

    #[must_use]
    pub fn resolve_ticket_path(ticket_id: &str) -> String {
        format!("/resolve-ticket/{}", ticket_id.trim())
    }

    #[must_use]
    pub fn escalate_ticket_path(ticket_id: &str) -> String {
        format!("/escalate-ticket/{}", ticket_id.trim())
    }

    #[must_use]
    pub fn common_issues_path() -> &'static str {
        "/common-issues"
    }

    #[must_use]
    pub fn knowledge_base_path() -> &'static str {
        "/knowledge-base"
    }

    #[must_use]
    pub fn reports_path() -> &'static str {
        "/reports"
    }

    #[must_use]
    pub fn save_settings_path() -> &'static str {
        "/save-settings"
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, SupportApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let response = self.send_get(path, &[]).await?;
        decode_json_response(response).await
    }

    pub async fn get_json_with_query<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SupportApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let response = self.send_get(path, query).await?;
        decode_json_response(response).await
    }

    pub async fn post_json<Req, Res>(&self, path: &str, payload: &Req) -> Result<Res, SupportApiError>
    where
        Req: Serialize + Sync + ?Sized,
        Res: for<'de> serde::Deserialize<'de>,
    {
        let response = self.send_post(path, Some(payload)).await?;
        decode_json_response(response).await
    }

    pub async fn post_empty_json<Res>(&self, path: &str) -> Result<Res, SupportApiError>
    where
        Res: for<'de> serde::Deserialize<'de>,
    {
        let response = self.send_post::<serde_json::Value>(path, None).await?;
        decode_json_response(response).await
    }

    pub async fn post_ack<Req>(&self, path: &str, payload: Option<&Req>) -> Result<(), SupportApiError>
    where
        Req: Serialize + Sync + ?Sized,
    {
        let response = self.send_post(path, payload).await?;
        ack_response(response).await
    }

    pub async fn put_ack<Req>(&self, path: &str, payload: &Req) -> Result<(), SupportApiError>
    where
        Req: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(path).ok_or(SupportApiError::InvalidPath)?;
        let mut last_error: Option<String> = None;

        for attempt in 0..self.request_attempts {
            let request = self
                .http
                .put(url.as_str())
                .bearer_auth(&self.access_token)
                .header("x-request-id", request_id())
                .timeout(self.timeout)
                .json(payload);

            match request.send().await {
                Ok(response) => return ack_response(response).await,
                Err(error) => {
                    tracing::debug!(attempt, %error, "support api request attempt failed");
                    last_error = Some(error.to_string());
                    if attempt + 1 >= self.request_attempts {
                        break;
                    }
                }
            }
        }

        Err(SupportApiError::Request {
            message: last_error.unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn send_get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, SupportApiError> {
        let url = self.endpoint(path).ok_or(SupportApiError::InvalidPath)?;
        let mut last_error: Option<String> = None;

        for attempt in 0..self.request_attempts {
            let mut request = self
                .http
                .get(url.as_str())
                .bearer_auth(&self.access_token)
                .header("x-request-id", request_id())
                .timeout(self.timeout);
            if !query.is_empty() {
                request = request.query(query);
            }

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    tracing::debug!(attempt, %error, "support api request attempt failed");
                    last_error = Some(error.to_string());
                    if attempt + 1 >= self.request_attempts {
                        break;
                    }
                }
            }
        }

        Err(SupportApiError::Request {
            message: last_error.unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn send_post<Req>(
        &self,
        path: &str,
        payload: Option<&Req>,
    ) -> Result<reqwest::Response, SupportApiError>
    where
        Req: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(path).ok_or(SupportApiError::InvalidPath)?;
        let mut last_error: Option<String> = None;

        for attempt in 0..self.request_attempts {
            let mut request = self
                .http
                .post(url.as_str())
                .bearer_auth(&self.access_token)
                .header("x-request-id", request_id())
                .timeout(self.timeout);
            if let Some(payload) = payload {
                request = request.json(payload);
            }

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    tracing::debug!(attempt, %error, "support api request attempt failed");
                    last_error = Some(error.to_string());
                    if attempt + 1 >= self.request_attempts {
                        break;
                    }
                }
            }
        }

        Err(SupportApiError::Request {
            message: last_error.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

#[async_trait]
impl SupportBackend for SupportApiClient {
    async fn search_patient(&self, query: &PatientQuery) -> Result<Patient, SupportApiError> {
        self.get_json_with_query(
            Self::search_patient_path(),
            &[(query.field(), query.value())],
        )
        .await
    }

    async fn create_ticket(
        &self,
        request: &CreateTicketRequest,
    ) -> Result<CreatedTicket, SupportApiError> {
        self.post_json(Self::create_ticket_path(), request).await
    }

    async fn patient_history(&self, patient_id: &str) -> Result<PatientHistory, SupportApiError> {
        self.get_json(Self::patient_history_path(patient_id).as_str())
            .await
    }

    async fn patient_info(&self, patient_id: &str) -> Result<Patient, SupportApiError> {
        self.get_json(Self::patient_info_path(patient_id).as_str())
            .await
    }

    async fn update_patient(
        &self,
        patient_id: &str,
        request: &UpdatePatientRequest,
    ) -> Result<(), SupportApiError> {
        self.put_ack(Self::update_patient_path(patient_id).as_str(), request)
            .await
    }

    async fn reset_password(
        &self,
        patient_id: &str,
    ) -> Result<PasswordResetReceipt, SupportApiError> {
        self.post_empty_json(Self::reset_password_path(patient_id).as_str())
            .await
    }

    async fn overview(&self) -> Result<OverviewStats, SupportApiError> {
        self.get_json(Self::overview_path()).await
    }

    async fn active_tickets(&self) -> Result<Vec<Ticket>, SupportApiError> {
        self.get_json(Self::active_tickets_path()).await
    }

    async fn resolved_tickets(&self) -> Result<Vec<Ticket>, SupportApiError> {
        self.get_json(Self::resolved_tickets_path()).await
    }

    async fn resolve_ticket(&self, ticket_id: &str) -> Result<(), SupportApiError> {
        self.post_ack::<serde_json::Value>(Self::resolve_ticket_path(ticket_id).as_str(), None)
            .await
    }

    async fn escalate_ticket(&self, ticket_id: &str) -> Result<(), SupportApiError> {
        self.post_ack::<serde_json::Value>(Self::escalate_ticket_path(ticket_id).as_str(), None)
            .await
    }

    async fn common_issues(&self) -> Result<CommonIssues, SupportApiError> {
        self.get_json(Self::common_issues_path()).await
    }

    async fn knowledge_base(&self) -> Result<KnowledgeBase, SupportApiError> {
        self.get_json(Self::knowledge_base_path()).await
    }

    async fn reports(&self) -> Result<SupportReports, SupportApiError> {
        self.get_json(Self::reports_path()).await
    }

    async fn save_settings(&self, settings: &SupervisorSettings) -> Result<(), SupportApiError> {
        self.post_ack(Self::save_settings_path(), Some(settings))
            .await
    }
}

pub fn format_http_error(status: StatusCode, body: &[u8]) -> SupportApiError {
    let body = non_empty_string(String::from_utf8_lossy(body).to_string())
        .unwrap_or_else(|| "<empty>".to_string());
    SupportApiError::Http { status, body }
}

fn request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

fn normalize_base_url(base_url: &str) -> Result<String, SupportApiError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(SupportApiError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

async fn decode_json_response<T>(response: reqwest::Response) -> Result<T, SupportApiError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|error| SupportApiError::Read {
            message: error.to_string(),
        })?;

    if !status.is_success() {
        tracing::warn!(%status, "support api returned an error status");
        return Err(format_http_error(status, &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|error| {
        tracing::warn!(%error, "support api response decode failed");
        SupportApiError::Decode {
            message: error.to_string(),
        }
    })
}

/// Writes are acknowledged by status alone; the body, if any, is ignored.
async fn ack_response(response: reqwest::Response) -> Result<(), SupportApiError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|error| SupportApiError::Read {
            message: error.to_string(),
        })?;

    if !status.is_success() {
        tracing::warn!(%status, "support api returned an error status");
        return Err(format_http_error(status, &bytes));
    }
    Ok(())
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupportApiClient {
        SupportApiClient::new(SupportApiConfig::new(
            "https://support.caredesk.example/",
            "token-abc",
        ))
        .expect("support client")
    }

    #[test]
    fn endpoint_builder_prefixes_the_supervisor_base_path() {
        let client = client();
        assert_eq!(
            client.endpoint("/overview"),
            Some("https://support.caredesk.example/api/patient-supervisor/overview".to_string())
        );
        assert_eq!(
            client.endpoint("overview"),
            Some("https://support.caredesk.example/api/patient-supervisor/overview".to_string())
        );
        assert_eq!(client.endpoint(""), None);
    }

    #[test]
    fn path_helpers_are_deterministic() {
        assert_eq!(SupportApiClient::overview_path(), "/overview");
        assert_eq!(SupportApiClient::active_tickets_path(), "/active-tickets");
        assert_eq!(
            SupportApiClient::resolved_tickets_path(),
            "/resolved-tickets"
        );
        assert_eq!(SupportApiClient::common_issues_path(), "/common-issues");
        assert_eq!(SupportApiClient::knowledge_base_path(), "/knowledge-base");
        assert_eq!(SupportApiClient::reports_path(), "/reports");
        assert_eq!(SupportApiClient::save_settings_path(), "/save-settings");
        assert_eq!(
            SupportApiClient::patient_history_path(" p-9 "),
            "/patient-history/p-9"
        );
        assert_eq!(
            SupportApiClient::update_patient_path("p-9"),
            "/update-patient/p-9"
        );
        assert_eq!(
            SupportApiClient::reset_password_path("p-9"),
            "/reset-password/p-9"
        );
        assert_eq!(
            SupportApiClient::resolve_ticket_path("t-4"),
            "/resolve-ticket/t-4"
        );
        assert_eq!(
            SupportApiClient::escalate_ticket_path("t-4"),
            "/escalate-ticket/t-4"
        );
    }

    #[test]
    fn http_error_mapping_preserves_shape() {
        let error = format_http_error(StatusCode::BAD_GATEWAY, b" gateway failed ");
        assert_eq!(
            error.to_string(),
            "support_api_http_502 Bad Gateway:gateway failed"
        );

        let empty_body = format_http_error(StatusCode::SERVICE_UNAVAILABLE, b" ");
        assert_eq!(
            empty_body.to_string(),
            "support_api_http_503 Service Unavailable:<empty>"
        );
    }

    #[test]
    fn not_found_detection_only_matches_404() {
        assert!(format_http_error(StatusCode::NOT_FOUND, b"").is_not_found());
        assert!(!format_http_error(StatusCode::INTERNAL_SERVER_ERROR, b"").is_not_found());
        assert!(
            !SupportApiError::Request {
                message: "timeout".to_string()
            }
            .is_not_found()
        );
    }

    #[test]
    fn base_url_missing_is_rejected() {
        let result = SupportApiClient::new(SupportApiConfig::new("   ", "token"));
        assert!(matches!(result, Err(SupportApiError::BaseUrlMissing)));
    }
}
