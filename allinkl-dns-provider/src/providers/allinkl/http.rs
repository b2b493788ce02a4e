//! KAS SOAP transport: session handling, flood pacing and HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{ProviderError, Result};
use crate::http_client::{BodyLogging, HttpUtils};
use crate::providers::common::create_http_client;
use crate::traits::{KasTransport, TransportError};
use crate::types::KasCredentials;
use crate::utils::log_sanitizer::{mask_secret, truncate_for_log};

use super::soap::{self, SoapResponse};
use super::types::{KasApiParams, KasAuthParams};
use super::{DEFAULT_SESSION_LIFETIME, KAS_API_BASE, KAS_API_PATH, KAS_AUTH_PATH, PROVIDER_ID};

/// A session is renewed when less than this is left of its lifetime.
const SESSION_REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Talks to the KAS SOAP endpoints.
///
/// Calls are serialized: KAS requires a pause (`KasFloodDelay`) between requests of
/// the same account, and the session token is shared by all calls.
pub struct SoapTransport {
    client: Client,
    credentials: KasCredentials,
    auth_url: String,
    api_url: String,
    session_lifetime: Duration,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    session: Option<Session>,
    /// Earliest moment the next API call may be sent.
    next_call_at: Option<Instant>,
}

struct Session {
    token: String,
    last_used: Instant,
}

impl SoapTransport {
    pub fn new(credentials: KasCredentials) -> Self {
        Self::with_options(credentials, KAS_API_BASE, DEFAULT_SESSION_LIFETIME)
    }

    pub(crate) fn with_options(
        credentials: KasCredentials,
        base_url: &str,
        session_lifetime: Duration,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            client: create_http_client(),
            credentials,
            auth_url: format!("{base_url}{KAS_AUTH_PATH}"),
            api_url: format!("{base_url}{KAS_API_PATH}"),
            session_lifetime,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sends one SOAP request. Faults come back as `Ok(SoapResponse::Fault)`.
    async fn post(
        &self,
        url: &str,
        operation: &str,
        params: &impl Serialize,
        body_logging: BodyLogging,
    ) -> Result<SoapResponse> {
        let params = serde_json::to_string(params).map_err(|e| {
            ProviderError::SerializationError {
                provider: PROVIDER_ID.to_string(),
                detail: e.to_string(),
            }
        })?;

        let request = self
            .client
            .post(url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"urn:xmethods{operation}#{operation}\""))
            .body(soap::encode_request(operation, &params));

        let (status, text) =
            HttpUtils::execute_request(request, PROVIDER_ID, "POST", url, body_logging).await?;

        match soap::decode_response(&text) {
            Ok(response) => Ok(response),
            Err(detail) if status >= 400 => {
                log::error!("[{PROVIDER_ID}] HTTP {status} without SOAP fault: {detail}");
                Err(ProviderError::NetworkError {
                    provider: PROVIDER_ID.to_string(),
                    detail: format!("HTTP {status}: {}", truncate_for_log(&text)),
                })
            }
            Err(detail) => {
                log::error!("[{PROVIDER_ID}] SOAP decode failed: {detail}");
                Err(ProviderError::ParseError {
                    provider: PROVIDER_ID.to_string(),
                    detail,
                })
            }
        }
    }

    /// Logs in with the account password and returns a session token.
    async fn login(&self) -> std::result::Result<String, TransportError> {
        log::debug!(
            "[{PROVIDER_ID}] Logging in as {}",
            mask_secret(&self.credentials.username)
        );
        let params = KasAuthParams {
            kas_login: &self.credentials.username,
            kas_auth_data: &self.credentials.password,
            kas_auth_type: "plain",
            session_lifetime: self.session_lifetime.as_secs(),
            session_update_lifetime: "Y",
        };

        match self
            .post(&self.auth_url, "KasAuth", &params, BodyLogging::Redacted)
            .await?
        {
            SoapResponse::Fault(raw) => {
                log::warn!("[{PROVIDER_ID}] Login rejected: {}", raw.message);
                Err(raw.into())
            }
            SoapResponse::Return(Value::String(token)) if !token.trim().is_empty() => {
                Ok(token.trim().to_string())
            }
            SoapResponse::Return(other) => Err(ProviderError::ParseError {
                provider: PROVIDER_ID.to_string(),
                detail: format!("unexpected KasAuth return: {}", value_kind(&other)),
            }
            .into()),
        }
    }

    /// Returns the cached session token, logging in again when it is missing or
    /// about to expire.
    async fn session_token(
        &self,
        state: &mut SessionState,
    ) -> std::result::Result<String, TransportError> {
        let lifetime = self.session_lifetime.saturating_sub(SESSION_REFRESH_MARGIN);
        if let Some(session) = &state.session {
            if session.last_used.elapsed() < lifetime {
                return Ok(session.token.clone());
            }
            log::debug!("[{PROVIDER_ID}] Session about to expire, logging in again");
        }

        state.session = None;
        let token = self.login().await?;
        state.session = Some(Session {
            token: token.clone(),
            last_used: Instant::now(),
        });
        Ok(token)
    }
}

#[async_trait]
impl KasTransport for SoapTransport {
    async fn call(
        &self,
        action: &str,
        params: Value,
    ) -> std::result::Result<Value, TransportError> {
        let mut state = self.state.lock().await;

        if let Some(at) = state.next_call_at.take() {
            if at > Instant::now() {
                log::debug!(
                    "[{PROVIDER_ID}] Waiting {:?} for KAS flood delay",
                    at.saturating_duration_since(Instant::now())
                );
                tokio::time::sleep_until(at).await;
            }
        }

        let token = self.session_token(&mut state).await?;
        let request = KasApiParams {
            kas_login: &self.credentials.username,
            kas_auth_type: "session",
            kas_auth_data: &token,
            kas_action: action,
            request_params: &params,
        };

        let response = self
            .post(&self.api_url, "KasApi", &request, BodyLogging::Truncated)
            .await?;
        let now = Instant::now();

        match response {
            SoapResponse::Fault(raw) => {
                let code = raw.code.as_deref().unwrap_or_default();
                if code.starts_with("session") || code.starts_with("kas_auth") {
                    state.session = None;
                }
                if code == "flood_protection" {
                    state.next_call_at = now.checked_add(Duration::from_secs(1));
                }
                log::debug!("[{PROVIDER_ID}] {action} fault: {}", raw.message);
                Err(raw.into())
            }
            SoapResponse::Return(value) => {
                if let Some(session) = state.session.as_mut() {
                    session.last_used = now;
                }
                let ret = soap::split_api_return(value).map_err(|detail| {
                    ProviderError::ParseError {
                        provider: PROVIDER_ID.to_string(),
                        detail,
                    }
                })?;
                state.next_call_at = ret.flood_delay.and_then(|delay| now.checked_add(delay));
                Ok(ret.return_info)
            }
        }
    }

    async fn authenticate(&self) -> std::result::Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.session = None;
        self.session_token(&mut state).await.map(|_| ())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "empty string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
