//! Generic HTTP client tools
//!
//! Sends a prepared request, logs it and classifies transport-level failures.
//! Callers construct the `RequestBuilder` themselves (URL, headers, body) and
//! decode the returned text.
//!
//! # design principles
//! - **No retries** - a failed request is reported once, classified so the caller can decide
//! - **Unified HTTP processing flow** - sending requests, logging, and reading responses
//! - **Secrets stay out of logs** - bodies that may carry session tokens are not logged

use reqwest::RequestBuilder;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP tool function set
pub struct HttpUtils;

/// Whether the response body may be written to the debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLogging {
    /// Log a truncated copy of the body.
    Truncated,
    /// Log only the body length.
    Redacted,
}

impl HttpUtils {
    /// Performs an HTTP request and returns response text
    ///
    /// Unified processing: sending requests, logging, error handling
    ///
    /// # Arguments
    /// * `request_builder` - configured request constructor (including URL, headers, body, etc.)
    /// * `provider_name` - Provider name (for logging)
    /// * `method_name` - request method name (such as "GET", "POST", used for logs)
    /// * `url_or_action` - URL or Action name (for logging)
    /// * `body_logging` - how much of the response body to log
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - any status other than 429 and 502-504
    /// * `Err(ProviderError::Timeout)` - the request timed out
    /// * `Err(ProviderError::RateLimited)` - HTTP 429
    /// * `Err(ProviderError::NetworkError)` - connection failure or HTTP 502-504
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
        body_logging: BodyLogging,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url_or_action}");

        // Send request
        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{provider_name}] Response Status: {status_code}");

        // Extract Retry-After header (before consuming response body)
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        // Returns RateLimited error for HTTP 429
        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                provider: provider_name.to_string(),
                retry_after,
                raw_message: Some(truncate_for_log(&body)),
            });
        }

        // Return NetworkError for 502/503/504
        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Server error (HTTP {status_code})");
            return Err(ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        // Read response body
        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        match body_logging {
            BodyLogging::Truncated => log::debug!(
                "[{provider_name}] Response Body: {}",
                truncate_for_log(&response_text)
            ),
            BodyLogging::Redacted => log::debug!(
                "[{provider_name}] Response Body: <redacted, {} bytes>",
                response_text.len()
            ),
        }

        Ok((status_code, response_text))
    }
}
