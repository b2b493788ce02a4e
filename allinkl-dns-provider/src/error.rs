use serde::{Deserialize, Serialize};

/// Unified error type for all provider operations.
///
/// Each variant includes a `provider` field identifying which provider produced the error,
/// plus variant-specific context. All variants are serializable for structured error reporting.
///
/// # Transient Errors
///
/// The following variants represent transient failures that may succeed if the caller
/// tries again later (see [`is_transient`](Self::is_transient)):
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): the KAS flood protection kicked in
///
/// The provider itself never retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The provided credentials are invalid or the session was rejected.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// No DNS record matched the requested identity.
    RecordNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Registrar record id, or a description of the record that was looked up.
        record: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// More than one DNS record matched and no deterministic choice exists.
    AmbiguousMatch {
        /// Provider that produced the error.
        provider: String,
        /// Description of the record that was looked up.
        record: String,
        /// Number of candidate records.
        matches: usize,
    },

    /// A request parameter is invalid.
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The requested DNS record type is not supported by this provider.
    UnsupportedRecordType {
        /// Provider that produced the error.
        provider: String,
        /// The unsupported record type string.
        record_type: String,
    },

    /// The API refused the call because requests came in too fast.
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Suggested wait time in seconds, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The specified zone was not found.
    DomainNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Zone that was not found.
        domain: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The authenticated user lacks permission for the requested operation.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// Failed to parse the provider's API response.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// A record of a batch operation failed; the batch was abandoned at this record.
    ///
    /// Records processed earlier in the same batch may already have been applied
    /// at the registrar. The error does not say which.
    RecordFailed {
        /// Provider that produced the error.
        provider: String,
        /// Operation name (`append`, `set` or `delete`).
        operation: String,
        /// The failed record in presentation form.
        record: String,
        /// Why the record failed.
        source: Box<ProviderError>,
    },

    /// An unrecognized error from the provider API.
    ///
    /// This is a catch-all for fault codes not yet mapped to a specific variant.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// Wraps `source` as the failure of `record` inside a batch `operation`.
    pub fn record_failed(
        operation: &str,
        record: impl std::fmt::Display,
        source: ProviderError,
    ) -> Self {
        Self::RecordFailed {
            provider: source.provider().to_string(),
            operation: operation.to_string(),
            record: record.to_string(),
            source: Box::new(source),
        }
    }

    /// Identifier of the provider that produced the error.
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::RecordNotFound { provider, .. }
            | Self::AmbiguousMatch { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::UnsupportedRecordType { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::DomainNotFound { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::SerializationError { provider, .. }
            | Self::RecordFailed { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }

    /// Whether the error is an expected outcome (bad input, missing resource) rather than a fault.
    ///
    /// `true` is logged at `warn` level, `false` at `error` level.
    /// **Update this method when adding a variant.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::RecordFailed { source, .. } => source.is_expected(),
            _ => matches!(
                self,
                Self::InvalidCredentials { .. }
                    | Self::RecordNotFound { .. }
                    | Self::AmbiguousMatch { .. }
                    | Self::InvalidParameter { .. }
                    | Self::UnsupportedRecordType { .. }
                    | Self::DomainNotFound { .. }
                    | Self::PermissionDenied { .. }
            ),
        }
    }

    /// Whether the failure is transient (network, timeout, flood protection).
    ///
    /// Batch failures report the classification of the record that failed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RecordFailed { source, .. } => source.is_transient(),
            _ => matches!(
                self,
                Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
            ),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::RecordNotFound {
                provider, record, ..
            } => {
                write!(f, "[{provider}] Record '{record}' not found")
            }
            Self::AmbiguousMatch {
                provider,
                record,
                matches,
            } => {
                write!(
                    f,
                    "[{provider}] Record '{record}' is ambiguous: {matches} records match"
                )
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::UnsupportedRecordType {
                provider,
                record_type,
            } => {
                write!(f, "[{provider}] Unsupported record type: {record_type}")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::DomainNotFound {
                provider,
                domain,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Zone '{domain}' not found: {msg}")
                } else {
                    write!(f, "[{provider}] Zone '{domain}' not found")
                }
            }
            Self::PermissionDenied {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Permission denied: {msg}")
                } else {
                    write!(f, "[{provider}] Permission denied")
                }
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::SerializationError { provider, detail } => {
                write!(f, "[{provider}] Serialization error: {detail}")
            }
            Self::RecordFailed {
                provider,
                operation,
                record,
                source,
            } => {
                write!(
                    f,
                    "[{provider}] Failed to {operation} record '{record}': {source}"
                )
            }
            Self::Unknown {
                provider,
                raw_message,
                ..
            } => {
                write!(f, "[{provider}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RecordFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
