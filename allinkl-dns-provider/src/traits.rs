use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{ProviderMetadata, Record};

/// A fault reported by the registrar API (SOAP `faultstring`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawApiError {
    /// Machine-readable fault code, e.g. `record_id_not_found`.
    pub code: Option<String>,
    /// Original fault message.
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Why a [`KasTransport`] call did not produce a result.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// The registrar answered with a fault. Classified by the provider.
    Fault(RawApiError),
    /// The call failed before the registrar could answer (network, timeout, decoding).
    Failed(ProviderError),
}

impl From<ProviderError> for TransportError {
    fn from(e: ProviderError) -> Self {
        Self::Failed(e)
    }
}

impl From<RawApiError> for TransportError {
    fn from(e: RawApiError) -> Self {
        Self::Fault(e)
    }
}

/// Remote-call seam between the record mapping logic and the KAS API.
///
/// `params` is the `KasRequestParams` document of the action; the returned value is the
/// action's `ReturnInfo`, with every scalar decoded as a JSON string.
#[async_trait]
pub trait KasTransport: Send + Sync {
    /// Invokes a KAS API action.
    async fn call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, TransportError>;

    /// Discards any cached session and logs in again.
    async fn authenticate(&self) -> std::result::Result<(), TransportError> {
        Ok(())
    }
}

/// Extra information for error mapping (internal).
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Record description, used by `RecordNotFound`.
    pub record: Option<String>,
    /// Zone, used by `DomainNotFound`.
    pub zone: Option<String>,
}

/// Maps raw registrar faults onto [`ProviderError`] (internal).
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier.
    fn provider_name(&self) -> &'static str;

    /// Maps a raw fault to a [`ProviderError`].
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut for a parse error.
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut for the unknown-fault fallback.
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Lists the records of a zone.
#[async_trait]
pub trait RecordGetter: Send + Sync {
    /// Returns every record in `zone`.
    ///
    /// On failure no records are returned.
    async fn get_records(&self, zone: &str) -> Result<Vec<Record>>;
}

/// Inserts records into a zone.
#[async_trait]
pub trait RecordAppender: Send + Sync {
    /// Creates one record, never touching existing ones.
    async fn append_record(&self, zone: &str, record: &Record) -> Result<Record>;

    /// Creates every record in order and returns the created records.
    ///
    /// Stops at the first failure and returns [`ProviderError::RecordFailed`] naming that
    /// record. Records created before the failure stay at the registrar.
    async fn append_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            let result = self
                .append_record(zone, record)
                .await
                .map_err(|e| ProviderError::record_failed("append", record, e))?;
            created.push(result);
        }
        Ok(created)
    }
}

/// Upserts records in a zone.
#[async_trait]
pub trait RecordSetter: Send + Sync {
    /// Updates the record with the same type and name, or creates it when absent.
    async fn set_record(&self, zone: &str, record: &Record) -> Result<Record>;

    /// Upserts every record in order and returns the resulting records.
    ///
    /// Stops at the first failure, like [`RecordAppender::append_records`].
    async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        let mut updated = Vec::with_capacity(records.len());
        for record in records {
            let result = self
                .set_record(zone, record)
                .await
                .map_err(|e| ProviderError::record_failed("set", record, e))?;
            updated.push(result);
        }
        Ok(updated)
    }
}

/// Removes records from a zone.
#[async_trait]
pub trait RecordDeleter: Send + Sync {
    /// Deletes the record with the same type, name and data and returns it.
    async fn delete_record(&self, zone: &str, record: &Record) -> Result<Record>;

    /// Deletes every record in order and returns the removed records.
    ///
    /// Stops at the first failure, like [`RecordAppender::append_records`].
    async fn delete_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>> {
        let mut deleted = Vec::with_capacity(records.len());
        for record in records {
            let result = self
                .delete_record(zone, record)
                .await
                .map_err(|e| ProviderError::record_failed("delete", record, e))?;
            deleted.push(result);
        }
        Ok(deleted)
    }
}

/// A provider implementing the full record management capability set.
#[async_trait]
pub trait DnsRecordProvider: RecordGetter + RecordAppender + RecordSetter + RecordDeleter {
    /// Provider identifier.
    fn id(&self) -> &'static str;

    /// Provider metadata (type level).
    ///
    /// Needs no instance, so it can be called before a provider is created.
    fn metadata() -> ProviderMetadata
    where
        Self: Sized;

    /// Checks whether the credentials are accepted.
    async fn validate_credentials(&self) -> Result<bool>;
}
