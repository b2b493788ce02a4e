//! Provider factory functions and metadata.

use std::sync::Arc;

use crate::error::{ProviderError, Result};
use crate::providers::{AllinklProvider, PROVIDER_ID};
use crate::traits::DnsRecordProvider;
use crate::types::{KasCredentials, ProviderMetadata};

/// Creates a [`DnsRecordProvider`] from KAS credentials.
///
/// Credentials are checked for empty fields only; use
/// [`DnsRecordProvider::validate_credentials`] to check them against the API.
/// The returned provider is wrapped in `Arc<dyn DnsRecordProvider>` for easy sharing
/// across async tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use allinkl_dns_provider::{create_provider, KasCredentials};
///
/// let provider = create_provider(KasCredentials::new("w0123456", "secret")).unwrap();
/// ```
pub fn create_provider(credentials: KasCredentials) -> Result<Arc<dyn DnsRecordProvider>> {
    credentials
        .validate()
        .map_err(|e| ProviderError::InvalidCredentials {
            provider: PROVIDER_ID.to_string(),
            raw_message: Some(e.to_string()),
        })?;
    Ok(Arc::new(AllinklProvider::from_credentials(credentials)))
}

/// Returns the provider metadata.
///
/// Useful for building dynamic UIs that ask for the required credential fields.
pub fn provider_metadata() -> ProviderMetadata {
    AllinklProvider::<crate::providers::SoapTransport>::metadata()
}
