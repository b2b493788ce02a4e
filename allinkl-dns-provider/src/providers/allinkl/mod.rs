//! all-inkl.com (KAS) DNS Provider

mod error;
mod http;
mod provider;
mod soap;
mod types;

use std::time::Duration;

use crate::traits::KasTransport;
use crate::types::KasCredentials;

pub use http::SoapTransport;

pub(crate) const PROVIDER_ID: &str = "allinkl";
pub(crate) const KAS_API_BASE: &str = "https://kasapi.kasserver.com";
pub(crate) const KAS_AUTH_PATH: &str = "/soap/KasAuth.php";
pub(crate) const KAS_API_PATH: &str = "/soap/KasApi.php";
/// KAS has no per-record TTL; listed records carry this zone-wide value.
pub(crate) const DEFAULT_ZONE_TTL: Duration = Duration::from_secs(3600);
/// Lifetime requested for KAS sessions (refreshed on every call).
pub(crate) const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(600);
pub(crate) const SUPPORTED_RECORD_TYPES: &[&str] =
    &["A", "AAAA", "CNAME", "MX", "NS", "TXT", "SRV", "CAA", "PTR"];

/// all-inkl.com DNS Provider
///
/// Generic over the remote-call seam so the record logic can run against any
/// [`KasTransport`]; the default talks SOAP to the KAS API.
pub struct AllinklProvider<T = SoapTransport> {
    pub(crate) transport: T,
    pub(crate) zone_ttl: Duration,
}

impl AllinklProvider {
    pub fn new(username: String, password: String) -> Self {
        Self::builder(username, password).build()
    }

    pub fn builder(username: String, password: String) -> AllinklProviderBuilder {
        AllinklProviderBuilder::new(KasCredentials::new(username, password))
    }

    pub fn from_credentials(credentials: KasCredentials) -> Self {
        AllinklProviderBuilder::new(credentials).build()
    }
}

impl<T: KasTransport> AllinklProvider<T> {
    /// Wraps an arbitrary transport, e.g. an in-memory registrar for tests.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            zone_ttl: DEFAULT_ZONE_TTL,
        }
    }

    /// TTL reported for listed records.
    #[must_use]
    pub fn with_zone_ttl(mut self, ttl: Duration) -> Self {
        self.zone_ttl = ttl;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// Builder for [`AllinklProvider`] backed by [`SoapTransport`].
pub struct AllinklProviderBuilder {
    credentials: KasCredentials,
    base_url: String,
    zone_ttl: Duration,
    session_lifetime: Duration,
}

impl AllinklProviderBuilder {
    fn new(credentials: KasCredentials) -> Self {
        Self {
            credentials,
            base_url: KAS_API_BASE.to_string(),
            zone_ttl: DEFAULT_ZONE_TTL,
            session_lifetime: DEFAULT_SESSION_LIFETIME,
        }
    }

    /// TTL reported for listed records (default one hour).
    #[must_use]
    pub fn zone_ttl(mut self, ttl: Duration) -> Self {
        self.zone_ttl = ttl;
        self
    }

    /// Scheme and host of the KAS endpoints (default `https://kasapi.kasserver.com`).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Session lifetime requested at login (default ten minutes).
    #[must_use]
    pub fn session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    pub fn build(self) -> AllinklProvider {
        let transport =
            SoapTransport::with_options(self.credentials, &self.base_url, self.session_lifetime);
        AllinklProvider::with_transport(transport).with_zone_ttl(self.zone_ttl)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::traits::{RawApiError, TransportError};

    /// Transport that rejects every call.
    pub(crate) struct NoopTransport;

    #[async_trait]
    impl KasTransport for NoopTransport {
        async fn call(&self, action: &str, _params: Value) -> Result<Value, TransportError> {
            Err(RawApiError::with_code("unexpected_call", action).into())
        }
    }

    #[test]
    fn builder_defaults() {
        let provider = AllinklProvider::new("w0123456".into(), "secret".into());
        assert_eq!(provider.zone_ttl, DEFAULT_ZONE_TTL);
        assert_eq!(
            provider.transport().auth_url(),
            "https://kasapi.kasserver.com/soap/KasAuth.php"
        );
    }

    #[test]
    fn builder_overrides() {
        let provider = AllinklProvider::builder("w0123456".into(), "secret".into())
            .zone_ttl(Duration::from_secs(300))
            .base_url("http://127.0.0.1:8080/")
            .build();
        assert_eq!(provider.zone_ttl, Duration::from_secs(300));
        assert_eq!(
            provider.transport().api_url(),
            "http://127.0.0.1:8080/soap/KasApi.php"
        );
    }
}
