//! # allinkl-dns-provider
//!
//! DNS record management for domains hosted at [all-inkl.com](https://all-inkl.com/),
//! through the KAS SOAP API.
//!
//! The crate exposes the four capabilities generic DNS automation (ACME DNS-01
//! solvers, dynamic DNS updaters) expects from a zone backend:
//!
//! | Capability | Trait | Semantics |
//! |------------|-------|-----------|
//! | List | [`RecordGetter`] | every record of the zone |
//! | Append | [`RecordAppender`] | create, never touch existing records |
//! | Set | [`RecordSetter`] | upsert by type and name |
//! | Delete | [`RecordDeleter`] | remove by type, name and data |
//!
//! Batches run in order and stop at the first failing record.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation and static builds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use allinkl_dns_provider::{
//!     AllinklProvider, Record, RecordAppender, RecordData, RecordDeleter, RecordGetter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AllinklProvider::new("w0123456".to_string(), "secret".to_string());
//!
//!     let challenge = Record {
//!         name: "_acme-challenge".to_string(),
//!         ttl: Duration::from_secs(300),
//!         data: RecordData::TXT { text: "token".to_string() },
//!     };
//!     provider.append_records("example.com.", &[challenge.clone()]).await?;
//!
//!     for record in provider.get_records("example.com.").await? {
//!         println!("{record}");
//!     }
//!
//!     provider.delete_records("example.com.", &[challenge]).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError):
//!
//! - [`ProviderError::InvalidCredentials`]: login or session rejected
//! - [`ProviderError::DomainNotFound`]: the zone is not managed by the account
//! - [`ProviderError::RecordNotFound`]: nothing to delete
//! - [`ProviderError::AmbiguousMatch`]: several records share the type and name being set
//! - [`ProviderError::RecordFailed`]: a batch stopped at this record
//!
//! Nothing is retried; [`ProviderError::is_transient`] tells callers which failures
//! are worth retrying.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::{create_provider, provider_metadata};

// Re-export capability traits and the transport seam
pub use traits::{
    DnsRecordProvider, KasTransport, RawApiError, RecordAppender, RecordDeleter, RecordGetter,
    RecordSetter, TransportError,
};

// Re-export types
pub use types::{
    CredentialValidationError, FieldType, KasCredentials, ProviderCredentialField,
    ProviderMetadata, Record, RecordData, Rr,
};

// Re-export concrete provider
pub use providers::{AllinklProvider, AllinklProviderBuilder, SoapTransport};
