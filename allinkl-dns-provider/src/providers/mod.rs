//! DNS Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

mod allinkl;

pub use allinkl::{AllinklProvider, AllinklProviderBuilder, SoapTransport};

pub(crate) use allinkl::PROVIDER_ID;
