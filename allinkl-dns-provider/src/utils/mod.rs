//! Utility modules.

/// TTL (de)serialization helpers shared by the record types.
pub mod ttl;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;
