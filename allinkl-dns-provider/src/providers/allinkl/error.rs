//! KAS fault mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, KasTransport, ProviderErrorMapper, RawApiError};

use super::{AllinklProvider, PROVIDER_ID};

/// KAS fault code mapping
/// The `faultstring` of a KAS SOAP fault is a snake_case error code.
impl<T: KasTransport> ProviderErrorMapper for AllinklProvider<T> {
    fn provider_name(&self) -> &'static str {
        PROVIDER_ID
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let code = raw.code.clone().unwrap_or_default();
        match code.as_str() {
            // Login or session rejected
            "kas_password_incorrect"
            | "kas_login_incorrect"
            | "kas_login_syntax_incorrect"
            | "kas_auth_data_incorrect"
            | "session_invalid"
            | "session_expired" => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // Account locked or API access disabled
            "kas_auth_blocked" | "kas_login_blocked" | "account_locked" | "in_progress" => {
                ProviderError::PermissionDenied {
                    provider: self.provider_name().to_string(),
                    raw_message: Some(raw.message),
                }
            }

            // Calls arrived before KasFloodDelay elapsed
            "flood_protection" => ProviderError::RateLimited {
                provider: self.provider_name().to_string(),
                retry_after: None,
                raw_message: Some(raw.message),
            },

            "record_id_not_found" => ProviderError::RecordNotFound {
                provider: self.provider_name().to_string(),
                record: context.record.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            "zone_not_found" | "zone_host_not_found" => ProviderError::DomainNotFound {
                provider: self.provider_name().to_string(),
                domain: context.zone.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },

            "missing_parameter" => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "general".to_string(),
                detail: raw.message,
            },
            // e.g. record_data_syntax_incorrect
            c if c.ends_with("_syntax_incorrect") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: c.trim_end_matches("_syntax_incorrect").to_string(),
                detail: raw.message,
            },

            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::allinkl::tests::NoopTransport;

    fn provider() -> AllinklProvider<NoopTransport> {
        AllinklProvider::with_transport(NoopTransport)
    }

    fn map(code: &str) -> ProviderError {
        provider().map_error(
            RawApiError::with_code(code, code),
            ErrorContext {
                record: Some("www 300 IN A 192.0.2.1".to_string()),
                zone: Some("example.com.".to_string()),
            },
        )
    }

    #[test]
    fn credential_faults() {
        for code in [
            "kas_password_incorrect",
            "kas_login_incorrect",
            "kas_auth_data_incorrect",
            "session_invalid",
        ] {
            assert!(
                matches!(map(code), ProviderError::InvalidCredentials { .. }),
                "{code}"
            );
        }
        // login syntax is a credential problem, not a parameter problem
        assert!(matches!(
            map("kas_login_syntax_incorrect"),
            ProviderError::InvalidCredentials { .. }
        ));
    }

    #[test]
    fn blocked_account_is_permission_denied() {
        assert!(matches!(
            map("kas_auth_blocked"),
            ProviderError::PermissionDenied { .. }
        ));
    }

    #[test]
    fn flood_protection_is_rate_limited() {
        let e = map("flood_protection");
        assert!(matches!(e, ProviderError::RateLimited { .. }));
        assert!(e.is_transient());
    }

    #[test]
    fn context_is_carried_into_errors() {
        assert!(matches!(
            map("record_id_not_found"),
            ProviderError::RecordNotFound { ref record, .. } if record == "www 300 IN A 192.0.2.1"
        ));
        assert!(matches!(
            map("zone_not_found"),
            ProviderError::DomainNotFound { ref domain, .. } if domain == "example.com."
        ));
    }

    #[test]
    fn syntax_faults_name_the_parameter() {
        assert!(matches!(
            map("record_data_syntax_incorrect"),
            ProviderError::InvalidParameter { ref param, .. } if param == "record_data"
        ));
        assert!(matches!(
            map("missing_parameter"),
            ProviderError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn unknown_faults_keep_the_code() {
        assert!(matches!(
            map("something_new"),
            ProviderError::Unknown { raw_code: Some(ref c), .. } if c == "something_new"
        ));
        let e = provider().map_error(RawApiError::new("boom"), ErrorContext::default());
        assert!(matches!(e, ProviderError::Unknown { raw_code: None, .. }));
    }
}
