use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::providers::PROVIDER_ID;

// ============ Generic Record ============

/// A DNS resource record in its generic, type-agnostic form.
///
/// `data` holds the record content in zone-file presentation format, e.g.
/// `"10 mail.example.com."` for MX or `0 issue "letsencrypt.org"` for CAA.
/// TXT data is stored unquoted.
///
/// Names are relative to the zone; `"@"` denotes the zone apex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rr {
    /// Record name relative to the zone (e.g. `"www"`, `"@"`).
    pub name: String,
    /// Time to live.
    #[serde(with = "crate::utils::ttl")]
    pub ttl: Duration,
    /// Record type (e.g. `"A"`, `"TXT"`).
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record content in presentation format.
    pub data: String,
}

impl Rr {
    /// Parses the generic record into its type-specific form.
    ///
    /// Unknown record types are kept verbatim as [`RecordData::Other`]; known types
    /// with malformed data are rejected.
    pub fn parse(&self) -> Result<Record> {
        let data = RecordData::parse(&self.record_type, &self.data)?;
        Ok(Record {
            name: self.name.clone(),
            ttl: self.ttl,
            data,
        })
    }
}

impl fmt::Display for Rr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} IN {} {}",
            self.name,
            self.ttl.as_secs(),
            self.record_type,
            self.data
        )
    }
}

// ============ Typed Record ============

/// A DNS record with type-specific data.
///
/// Every `Record` has a generic form, obtained with [`rr()`](Self::rr).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record name relative to the zone (e.g. `"www"`, `"@"`).
    pub name: String,
    /// Time to live.
    #[serde(with = "crate::utils::ttl")]
    pub ttl: Duration,
    /// Type-specific record data.
    pub data: RecordData,
}

impl Record {
    /// Returns the generic form of this record.
    pub fn rr(&self) -> Rr {
        Rr {
            name: self.name.clone(),
            ttl: self.ttl,
            record_type: self.data.record_type().to_string(),
            data: self.data.rr_data(),
        }
    }

    /// Shorthand for `self.data.record_type()`.
    pub fn record_type(&self) -> &str {
        self.data.record_type()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.rr(), f)
    }
}

impl From<Record> for Rr {
    fn from(record: Record) -> Self {
        record.rr()
    }
}

impl TryFrom<Rr> for Record {
    type Error = ProviderError;

    fn try_from(rr: Rr) -> Result<Self> {
        rr.parse()
    }
}

/// Type-safe representation of DNS record data.
///
/// Each variant carries the fields specific to that record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum RecordData {
    /// A record: maps a hostname to an IPv4 address.
    A {
        /// IPv4 address.
        address: Ipv4Addr,
    },

    /// AAAA record: maps a hostname to an IPv6 address.
    AAAA {
        /// IPv6 address.
        address: Ipv6Addr,
    },

    /// CNAME record: alias from one name to another.
    CNAME {
        /// Target hostname.
        target: String,
    },

    /// MX record: mail exchange server.
    MX {
        /// Preference (lower = preferred).
        priority: u16,
        /// Mail server hostname.
        exchange: String,
    },

    /// TXT record: arbitrary text data.
    TXT {
        /// Text content, unquoted.
        text: String,
    },

    /// NS record: authoritative name server.
    NS {
        /// Name server hostname.
        nameserver: String,
    },

    /// SRV record: service locator.
    SRV {
        /// Priority (lower = preferred).
        priority: u16,
        /// Weight for load balancing among same-priority targets.
        weight: u16,
        /// TCP/UDP port number.
        port: u16,
        /// Target hostname providing the service.
        target: String,
    },

    /// CAA record: Certificate Authority Authorization.
    CAA {
        /// Issuer critical flag (0 or 128).
        flags: u8,
        /// Property tag (`"issue"`, `"issuewild"`, or `"iodef"`).
        tag: String,
        /// CA domain or reporting URI.
        value: String,
    },

    /// Any other record type, kept in generic form.
    Other {
        /// Record type as given (uppercase).
        record_type: String,
        /// Record content in presentation format.
        data: String,
    },
}

impl RecordData {
    /// Parses presentation-format `data` for the given record type.
    pub fn parse(record_type: &str, data: &str) -> Result<Self> {
        let record_type = record_type.trim().to_uppercase();
        let data = data.trim();

        match record_type.as_str() {
            "A" => Ok(Self::A {
                address: data
                    .parse()
                    .map_err(|_| invalid_data(format!("invalid IPv4 address: '{data}'")))?,
            }),
            "AAAA" => Ok(Self::AAAA {
                address: data
                    .parse()
                    .map_err(|_| invalid_data(format!("invalid IPv6 address: '{data}'")))?,
            }),
            "CNAME" => Ok(Self::CNAME {
                target: data.to_string(),
            }),
            "NS" => Ok(Self::NS {
                nameserver: data.to_string(),
            }),
            "TXT" => Ok(Self::TXT {
                text: data.to_string(),
            }),
            "MX" => {
                let (priority, exchange) = data.split_once(char::is_whitespace).ok_or_else(|| {
                    invalid_data(format!(
                        "invalid MX data: expected 'preference exchange', got '{data}'"
                    ))
                })?;
                Ok(Self::MX {
                    priority: parse_number(priority, "MX preference")?,
                    exchange: exchange.trim().to_string(),
                })
            }
            "SRV" => {
                let parts: Vec<&str> = data.split_whitespace().collect();
                let [priority, weight, port, target] = parts.as_slice() else {
                    return Err(invalid_data(format!(
                        "invalid SRV data: expected 'priority weight port target', got '{data}'"
                    )));
                };
                Ok(Self::SRV {
                    priority: parse_number(priority, "SRV priority")?,
                    weight: parse_number(weight, "SRV weight")?,
                    port: parse_number(port, "SRV port")?,
                    target: (*target).to_string(),
                })
            }
            "CAA" => {
                let parts: Vec<&str> = data.splitn(3, ' ').collect();
                let [flags, tag, value] = parts.as_slice() else {
                    return Err(invalid_data(format!(
                        "invalid CAA data: expected 'flags tag value', got '{data}'"
                    )));
                };
                Ok(Self::CAA {
                    flags: parse_number(flags, "CAA flags")?,
                    tag: (*tag).to_string(),
                    value: value.trim().trim_matches('"').to_string(),
                })
            }
            "" => Err(ProviderError::InvalidParameter {
                provider: PROVIDER_ID.to_string(),
                param: "type".to_string(),
                detail: "record type must not be empty".to_string(),
            }),
            _ => Ok(Self::Other {
                record_type,
                data: data.to_string(),
            }),
        }
    }

    /// Returns the record type string (uppercase).
    pub fn record_type(&self) -> &str {
        match self {
            Self::A { .. } => "A",
            Self::AAAA { .. } => "AAAA",
            Self::CNAME { .. } => "CNAME",
            Self::MX { .. } => "MX",
            Self::TXT { .. } => "TXT",
            Self::NS { .. } => "NS",
            Self::SRV { .. } => "SRV",
            Self::CAA { .. } => "CAA",
            Self::Other { record_type, .. } => record_type,
        }
    }

    /// Returns the record content in presentation format.
    pub fn rr_data(&self) -> String {
        match self {
            Self::A { address } => address.to_string(),
            Self::AAAA { address } => address.to_string(),
            Self::CNAME { target } => target.clone(),
            Self::MX { priority, exchange } => format!("{priority} {exchange}"),
            Self::TXT { text } => text.clone(),
            Self::NS { nameserver } => nameserver.clone(),
            Self::SRV {
                priority,
                weight,
                port,
                target,
            } => format!("{priority} {weight} {port} {target}"),
            Self::CAA { flags, tag, value } => format!("{flags} {tag} \"{value}\""),
            Self::Other { data, .. } => data.clone(),
        }
    }
}

fn invalid_data(detail: String) -> ProviderError {
    ProviderError::InvalidParameter {
        provider: PROVIDER_ID.to_string(),
        param: "data".to_string(),
        detail,
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid_data(format!("invalid {what}: '{value}'")))
}

// ============ Provider Metadata Types ============

/// The input type of a credential field (affects UI rendering).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Plain text input.
    Text,
    /// Masked/password input.
    Password,
}

/// Definition of a single credential field required by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentialField {
    /// Machine-readable field key (e.g., `"kas_username"`).
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Input type for UI rendering.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Optional placeholder text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Optional help/description text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// Static metadata describing the provider.
///
/// Obtain via [`DnsRecordProvider::metadata()`](crate::DnsRecordProvider::metadata) or
/// [`provider_metadata()`](crate::provider_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    /// Provider identifier.
    pub id: String,
    /// Human-readable provider name.
    pub name: String,
    /// Short description of the provider.
    pub description: String,
    /// Credential fields required to authenticate with this provider.
    pub required_fields: Vec<ProviderCredentialField>,
    /// Record types the registrar accepts.
    pub supported_record_types: Vec<String>,
}

// ============ Credential Types ============

/// Validation error for provider credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A required credential field is missing entirely.
    MissingField {
        /// Machine-readable field key.
        field: String,
        /// Human-readable field label.
        label: String,
    },
    /// A credential field is present but empty/whitespace-only.
    EmptyField {
        /// Machine-readable field key.
        field: String,
        /// Human-readable field label.
        label: String,
    },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { label, .. } => write!(f, "Missing required field: {label}"),
            Self::EmptyField { label, .. } => write!(f, "Field must not be empty: {label}"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

pub(crate) const USERNAME_KEY: &str = "kas_username";
pub(crate) const USERNAME_LABEL: &str = "KAS Login";
pub(crate) const PASSWORD_KEY: &str = "kas_password";
pub(crate) const PASSWORD_LABEL: &str = "KAS Password";

/// KAS account credentials.
///
/// Serialized with the keys `kas_username` and `kas_password`:
///
/// ```json
/// { "kas_username": "w0123456", "kas_password": "..." }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KasCredentials {
    /// KAS login name.
    #[serde(rename = "kas_username")]
    pub username: String,
    /// KAS password.
    #[serde(rename = "kas_password")]
    pub password: String,
}

impl KasCredentials {
    /// Creates credentials from a login name and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks that both fields are non-empty.
    pub fn validate(&self) -> std::result::Result<(), CredentialValidationError> {
        for (value, key, label) in [
            (&self.username, USERNAME_KEY, USERNAME_LABEL),
            (&self.password, PASSWORD_KEY, PASSWORD_LABEL),
        ] {
            if value.trim().is_empty() {
                return Err(CredentialValidationError::EmptyField {
                    field: key.to_string(),
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Construct credentials from a `HashMap`, validating required fields.
    ///
    /// Useful for credentials stored in a flat key-value format.
    pub fn from_map(
        map: &HashMap<String, String>,
    ) -> std::result::Result<Self, CredentialValidationError> {
        Ok(Self {
            username: Self::get_required_field(map, USERNAME_KEY, USERNAME_LABEL)?,
            password: Self::get_required_field(map, PASSWORD_KEY, PASSWORD_LABEL)?,
        })
    }

    /// Obtain required fields from `HashMap` and verify that it is not empty
    fn get_required_field(
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> std::result::Result<String, CredentialValidationError> {
        match map.get(key) {
            None => Err(CredentialValidationError::MissingField {
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) if v.trim().is_empty() => Err(CredentialValidationError::EmptyField {
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) => Ok(v.clone()),
        }
    }

    /// Convert credentials to a `HashMap` for flat key-value storage.
    pub fn to_map(&self) -> HashMap<String, String> {
        [
            (USERNAME_KEY.to_string(), self.username.clone()),
            (PASSWORD_KEY.to_string(), self.password.clone()),
        ]
        .into()
    }
}

impl fmt::Debug for KasCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KasCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rr(record_type: &str, name: &str, data: &str) -> Rr {
        Rr {
            name: name.to_string(),
            ttl: Duration::from_secs(3600),
            record_type: record_type.to_string(),
            data: data.to_string(),
        }
    }

    // ============ Rr parsing ============

    #[test]
    fn parse_a_record() {
        let res = rr("A", "test", "123.123.123.123").parse();
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(record) = res else {
            return;
        };
        assert_eq!(
            record.data,
            RecordData::A {
                address: Ipv4Addr::new(123, 123, 123, 123)
            }
        );
        assert_eq!(record.name, "test");
        assert_eq!(record.ttl, Duration::from_secs(3600));
    }

    #[test]
    fn parse_lowercase_type() {
        let res = rr("aaaa", "v6", "2001:DB8::1").parse();
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(record) = res else {
            return;
        };
        assert_eq!(record.record_type(), "AAAA");
        assert_eq!(record.rr().data, "2001:db8::1");
    }

    #[test]
    fn parse_rejects_bad_address() {
        let res = rr("A", "test", "not-an-ip").parse();
        assert!(
            matches!(&res, Err(ProviderError::InvalidParameter { param, .. }) if param == "data"),
            "unexpected result: {res:?}"
        );
    }

    #[test]
    fn parse_mx_record() {
        let res = rr("MX", "@", "10 mail.example.com.").parse();
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(record) = res else {
            return;
        };
        assert_eq!(
            record.data,
            RecordData::MX {
                priority: 10,
                exchange: "mail.example.com.".to_string()
            }
        );
    }

    #[test]
    fn parse_mx_without_preference_fails() {
        let res = rr("MX", "@", "mail.example.com.").parse();
        assert!(res.is_err(), "expected Err(..), got {res:?}");
    }

    #[test]
    fn parse_srv_record() {
        let res = rr("SRV", "_sip._tcp", "0 5 5060 sip.example.com.").parse();
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(record) = res else {
            return;
        };
        assert_eq!(
            record.data,
            RecordData::SRV {
                priority: 0,
                weight: 5,
                port: 5060,
                target: "sip.example.com.".to_string()
            }
        );
    }

    #[test]
    fn parse_caa_record_strips_quotes() {
        let res = rr("CAA", "@", "0 issue \"letsencrypt.org\"").parse();
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(record) = res else {
            return;
        };
        assert_eq!(
            record.data,
            RecordData::CAA {
                flags: 0,
                tag: "issue".to_string(),
                value: "letsencrypt.org".to_string()
            }
        );
        assert_eq!(record.rr().data, "0 issue \"letsencrypt.org\"");
    }

    #[test]
    fn parse_txt_keeps_spaces() {
        let res = rr("TXT", "_acme-challenge", "v=spf1 include:example.net -all").parse();
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(record) = res else {
            return;
        };
        assert_eq!(record.rr().data, "v=spf1 include:example.net -all");
    }

    #[test]
    fn parse_unknown_type_is_kept() {
        let res = rr("ptr", "1", "host.example.com.").parse();
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(record) = res else {
            return;
        };
        assert_eq!(
            record.data,
            RecordData::Other {
                record_type: "PTR".to_string(),
                data: "host.example.com.".to_string()
            }
        );
        assert_eq!(record.rr(), rr("PTR", "1", "host.example.com."));
    }

    #[test]
    fn parse_empty_type_fails() {
        let res = rr("", "x", "y").parse();
        assert!(
            matches!(&res, Err(ProviderError::InvalidParameter { param, .. }) if param == "type"),
            "unexpected result: {res:?}"
        );
    }

    #[test]
    fn rr_display_is_zone_file_like() {
        assert_eq!(
            rr("A", "test", "123.123.123.123").to_string(),
            "test 3600 IN A 123.123.123.123"
        );
    }

    #[test]
    fn record_serde_uses_seconds_for_ttl() {
        let record = Record {
            name: "www".to_string(),
            ttl: Duration::from_secs(300),
            data: RecordData::CNAME {
                target: "example.com.".to_string(),
            },
        };
        let res = serde_json::to_string(&record);
        assert!(res.is_ok(), "serialize failed: {res:?}");
        let Ok(json) = res else { return };
        assert!(json.contains("\"ttl\":300"), "unexpected json: {json}");
        let back = serde_json::from_str::<Record>(&json);
        assert!(matches!(&back, Ok(r) if *r == record), "unexpected result: {back:?}");
    }

    // ============ KasCredentials ============

    #[test]
    fn credentials_map_roundtrip() {
        let map: HashMap<String, String> = [
            ("kas_username".to_string(), "w0123456".to_string()),
            ("kas_password".to_string(), "secret".to_string()),
        ]
        .into();
        let res = KasCredentials::from_map(&map);
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(cred) = res else {
            return;
        };
        assert_eq!(cred.to_map(), map);
    }

    #[test]
    fn credentials_missing_field() {
        let map: HashMap<String, String> =
            [("kas_username".to_string(), "w0123456".to_string())].into();
        let res = KasCredentials::from_map(&map);
        assert!(
            matches!(&res, Err(CredentialValidationError::MissingField { field, .. }) if field == "kas_password"),
            "unexpected result: {res:?}"
        );
    }

    #[test]
    fn credentials_empty_field() {
        let cred = KasCredentials::new("  ", "secret");
        let res = cred.validate();
        assert!(
            matches!(&res, Err(CredentialValidationError::EmptyField { field, .. }) if field == "kas_username"),
            "unexpected result: {res:?}"
        );
    }

    #[test]
    fn credentials_debug_hides_password() {
        let cred = KasCredentials::new("w0123456", "hunter2");
        let debug = format!("{cred:?}");
        assert!(debug.contains("w0123456"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn credentials_deserialize_kas_keys() {
        let res: serde_json::Result<KasCredentials> =
            serde_json::from_str(r#"{"kas_username":"w0123456","kas_password":"pw"}"#);
        assert!(res.is_ok(), "serde_json::from_str failed: {res:?}");
        let Ok(cred) = res else {
            return;
        };
        assert_eq!(cred, KasCredentials::new("w0123456", "pw"));
    }
}
