//! KAS API request and response types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A DNS record as returned by `get_dns_settings`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct KasDnsRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub record_id: String,
    #[serde(default)]
    pub record_zone: String,
    /// Relative name; empty for the zone apex.
    #[serde(default)]
    pub record_name: String,
    pub record_type: String,
    #[serde(default)]
    pub record_data: String,
    /// MX/SRV priority, `0` otherwise.
    #[serde(default, deserialize_with = "string_or_number")]
    pub record_aux: String,
    /// `Y` or `N`; registrar-managed records are not changeable.
    #[serde(default)]
    pub record_changeable: String,
}

impl KasDnsRecord {
    pub fn aux(&self) -> u16 {
        self.record_aux.trim().parse().unwrap_or(0)
    }

    pub fn is_changeable(&self) -> bool {
        !self.record_changeable.eq_ignore_ascii_case("N")
    }
}

/// Decodes the `ReturnInfo` of `get_dns_settings`.
///
/// An empty zone comes back as an empty map or an empty string rather than an
/// empty array, and a single record may come back without the surrounding array.
pub(crate) fn parse_record_list(value: Value) -> Result<Vec<KasDnsRecord>, serde_json::Error> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(ref s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::Object(ref map) if map.is_empty() => Ok(Vec::new()),
        Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        other => serde_json::from_value(other),
    }
}

// ============ Request Params ============

#[derive(Debug, Serialize)]
pub(crate) struct GetDnsSettingsParams<'a> {
    /// Zone in absolute form (`example.com.`).
    pub zone_host: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddDnsSettingsParams<'a> {
    pub zone_host: &'a str,
    pub record_type: &'a str,
    pub record_name: &'a str,
    pub record_data: &'a str,
    pub record_aux: u16,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateDnsSettingsParams<'a> {
    pub record_id: &'a str,
    pub record_name: &'a str,
    pub record_type: &'a str,
    pub record_data: &'a str,
    pub record_aux: u16,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteDnsSettingsParams<'a> {
    pub record_id: &'a str,
}

/// Login parameters for `KasAuth`.
#[derive(Serialize)]
pub(crate) struct KasAuthParams<'a> {
    pub kas_login: &'a str,
    pub kas_auth_data: &'a str,
    pub kas_auth_type: &'static str,
    pub session_lifetime: u64,
    pub session_update_lifetime: &'static str,
}

/// Envelope parameters for `KasApi`.
#[derive(Serialize)]
pub(crate) struct KasApiParams<'a> {
    pub kas_login: &'a str,
    pub kas_auth_type: &'static str,
    pub kas_auth_data: &'a str,
    pub kas_action: &'a str,
    #[serde(rename = "KasRequestParams")]
    pub request_params: &'a Value,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}
