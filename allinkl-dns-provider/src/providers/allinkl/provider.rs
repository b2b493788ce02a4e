//! all-inkl.com record operations

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::providers::common::{fqdn, normalize_domain_name, relative_name, relative_to_full_name};
use crate::traits::{
    DnsRecordProvider, ErrorContext, KasTransport, ProviderErrorMapper, RecordAppender,
    RecordDeleter, RecordGetter, RecordSetter, TransportError,
};
use crate::types::{
    FieldType, ProviderCredentialField, ProviderMetadata, Record, RecordData, Rr,
    PASSWORD_KEY, PASSWORD_LABEL, USERNAME_KEY, USERNAME_LABEL,
};

use super::types::{
    AddDnsSettingsParams, DeleteDnsSettingsParams, GetDnsSettingsParams, KasDnsRecord,
    UpdateDnsSettingsParams, parse_record_list,
};
use super::{AllinklProvider, PROVIDER_ID, SUPPORTED_RECORD_TYPES};

/// Type, data and aux fields of a record in the registrar's representation.
struct KasFields {
    record_type: String,
    data: String,
    aux: u16,
}

impl KasFields {
    fn from_record(record_data: &RecordData) -> Self {
        let (data, aux) = match record_data {
            RecordData::MX { priority, exchange } => (exchange.clone(), *priority),
            RecordData::SRV {
                priority,
                weight,
                port,
                target,
            } => (format!("{weight} {port} {target}"), *priority),
            other => (other.rr_data(), 0),
        };
        Self {
            record_type: record_data.record_type().to_string(),
            data,
            aux,
        }
    }
}

impl<T: KasTransport> AllinklProvider<T> {
    /// Invokes a KAS action and decodes its `ReturnInfo`.
    async fn request<R: DeserializeOwned>(
        &self,
        action: &str,
        params: impl Serialize + Send,
        context: ErrorContext,
    ) -> Result<R> {
        let params =
            serde_json::to_value(params).map_err(|e| ProviderError::SerializationError {
                provider: self.provider_name().to_string(),
                detail: e.to_string(),
            })?;

        match self.transport.call(action, params).await {
            Ok(value) => serde_json::from_value(value).map_err(|e| {
                log::error!("[{PROVIDER_ID}] Unexpected {action} result: {e}");
                self.parse_error(e)
            }),
            Err(TransportError::Fault(raw)) => {
                let error = self.map_error(raw, context);
                if error.is_expected() {
                    log::warn!("[{PROVIDER_ID}] {action} failed: {error}");
                } else {
                    log::error!("[{PROVIDER_ID}] {action} failed: {error}");
                }
                Err(error)
            }
            Err(TransportError::Failed(error)) => {
                log::error!("[{PROVIDER_ID}] {action} failed: {error}");
                Err(error)
            }
        }
    }

    /// Fetches the raw records of a zone (`zone_host` in absolute form).
    async fn fetch_records(&self, zone_host: &str) -> Result<Vec<KasDnsRecord>> {
        let value: Value = self
            .request(
                "get_dns_settings",
                GetDnsSettingsParams { zone_host },
                zone_context(zone_host, None),
            )
            .await?;
        parse_record_list(value).map_err(|e| self.parse_error(e))
    }

    /// Converts a registrar record into a [`Record`].
    ///
    /// MX and SRV priorities live in `record_aux` and are folded back into the data.
    /// Data this crate cannot parse is kept as [`RecordData::Other`].
    pub(crate) fn kas_to_record(&self, kas: &KasDnsRecord) -> Record {
        let record_type = kas.record_type.trim().to_uppercase();
        let data = match record_type.as_str() {
            "MX" | "SRV" => format!("{} {}", kas.aux(), kas.record_data.trim()),
            _ => kas.record_data.clone(),
        };
        let rr = Rr {
            name: kas_name_to_relative(&kas.record_name),
            ttl: self.zone_ttl,
            record_type,
            data,
        };

        rr.parse().unwrap_or_else(|e| {
            log::debug!("[{PROVIDER_ID}] Keeping record {} unparsed: {e}", kas.record_id);
            Record {
                name: rr.name,
                ttl: rr.ttl,
                data: RecordData::Other {
                    record_type: rr.record_type,
                    data: rr.data,
                },
            }
        })
    }

    /// Checks zone and record type, returning `(zone_host, relative_name)`.
    fn prepare(&self, zone: &str, record: &Record) -> Result<(String, String)> {
        if normalize_domain_name(zone).trim().is_empty() {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "zone".to_string(),
                detail: "zone must not be empty".to_string(),
            });
        }

        let record_type = record.record_type();
        if !SUPPORTED_RECORD_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(record_type))
        {
            return Err(ProviderError::UnsupportedRecordType {
                provider: self.provider_name().to_string(),
                record_type: record_type.to_string(),
            });
        }

        Ok((fqdn(zone), relative_name(&record.name, zone)))
    }

    fn matches_identity(kas: &KasDnsRecord, record_type: &str, name: &str) -> bool {
        kas.record_type.trim().eq_ignore_ascii_case(record_type)
            && kas_name_to_relative(&kas.record_name).eq_ignore_ascii_case(name)
    }

    fn same_data(&self, kas: &KasDnsRecord, record: &Record) -> bool {
        self.kas_to_record(kas).data.rr_data() == record.data.rr_data()
    }

    /// The caller's record with its name in relative form.
    fn normalized(record: &Record, name: String) -> Record {
        Record {
            name,
            ttl: record.ttl,
            data: record.data.clone(),
        }
    }

    async fn create(&self, zone_host: &str, name: &str, record: &Record) -> Result<String> {
        let fields = KasFields::from_record(&record.data);
        let id: String = self
            .request(
                "add_dns_settings",
                AddDnsSettingsParams {
                    zone_host,
                    record_type: &fields.record_type,
                    record_name: relative_to_kas_name(name),
                    record_data: &fields.data,
                    record_aux: fields.aux,
                },
                zone_context(zone_host, Some(record)),
            )
            .await?;
        log::info!(
            "[{PROVIDER_ID}] Created {} (id {id})",
            relative_to_full_name(name, zone_host)
        );
        Ok(id)
    }

    async fn update(
        &self,
        zone_host: &str,
        kas: &KasDnsRecord,
        name: &str,
        record: &Record,
    ) -> Result<()> {
        let fields = KasFields::from_record(&record.data);
        let _: Value = self
            .request(
                "update_dns_settings",
                UpdateDnsSettingsParams {
                    record_id: &kas.record_id,
                    record_name: relative_to_kas_name(name),
                    record_type: &fields.record_type,
                    record_data: &fields.data,
                    record_aux: fields.aux,
                },
                zone_context(zone_host, Some(record)),
            )
            .await?;
        log::info!(
            "[{PROVIDER_ID}] Updated {} (id {})",
            relative_to_full_name(name, zone_host),
            kas.record_id
        );
        Ok(())
    }
}

#[async_trait]
impl<T: KasTransport> RecordGetter for AllinklProvider<T> {
    async fn get_records(&self, zone: &str) -> Result<Vec<Record>> {
        if normalize_domain_name(zone).trim().is_empty() {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "zone".to_string(),
                detail: "zone must not be empty".to_string(),
            });
        }

        let zone_host = fqdn(zone);
        let records = self.fetch_records(&zone_host).await?;
        log::debug!(
            "[{PROVIDER_ID}] {} records in {zone_host}",
            records.len()
        );
        Ok(records.iter().map(|kas| self.kas_to_record(kas)).collect())
    }
}

#[async_trait]
impl<T: KasTransport> RecordAppender for AllinklProvider<T> {
    async fn append_record(&self, zone: &str, record: &Record) -> Result<Record> {
        let (zone_host, name) = self.prepare(zone, record)?;
        self.create(&zone_host, &name, record).await?;
        Ok(Self::normalized(record, name))
    }
}

#[async_trait]
impl<T: KasTransport> RecordSetter for AllinklProvider<T> {
    async fn set_record(&self, zone: &str, record: &Record) -> Result<Record> {
        let (zone_host, name) = self.prepare(zone, record)?;
        let record_type = record.record_type();

        let existing = self.fetch_records(&zone_host).await?;
        let candidates: Vec<&KasDnsRecord> = existing
            .iter()
            .filter(|kas| kas.is_changeable() && Self::matches_identity(kas, record_type, &name))
            .collect();

        if candidates.iter().any(|kas| self.same_data(kas, record)) {
            log::debug!("[{PROVIDER_ID}] {name} {record_type} is already up to date");
            return Ok(Self::normalized(record, name));
        }

        match candidates.as_slice() {
            [] => {
                self.create(&zone_host, &name, record).await?;
            }
            [kas] => self.update(&zone_host, kas, &name, record).await?,
            many => {
                return Err(ProviderError::AmbiguousMatch {
                    provider: self.provider_name().to_string(),
                    record: format!("{name} {record_type}"),
                    matches: many.len(),
                });
            }
        }
        Ok(Self::normalized(record, name))
    }
}

#[async_trait]
impl<T: KasTransport> RecordDeleter for AllinklProvider<T> {
    async fn delete_record(&self, zone: &str, record: &Record) -> Result<Record> {
        let (zone_host, name) = self.prepare(zone, record)?;
        let record_type = record.record_type();

        let existing = self.fetch_records(&zone_host).await?;
        let matches: Vec<&KasDnsRecord> = existing
            .iter()
            .filter(|kas| {
                Self::matches_identity(kas, record_type, &name) && self.same_data(kas, record)
            })
            .collect();

        let Some(first) = matches.first() else {
            return Err(ProviderError::RecordNotFound {
                provider: self.provider_name().to_string(),
                record: Self::normalized(record, name.clone()).to_string(),
                raw_message: None,
            });
        };
        // Registrar-managed duplicates are skipped in favour of a deletable one.
        let Some(target) = matches.iter().copied().find(|kas| kas.is_changeable()) else {
            return Err(ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(format!(
                    "record {} is managed by the registrar",
                    first.record_id
                )),
            });
        };
        if matches.len() > 1 {
            log::debug!(
                "[{PROVIDER_ID}] {} identical {name} {record_type} records, deleting id {}",
                matches.len(),
                target.record_id
            );
        }

        let _: Value = self
            .request(
                "delete_dns_settings",
                DeleteDnsSettingsParams {
                    record_id: &target.record_id,
                },
                zone_context(&zone_host, Some(record)),
            )
            .await?;
        log::info!(
            "[{PROVIDER_ID}] Deleted {} (id {})",
            relative_to_full_name(&name, &zone_host),
            target.record_id
        );

        let mut removed = self.kas_to_record(target);
        removed.ttl = record.ttl;
        Ok(removed)
    }
}

#[async_trait]
impl<T: KasTransport> DnsRecordProvider for AllinklProvider<T> {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: PROVIDER_ID.to_string(),
            name: "all-inkl.com".to_string(),
            description: "DNS records of domains hosted at all-inkl.com (KAS API)".to_string(),
            required_fields: vec![
                ProviderCredentialField {
                    key: USERNAME_KEY.to_string(),
                    label: USERNAME_LABEL.to_string(),
                    field_type: FieldType::Text,
                    placeholder: Some("w0123456".to_string()),
                    help_text: Some("KAS login name of the account".to_string()),
                },
                ProviderCredentialField {
                    key: PASSWORD_KEY.to_string(),
                    label: PASSWORD_LABEL.to_string(),
                    field_type: FieldType::Password,
                    placeholder: None,
                    help_text: None,
                },
            ],
            supported_record_types: SUPPORTED_RECORD_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    async fn validate_credentials(&self) -> Result<bool> {
        match self.transport.authenticate().await {
            Ok(()) => Ok(true),
            Err(TransportError::Fault(raw)) => {
                match self.map_error(raw, ErrorContext::default()) {
                    ProviderError::InvalidCredentials { raw_message, .. }
                    | ProviderError::PermissionDenied { raw_message, .. } => {
                        log::warn!(
                            "[{PROVIDER_ID}] Credential validation failed: {}",
                            raw_message.unwrap_or_default()
                        );
                        Ok(false)
                    }
                    other => Err(other),
                }
            }
            Err(TransportError::Failed(e)) => Err(e),
        }
    }
}

/// Registrar names are relative with `""` for the apex.
fn kas_name_to_relative(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        "@".to_string()
    } else {
        name.to_string()
    }
}

fn relative_to_kas_name(name: &str) -> &str {
    if name == "@" { "" } else { name }
}

fn zone_context(zone_host: &str, record: Option<&Record>) -> ErrorContext {
    ErrorContext {
        record: record.map(ToString::to_string),
        zone: Some(zone_host.to_string()),
    }
}
