//! Shared test utilities: an in-memory KAS registrar and assertion macros

#![allow(dead_code)]

use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use allinkl_dns_provider::{
    AllinklProvider, DnsRecordProvider, KasCredentials, KasTransport, RawApiError, Record,
    RecordData, TransportError, create_provider,
};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Skip the test when an environment variable is missing
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("Skipping test: missing environment variable {}", $var);
                return;
            }
        )+
    };
}

/// Assert that an `Option` is `Some` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert that a `Result` is `Ok` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Zone served by [`MockRegistrar`] (in `zone_host` form).
pub const MOCK_ZONE: &str = "example.com.";

/// A record held by [`MockRegistrar`], in registrar form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRecord {
    pub id: String,
    pub name: String,
    pub record_type: String,
    pub data: String,
    pub aux: u16,
    pub changeable: bool,
}

#[derive(Default)]
struct MockState {
    records: Vec<MockRecord>,
    next_id: u64,
    calls: Vec<String>,
    /// (action, 1-based call number of that action) -> fault code
    faults: HashMap<(String, usize), String>,
    login_fault: Option<String>,
}

/// In-memory stand-in for the KAS API.
///
/// Behaves like the registrar for the four DNS actions: record ids are assigned on
/// insert, unknown ids and zones produce faults, registrar-managed records reject
/// changes. Every action is recorded in a call log.
#[derive(Default)]
pub struct MockRegistrar {
    state: Mutex<MockState>,
}

impl MockRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a changeable record and returns its id.
    pub fn with_record(self, name: &str, record_type: &str, data: &str, aux: u16) -> Self {
        self.insert(name, record_type, data, aux, true);
        self
    }

    /// Seeds a registrar-managed (not changeable) record.
    pub fn with_locked_record(self, name: &str, record_type: &str, data: &str) -> Self {
        self.insert(name, record_type, data, 0, false);
        self
    }

    /// Makes the `nth` call (1-based) of `action` fail with the fault `code`.
    pub fn fail_nth(self, action: &str, nth: usize, code: &str) -> Self {
        self.lock()
            .faults
            .insert((action.to_string(), nth), code.to_string());
        self
    }

    /// Makes every login attempt fail with the fault `code`.
    pub fn reject_login(self, code: &str) -> Self {
        self.lock().login_fault = Some(code.to_string());
        self
    }

    pub fn records(&self) -> Vec<MockRecord> {
        self.lock().records.clone()
    }

    /// Actions received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Number of calls that changed records.
    pub fn mutations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.as_str() != "get_dns_settings")
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn insert(&self, name: &str, record_type: &str, data: &str, aux: u16, changeable: bool) {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id.to_string();
        state.records.push(MockRecord {
            id,
            name: name.to_string(),
            record_type: record_type.to_string(),
            data: data.to_string(),
            aux,
            changeable,
        });
    }
}

fn fault(code: &str) -> TransportError {
    RawApiError::with_code(code, format!("{code} (KasApi)")).into()
}

fn field(params: &Value, key: &str) -> String {
    match &params[key] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn require_field(params: &Value, key: &str) -> Result<String, TransportError> {
    if params.get(key).is_none() {
        return Err(fault("missing_parameter"));
    }
    Ok(field(params, key))
}

#[async_trait]
impl KasTransport for MockRegistrar {
    async fn call(&self, action: &str, params: Value) -> Result<Value, TransportError> {
        let mut state = self.lock();
        state.calls.push(action.to_string());
        let nth = state.calls.iter().filter(|c| c.as_str() == action).count();
        if let Some(code) = state.faults.get(&(action.to_string(), nth)) {
            return Err(fault(code));
        }

        match action {
            "get_dns_settings" => {
                if require_field(&params, "zone_host")? != MOCK_ZONE {
                    return Err(fault("zone_not_found"));
                }
                Ok(Value::Array(
                    state
                        .records
                        .iter()
                        .map(|r| {
                            json!({
                                "record_id": r.id,
                                "record_zone": MOCK_ZONE.trim_end_matches('.'),
                                "record_name": r.name,
                                "record_type": r.record_type,
                                "record_data": r.data,
                                "record_aux": r.aux.to_string(),
                                "record_changeable": if r.changeable { "Y" } else { "N" },
                            })
                        })
                        .collect(),
                ))
            }
            "add_dns_settings" => {
                if require_field(&params, "zone_host")? != MOCK_ZONE {
                    return Err(fault("zone_not_found"));
                }
                state.next_id += 1;
                let id = state.next_id.to_string();
                let record = MockRecord {
                    id: id.clone(),
                    name: require_field(&params, "record_name")?,
                    record_type: require_field(&params, "record_type")?,
                    data: require_field(&params, "record_data")?,
                    aux: field(&params, "record_aux").parse().unwrap_or(0),
                    changeable: true,
                };
                state.records.push(record);
                Ok(Value::String(id))
            }
            "update_dns_settings" => {
                let id = require_field(&params, "record_id")?;
                let record = state
                    .records
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| fault("record_id_not_found"))?;
                if !record.changeable {
                    return Err(fault("record_not_changeable"));
                }
                record.name = field(&params, "record_name");
                record.record_type = field(&params, "record_type");
                record.data = field(&params, "record_data");
                record.aux = field(&params, "record_aux").parse().unwrap_or(0);
                Ok(Value::String("TRUE".to_string()))
            }
            "delete_dns_settings" => {
                let id = require_field(&params, "record_id")?;
                let index = state
                    .records
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or_else(|| fault("record_id_not_found"))?;
                state.records.remove(index);
                Ok(Value::String("TRUE".to_string()))
            }
            other => Err(fault(&format!("{other}_unknown_action"))),
        }
    }

    async fn authenticate(&self) -> Result<(), TransportError> {
        match &self.lock().login_fault {
            Some(code) => Err(fault(code)),
            None => Ok(()),
        }
    }
}

/// A provider backed by `registrar`.
pub fn mock_provider(registrar: MockRegistrar) -> AllinklProvider<MockRegistrar> {
    AllinklProvider::with_transport(registrar)
}

pub fn record(name: &str, ttl_secs: u64, data: RecordData) -> Record {
    Record {
        name: name.to_string(),
        ttl: Duration::from_secs(ttl_secs),
        data,
    }
}

pub fn a(name: &str, address: &str) -> Record {
    record(
        name,
        3600,
        RecordData::A {
            address: address.parse().unwrap_or(std::net::Ipv4Addr::UNSPECIFIED),
        },
    )
}

pub fn txt(name: &str, text: &str) -> Record {
    record(
        name,
        3600,
        RecordData::TXT {
            text: text.to_string(),
        },
    )
}

/// Generate a unique test record name
pub fn generate_test_record_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}", &uuid.to_string()[..8])
}

/// Live test context - wraps the provider and the test zone
pub struct TestContext {
    pub provider: Arc<dyn DnsRecordProvider>,
    pub zone: String,
}

impl TestContext {
    /// Create a context from `KAS_USERNAME`, `KAS_PASSWORD` and `TEST_ZONE`
    pub fn allinkl() -> Option<Self> {
        let username = env::var("KAS_USERNAME").ok()?;
        let password = env::var("KAS_PASSWORD").ok()?;
        let zone = env::var("TEST_ZONE").ok()?;

        let provider = create_provider(KasCredentials::new(username, password)).ok()?;
        Some(Self { provider, zone })
    }
}
