//! KAS SOAP envelope encoding and decoding
//!
//! Requests carry a JSON document inside `<Params>`; responses encode values as
//! apache `Map` structures (`item/key/value`) and SOAP arrays. Decoded responses are
//! turned into `serde_json::Value` trees whose scalars are always strings.

use std::time::Duration;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::traits::RawApiError;

/// Upper bound for a `KasFloodDelay`; larger values are clamped.
pub(crate) const MAX_FLOOD_DELAY: Duration = Duration::from_secs(60);

/// Decoded SOAP response body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SoapResponse {
    /// Content of the operation's `<return>` element.
    Return(Value),
    /// A SOAP fault; `faultstring` is the KAS error code.
    Fault(RawApiError),
}

/// Result of a `KasApi` call, extracted from its `<return>` map.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KasApiReturn {
    /// `Response/ReturnInfo`.
    pub return_info: Value,
    /// `Response/KasFloodDelay`: wait before the next call.
    pub flood_delay: Option<Duration>,
}

/// Wraps a JSON parameter document into a SOAP envelope for `operation`
/// (`KasAuth` or `KasApi`).
pub(crate) fn encode_request(operation: &str, params: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:ns1="https://kasserver.com/">"#,
            "<soapenv:Header/><soapenv:Body><ns1:{op}><Params>{params}</Params></ns1:{op}>",
            "</soapenv:Body></soapenv:Envelope>"
        ),
        op = operation,
        params = escape(params),
    )
}

/// Decodes a SOAP response document.
///
/// Returns a description of the problem when the document is not a SOAP response.
pub(crate) fn decode_response(xml: &str) -> Result<SoapResponse, String> {
    let root = parse_tree(xml)?;
    let body = root
        .find("Body")
        .ok_or_else(|| "missing SOAP Body".to_string())?;

    if let Some(fault) = body.child("Fault") {
        let code = fault
            .child("faultstring")
            .map(|n| n.text.trim().to_string())
            .unwrap_or_default();
        let actor = fault
            .child("faultactor")
            .map(|n| n.text.trim().to_string())
            .unwrap_or_default();
        let message = if actor.is_empty() {
            code.clone()
        } else {
            format!("{code} ({actor})")
        };
        return Ok(SoapResponse::Fault(RawApiError::with_code(code, message)));
    }

    let response = body
        .children
        .first()
        .ok_or_else(|| "empty SOAP Body".to_string())?;
    let ret = response
        .child("return")
        .ok_or_else(|| format!("missing return element in {}", response.name))?;
    Ok(SoapResponse::Return(ret.to_value()))
}

/// Splits the `<return>` map of a `KasApi` call.
pub(crate) fn split_api_return(value: Value) -> Result<KasApiReturn, String> {
    let Value::Object(mut map) = value else {
        return Err("KasApi return is not a map".to_string());
    };
    let Some(Value::Object(mut response)) = map.remove("Response") else {
        return Err("KasApi return lacks a Response map".to_string());
    };

    let flood_delay = response
        .get("KasFloodDelay")
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(|secs| Duration::from_secs_f64(secs.min(MAX_FLOOD_DELAY.as_secs_f64())));

    Ok(KasApiReturn {
        return_info: response.remove("ReturnInfo").unwrap_or(Value::Null),
        flood_delay,
    })
}

/// Minimal element tree; namespaces are dropped, only local names are kept.
#[derive(Debug, Default)]
struct XmlNode {
    name: String,
    xsi_type: Option<String>,
    nil: bool,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn open(start: &BytesStart<'_>) -> Result<Self, String> {
        let mut node = Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        };
        for attr in start.attributes() {
            let attr = attr.map_err(|e| format!("invalid attribute: {e}"))?;
            let value = attr
                .unescape_value()
                .map_err(|e| format!("invalid attribute value: {e}"))?;
            match attr.key.local_name().as_ref() {
                b"type" => node.xsi_type = Some(value.into_owned()),
                b"nil" => node.nil = value == "true",
                _ => {}
            }
        }
        Ok(node)
    }

    fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    fn find(&self, name: &str) -> Option<&Self> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    fn has_type(&self, suffix: &str) -> bool {
        self.xsi_type
            .as_deref()
            .is_some_and(|t| t.rsplit(':').next() == Some(suffix))
    }

    fn to_value(&self) -> Value {
        if self.nil {
            return Value::Null;
        }
        if self.children.is_empty() {
            return if self.has_type("Map") {
                Value::Object(Map::new())
            } else if self.has_type("Array") {
                Value::Array(Vec::new())
            } else {
                Value::String(self.text.clone())
            };
        }

        let is_map = !self.has_type("Array")
            && self
                .children
                .iter()
                .all(|c| c.name == "item" && c.child("key").is_some());
        if is_map {
            let mut map = Map::new();
            for item in &self.children {
                let key = item.child("key").map(|k| k.text.clone()).unwrap_or_default();
                let value = item.child("value").map_or(Value::Null, Self::to_value);
                map.insert(key, value);
            }
            Value::Object(map)
        } else {
            Value::Array(self.children.iter().map(Self::to_value).collect())
        }
    }
}

fn parse_tree(xml: &str) -> Result<XmlNode, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // stack[0] is a synthetic document node
    let mut stack = vec![XmlNode::default()];
    loop {
        match reader
            .read_event()
            .map_err(|e| format!("malformed XML at {}: {e}", reader.buffer_position()))?
        {
            Event::Start(start) => stack.push(XmlNode::open(&start)?),
            Event::Empty(start) => {
                let node = XmlNode::open(&start)?;
                current(&mut stack)?.children.push(node);
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .filter(|_| !stack.is_empty())
                    .ok_or_else(|| "unbalanced closing tag".to_string())?;
                current(&mut stack)?.children.push(node);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| format!("invalid text content: {e}"))?;
                current(&mut stack)?.text.push_str(&text);
            }
            Event::CData(data) => {
                let data = data.into_inner();
                current(&mut stack)?
                    .text
                    .push_str(&String::from_utf8_lossy(&data));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err("unexpected end of document".to_string()),
    }
}

fn current(stack: &mut [XmlNode]) -> Result<&mut XmlNode, String> {
    stack
        .last_mut()
        .ok_or_else(|| "unbalanced document".to_string())
}
