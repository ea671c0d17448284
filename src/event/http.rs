//! The CloudEvents HTTP protocol binding, binary and structured content modes

use super::{is_json, CloudEvent, SPEC_VERSION};
use actix_web::http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use actix_web::HttpResponse;
use anyhow::Context;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

/// Media type of a structured mode event
pub const CLOUDEVENTS_JSON: &str = "application/cloudevents+json";

/// Characters escaped in `ce-` header values: space, double quote, percent,
/// and everything outside printable ASCII
const HEADER_ESCAPES: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'%');

/// How the event was laid out on the wire. Replies use the same mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Attributes in `ce-` headers, data in the body
    Binary,

    /// The whole event as a JSON document
    Structured,
}

/// The request is not a well-formed CloudEvent
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("missing required attribute {0:?}")]
    MissingAttribute(&'static str),

    #[error("unsupported specversion {0:?}")]
    SpecVersion(String),

    #[error("attribute {0:?} is not valid text")]
    InvalidHeader(&'static str),

    #[error("attribute {0:?} is not valid percent-encoded UTF-8")]
    InvalidEncoding(&'static str),

    #[error("invalid time attribute: {0}")]
    Time(#[from] chrono::ParseError),

    #[error("invalid structured event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid data_base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Deserialize)]
struct StructuredIn {
    specversion: Option<String>,
    id: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
    source: Option<String>,
    time: Option<String>,
    datacontenttype: Option<String>,
    data: Option<Box<RawValue>>,
    data_base64: Option<String>,
}

#[derive(Serialize)]
struct StructuredOut<'a> {
    specversion: &'static str,
    id: &'a str,
    #[serde(rename = "type")]
    ty: &'a str,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datacontenttype: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_base64: Option<String>,
}

/// Decode an inbound HTTP request into an event
pub fn read_event(headers: &HeaderMap, body: &[u8]) -> Result<(CloudEvent, Mode), FormatError> {
    let content_type = header(headers, CONTENT_TYPE.as_str(), "datacontenttype")?;

    match content_type {
        Some(ct) if is_structured(ct) => Ok((read_structured(body)?, Mode::Structured)),
        _ => Ok((read_binary(headers, content_type, body)?, Mode::Binary)),
    }
}

/// Encode an event as the HTTP reply
pub fn write_event(event: &CloudEvent, mode: Mode) -> anyhow::Result<HttpResponse> {
    let time = event
        .time
        .map(|time| time.to_rfc3339_opts(SecondsFormat::AutoSi, true));

    match mode {
        Mode::Binary => {
            let mut res = HttpResponse::Ok();
            res.insert_header(("ce-specversion", SPEC_VERSION))
                .insert_header(("ce-id", attribute_value(&event.id)))
                .insert_header(("ce-type", attribute_value(&event.ty)))
                .insert_header(("ce-source", attribute_value(&event.source)));
            if let Some(time) = time {
                res.insert_header(("ce-time", attribute_value(&time)));
            }
            if let Some(content_type) = &event.datacontenttype {
                res.insert_header((CONTENT_TYPE, header_value(content_type, "datacontenttype")?));
            }

            Ok(res.body(event.data.clone().unwrap_or_default()))
        }
        Mode::Structured => {
            let json_data = event
                .datacontenttype
                .as_deref()
                .map_or(true, is_json);

            // Data that claims to be JSON but is not goes out as base 64
            let (data, data_base64) = match &event.data {
                Some(data) => match serde_json::from_slice::<&RawValue>(data) {
                    Ok(raw) if json_data => (Some(raw), None),
                    _ => (None, Some(general_purpose::STANDARD.encode(data))),
                },
                None => (None, None),
            };

            let body = serde_json::to_vec(&StructuredOut {
                specversion: SPEC_VERSION,
                id: &event.id,
                ty: &event.ty,
                source: &event.source,
                time,
                datacontenttype: event.datacontenttype.as_deref(),
                data,
                data_base64,
            })?;

            Ok(HttpResponse::Ok()
                .insert_header((CONTENT_TYPE, CLOUDEVENTS_JSON))
                .body(body))
        }
    }
}

fn is_structured(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .eq_ignore_ascii_case(CLOUDEVENTS_JSON)
}

fn read_binary(
    headers: &HeaderMap,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<CloudEvent, FormatError> {
    let attribute = |name: &'static str| -> Result<Option<String>, FormatError> {
        header(headers, &format!("ce-{name}"), name)?
            .map(|value| decode_attribute(value, name))
            .transpose()
    };

    let specversion = attribute("specversion")?;
    check_spec_version(required(specversion.as_deref(), "specversion")?)?;

    Ok(CloudEvent {
        id: required(attribute("id")?.as_deref(), "id")?.to_string(),
        source: required(attribute("source")?.as_deref(), "source")?.to_string(),
        ty: required(attribute("type")?.as_deref(), "type")?.to_string(),
        time: attribute("time")?.as_deref().map(parse_time).transpose()?,
        datacontenttype: content_type.map(str::to_string),
        data: (!body.is_empty()).then(|| body.to_vec()),
    })
}

fn read_structured(body: &[u8]) -> Result<CloudEvent, FormatError> {
    let event: StructuredIn = serde_json::from_slice(body)?;

    let specversion = required(event.specversion.as_deref(), "specversion")?;
    check_spec_version(specversion)?;

    let data = match (event.data_base64, event.data) {
        (Some(encoded), _) => Some(general_purpose::STANDARD.decode(encoded)?),
        (None, Some(raw)) => Some(structured_data(&raw, event.datacontenttype.as_deref())),
        (None, None) => None,
    };

    Ok(CloudEvent {
        id: event.id.ok_or(FormatError::MissingAttribute("id"))?,
        source: event.source.ok_or(FormatError::MissingAttribute("source"))?,
        ty: event.ty.ok_or(FormatError::MissingAttribute("type"))?,
        time: event.time.as_deref().map(parse_time).transpose()?,
        datacontenttype: event.datacontenttype,
        data,
    })
}

/// Non-JSON data embedded as a JSON string is unwrapped to its text
fn structured_data(raw: &RawValue, content_type: Option<&str>) -> Vec<u8> {
    if content_type.is_some_and(|ct| !is_json(ct)) {
        if let Ok(text) = serde_json::from_str::<String>(raw.get()) {
            return text.into_bytes();
        }
    }
    raw.get().as_bytes().to_vec()
}

fn header<'a>(
    headers: &'a HeaderMap,
    name: &str,
    attribute: &'static str,
) -> Result<Option<&'a str>, FormatError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| FormatError::InvalidHeader(attribute))
        })
        .transpose()
}

fn required<'a>(value: Option<&'a str>, attribute: &'static str) -> Result<&'a str, FormatError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or(FormatError::MissingAttribute(attribute))
}

fn check_spec_version(specversion: &str) -> Result<(), FormatError> {
    if specversion != SPEC_VERSION {
        return Err(FormatError::SpecVersion(specversion.to_string()));
    }
    Ok(())
}

fn parse_time(time: &str) -> Result<DateTime<Utc>, FormatError> {
    Ok(DateTime::parse_from_rfc3339(time)?.with_timezone(&Utc))
}

/// Percent-encode an attribute for a `ce-` header. The result is always
/// printable ASCII.
fn attribute_value(value: &str) -> String {
    utf8_percent_encode(value, HEADER_ESCAPES).to_string()
}

fn decode_attribute(value: &str, attribute: &'static str) -> Result<String, FormatError> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| FormatError::InvalidEncoding(attribute))
}

fn header_value(value: &str, attribute: &str) -> anyhow::Result<HeaderValue> {
    HeaderValue::from_str(value).with_context(|| format!("{attribute} is not a valid header value"))
}
