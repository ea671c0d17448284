//! A minimal CloudEvents 1.0 envelope and its HTTP protocol binding

use crate::error::DataError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub mod http;

pub const SPEC_VERSION: &str = "1.0";

pub const APPLICATION_JSON: &str = "application/json";

/// A structured event. Extension attributes are not carried.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudEvent {
    pub id: String,
    pub source: String,
    pub ty: String,
    pub time: Option<DateTime<Utc>>,
    pub datacontenttype: Option<String>,
    pub data: Option<Vec<u8>>,
}

impl CloudEvent {
    /// A new event with a random id, stamped with the current time
    pub fn new(ty: impl Into<String>, source: impl Into<String>) -> Self {
        CloudEvent {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            ty: ty.into(),
            time: Some(Utc::now()),
            datacontenttype: None,
            data: None,
        }
    }

    /// Attach the event data. The bytes are kept as-is and not checked
    /// against `content_type`.
    pub fn set_data(&mut self, content_type: &str, data: Vec<u8>) {
        self.datacontenttype = Some(content_type.to_string());
        self.data = Some(data);
    }

    /// Decode the event data as JSON. An absent content type is treated as
    /// JSON.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, DataError> {
        if let Some(content_type) = &self.datacontenttype {
            if !is_json(content_type) {
                return Err(DataError::ContentType(content_type.clone()));
            }
        }

        let data = self
            .data
            .as_deref()
            .filter(|data| !data.is_empty())
            .ok_or(DataError::Missing)?;

        Ok(serde_json::from_slice(data)?)
    }
}

/// Whether a media type carries JSON, ignoring parameters
pub fn is_json(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == APPLICATION_JSON || mime == "text/json" || mime.ends_with("+json")
}
