//! Failures of the event translation. Every `ReceiveError` is turned into an
//! error event; `FatalEncodingError` is the only failure that reaches the
//! transport as an HTTP error.

use std::fmt;
use thiserror::Error;

/// Which part of the inference call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStage {
    /// Serializing the request body
    Marshal,

    /// Building the HTTP request
    BuildRequest,

    /// Sending the request and waiting for the response head
    Send,

    /// Reading the response body
    ReadBody,
}

impl fmt::Display for CallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            CallStage::Marshal => "marshal",
            CallStage::BuildRequest => "build request",
            CallStage::Send => "send",
            CallStage::ReadBody => "read body",
        };
        f.write_str(stage)
    }
}

/// Why the data of an event could not be decoded
#[derive(Error, Debug)]
pub enum DataError {
    #[error("event has no data")]
    Missing,

    #[error("unsupported data content type {0:?}")]
    ContentType(String),

    #[error("url must not be empty")]
    EmptyUrl,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ReceiveError {
    /// The inbound event is not a tensformation response
    #[error("wrong event type")]
    WrongEventType { found: String },

    /// The inbound data does not decode into a request
    #[error("{0}")]
    Unmarshaling(#[from] DataError),

    /// Any failure talking to the inference endpoint
    #[error("{cause:#}")]
    InferenceCallFailed {
        stage: CallStage,
        cause: anyhow::Error,
    },

    /// The reply carrying the inference response could not be written
    #[error("{0:#}")]
    DataEncoding(anyhow::Error),
}

impl ReceiveError {
    pub(crate) fn call_failed(stage: CallStage, cause: impl Into<anyhow::Error>) -> Self {
        ReceiveError::InferenceCallFailed {
            stage,
            cause: cause.into(),
        }
    }

    /// The source attribute of the error event reporting this failure
    pub fn source_tag(&self) -> &'static str {
        match self {
            ReceiveError::WrongEventType { .. } => "wrongEventType",
            ReceiveError::Unmarshaling(_) => "unmarshalingEvent",
            ReceiveError::InferenceCallFailed { .. } => "requestingFromTensorflow",
            ReceiveError::DataEncoding(_) => "settingCEData",
        }
    }
}

/// Not even the error event could be encoded
#[derive(Error, Debug)]
#[error("setting cloudevent response data")]
pub struct FatalEncodingError(pub anyhow::Error);
