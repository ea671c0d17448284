//! Builds the reply events

use crate::error::{FatalEncodingError, ReceiveError};
use crate::event::{CloudEvent, APPLICATION_JSON};
use crate::types::{ERROR_EVENT, RESPONSE_EVENT};

/// Wrap an inference response, byte for byte. `source` is the url the caller
/// sent along with the image.
pub fn response_event(source: &str, prediction: Vec<u8>) -> CloudEvent {
    let mut event = CloudEvent::new(RESPONSE_EVENT, source);
    event.set_data(APPLICATION_JSON, prediction);
    event
}

/// Report a failure. The message becomes the event data as a JSON string and
/// the failing stage becomes the source.
pub fn error_event(err: &ReceiveError) -> Result<CloudEvent, FatalEncodingError> {
    let mut event = CloudEvent::new(ERROR_EVENT, err.source_tag());
    let message = serde_json::to_vec(&err.to_string()).map_err(|e| FatalEncodingError(e.into()))?;
    event.set_data(APPLICATION_JSON, message);
    Ok(event)
}
