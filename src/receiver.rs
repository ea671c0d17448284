//! The event translation: validate the inbound event, ask the model for a
//! prediction, and wrap the answer (or the failure) in a reply event.

use crate::emitter;
use crate::error::{DataError, FatalEncodingError, ReceiveError};
use crate::event::CloudEvent;
use crate::protocol::InboundRequest;
use crate::tensorflow::TensorflowClient;
use crate::types::TENSFORMATION_EVENT;
use tracing::{info, warn};

/// Handles inbound events. Holds nothing mutable, so one instance is shared by
/// every request.
#[derive(Debug, Clone)]
pub struct Receiver {
    client: TensorflowClient,
}

impl Receiver {
    pub fn new(client: TensorflowClient) -> Self {
        Receiver { client }
    }

    /// Translate one inbound event into exactly one reply event. Only a
    /// failure to encode the error reply itself escapes as an `Err`.
    #[tracing::instrument(skip_all, fields(id = %event.id))]
    pub async fn receive(&self, event: &CloudEvent) -> Result<CloudEvent, FatalEncodingError> {
        info!("processing event from source {:?}", event.source);

        match self.translate(event).await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                match &err {
                    ReceiveError::WrongEventType { found } => {
                        warn!(source_tag = err.source_tag(), "wrong event type {found:?}")
                    }
                    ReceiveError::InferenceCallFailed { stage, cause } => warn!(
                        source_tag = err.source_tag(),
                        "inference call failed at {stage}: {cause:#}"
                    ),
                    _ => warn!(source_tag = err.source_tag(), "{err}"),
                }
                emitter::error_event(&err)
            }
        }
    }

    async fn translate(&self, event: &CloudEvent) -> Result<CloudEvent, ReceiveError> {
        let req = validate(event)?;
        let prediction = self.client.predict(&req.b64_image).await?;
        Ok(emitter::response_event(&req.source_url, prediction))
    }
}

/// Check the event type and decode the request it carries
pub fn validate(event: &CloudEvent) -> Result<InboundRequest, ReceiveError> {
    if event.ty != TENSFORMATION_EVENT {
        return Err(ReceiveError::WrongEventType {
            found: event.ty.clone(),
        });
    }

    let req = event.data_as::<InboundRequest>()?;
    if req.source_url.is_empty() {
        return Err(DataError::EmptyUrl.into());
    }

    Ok(req)
}
