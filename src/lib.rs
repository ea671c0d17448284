//! An event-driven adapter between a CloudEvents broker and a TensorFlow
//! Serving style inference endpoint. Inbound events carry a base 64 image,
//! which is forwarded as a prediction request; the prediction (or a
//! description of what went wrong) is sent back as a new event.

pub mod emitter;
pub mod error;
pub mod event;
pub mod protocol;
pub mod receiver;
pub mod server;
pub mod settings;
pub mod tensorflow;

/// Event type identifiers
pub mod types {
    /// The only event type the receiver accepts
    pub const TENSFORMATION_EVENT: &str = "io.triggermesh.transformations.tensformation.response";

    /// Type of a successful reply
    pub const RESPONSE_EVENT: &str = "io.triggermesh.transformations.tensorflowrequest.response";

    /// Type of an error reply
    pub const ERROR_EVENT: &str = "io.triggermesh.transformations.tensorflowrequest.response.error";
}
