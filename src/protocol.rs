//! Wire formats of the inbound event data and the inference endpoint

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Data of an inbound tensformation event
#[derive(Deserialize, Clone, PartialEq)]
pub struct InboundRequest {
    /// The base 64 encoded image
    #[serde(rename = "b64")]
    pub b64_image: String,

    /// Where the image came from. Reused as the source of the reply
    #[serde(rename = "url")]
    pub source_url: String,
}

impl Debug for InboundRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "InboundRequest {{ b64: <{} bytes>, url: {:?} }}",
            self.b64_image.len(),
            self.source_url
        )
    }
}

/// A single input to the model
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Instance<'a> {
    pub b64: &'a str,
}

/// Body of a `:predict` request
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PredictRequest<'a> {
    pub instances: Vec<Instance<'a>>,
}

impl<'a> PredictRequest<'a> {
    /// A request for exactly one image
    pub fn single(b64_image: &'a str) -> Self {
        PredictRequest {
            instances: vec![Instance { b64: b64_image }],
        }
    }
}

/// Body of a `:predict` response from an object detection model. The receiver
/// forwards responses verbatim; this is only decoded for diagnostics.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// Detections for one instance
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Prediction {
    pub num_detections: f64,
    pub detection_boxes: Vec<Vec<f64>>,
    pub raw_detection_boxes: Vec<Vec<f64>>,
    pub detection_scores: Vec<f64>,
    pub raw_detection_scores: Vec<Vec<f64>>,
    pub detection_multiclass_scores: Vec<Vec<f64>>,
}
