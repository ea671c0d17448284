//! Client for a TensorFlow Serving style REST `:predict` endpoint

use crate::error::{CallStage, ReceiveError};
use crate::protocol::{PredictRequest, PredictResponse};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{debug, enabled, warn, Level};

/// Sends prediction requests to one fixed endpoint. Cheap to share: the
/// underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct TensorflowClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl TensorflowClient {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        TensorflowClient { http, endpoint }
    }

    /// Request a prediction for one base 64 image and return the raw response
    /// body. The status code is not checked: whatever the server answers is
    /// handed back.
    pub async fn predict(&self, b64_image: &str) -> Result<Vec<u8>, ReceiveError> {
        let body = serde_json::to_vec(&PredictRequest::single(b64_image))
            .map_err(|e| ReceiveError::call_failed(CallStage::Marshal, e))?;

        let request = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .build()
            .map_err(|e| ReceiveError::call_failed(CallStage::BuildRequest, e))?;

        debug!("sending prediction request to {}", self.endpoint);
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ReceiveError::call_failed(CallStage::Send, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("inference endpoint answered {status}, forwarding the body anyway");
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ReceiveError::call_failed(CallStage::ReadBody, e))?;

        if enabled!(Level::DEBUG) {
            if let Ok(res) = serde_json::from_slice::<PredictResponse>(&body) {
                debug!("received {} predictions", res.predictions.len());
            }
        }

        Ok(body.to_vec())
    }
}
