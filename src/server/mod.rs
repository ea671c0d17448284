use crate::error::FatalEncodingError;
use crate::event::http::FormatError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use anyhow::anyhow;
use std::collections::HashMap;

pub mod routes;

/// An error answered with a JSON `{"errors": [...]}` body instead of an event
#[derive(Debug)]
pub struct WebError {
    err: anyhow::Error,
    status: StatusCode,
}

impl WebError {
    pub fn bad_request(err: impl Into<anyhow::Error>) -> Self {
        WebError {
            err: err.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.err)
    }
}

impl actix_web::error::ResponseError for WebError {
    fn error_response(&self) -> HttpResponse {
        let err = HashMap::from([("errors", vec![self.to_string()])]);

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(err)
    }

    fn status_code(&self) -> StatusCode {
        self.status
    }
}

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> WebError {
        WebError {
            err,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FormatError> for WebError {
    fn from(err: FormatError) -> Self {
        WebError::bad_request(err)
    }
}

impl From<FatalEncodingError> for WebError {
    fn from(err: FatalEncodingError) -> Self {
        WebError::from(anyhow!(err))
    }
}
