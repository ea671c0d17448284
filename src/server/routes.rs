//! The HTTP face of the receiver. Events are posted to `/` using the
//! CloudEvents HTTP binding and the reply event is written back in the
//! response.

use super::WebError;
use crate::emitter;
use crate::error::{FatalEncodingError, ReceiveError};
use crate::event::http::{read_event, write_event, Mode};
use crate::event::CloudEvent;
use crate::receiver::Receiver;
use crate::types::ERROR_EVENT;
use actix_web::{post, web, HttpRequest, HttpResponse};
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, WebError>;

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(receive);
}

#[post("/")]
pub async fn receive(
    req: HttpRequest,
    body: web::Bytes,
    receiver: web::Data<Receiver>,
) -> Result<HttpResponse> {
    let (event, mode) = read_event(req.headers(), &body)?;
    debug!("received {mode:?} mode event {} of type {:?}", event.id, event.ty);

    let reply = receiver.receive(&event).await?;

    respond(&reply, mode)
}

/// Write the reply event. A prediction that cannot be written is replaced by
/// a `settingCEData` error event; an error event that cannot be written is
/// fatal.
fn respond(reply: &CloudEvent, mode: Mode) -> Result<HttpResponse> {
    if reply.ty == ERROR_EVENT {
        return Ok(write_event(reply, mode).map_err(FatalEncodingError)?);
    }

    match write_event(reply, mode) {
        Ok(res) => Ok(res),
        Err(err) => {
            let err = ReceiveError::DataEncoding(err);
            warn!(source_tag = err.source_tag(), "{err}");
            let fallback = emitter::error_event(&err)?;
            Ok(write_event(&fallback, mode).map_err(FatalEncodingError)?)
        }
    }
}
