//! # Request Span Middleware
//!
//! Runs every request inside its own `tracing` span so that repository
//! logs can be tied back to the request that caused them.
//!
//! ```text
//! request{request_id=6f1c.. method=POST path=/sales}
//!   ├── DEBUG liquor_db::repository::sale: Creating sale
//!   ├── INFO  liquor_db::repository::sale: Sale recorded
//!   └── INFO  liquor_api::middleware: Request completed status=201
//! ```
//!
//! The id is echoed back in the `x-request-id` response header.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::Error;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wraps the rest of the chain in `info_span!("request", ..)`.
///
/// Register with `actix_web::middleware::from_fn(request_span)`.
pub async fn request_span(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.path(),
    );

    async move {
        let started = Instant::now();
        let mut res = next.call(req).await?;

        info!(
            status = res.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );

        let value = HeaderValue::from_str(&request_id.to_string())
            .map_err(actix_web::error::ErrorInternalServerError)?;
        res.headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);

        Ok(res)
    }
    .instrument(span)
    .await
}
