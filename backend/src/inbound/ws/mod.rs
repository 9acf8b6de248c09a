//! WebSocket inbound adapter streaming case change events to dashboards.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list, authenticated session)
//! - initialise the per-connection feed handler
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, warn};
use url::Url;

use crate::inbound::http::session::SessionContext;

mod session;

pub mod messages;
pub mod state;

/// Handle WebSocket upgrade for the `/ws` endpoint.
///
/// Requires an authenticated session and an allow-listed `Origin` header.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    session: SessionContext,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    session.require_caller()?;

    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(origin_header, &state.allowed_origins)?;

    let (response, feed_session, message_stream) = actix_ws::handle(&req, stream)?;
    actix_web::rt::spawn(session::handle_feed_session(
        state.events.clone(),
        feed_session,
        message_stream,
    ));
    Ok(response)
}

fn validate_origin(origin_header: &HeaderValue, allowed: &[Url]) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(parse_error) => {
            error!(error = %parse_error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|parse_error| {
        error!(error = %parse_error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if is_allowed_origin(&origin, allowed) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

/// Returns true when a parsed Origin matches an allow-list entry on scheme,
/// host, and effective port.
fn is_allowed_origin(origin: &Url, allowed: &[Url]) -> bool {
    allowed.iter().any(|entry| {
        entry.scheme() == origin.scheme()
            && entry.host_str() == origin.host_str()
            && entry.port_or_known_default() == origin.port_or_known_default()
    })
}
