//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tiny_http::{Response, StatusCode};

use crate::export;
use crate::inspector::{InspectorSession, PayloadKind, sniff};

use super::content_type_json;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// `POST /api/inspect` request body.
#[derive(Deserialize)]
struct InspectRequest {
    /// The raw captured payload, verbatim.
    payload: String,
    /// Optional shape override: `request`, `response`, `streaming-response`.
    /// Anything else (or absent) means sniff it.
    #[serde(default)]
    kind: Option<String>,
    /// Show messages newest-first (request inspections only).
    #[serde(default)]
    newest_first: bool,
}

/// `POST /api/inspect` response.
#[derive(Serialize)]
struct InspectResponse {
    kind: &'static str,
    /// Rendered section-tree fragment, ready to mount.
    html: String,
    /// The parsed model for programmatic consumers.
    model: Value,
}

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Build a JSON error response with the given status.
fn error_response(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

fn kind_override(kind: Option<&str>) -> Option<PayloadKind> {
    match kind {
        Some("request") => Some(PayloadKind::Request),
        Some("response") => Some(PayloadKind::Response),
        Some("streaming-response") | Some("streaming") => Some(PayloadKind::StreamingResponse),
        _ => None,
    }
}

fn build_session(body: &InspectRequest) -> InspectorSession {
    let mut session = match kind_override(body.kind.as_deref()) {
        Some(kind) => InspectorSession::inspect_as(&body.payload, kind),
        None => InspectorSession::inspect(&body.payload),
    };
    session.set_newest_first(body.newest_first);
    session
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `POST /api/inspect` — parse a payload and return the rendered fragment
/// plus the model.
pub fn post_inspect(body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let Ok(request) = serde_json::from_str::<InspectRequest>(body) else {
        return Ok(error_response(400, "body must be JSON with a `payload` string"));
    };

    let session = build_session(&request);
    json_response(&InspectResponse {
        kind: session.kind.as_str(),
        html: session.render_html(),
        model: session.model_json(),
    })
}

/// `POST /api/export` — parse a payload and return its analysis document.
pub fn post_export(body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let Ok(request) = serde_json::from_str::<InspectRequest>(body) else {
        return Ok(error_response(400, "body must be JSON with a `payload` string"));
    };

    let session = build_session(&request);
    match export::analysis_document(&session) {
        Some(document) => json_response(&document),
        None => Ok(error_response(422, "payload shape not recognized")),
    }
}

/// `POST /api/detect` — sniff a raw payload's shape.
pub fn post_detect(body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&serde_json::json!({
        "kind": sniff::detect(body).as_str(),
    }))
}

/// `GET /api/health` — liveness and version.
pub fn get_health() -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
