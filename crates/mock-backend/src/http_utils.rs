// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::{
    header,
    http::{self, HeaderMap},
    Response, StatusCode,
};
use serde_json::json;
use tracing::{debug, error};

/// Request body type handled by the server: the real `hyper` incoming body
/// in production, or a fixed buffer in tests.
pub type RequestBody = BoxBody<Bytes, hyper::Error>;
pub type HttpRequest = hyper::Request<RequestBody>;
pub type HttpResponse = hyper::Response<Full<Bytes>>;

/// Wraps a live connection body for the request pipeline.
pub fn incoming_body(body: hyper::body::Incoming) -> RequestBody {
    body.boxed()
}

/// Wraps a fixed byte payload in the request body type, for constructing
/// requests outside of a real connection.
pub fn request_body_from(bytes: impl Into<Bytes>) -> RequestBody {
    Full::new(bytes.into()).map_err(|never| match never {}).boxed()
}

/// Current time as an RFC 3339 UTC string with microsecond precision; every
/// response body carries one of these.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serializes `body` with the headers every endpoint shares: JSON content
/// type and a permissive CORS origin. `Content-Length` is derived from the
/// fixed body by hyper.
pub fn json_response(status: StatusCode, body: &serde_json::Value) -> http::Result<HttpResponse> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .body(Full::new(Bytes::from(body.to_string())))
}

/// Does two things:
/// 1. Logs the given message at error level.
/// 2. Returns the message in a JSON error body with the given status code.
///
/// Response body format:
/// {
///     "error": message,
///     "status_code": status,
///     "timestamp": "<RFC 3339 UTC>"
/// }
pub fn log_and_create_error_response(
    message: &str,
    status: StatusCode,
) -> http::Result<HttpResponse> {
    error!("Error {}: {message}", status.as_u16());
    let body = json!({
        "error": message,
        "status_code": status.as_u16(),
        "timestamp": now_rfc3339(),
    });
    json_response(status, &body)
}

/// Takes a request's header map and verifies that the "content-length"
/// header is present, parsable, non-zero and within `max_content_length`.
///
/// Returns None if no issues are found. Otherwise returns the error
/// response to send back. A request with a "transfer-encoding" header and
/// no content length is let through; the collected body is checked for
/// emptiness later.
pub fn verify_request_content_length(
    header_map: &HeaderMap,
    max_content_length: usize,
) -> Option<http::Result<HttpResponse>> {
    let content_length_header = match header_map.get(header::CONTENT_LENGTH) {
        Some(res) => res,
        None => {
            if let Some(transfer_encoding_header) = header_map.get(header::TRANSFER_ENCODING) {
                debug!(
                    "Transfer-Encoding header is present: {:?}",
                    transfer_encoding_header
                );
                return None;
            }
            return Some(log_and_create_error_response(
                "Empty request body",
                StatusCode::BAD_REQUEST,
            ));
        }
    };
    let content_length = match content_length_header
        .to_str()
        .ok()
        .and_then(|header| header.parse::<usize>().ok())
    {
        Some(res) => res,
        None => {
            return Some(log_and_create_error_response(
                "Invalid Content-Length header",
                StatusCode::BAD_REQUEST,
            ));
        }
    };
    if content_length == 0 {
        return Some(log_and_create_error_response(
            "Empty request body",
            StatusCode::BAD_REQUEST,
        ));
    }
    if content_length > max_content_length {
        return Some(log_and_create_error_response(
            "Payload too large",
            StatusCode::PAYLOAD_TOO_LARGE,
        ));
    }
    None
}
