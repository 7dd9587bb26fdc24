//! JSON responses with cache headers
//!
//! The body is serialized through `serde_json::Value`, whose object keys are
//! sorted, so the ETag is a hash of the canonical form.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{ApiError, ApiResult};

/// `Cache-Control` per endpoint
pub mod cache {
    pub const HEALTH: &str = "public, max-age=5";
    pub const OVERVIEW: &str = "public, s-maxage=30, stale-while-revalidate=300";
    pub const CARD: &str = "public, s-maxage=20, stale-while-revalidate=300";
    pub const SUPERCARD: &str = "public, s-maxage=30, stale-while-revalidate=300";
    pub const REGIME: &str = "public, s-maxage=60, stale-while-revalidate=300";
    pub const FEAR_GREED: &str = "public, s-maxage=60, stale-while-revalidate=600";
    pub const PAPER: &str = "public, s-maxage=60, stale-while-revalidate=300";
    pub const ALERTS: &str = "public, s-maxage=30, stale-while-revalidate=120";
    pub const TELEMETRY: &str = "no-store";
}

/// Canonical JSON bytes of a payload
pub fn canonical_json<T: Serialize>(payload: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(payload)?;
    serde_json::to_vec(&value)
}

/// Strong ETag: quoted SHA-256 hex of the body
pub fn etag_for(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// Whether an `If-None-Match` header already names this ETag
fn matches_etag(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|tag| tag.trim())
        .any(|tag| tag == "*" || tag.trim_start_matches("W/") == etag)
}

/// Serialize `payload` with `Cache-Control` and `ETag`, answering `304` on a match
pub fn cached_json<T: Serialize>(
    headers: &HeaderMap,
    cache_control: &'static str,
    payload: &T,
) -> ApiResult<Response> {
    let body = canonical_json(payload)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize response: {}", e)))?;
    let etag = etag_for(&body);
    let etag_header = HeaderValue::from_str(&etag)
        .map_err(|e| ApiError::Internal(format!("Invalid ETag: {}", e)))?;

    let cache_headers = [
        (header::CACHE_CONTROL, HeaderValue::from_static(cache_control)),
        (header::ETAG, etag_header),
    ];

    if matches_etag(headers, &etag) {
        return Ok((StatusCode::NOT_MODIFIED, cache_headers).into_response());
    }

    Ok((
        StatusCode::OK,
        cache_headers,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        Body::from(body),
    )
        .into_response())
}
