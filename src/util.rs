//! Shared helpers for request parsing and day arithmetic.

use axum::http::HeaderMap;

use crate::models::DaysRemaining;

pub const SECONDS_PER_DAY: i64 = 86400;

/// Expiry timestamp `days` days after `base_time`; zero or negative days
/// means the entity never expires.
pub fn expiry_from_days(base_time: i64, days: i64) -> Option<i64> {
    (days > 0).then(|| base_time + days * SECONDS_PER_DAY)
}

/// Whole days left before `expires_at`, rounded down.
pub fn days_remaining(now: i64, expires_at: Option<i64>) -> DaysRemaining {
    match expires_at {
        Some(exp) => DaysRemaining::Days((exp - now).div_euclid(SECONDS_PER_DAY)),
        None => DaysRemaining::NoLimit,
    }
}

/// Client IP from proxy headers, `x-forwarded-for` first then `x-real-ip`.
/// Only the first hop of `x-forwarded-for` is used.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token without the "Bearer " prefix, or None if the header is
/// missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
