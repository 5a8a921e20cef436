//! Rate limiting middleware using Redis fixed-window counters.
//!
//! Without a configured Redis the limits are not enforced.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS, RATE_LIMIT_REQUESTS,
    RATE_LIMIT_WINDOW_SECONDS,
};
use crate::errors::{AppError, ErrorResponse};

/// Rate limit error response
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));

        let error = AppError::TooManyRequests;
        let body = ErrorResponse {
            code: error.code().to_string(),
            message: error.user_message(),
        };

        (StatusCode::TOO_MANY_REQUESTS, headers, Json(body)).into_response()
    }
}

/// Extract client identifier for rate limiting.
/// Uses X-Forwarded-For header if behind proxy, otherwise uses connection IP.
fn get_client_identifier(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
    {
        // first hop is the original client
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
    {
        return real_ip.to_string();
    }

    if let Some(connect_info) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    "unknown".to_string()
}

struct Limit {
    scope: &'static str,
    max_requests: u64,
    window_seconds: u64,
}

const GENERAL: Limit = Limit {
    scope: "general",
    max_requests: RATE_LIMIT_REQUESTS,
    window_seconds: RATE_LIMIT_WINDOW_SECONDS,
};

const AUTH: Limit = Limit {
    scope: "auth",
    max_requests: RATE_LIMIT_AUTH_REQUESTS,
    window_seconds: RATE_LIMIT_AUTH_WINDOW_SECONDS,
};

async fn enforce(
    state: &AppState,
    limit: &Limit,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    let Some(cache) = state.cache.as_ref() else {
        return Ok(next.run(request).await);
    };

    let client_id = get_client_identifier(&request);
    let key = format!("{}:{}", limit.scope, client_id);

    let (count, allowed) = match cache
        .check_rate_limit(&key, limit.max_requests, limit.window_seconds)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            // Fail closed: an unreachable Redis must not lift the limit
            tracing::error!(
                error = %e,
                scope = limit.scope,
                "Rate limit check failed - denying request"
            );
            return Err(RateLimitError {
                retry_after: limit.window_seconds,
            });
        }
    };

    if !allowed {
        tracing::warn!(client = %client_id, scope = limit.scope, count, "Rate limit exceeded");
        return Err(RateLimitError {
            retry_after: limit.window_seconds,
        });
    }

    let mut response = next.run(request).await;

    let remaining = limit.max_requests.saturating_sub(count);
    response
        .headers_mut()
        .insert("X-RateLimit-Limit", HeaderValue::from(limit.max_requests));
    response
        .headers_mut()
        .insert("X-RateLimit-Remaining", HeaderValue::from(remaining));

    Ok(response)
}

/// General rate limiting middleware.
/// Limits requests to RATE_LIMIT_REQUESTS per RATE_LIMIT_WINDOW_SECONDS.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    enforce(&state, &GENERAL, request, next).await
}

/// Stricter rate limiting for login and onboarding.
/// Limits requests to RATE_LIMIT_AUTH_REQUESTS per RATE_LIMIT_AUTH_WINDOW_SECONDS.
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    enforce(&state, &AUTH, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_rate_limit_error_response() {
        let error = RateLimitError { retry_after: 60 };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "60");
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let request = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(get_client_identifier(&request), "203.0.113.7");
    }

    #[test]
    fn test_unknown_client() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(get_client_identifier(&request), "unknown");
    }
}
