//! Application route configuration.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    appointment_routes, auth_routes, department_routes, dispensing_routes, hospital_routes,
    menu_routes, onboarding_routes, patient_routes, prescription_routes, role_routes,
    staff_routes, vitals_routes,
};
use super::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes (stricter rate limiting)
        .nest("/api/auth", public(auth_routes(), &state))
        .nest("/api/hospitals", public(onboarding_routes(), &state))
        // Tenant-scoped routes (require JWT + general rate limiting)
        .nest("/api/hospital", protected(hospital_routes(), &state))
        .nest("/api/departments", protected(department_routes(), &state))
        .nest("/api/users", protected(staff_routes(), &state))
        .nest("/api/roles", protected(role_routes(), &state))
        .nest("/api/patients", protected(patient_routes(), &state))
        .nest("/api/vitals", protected(vitals_routes(), &state))
        .nest("/api/prescriptions", protected(prescription_routes(), &state))
        .nest("/api/dispensing", protected(dispensing_routes(), &state))
        .nest("/api/appointments", protected(appointment_routes(), &state))
        .nest("/api/menu", protected(menu_routes(), &state))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_auth_middleware,
    ))
}

// Layers run outside-in, so the rate limiter sees the request before auth.
fn protected(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
}

/// CORS policy for the configured browser origins.
///
/// With no origins configured, cross-origin requests get no CORS headers.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Root endpoint
async fn root() -> &'static str {
    "Hospital Management API"
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

#[derive(Debug, Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

#[derive(Debug, Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: ToString>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn not_configured() -> Self {
        Self {
            status: "not_configured",
            error: None,
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Health check endpoint with database and Redis connectivity check.
///
/// A component that is not configured does not degrade the overall status.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_status = match &state.database {
        Some(database) => ServiceStatus::from_result(database.ping().await),
        None => ServiceStatus::not_configured(),
    };

    let redis_status = match &state.cache {
        Some(cache) => ServiceStatus::from_result(cache.ping().await),
        None => ServiceStatus::not_configured(),
    };

    let healthy = !db_status.is_unhealthy() && !redis_status.is_unhealthy();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        services: ServiceHealth {
            database: db_status,
            redis: redis_status,
        },
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockServiceContainer;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(Arc::new(MockServiceContainer::new())))
    }

    #[tokio::test]
    async fn test_root_responds() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_without_backends_is_healthy() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["services"]["database"]["status"], "not_configured");
        assert_eq!(json["services"]["redis"]["status"], "not_configured");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = app()
            .oneshot(Request::get("/api/patients").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let response = app()
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Construction must not panic on a header-invalid origin.
        let _ = cors_layer(&["https://app.example.com".into(), "bad\norigin".into()]);
    }
}
