//! Integration tests for API endpoints.
//!
//! The router runs against hand-written service stubs, so no database or
//! Redis is needed. Tokens are opaque strings the stub auth service maps to
//! a fixed principal.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use hospital_api::api::{create_router, AppState};
use hospital_api::domain::{
    Patient, PatientFilter, PatientSummary, PermissionSet, Principal, RecordStatus,
    RegisterPatient, UpdatePatient,
};
use hospital_api::errors::{AppError, AppResult};
use hospital_api::services::{
    AppointmentService, AuthService, Claims, DepartmentService, DispensingService,
    HospitalService, LoginRequest, PatientService, PrescriptionService, RoleService,
    ServiceContainer, StaffService, TokenResponse, VitalsService,
};
use hospital_api::types::{Paginated, PaginationParams};

const TENANT: Uuid = Uuid::from_u128(0x1000);
const KNOWN_PATIENT: Uuid = Uuid::from_u128(0x2000);

// =============================================================================
// Service stubs
// =============================================================================

struct StubAuth;

#[async_trait]
impl AuthService for StubAuth {
    async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        if request.password != "correct-horse" {
            return Err(AppError::InvalidCredentials);
        }
        Ok(TokenResponse {
            access_token: "admin-token".into(),
            token_type: "Bearer".into(),
            expires_in: 43200,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let email = match token {
            "admin-token" => "admin@citygeneral.org",
            "clerk-token" => "clerk@citygeneral.org",
            _ => return Err(AppError::Unauthorized),
        };
        let now = Utc::now().timestamp();
        Ok(Claims {
            sub: Uuid::new_v4(),
            tid: TENANT,
            email: email.into(),
            iat: now,
            exp: now + 3600,
        })
    }

    async fn resolve_principal(&self, claims: &Claims) -> AppResult<Principal> {
        let permissions: PermissionSet = if claims.email.starts_with("admin") {
            ["*"].into_iter().collect()
        } else {
            ["appointments:read", "patients:read"].into_iter().collect()
        };
        Ok(Principal {
            staff_id: claims.sub,
            tenant_id: claims.tid,
            department_id: None,
            email: claims.email.clone(),
            permissions,
        })
    }
}

struct StubPatients;

fn patient(id: Uuid, input: &RegisterPatient) -> Patient {
    let now = Utc::now();
    Patient {
        id,
        tenant_id: TENANT,
        mrn: "CITYGEN-20250314-4F0A9C".into(),
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        date_of_birth: input.date_of_birth,
        gender: input.gender,
        phone: None,
        email: None,
        address: None,
        blood_group: None,
        allergies: input.allergies.clone(),
        department_id: None,
        primary_doctor_id: None,
        status: RecordStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl PatientService for StubPatients {
    async fn register(&self, tenant_id: Uuid, input: RegisterPatient) -> AppResult<Patient> {
        assert_eq!(tenant_id, TENANT);
        Ok(patient(Uuid::new_v4(), &input))
    }

    async fn list(
        &self,
        _tenant_id: Uuid,
        _filter: PatientFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Patient>> {
        Ok(Paginated::new(vec![], page, 0))
    }

    async fn get(&self, principal: &Principal, id: Uuid) -> AppResult<Patient> {
        principal.require("patients:read")?;
        if id != KNOWN_PATIENT {
            return Err(AppError::not_found("PATIENT_NOT_FOUND", "Patient not found"));
        }
        let input = RegisterPatient {
            first_name: "Ada".into(),
            last_name: "Okafor".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1984, 7, 21).unwrap_or_default(),
            gender: hospital_api::domain::Gender::Female,
            phone: None,
            email: None,
            address: None,
            blood_group: None,
            allergies: vec!["Penicillin".into()],
            department_id: None,
            primary_doctor_id: None,
        };
        Ok(patient(id, &input))
    }

    async fn update(
        &self,
        _principal: &Principal,
        _id: Uuid,
        _input: UpdatePatient,
    ) -> AppResult<Patient> {
        unimplemented!("not exercised")
    }

    async fn deactivate(&self, _tenant_id: Uuid, _id: Uuid) -> AppResult<Patient> {
        unimplemented!("not exercised")
    }

    async fn summary(&self, _principal: &Principal, _id: Uuid) -> AppResult<PatientSummary> {
        unimplemented!("not exercised")
    }
}

struct StubServices {
    auth: Arc<StubAuth>,
    patients: Arc<StubPatients>,
}

impl ServiceContainer for StubServices {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn hospitals(&self) -> Arc<dyn HospitalService> {
        unimplemented!("not exercised")
    }

    fn departments(&self) -> Arc<dyn DepartmentService> {
        unimplemented!("not exercised")
    }

    fn roles(&self) -> Arc<dyn RoleService> {
        unimplemented!("not exercised")
    }

    fn staff(&self) -> Arc<dyn StaffService> {
        unimplemented!("not exercised")
    }

    fn patients(&self) -> Arc<dyn PatientService> {
        self.patients.clone()
    }

    fn vitals(&self) -> Arc<dyn VitalsService> {
        unimplemented!("not exercised")
    }

    fn prescriptions(&self) -> Arc<dyn PrescriptionService> {
        unimplemented!("not exercised")
    }

    fn dispensing(&self) -> Arc<dyn DispensingService> {
        unimplemented!("not exercised")
    }

    fn appointments(&self) -> Arc<dyn AppointmentService> {
        unimplemented!("not exercised")
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn app() -> Router {
    let services = StubServices {
        auth: Arc::new(StubAuth),
        patients: Arc::new(StubPatients),
    };
    create_router(AppState::new(Arc::new(services)))
}

async fn send(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn registration() -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Okafor",
        "date_of_birth": "1984-07-21",
        "gender": "FEMALE",
        "allergies": ["Penicillin"]
    })
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let (status, body) = send(
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({
            "hospital_code": "CITYGEN",
            "email": "admin@citygeneral.org",
            "password": "correct-horse"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["access_token"], "admin-token");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let (status, body) = send(
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({
            "hospital_code": "CITYGEN",
            "email": "admin@citygeneral.org",
            "password": "wrong"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let (status, body) = send(
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({
            "hospital_code": "CITYGEN",
            "email": "not-an-email",
            "password": "correct-horse"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Invalid email format");
}

#[tokio::test]
async fn test_missing_or_unknown_token_is_unauthorized() {
    let (status, _) = send(Method::GET, "/api/menu", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(Method::GET, "/api/menu", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

// =============================================================================
// Menu
// =============================================================================

#[tokio::test]
async fn test_menu_is_filtered_by_permissions() {
    let (status, body) = send(Method::GET, "/api/menu", Some("clerk-token"), None).await;
    assert_eq!(status, StatusCode::OK);

    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["dashboard", "clinical"]);

    let clinical: Vec<&str> = body[1]["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap())
        .collect();
    assert_eq!(clinical, vec!["patients", "appointments"]);
}

#[tokio::test]
async fn test_wildcard_sees_administration_menu() {
    let (_, body) = send(Method::GET, "/api/menu", Some("admin-token"), None).await;
    let keys: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap())
        .collect();
    assert!(keys.contains(&"administration"));
    assert!(keys.contains(&"pharmacy"));
}

// =============================================================================
// Patients
// =============================================================================

#[tokio::test]
async fn test_register_patient_returns_created() {
    let (status, body) = send(
        Method::POST,
        "/api/patients",
        Some("admin-token"),
        Some(registration()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["gender"], "FEMALE");
    assert_eq!(body["status"], "ACTIVE");
}

#[tokio::test]
async fn test_register_patient_requires_permission() {
    let (status, body) = send(
        Method::POST,
        "/api/patients",
        Some("clerk-token"),
        Some(registration()),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INSUFFICIENT_PERMISSIONS");
}

#[tokio::test]
async fn test_register_patient_validates_body() {
    let mut payload = registration();
    payload["first_name"] = json!("");

    let (status, body) = send(
        Method::POST,
        "/api/patients",
        Some("admin-token"),
        Some(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "First name is required");
}

#[tokio::test]
async fn test_get_patient_found_and_missing() {
    let (status, body) = send(
        Method::GET,
        &format!("/api/patients/{}", KNOWN_PATIENT),
        Some("clerk-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allergies"][0], "Penicillin");

    let (status, body) = send(
        Method::GET,
        &format!("/api/patients/{}", Uuid::new_v4()),
        Some("clerk-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PATIENT_NOT_FOUND");
}

#[tokio::test]
async fn test_list_patients_returns_pagination_meta() {
    let (status, body) = send(
        Method::GET,
        "/api/patients?page=2&limit=10",
        Some("clerk-token"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["pagination"]["total_pages"], 0);
}
