//! Authentication service - login, token verification and principal resolution.
//!
//! Tokens are HS256 JWTs carrying the staff id and tenant id. Every
//! authenticated request re-resolves the principal from the database, so a
//! suspended hospital, a deactivated account or a changed role assignment
//! takes effect on the next request.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::container::parallel;
use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{
    normalize_code, normalize_email, resolve_permissions, Password, Principal, Staff,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Staff id
    pub sub: Uuid,
    /// Tenant (hospital) id
    pub tid: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 43200)]
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Hospital code is required"))]
    #[schema(example = "CITYGEN")]
    pub hospital_code: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "admin@citygeneral.org")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and issue a token
    async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Load the caller behind verified claims
    async fn resolve_principal(&self, claims: &Claims) -> AppResult<Principal>;
}

fn generate_token(staff: &Staff, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: staff.id,
        tid: staff.tenant_id,
        email: staff.email.clone(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        let code = normalize_code(&request.hospital_code);
        let hospital = self.uow.hospitals().find_by_code(&code).await?;

        let staff = match &hospital {
            Some(h) => {
                self.uow
                    .staff()
                    .find_by_email(h.id, &normalize_email(&request.email))
                    .await?
            }
            None => None,
        };

        // Unknown accounts verify against a dummy hash
        let stored = staff
            .as_ref()
            .map(|s| Password::from_hash(s.password_hash.clone()))
            .unwrap_or_else(Password::dummy);
        let password_valid = stored.verify(&request.password);

        let (Some(hospital), Some(staff)) = (hospital, staff) else {
            tracing::debug!(hospital = %code, "Login for unknown hospital or email");
            return Err(AppError::InvalidCredentials);
        };

        if !password_valid || !staff.is_active() {
            tracing::debug!(staff = %staff.id, "Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        if !hospital.is_active() {
            return Err(AppError::forbidden(
                "HOSPITAL_SUSPENDED",
                "Hospital account is suspended",
            ));
        }

        self.uow
            .staff()
            .record_login(staff.tenant_id, staff.id, Utc::now())
            .await?;

        tracing::info!(staff = %staff.id, tenant = %staff.tenant_id, "Staff logged in");
        generate_token(&staff, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn resolve_principal(&self, claims: &Claims) -> AppResult<Principal> {
        let hospital_repo = self.uow.hospitals();
        let staff_repo = self.uow.staff();
        let role_repo = self.uow.roles();

        let (hospital, staff, roles) = parallel::join3(
            hospital_repo.find_by_id(claims.tid),
            staff_repo.find_by_id(claims.tid, claims.sub),
            role_repo.list_all(claims.tid),
        )
        .await?;

        let hospital = hospital.ok_or(AppError::Unauthorized)?;
        if !hospital.is_active() {
            return Err(AppError::forbidden(
                "HOSPITAL_SUSPENDED",
                "Hospital account is suspended",
            ));
        }

        let staff = staff
            .filter(Staff::is_active)
            .ok_or(AppError::Unauthorized)?;

        let roles: HashMap<Uuid, _> = roles.into_iter().map(|r| (r.id, r)).collect();
        let permissions = resolve_permissions(&staff.role_ids, &roles);

        Ok(Principal {
            staff_id: staff.id,
            tenant_id: staff.tenant_id,
            department_id: staff.department_id,
            email: staff.email,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{system_roles, Hospital, HospitalStatus, RecordStatus};
    use crate::infra::unit_of_work::test_support::TestUnitOfWork;

    const SECRET: &str = "test-secret-key-that-is-long-enough!";

    fn hospital() -> Hospital {
        Hospital::new("City General".into(), "citygen", "info@citygen.org")
    }

    fn staff_member(tenant_id: Uuid, password: &str) -> Staff {
        let hash = Password::new(password).unwrap().into_string();
        Staff::new(tenant_id, "Nurse@CityGen.org", hash, "Ada".into(), "Obi".into())
    }

    fn login_request(password: &str) -> LoginRequest {
        LoginRequest {
            hospital_code: "citygen".into(),
            email: "nurse@citygen.org".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let hospital = hospital();
        let staff = staff_member(hospital.id, "CorrectHorse1");
        let (tenant, staff_id) = (hospital.id, staff.id);

        let mut uow = TestUnitOfWork::default();
        let found = hospital.clone();
        uow.hospitals
            .expect_find_by_code()
            .withf(|code| code == "CITYGEN")
            .returning(move |_| Ok(Some(found.clone())));
        uow.staff
            .expect_find_by_email()
            .returning(move |_, _| Ok(Some(staff.clone())));
        uow.staff
            .expect_record_login()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let auth = Authenticator::new(uow.build(), Config::for_tests(SECRET));
        let token = auth.login(login_request("CorrectHorse1")).await.unwrap();
        assert_eq!(token.token_type, "Bearer");

        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, staff_id);
        assert_eq!(claims.tid, tenant);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let hospital = hospital();
        let staff = staff_member(hospital.id, "CorrectHorse1");

        let mut uow = TestUnitOfWork::default();
        uow.hospitals
            .expect_find_by_code()
            .returning(move |_| Ok(Some(hospital.clone())));
        uow.staff
            .expect_find_by_email()
            .returning(move |_, _| Ok(Some(staff.clone())));

        let auth = Authenticator::new(uow.build(), Config::for_tests(SECRET));
        let err = auth.login(login_request("WrongHorse1")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_hospital_is_invalid_credentials() {
        let mut uow = TestUnitOfWork::default();
        uow.hospitals.expect_find_by_code().returning(|_| Ok(None));

        let auth = Authenticator::new(uow.build(), Config::for_tests(SECRET));
        let err = auth.login(login_request("whatever1")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_inactive_staff_cannot_login() {
        let hospital = hospital();
        let mut staff = staff_member(hospital.id, "CorrectHorse1");
        staff.set_status(RecordStatus::Inactive);

        let mut uow = TestUnitOfWork::default();
        uow.hospitals
            .expect_find_by_code()
            .returning(move |_| Ok(Some(hospital.clone())));
        uow.staff
            .expect_find_by_email()
            .returning(move |_, _| Ok(Some(staff.clone())));

        let auth = Authenticator::new(uow.build(), Config::for_tests(SECRET));
        let err = auth.login(login_request("CorrectHorse1")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_suspended_hospital_is_forbidden() {
        let mut hospital = hospital();
        hospital.status = HospitalStatus::Suspended;
        let staff = staff_member(hospital.id, "CorrectHorse1");

        let mut uow = TestUnitOfWork::default();
        uow.hospitals
            .expect_find_by_code()
            .returning(move |_| Ok(Some(hospital.clone())));
        uow.staff
            .expect_find_by_email()
            .returning(move |_, _| Ok(Some(staff.clone())));

        let auth = Authenticator::new(uow.build(), Config::for_tests(SECRET));
        let err = auth.login(login_request("CorrectHorse1")).await.unwrap_err();
        assert_eq!(err.code(), "HOSPITAL_SUSPENDED");
    }

    #[tokio::test]
    async fn test_resolve_principal_inherits_role_permissions() {
        let hospital = hospital();
        let roles = system_roles(hospital.id);
        let nurse = roles.iter().find(|r| r.code == "NURSE").unwrap().clone();

        let mut staff = staff_member(hospital.id, "CorrectHorse1");
        staff.role_ids = vec![nurse.id];

        let claims = Claims {
            sub: staff.id,
            tid: hospital.id,
            email: staff.email.clone(),
            iat: 0,
            exp: 0,
        };

        let mut uow = TestUnitOfWork::default();
        uow.hospitals
            .expect_find_by_id()
            .returning(move |_| Ok(Some(hospital.clone())));
        uow.staff
            .expect_find_by_id()
            .returning(move |_, _| Ok(Some(staff.clone())));
        uow.roles
            .expect_list_all()
            .returning(move |_| Ok(roles.clone()));

        let auth = Authenticator::new(uow.build(), Config::for_tests(SECRET));
        let principal = auth.resolve_principal(&claims).await.unwrap();

        assert!(principal.can("vitals:create"));
        // inherited from STAFF
        assert!(principal.can("departments:read"));
        assert!(!principal.can("dispensing:create"));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let auth = Authenticator::new(
            TestUnitOfWork::default().build(),
            Config::for_tests(SECRET),
        );
        assert!(auth.verify_token("not.a.token").is_err());
    }
}
