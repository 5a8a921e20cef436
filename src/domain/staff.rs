//! Staff (user) domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::RecordStatus;

/// Staff domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department_id: Option<Uuid>,
    pub role_ids: Vec<Uuid>,
    pub status: RecordStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Staff {
    pub fn new(
        tenant_id: Uuid,
        email: &str,
        password_hash: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            email: normalize_email(email),
            password_hash,
            first_name,
            last_name,
            phone: None,
            job_title: None,
            department_id: None,
            role_ids: Vec::new(),
            status: RecordStatus::Active,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn set_status(&mut self, status: RecordStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Emails are compared case-insensitively by storing them lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Staff creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStaff {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ada.obi@citygeneral.org")]
    pub email: String,
    /// Initial password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

/// Profile update request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStaff {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignRoles {
    #[validate(length(min = 1, message = "At least one role is required"))]
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StaffFilter {
    pub department_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub status: Option<RecordStatus>,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
}

/// Staff response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StaffResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[schema(example = "ada.obi@citygeneral.org")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department_id: Option<Uuid>,
    pub role_ids: Vec<Uuid>,
    pub status: RecordStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Staff> for StaffResponse {
    fn from(staff: Staff) -> Self {
        Self {
            id: staff.id,
            tenant_id: staff.tenant_id,
            email: staff.email,
            first_name: staff.first_name,
            last_name: staff.last_name,
            phone: staff.phone,
            job_title: staff.job_title,
            department_id: staff.department_id,
            role_ids: staff.role_ids,
            status: staff.status,
            last_login_at: staff.last_login_at,
            created_at: staff.created_at,
        }
    }
}

/// The authenticated staff member with their effective permissions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffProfile {
    #[serde(flatten)]
    pub staff: StaffResponse,
    pub permissions: Vec<String>,
}
