//! Hospital (tenant) entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::department::normalize_code;
use crate::config::DEFAULT_TIMEZONE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HospitalStatus {
    Active,
    Suspended,
}

impl HospitalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HospitalStatus::Active => "ACTIVE",
            HospitalStatus::Suspended => "SUSPENDED",
        }
    }
}

impl From<&str> for HospitalStatus {
    fn from(s: &str) -> Self {
        match s {
            "ACTIVE" => HospitalStatus::Active,
            _ => HospitalStatus::Suspended,
        }
    }
}

/// A hospital is a tenant: its id is the `tenant_id` of every other record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    /// Upper-case, globally unique code used at login
    #[schema(example = "CITYGEN")]
    pub code: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub license_number: Option<String>,
    #[schema(example = "Africa/Lagos")]
    pub timezone: String,
    pub status: HospitalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hospital {
    pub fn new(name: String, code: &str, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            code: normalize_code(code),
            email: email.trim().to_lowercase(),
            phone: None,
            address: None,
            license_number: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            status: HospitalStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == HospitalStatus::Active
    }
}

/// Editable hospital profile fields
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateHospital {
    #[validate(length(min = 1, max = 200, message = "Hospital name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub license_number: Option<String>,
    pub timezone: Option<String>,
}

impl Hospital {
    pub fn apply(&mut self, changes: UpdateHospital) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email.to_lowercase();
        }
        if changes.phone.is_some() {
            self.phone = changes.phone;
        }
        if changes.address.is_some() {
            self.address = changes.address;
        }
        if changes.license_number.is_some() {
            self.license_number = changes.license_number;
        }
        if let Some(timezone) = changes.timezone {
            self.timezone = timezone;
        }
        self.updated_at = Utc::now();
    }
}
