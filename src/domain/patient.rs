//! Patient entity and medical record numbers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::access::ResourceAttributes;
use super::{Appointment, Prescription, RecordStatus, Vitals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
            Gender::Unknown => "UNKNOWN",
        }
    }
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        match s {
            "MALE" => Gender::Male,
            "FEMALE" => Gender::Female,
            "OTHER" => Gender::Other,
            _ => Gender::Unknown,
        }
    }
}

/// Patient domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Medical record number, unique per tenant
    #[schema(example = "CITYGEN-20250314-4F0A9C")]
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[schema(example = "O+")]
    pub blood_group: Option<String>,
    pub allergies: Vec<String>,
    pub department_id: Option<Uuid>,
    pub primary_doctor_id: Option<Uuid>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn attributes(&self) -> ResourceAttributes {
        ResourceAttributes::new(self.tenant_id).department(self.department_id)
    }

    pub fn apply(&mut self, changes: UpdatePatient) {
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(gender) = changes.gender {
            self.gender = gender;
        }
        if changes.phone.is_some() {
            self.phone = changes.phone;
        }
        if changes.email.is_some() {
            self.email = changes.email.map(|e| e.to_lowercase());
        }
        if changes.address.is_some() {
            self.address = changes.address;
        }
        if changes.blood_group.is_some() {
            self.blood_group = changes.blood_group;
        }
        if let Some(allergies) = changes.allergies {
            self.allergies = allergies;
        }
        if changes.department_id.is_some() {
            self.department_id = changes.department_id;
        }
        if changes.primary_doctor_id.is_some() {
            self.primary_doctor_id = changes.primary_doctor_id;
        }
        self.updated_at = Utc::now();
    }
}

/// Generate an MRN: `<HOSPITAL_CODE>-<YYYYMMDD>-<6 hex>`.
pub fn generate_mrn(hospital_code: &str, date: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("{}-{}-{}", hospital_code, date.format("%Y%m%d"), suffix)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterPatient {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[schema(example = "1984-07-21")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub department_id: Option<Uuid>,
    pub primary_doctor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePatient {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub department_id: Option<Uuid>,
    pub primary_doctor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientFilter {
    pub department_id: Option<Uuid>,
    pub status: Option<RecordStatus>,
    /// Case-insensitive match on name, MRN or phone
    pub search: Option<String>,
}

/// Identity used to detect duplicate registrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientIdentity {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: Option<String>,
}

/// Patient overview for the chart screen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PatientSummary {
    pub patient: Patient,
    pub latest_vitals: Option<Vitals>,
    pub open_prescriptions: Vec<Prescription>,
    pub upcoming_appointments: Vec<Appointment>,
}
