//! Domain layer - Core hospital entities and rules
//!
//! Entities, inputs and the pure logic that needs no database: permission
//! resolution, access policies, the department tree, vitals alerts and the
//! prescription arithmetic.

pub mod access;
pub mod appointment;
pub mod department;
pub mod dispensing;
pub mod hierarchy;
pub mod hospital;
pub mod menu;
pub mod password;
pub mod patient;
pub mod permission;
pub mod prescription;
pub mod role;
pub mod staff;
pub mod status;
pub mod vitals;

use serde::{Deserialize, Deserializer};

pub use access::{Principal, ResourceAttributes};
pub use appointment::{
    schedule_window, Appointment, AppointmentFilter, AppointmentStatus, AppointmentView,
    BookAppointment, RescheduleAppointment, UpdateAppointmentStatus,
};
pub use department::{
    build_tree, normalize_code, CreateDepartment, Department, DepartmentFilter, DepartmentNode,
    DepartmentStaff, UpdateDepartment,
};
pub use dispensing::{DispenseLine, DispenseOutcome, DispenseRequest, DispensedItem, Dispensing};
pub use hierarchy::creates_cycle;
pub use hospital::{Hospital, HospitalStatus, UpdateHospital};
pub use menu::{build_menu, MenuItem};
pub use password::Password;
pub use patient::{
    generate_mrn, Gender, Patient, PatientFilter, PatientIdentity, PatientSummary,
    RegisterPatient, UpdatePatient,
};
pub use permission::{catalog, is_known_permission, PermissionInfo, PermissionSet, WILDCARD};
pub use prescription::{
    CreatePrescription, Prescription, PrescriptionFilter, PrescriptionItem, PrescriptionStatus,
};
pub use role::{
    resolve_permissions, system_roles, CreateRole, Role, RoleDetail, RoleFilter, UpdateRole,
};
pub use staff::{
    normalize_email, AssignRoles, ChangePassword, CreateStaff, Staff, StaffFilter, StaffProfile,
    StaffResponse, UpdateStaff,
};
pub use status::RecordStatus;
pub use vitals::{
    generate_alerts, AlertSeverity, Measurements, RecordVitals, VitalAlert, Vitals,
};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial updates. Use with `#[serde(default)]`.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
