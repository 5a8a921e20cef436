//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    appointment_handler, auth_handler, department_handler, dispensing_handler, hospital_handler,
    menu_handler, patient_handler, prescription_handler, role_handler, staff_handler,
    vitals_handler,
};
use crate::domain::vitals::{GlucoseUnit, HeightUnit, TemperatureUnit, WeightUnit};
use crate::domain::{
    AlertSeverity, Appointment, AppointmentStatus, AppointmentView, AssignRoles, BookAppointment,
    ChangePassword, CreateDepartment, CreatePrescription, CreateRole, CreateStaff, Department,
    DepartmentNode, DepartmentStaff, DispenseLine, DispenseOutcome, DispenseRequest,
    DispensedItem, Dispensing, Gender, Hospital, HospitalStatus, Measurements, MenuItem, Patient,
    PatientSummary, PermissionInfo, Prescription, PrescriptionItem, PrescriptionStatus,
    RecordStatus, RecordVitals, RegisterPatient, RescheduleAppointment, Role, RoleDetail,
    StaffProfile, StaffResponse, UpdateAppointmentStatus, UpdateDepartment, UpdateHospital,
    UpdatePatient, UpdateRole, UpdateStaff, VitalAlert, Vitals,
};
use crate::errors::ErrorResponse;
use crate::services::{LoginRequest, OnboardHospital, OnboardResult, TokenResponse};
use crate::types::{
    PaginatedAppointments, PaginatedDepartments, PaginatedPatients, PaginatedPrescriptions,
    PaginatedRoles, PaginatedStaff, PaginatedVitals, PaginationMeta,
};

/// OpenAPI documentation for the Hospital Management API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hospital Management API",
        version = "0.1.0",
        description = "Multi-tenant hospital management: departments, staff, roles, patients, \
                       vitals, prescriptions, dispensing and appointments",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::login,
        hospital_handler::onboard,
        hospital_handler::get_current,
        hospital_handler::update_current,
        department_handler::create_department,
        department_handler::list_departments,
        department_handler::department_tree,
        department_handler::get_department,
        department_handler::update_department,
        department_handler::deactivate_department,
        department_handler::activate_department,
        department_handler::department_staff,
        staff_handler::get_current_user,
        staff_handler::change_password,
        staff_handler::create_staff,
        staff_handler::list_staff,
        staff_handler::get_staff,
        staff_handler::update_staff,
        staff_handler::assign_roles,
        staff_handler::deactivate_staff,
        staff_handler::activate_staff,
        role_handler::create_role,
        role_handler::list_roles,
        role_handler::list_permissions,
        role_handler::get_role,
        role_handler::update_role,
        role_handler::delete_role,
        patient_handler::register_patient,
        patient_handler::list_patients,
        patient_handler::get_patient,
        patient_handler::update_patient,
        patient_handler::deactivate_patient,
        patient_handler::patient_summary,
        patient_handler::patient_vitals,
        patient_handler::latest_vitals,
        vitals_handler::record_vitals,
        vitals_handler::get_vitals,
        prescription_handler::create_prescription,
        prescription_handler::list_prescriptions,
        prescription_handler::get_prescription,
        prescription_handler::cancel_prescription,
        prescription_handler::prescription_dispensings,
        dispensing_handler::dispense,
        dispensing_handler::get_dispensing,
        appointment_handler::book_appointment,
        appointment_handler::list_appointments,
        appointment_handler::get_appointment,
        appointment_handler::reschedule_appointment,
        appointment_handler::update_appointment_status,
        menu_handler::get_menu,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMeta,
            RecordStatus,
            // Auth and onboarding
            LoginRequest,
            TokenResponse,
            OnboardHospital,
            OnboardResult,
            Hospital,
            HospitalStatus,
            UpdateHospital,
            // Departments
            Department,
            CreateDepartment,
            UpdateDepartment,
            DepartmentNode,
            DepartmentStaff,
            PaginatedDepartments,
            // Staff and roles
            CreateStaff,
            UpdateStaff,
            AssignRoles,
            ChangePassword,
            StaffResponse,
            StaffProfile,
            PaginatedStaff,
            Role,
            RoleDetail,
            CreateRole,
            UpdateRole,
            PermissionInfo,
            PaginatedRoles,
            MenuItem,
            // Clinical
            Gender,
            Patient,
            RegisterPatient,
            UpdatePatient,
            PatientSummary,
            PaginatedPatients,
            TemperatureUnit,
            WeightUnit,
            HeightUnit,
            GlucoseUnit,
            RecordVitals,
            Measurements,
            AlertSeverity,
            VitalAlert,
            Vitals,
            PaginatedVitals,
            // Pharmacy
            PrescriptionStatus,
            PrescriptionItem,
            Prescription,
            CreatePrescription,
            PaginatedPrescriptions,
            DispenseLine,
            DispenseRequest,
            DispensedItem,
            Dispensing,
            DispenseOutcome,
            // Scheduling
            AppointmentStatus,
            Appointment,
            AppointmentView,
            BookAppointment,
            RescheduleAppointment,
            UpdateAppointmentStatus,
            PaginatedAppointments,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Staff login"),
        (name = "Hospitals", description = "Onboarding and hospital profile"),
        (name = "Departments", description = "Department hierarchy"),
        (name = "Staff", description = "Staff accounts"),
        (name = "Roles", description = "Roles and the permission catalog"),
        (name = "Patients", description = "Patient registry"),
        (name = "Vitals", description = "Vital signs and alerts"),
        (name = "Prescriptions", description = "Prescribing"),
        (name = "Dispensing", description = "Pharmacy dispensing"),
        (name = "Appointments", description = "Appointment scheduling"),
        (name = "Menu", description = "Permission-filtered navigation")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
