//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure for one vertical
//! each. Every manager reaches the database through the Unit of Work, and
//! the two multi-row writes (onboarding and dispensing) run in a transaction.

mod appointment_service;
mod auth_service;
pub mod container;
mod department_service;
mod dispensing_service;
mod hospital_service;
mod patient_service;
mod prescription_service;
mod role_service;
mod staff_service;
mod vitals_service;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use appointment_service::{AppointmentManager, AppointmentService};
pub use auth_service::{AuthService, Authenticator, Claims, LoginRequest, TokenResponse};
pub use department_service::{DepartmentManager, DepartmentService};
pub use dispensing_service::{DispensingManager, DispensingService};
pub use hospital_service::{HospitalManager, HospitalService, OnboardHospital, OnboardResult};
pub use patient_service::{PatientManager, PatientService};
pub use prescription_service::{PrescriptionManager, PrescriptionService};
pub use role_service::{RoleManager, RoleService};
pub use staff_service::{StaffManager, StaffService};
pub use vitals_service::{VitalsManager, VitalsService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
