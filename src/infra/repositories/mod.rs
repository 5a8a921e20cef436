//! Repository layer - Data access abstraction
//!
//! One trait per aggregate with a SeaORM-backed `*Store` implementation.
//! Every method that reads or writes tenant data takes the tenant id and
//! filters on it.

pub(crate) mod entities;

mod appointment_repository;
mod department_repository;
mod dispensing_repository;
mod hospital_repository;
mod patient_repository;
mod prescription_repository;
mod role_repository;
mod staff_repository;
mod vitals_repository;

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};

use crate::errors::AppResult;
use crate::types::PaginationParams;

pub use appointment_repository::{AppointmentRepository, AppointmentStore};
pub use department_repository::{DepartmentRepository, DepartmentStore};
pub use dispensing_repository::{DispensingRepository, DispensingStore};
pub use hospital_repository::{HospitalRepository, HospitalStore};
pub use patient_repository::{PatientRepository, PatientStore};
pub use prescription_repository::{PrescriptionRepository, PrescriptionStore};
pub use role_repository::{RoleRepository, RoleStore};
pub use staff_repository::{StaffRepository, StaffStore};
pub use vitals_repository::{VitalsRepository, VitalsStore};

// Export mocks for tests
#[cfg(any(test, feature = "test-utils"))]
pub use appointment_repository::MockAppointmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use department_repository::MockDepartmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use dispensing_repository::MockDispensingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use hospital_repository::MockHospitalRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use patient_repository::MockPatientRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use prescription_repository::MockPrescriptionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use staff_repository::MockStaffRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use vitals_repository::MockVitalsRepository;

/// Run a select as one page plus the total row count.
pub(crate) async fn fetch_page<E>(
    select: Select<E>,
    db: &DatabaseConnection,
    params: PaginationParams,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let paginator = select.paginate(db, params.limit());
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(params.page_index()).await?;
    Ok((rows, total))
}

/// `LOWER(column) LIKE '%term%'`, with LIKE wildcards in the term escaped.
pub(crate) fn contains_ci<C>(column: C, term: &str) -> SimpleExpr
where
    C: sea_orm::sea_query::IntoColumnRef,
{
    let escaped = term
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", escaped))
}

/// The trimmed search term, when one was given.
pub(crate) fn search_term(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
