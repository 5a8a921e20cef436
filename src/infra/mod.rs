//! Infrastructure layer - External systems integration
//!
//! - PostgreSQL connection, migrations and repositories
//! - Redis for rate limiting
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    AppointmentRepository, DepartmentRepository, DispensingRepository, HospitalRepository,
    PatientRepository, PrescriptionRepository, RoleRepository, StaffRepository, VitalsRepository,
};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};
