//! Service Container - one place to reach every hospital service.
//!
//! Handlers depend on the `ServiceContainer` trait, never on the concrete
//! managers, so router tests can swap in mocks.

use std::future::Future;
use std::sync::Arc;

use super::{
    AppointmentManager, AppointmentService, AuthService, Authenticator, DepartmentManager,
    DepartmentService, DispensingManager, DispensingService, HospitalManager, HospitalService,
    PatientManager, PatientService, PrescriptionManager, PrescriptionService, RoleManager,
    RoleService, StaffManager, StaffService, VitalsManager, VitalsService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn hospitals(&self) -> Arc<dyn HospitalService>;

    fn departments(&self) -> Arc<dyn DepartmentService>;

    fn roles(&self) -> Arc<dyn RoleService>;

    fn staff(&self) -> Arc<dyn StaffService>;

    fn patients(&self) -> Arc<dyn PatientService>;

    fn vitals(&self) -> Arc<dyn VitalsService>;

    fn prescriptions(&self) -> Arc<dyn PrescriptionService>;

    fn dispensing(&self) -> Arc<dyn DispensingService>;

    fn appointments(&self) -> Arc<dyn AppointmentService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth: Arc<dyn AuthService>,
    hospitals: Arc<dyn HospitalService>,
    departments: Arc<dyn DepartmentService>,
    roles: Arc<dyn RoleService>,
    staff: Arc<dyn StaffService>,
    patients: Arc<dyn PatientService>,
    vitals: Arc<dyn VitalsService>,
    prescriptions: Arc<dyn PrescriptionService>,
    dispensing: Arc<dyn DispensingService>,
    appointments: Arc<dyn AppointmentService>,
}

impl Services {
    /// Build every manager over one shared unit of work
    pub fn from_uow<U: UnitOfWork + 'static>(uow: Arc<U>, config: Config) -> Self {
        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config)),
            hospitals: Arc::new(HospitalManager::new(uow.clone())),
            departments: Arc::new(DepartmentManager::new(uow.clone())),
            roles: Arc::new(RoleManager::new(uow.clone())),
            staff: Arc::new(StaffManager::new(uow.clone())),
            patients: Arc::new(PatientManager::new(uow.clone())),
            vitals: Arc::new(VitalsManager::new(uow.clone())),
            prescriptions: Arc::new(PrescriptionManager::new(uow.clone())),
            dispensing: Arc::new(DispensingManager::new(uow.clone())),
            appointments: Arc::new(AppointmentManager::new(uow)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        Self::from_uow(Arc::new(Persistence::new(db)), config)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn hospitals(&self) -> Arc<dyn HospitalService> {
        self.hospitals.clone()
    }

    fn departments(&self) -> Arc<dyn DepartmentService> {
        self.departments.clone()
    }

    fn roles(&self) -> Arc<dyn RoleService> {
        self.roles.clone()
    }

    fn staff(&self) -> Arc<dyn StaffService> {
        self.staff.clone()
    }

    fn patients(&self) -> Arc<dyn PatientService> {
        self.patients.clone()
    }

    fn vitals(&self) -> Arc<dyn VitalsService> {
        self.vitals.clone()
    }

    fn prescriptions(&self) -> Arc<dyn PrescriptionService> {
        self.prescriptions.clone()
    }

    fn dispensing(&self) -> Arc<dyn DispensingService> {
        self.dispensing.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentService> {
        self.appointments.clone()
    }
}

/// Run independent lookups concurrently.
///
/// Each helper fails fast with the first error.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// # Example
    /// ```ignore
    /// let (head, members) = parallel::join2(
    ///     staff.find_by_id(tenant_id, head_id),
    ///     staff.list_by_department(tenant_id, id),
    /// ).await?;
    /// ```
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute three independent async operations in parallel.
    pub async fn join3<F1, F2, F3, T1, T2, T3>(
        f1: F1,
        f2: F2,
        f3: F3,
    ) -> AppResult<(T1, T2, T3)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
    {
        try_join!(f1, f2, f3)
    }

}
