//! Unit of Work: repository access and transaction management.
//!
//! Services reach every repository through a `UnitOfWork`. Work that must
//! be atomic (tenant onboarding, dispensing) runs inside `transaction`, whose
//! closure receives a `TransactionContext` exposing the transaction-bound
//! repositories.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, NotSet, QueryFilter, QuerySelect, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::{department, dispensing, hospital, prescription, role, staff};
use super::repositories::{
    AppointmentRepository, AppointmentStore, DepartmentRepository, DepartmentStore,
    DispensingRepository, DispensingStore, HospitalRepository, HospitalStore, PatientRepository,
    PatientStore, PrescriptionRepository, PrescriptionStore, RoleRepository, RoleStore,
    StaffRepository, StaffStore, VitalsRepository, VitalsStore,
};
use crate::domain::{Department, Dispensing, Hospital, Prescription, Role, Staff};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic `transaction` method; tests
/// implement it over repository mocks instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn hospitals(&self) -> Arc<dyn HospitalRepository>;
    fn departments(&self) -> Arc<dyn DepartmentRepository>;
    fn staff(&self) -> Arc<dyn StaffRepository>;
    fn roles(&self) -> Arc<dyn RoleRepository>;
    fn patients(&self) -> Arc<dyn PatientRepository>;
    fn vitals(&self) -> Arc<dyn VitalsRepository>;
    fn prescriptions(&self) -> Arc<dyn PrescriptionRepository>;
    fn dispensings(&self) -> Arc<dyn DispensingRepository>;
    fn appointments(&self) -> Arc<dyn AppointmentRepository>;

    /// Run `f` inside a ReadCommitted transaction.
    ///
    /// Committed when `f` succeeds, rolled back when it fails.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn hospitals(&self) -> TxHospitalRepository<'a> {
        TxHospitalRepository { txn: self.txn }
    }

    pub fn roles(&self) -> TxRoleRepository<'a> {
        TxRoleRepository { txn: self.txn }
    }

    pub fn departments(&self) -> TxDepartmentRepository<'a> {
        TxDepartmentRepository { txn: self.txn }
    }

    pub fn staff(&self) -> TxStaffRepository<'a> {
        TxStaffRepository { txn: self.txn }
    }

    pub fn prescriptions(&self) -> TxPrescriptionRepository<'a> {
        TxPrescriptionRepository { txn: self.txn }
    }

    pub fn dispensings(&self) -> TxDispensingRepository<'a> {
        TxDispensingRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork over a SeaORM connection
pub struct Persistence {
    db: DatabaseConnection,
    hospitals: Arc<HospitalStore>,
    departments: Arc<DepartmentStore>,
    staff: Arc<StaffStore>,
    roles: Arc<RoleStore>,
    patients: Arc<PatientStore>,
    vitals: Arc<VitalsStore>,
    prescriptions: Arc<PrescriptionStore>,
    dispensings: Arc<DispensingStore>,
    appointments: Arc<AppointmentStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            hospitals: Arc::new(HospitalStore::new(db.clone())),
            departments: Arc::new(DepartmentStore::new(db.clone())),
            staff: Arc::new(StaffStore::new(db.clone())),
            roles: Arc::new(RoleStore::new(db.clone())),
            patients: Arc::new(PatientStore::new(db.clone())),
            vitals: Arc::new(VitalsStore::new(db.clone())),
            prescriptions: Arc::new(PrescriptionStore::new(db.clone())),
            dispensings: Arc::new(DispensingStore::new(db.clone())),
            appointments: Arc::new(AppointmentStore::new(db.clone())),
            db,
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn hospitals(&self) -> Arc<dyn HospitalRepository> {
        self.hospitals.clone()
    }

    fn departments(&self) -> Arc<dyn DepartmentRepository> {
        self.departments.clone()
    }

    fn staff(&self) -> Arc<dyn StaffRepository> {
        self.staff.clone()
    }

    fn roles(&self) -> Arc<dyn RoleRepository> {
        self.roles.clone()
    }

    fn patients(&self) -> Arc<dyn PatientRepository> {
        self.patients.clone()
    }

    fn vitals(&self) -> Arc<dyn VitalsRepository> {
        self.vitals.clone()
    }

    fn prescriptions(&self) -> Arc<dyn PrescriptionRepository> {
        self.prescriptions.clone()
    }

    fn dispensings(&self) -> Arc<dyn DispensingRepository> {
        self.dispensings.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentRepository> {
        self.appointments.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f)
            .await
    }
}

// =============================================================================
// Transaction-bound repositories
// =============================================================================

pub struct TxHospitalRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxHospitalRepository<'_> {
    pub async fn insert(&self, hospital: &Hospital) -> AppResult<Hospital> {
        let model = hospital::ActiveModel::from(hospital)
            .insert(self.txn)
            .await?;
        Ok(Hospital::from(model))
    }
}

pub struct TxRoleRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxRoleRepository<'_> {
    pub async fn insert(&self, role: &Role) -> AppResult<Role> {
        let model = role::ActiveModel::from(role).insert(self.txn).await?;
        Ok(Role::from(model))
    }
}

pub struct TxDepartmentRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxDepartmentRepository<'_> {
    pub async fn insert(&self, department: &Department) -> AppResult<Department> {
        let model = department::ActiveModel::from(department)
            .insert(self.txn)
            .await?;
        Ok(Department::from(model))
    }
}

pub struct TxStaffRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxStaffRepository<'_> {
    pub async fn insert(&self, staff: &Staff) -> AppResult<Staff> {
        let model = staff::ActiveModel::from(staff).insert(self.txn).await?;
        Ok(Staff::from(model))
    }
}

pub struct TxPrescriptionRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxPrescriptionRepository<'_> {
    /// Read the prescription and hold a row lock until commit, so concurrent
    /// dispenses of the same prescription are serialized.
    pub async fn find_for_update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<Prescription>> {
        let result = prescription::Entity::find()
            .filter(prescription::Column::TenantId.eq(tenant_id))
            .filter(prescription::Column::Id.eq(id))
            .lock_exclusive()
            .one(self.txn)
            .await?;
        Ok(result.map(Prescription::from))
    }

    pub async fn update(&self, value: &Prescription) -> AppResult<Prescription> {
        let mut active = prescription::ActiveModel::from(value);
        active.id = NotSet;
        active.tenant_id = NotSet;
        active.created_at = NotSet;

        let result = prescription::Entity::update_many()
            .set(active)
            .filter(prescription::Column::Id.eq(value.id))
            .filter(prescription::Column::TenantId.eq(value.tenant_id))
            .exec(self.txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found(
                "PRESCRIPTION_NOT_FOUND",
                "Prescription not found",
            ));
        }
        Ok(value.clone())
    }
}

pub struct TxDispensingRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxDispensingRepository<'_> {
    pub async fn insert(&self, value: &Dispensing) -> AppResult<Dispensing> {
        let model = dispensing::ActiveModel::from(value)
            .insert(self.txn)
            .await?;
        Ok(Dispensing::from(model))
    }
}

/// Shorthand for `uow.transaction(|ctx| Box::pin(async move { ... }))`.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
