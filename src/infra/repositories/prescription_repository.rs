//! Prescription repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::entities::prescription::{ActiveModel, Column, Entity as PrescriptionEntity};
use super::fetch_page;
use crate::domain::{Prescription, PrescriptionFilter, PrescriptionStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PrescriptionRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Prescription>>;

    /// Newest first
    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &PrescriptionFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Prescription>, u64)>;

    async fn insert(&self, prescription: &Prescription) -> AppResult<Prescription>;

    async fn update(&self, prescription: &Prescription) -> AppResult<Prescription>;

    /// `ACTIVE` or `PARTIALLY_DISPENSED`, newest first
    async fn list_open_for_patient(
        &self,
        tenant_id: Uuid,
        patient_id: Uuid,
    ) -> AppResult<Vec<Prescription>>;
}

pub struct PrescriptionStore {
    db: DatabaseConnection,
}

impl PrescriptionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn scoped(tenant_id: Uuid) -> sea_orm::Select<PrescriptionEntity> {
    PrescriptionEntity::find().filter(Column::TenantId.eq(tenant_id))
}

pub(crate) fn open_statuses() -> [&'static str; 2] {
    [
        PrescriptionStatus::Active.as_str(),
        PrescriptionStatus::PartiallyDispensed.as_str(),
    ]
}

#[async_trait]
impl PrescriptionRepository for PrescriptionStore {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Prescription>> {
        let result = scoped(tenant_id)
            .filter(Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(result.map(Prescription::from))
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &PrescriptionFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Prescription>, u64)> {
        let mut query = scoped(tenant_id);
        if let Some(patient_id) = filter.patient_id {
            query = query.filter(Column::PatientId.eq(patient_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let (rows, total) =
            fetch_page(query.order_by_desc(Column::CreatedAt), &self.db, page).await?;
        Ok((rows.into_iter().map(Prescription::from).collect(), total))
    }

    async fn insert(&self, prescription: &Prescription) -> AppResult<Prescription> {
        let model = ActiveModel::from(prescription).insert(&self.db).await?;
        Ok(Prescription::from(model))
    }

    async fn update(&self, prescription: &Prescription) -> AppResult<Prescription> {
        let mut active = ActiveModel::from(prescription);
        active.id = NotSet;
        active.tenant_id = NotSet;
        active.created_at = NotSet;

        let result = PrescriptionEntity::update_many()
            .set(active)
            .filter(Column::Id.eq(prescription.id))
            .filter(Column::TenantId.eq(prescription.tenant_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found(
                "PRESCRIPTION_NOT_FOUND",
                "Prescription not found",
            ));
        }
        Ok(prescription.clone())
    }

    async fn list_open_for_patient(
        &self,
        tenant_id: Uuid,
        patient_id: Uuid,
    ) -> AppResult<Vec<Prescription>> {
        let rows = scoped(tenant_id)
            .filter(Column::PatientId.eq(patient_id))
            .filter(Column::Status.is_in(open_statuses()))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Prescription::from).collect())
    }
}
