//! Vitals repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::vitals::{ActiveModel, Column, Entity as VitalsEntity};
use super::fetch_page;
use crate::domain::Vitals;
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait VitalsRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Vitals>>;

    async fn insert(&self, vitals: &Vitals) -> AppResult<Vitals>;

    /// Newest first
    async fn list_for_patient(
        &self,
        tenant_id: Uuid,
        patient_id: Uuid,
        page: PaginationParams,
    ) -> AppResult<(Vec<Vitals>, u64)>;

    async fn latest_for_patient(&self, tenant_id: Uuid, patient_id: Uuid)
        -> AppResult<Option<Vitals>>;
}

pub struct VitalsStore {
    db: DatabaseConnection,
}

impl VitalsStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn for_patient(tenant_id: Uuid, patient_id: Uuid) -> sea_orm::Select<VitalsEntity> {
    VitalsEntity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::PatientId.eq(patient_id))
        .order_by_desc(Column::RecordedAt)
}

#[async_trait]
impl VitalsRepository for VitalsStore {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Vitals>> {
        let result = VitalsEntity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(result.map(Vitals::from))
    }

    async fn insert(&self, vitals: &Vitals) -> AppResult<Vitals> {
        let model = ActiveModel::from(vitals).insert(&self.db).await?;
        Ok(Vitals::from(model))
    }

    async fn list_for_patient(
        &self,
        tenant_id: Uuid,
        patient_id: Uuid,
        page: PaginationParams,
    ) -> AppResult<(Vec<Vitals>, u64)> {
        let (rows, total) = fetch_page(for_patient(tenant_id, patient_id), &self.db, page).await?;
        Ok((rows.into_iter().map(Vitals::from).collect(), total))
    }

    async fn latest_for_patient(
        &self,
        tenant_id: Uuid,
        patient_id: Uuid,
    ) -> AppResult<Option<Vitals>> {
        let result = for_patient(tenant_id, patient_id).one(&self.db).await?;
        Ok(result.map(Vitals::from))
    }
}
