//! Dispensing repository. Records are written only inside the dispense
//! transaction (see `TxDispensingRepository`); this side is read-only.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entities::dispensing::{Column, Entity as DispensingEntity};
use crate::domain::Dispensing;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DispensingRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Dispensing>>;

    /// Oldest first
    async fn list_for_prescription(
        &self,
        tenant_id: Uuid,
        prescription_id: Uuid,
    ) -> AppResult<Vec<Dispensing>>;
}

pub struct DispensingStore {
    db: DatabaseConnection,
}

impl DispensingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DispensingRepository for DispensingStore {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Dispensing>> {
        let result = DispensingEntity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(result.map(Dispensing::from))
    }

    async fn list_for_prescription(
        &self,
        tenant_id: Uuid,
        prescription_id: Uuid,
    ) -> AppResult<Vec<Dispensing>> {
        let rows = DispensingEntity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::PrescriptionId.eq(prescription_id))
            .order_by_asc(Column::DispensedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Dispensing::from).collect())
    }
}
