//! Hospital repository. Hospitals are the tenants themselves, so lookups
//! here are by id or by the global hospital code.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::entities::hospital::{self, ActiveModel, Entity as HospitalEntity};
use crate::domain::Hospital;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HospitalRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hospital>>;

    /// Lookup by the upper-case hospital code
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Hospital>>;

    async fn update(&self, hospital: &Hospital) -> AppResult<Hospital>;
}

pub struct HospitalStore {
    db: DatabaseConnection,
}

impl HospitalStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HospitalRepository for HospitalStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hospital>> {
        let result = HospitalEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Hospital::from))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Hospital>> {
        let result = HospitalEntity::find()
            .filter(hospital::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(result.map(Hospital::from))
    }

    async fn update(&self, hospital: &Hospital) -> AppResult<Hospital> {
        let mut active = ActiveModel::from(hospital);
        active.id = sea_orm::NotSet;
        active.created_at = sea_orm::NotSet;

        let result = HospitalEntity::update_many()
            .set(active)
            .filter(hospital::Column::Id.eq(hospital.id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("HOSPITAL_NOT_FOUND", "Hospital not found"));
        }
        Ok(hospital.clone())
    }
}
