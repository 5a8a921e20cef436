//! Patient repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::patient::{ActiveModel, Column, Entity as PatientEntity};
use super::{contains_ci, fetch_page, search_term};
use crate::config::STATUS_ACTIVE;
use crate::domain::{Patient, PatientFilter, PatientIdentity};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Patient>>;

    /// Active patient with the same name, date of birth and phone
    async fn find_duplicate(
        &self,
        tenant_id: Uuid,
        identity: &PatientIdentity,
    ) -> AppResult<Option<Patient>>;

    async fn mrn_exists(&self, tenant_id: Uuid, mrn: &str) -> AppResult<bool>;

    async fn find_by_ids(&self, tenant_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Patient>>;

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &PatientFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Patient>, u64)>;

    async fn insert(&self, patient: &Patient) -> AppResult<Patient>;

    async fn update(&self, patient: &Patient) -> AppResult<Patient>;
}

pub struct PatientStore {
    db: DatabaseConnection,
}

impl PatientStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn scoped(tenant_id: Uuid) -> sea_orm::Select<PatientEntity> {
    PatientEntity::find().filter(Column::TenantId.eq(tenant_id))
}

#[async_trait]
impl PatientRepository for PatientStore {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Patient>> {
        let result = scoped(tenant_id)
            .filter(Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(result.map(Patient::from))
    }

    async fn find_duplicate(
        &self,
        tenant_id: Uuid,
        identity: &PatientIdentity,
    ) -> AppResult<Option<Patient>> {
        let mut query = scoped(tenant_id)
            .filter(Column::Status.eq(STATUS_ACTIVE))
            .filter(equals_ci(Column::FirstName, &identity.first_name))
            .filter(equals_ci(Column::LastName, &identity.last_name))
            .filter(Column::DateOfBirth.eq(identity.date_of_birth));
        query = match &identity.phone {
            Some(phone) => query.filter(Column::Phone.eq(phone.as_str())),
            None => query.filter(Column::Phone.is_null()),
        };

        let result = query.one(&self.db).await?;
        Ok(result.map(Patient::from))
    }

    async fn mrn_exists(&self, tenant_id: Uuid, mrn: &str) -> AppResult<bool> {
        let count = scoped(tenant_id)
            .filter(Column::Mrn.eq(mrn))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn find_by_ids(&self, tenant_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Patient>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = scoped(tenant_id)
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Patient::from).collect())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &PatientFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Patient>, u64)> {
        let mut query = scoped(tenant_id);
        if let Some(department_id) = filter.department_id {
            query = query.filter(Column::DepartmentId.eq(department_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(term) = search_term(&filter.search) {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(Column::FirstName, term))
                    .add(contains_ci(Column::LastName, term))
                    .add(contains_ci(Column::Mrn, term))
                    .add(contains_ci(Column::Phone, term)),
            );
        }

        let query = query
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName);
        let (rows, total) = fetch_page(query, &self.db, page).await?;
        Ok((rows.into_iter().map(Patient::from).collect(), total))
    }

    async fn insert(&self, patient: &Patient) -> AppResult<Patient> {
        let model = ActiveModel::from(patient).insert(&self.db).await?;
        Ok(Patient::from(model))
    }

    async fn update(&self, patient: &Patient) -> AppResult<Patient> {
        let mut active = ActiveModel::from(patient);
        active.id = NotSet;
        active.tenant_id = NotSet;
        active.mrn = NotSet;
        active.created_at = NotSet;

        let result = PatientEntity::update_many()
            .set(active)
            .filter(Column::Id.eq(patient.id))
            .filter(Column::TenantId.eq(patient.tenant_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("PATIENT_NOT_FOUND", "Patient not found"));
        }
        Ok(patient.clone())
    }
}

/// Case-insensitive equality
fn equals_ci(column: Column, value: &str) -> sea_orm::sea_query::SimpleExpr {
    use sea_orm::sea_query::{Expr, Func};
    Expr::expr(Func::lower(Expr::col(column))).eq(value.trim().to_lowercase())
}
