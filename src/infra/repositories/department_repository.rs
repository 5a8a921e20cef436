//! Department repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::department::{self, ActiveModel, Column, Entity as DepartmentEntity};
use super::{contains_ci, fetch_page, search_term};
use crate::config::STATUS_ACTIVE;
use crate::domain::{Department, DepartmentFilter};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Find a department of any status
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Department>>;

    async fn find_by_code(&self, tenant_id: Uuid, code: &str) -> AppResult<Option<Department>>;

    /// Filtered page, sorted by name
    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &DepartmentFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Department>, u64)>;

    /// Every department of the tenant, sorted by name
    async fn list_all(&self, tenant_id: Uuid) -> AppResult<Vec<Department>>;

    async fn insert(&self, department: &Department) -> AppResult<Department>;

    async fn update(&self, department: &Department) -> AppResult<Department>;

    /// Active departments whose parent is `id`
    async fn count_active_children(&self, tenant_id: Uuid, id: Uuid) -> AppResult<u64>;

    /// Active departments headed by `staff_id`
    async fn count_active_headed_by(&self, tenant_id: Uuid, staff_id: Uuid) -> AppResult<u64>;
}

pub struct DepartmentStore {
    db: DatabaseConnection,
}

impl DepartmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn scoped(tenant_id: Uuid) -> sea_orm::Select<DepartmentEntity> {
    DepartmentEntity::find().filter(Column::TenantId.eq(tenant_id))
}

#[async_trait]
impl DepartmentRepository for DepartmentStore {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Department>> {
        let result = scoped(tenant_id)
            .filter(Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(result.map(Department::from))
    }

    async fn find_by_code(&self, tenant_id: Uuid, code: &str) -> AppResult<Option<Department>> {
        let result = scoped(tenant_id)
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(result.map(Department::from))
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &DepartmentFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Department>, u64)> {
        let mut query = scoped(tenant_id);
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(term) = search_term(&filter.search) {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(Column::Name, term))
                    .add(contains_ci(Column::Code, term)),
            );
        }

        let (rows, total) =
            fetch_page(query.order_by_asc(Column::Name), &self.db, page).await?;
        Ok((rows.into_iter().map(Department::from).collect(), total))
    }

    async fn list_all(&self, tenant_id: Uuid) -> AppResult<Vec<Department>> {
        let rows = scoped(tenant_id)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Department::from).collect())
    }

    async fn insert(&self, department: &Department) -> AppResult<Department> {
        let model = ActiveModel::from(department).insert(&self.db).await?;
        Ok(Department::from(model))
    }

    async fn update(&self, department: &Department) -> AppResult<Department> {
        let mut active = ActiveModel::from(department);
        active.id = NotSet;
        active.tenant_id = NotSet;
        active.created_at = NotSet;

        let result = DepartmentEntity::update_many()
            .set(active)
            .filter(department::Column::Id.eq(department.id))
            .filter(department::Column::TenantId.eq(department.tenant_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found(
                "DEPARTMENT_NOT_FOUND",
                "Department not found",
            ));
        }
        Ok(department.clone())
    }

    async fn count_active_children(&self, tenant_id: Uuid, id: Uuid) -> AppResult<u64> {
        let count = scoped(tenant_id)
            .filter(Column::ParentId.eq(id))
            .filter(Column::Status.eq(STATUS_ACTIVE))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_active_headed_by(&self, tenant_id: Uuid, staff_id: Uuid) -> AppResult<u64> {
        let count = scoped(tenant_id)
            .filter(Column::HeadId.eq(staff_id))
            .filter(Column::Status.eq(STATUS_ACTIVE))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
