//! Role repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::role::{ActiveModel, Column, Entity as RoleEntity};
use super::{contains_ci, fetch_page, search_term};
use crate::config::STATUS_ACTIVE;
use crate::domain::{Role, RoleFilter};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Role>>;

    async fn find_by_code(&self, tenant_id: Uuid, code: &str) -> AppResult<Option<Role>>;

    /// Every role of the tenant; used for permission resolution
    async fn list_all(&self, tenant_id: Uuid) -> AppResult<Vec<Role>>;

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &RoleFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Role>, u64)>;

    async fn insert(&self, role: &Role) -> AppResult<Role>;

    async fn update(&self, role: &Role) -> AppResult<Role>;

    /// Active roles whose parent is `id`
    async fn count_active_children(&self, tenant_id: Uuid, id: Uuid) -> AppResult<u64>;
}

pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn scoped(tenant_id: Uuid) -> sea_orm::Select<RoleEntity> {
    RoleEntity::find().filter(Column::TenantId.eq(tenant_id))
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Role>> {
        let result = scoped(tenant_id)
            .filter(Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(result.map(Role::from))
    }

    async fn find_by_code(&self, tenant_id: Uuid, code: &str) -> AppResult<Option<Role>> {
        let result = scoped(tenant_id)
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(result.map(Role::from))
    }

    async fn list_all(&self, tenant_id: Uuid) -> AppResult<Vec<Role>> {
        let rows = scoped(tenant_id)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &RoleFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Role>, u64)> {
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

        let (rows, total) = fetch_page(query.order_by_asc(Column::Name), &self.db, page).await?;
        Ok((rows.into_iter().map(Role::from).collect(), total))
    }

    async fn insert(&self, role: &Role) -> AppResult<Role> {
        let model = ActiveModel::from(role).insert(&self.db).await?;
        Ok(Role::from(model))
    }

    async fn update(&self, role: &Role) -> AppResult<Role> {
        let mut active = ActiveModel::from(role);
        active.id = NotSet;
        active.tenant_id = NotSet;
        active.created_at = NotSet;

        let result = RoleEntity::update_many()
            .set(active)
            .filter(Column::Id.eq(role.id))
            .filter(Column::TenantId.eq(role.tenant_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("ROLE_NOT_FOUND", "Role not found"));
        }
        Ok(role.clone())
    }

    async fn count_active_children(&self, tenant_id: Uuid, id: Uuid) -> AppResult<u64> {
        let count = scoped(tenant_id)
            .filter(Column::ParentId.eq(id))
            .filter(Column::Status.eq(STATUS_ACTIVE))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
