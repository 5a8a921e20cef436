//! Staff repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgBinOper;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::staff::{ActiveModel, Column, Entity as StaffEntity};
use super::{contains_ci, fetch_page, search_term};
use crate::config::STATUS_ACTIVE;
use crate::domain::{Staff, StaffFilter};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Find a staff member of any status
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Staff>>;

    /// Find by (already lower-cased) email
    async fn find_by_email(&self, tenant_id: Uuid, email: &str) -> AppResult<Option<Staff>>;

    /// Batch lookup; missing ids are skipped
    async fn find_by_ids(&self, tenant_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Staff>>;

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &StaffFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Staff>, u64)>;

    /// Active members of a department, sorted by last name
    async fn list_by_department(&self, tenant_id: Uuid, department_id: Uuid)
        -> AppResult<Vec<Staff>>;

    async fn count_active_in_department(&self, tenant_id: Uuid, department_id: Uuid)
        -> AppResult<u64>;

    /// Active staff holding `role_id`
    async fn count_active_with_role(&self, tenant_id: Uuid, role_id: Uuid) -> AppResult<u64>;

    async fn insert(&self, staff: &Staff) -> AppResult<Staff>;

    async fn update(&self, staff: &Staff) -> AppResult<Staff>;

    async fn record_login(&self, tenant_id: Uuid, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

pub struct StaffStore {
    db: DatabaseConnection,
}

impl StaffStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn scoped(tenant_id: Uuid) -> sea_orm::Select<StaffEntity> {
    StaffEntity::find().filter(Column::TenantId.eq(tenant_id))
}

/// `role_ids @> '["<id>"]'`
fn holds_role(role_id: Uuid) -> sea_orm::sea_query::SimpleExpr {
    Expr::col(Column::RoleIds).binary(
        PgBinOper::Contains,
        Expr::val(serde_json::json!([role_id])),
    )
}

#[async_trait]
impl StaffRepository for StaffStore {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Staff>> {
        let result = scoped(tenant_id)
            .filter(Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(result.map(Staff::from))
    }

    async fn find_by_email(&self, tenant_id: Uuid, email: &str) -> AppResult<Option<Staff>> {
        let result = scoped(tenant_id)
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(result.map(Staff::from))
    }

    async fn find_by_ids(&self, tenant_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Staff>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = scoped(tenant_id)
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Staff::from).collect())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &StaffFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Staff>, u64)> {
        let mut query = scoped(tenant_id);
        if let Some(department_id) = filter.department_id {
            query = query.filter(Column::DepartmentId.eq(department_id));
        }
        if let Some(role_id) = filter.role_id {
            query = query.filter(holds_role(role_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(term) = search_term(&filter.search) {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(Column::FirstName, term))
                    .add(contains_ci(Column::LastName, term))
                    .add(contains_ci(Column::Email, term)),
            );
        }

        let query = query
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName);
        let (rows, total) = fetch_page(query, &self.db, page).await?;
        Ok((rows.into_iter().map(Staff::from).collect(), total))
    }

    async fn list_by_department(
        &self,
        tenant_id: Uuid,
        department_id: Uuid,
    ) -> AppResult<Vec<Staff>> {
        let rows = scoped(tenant_id)
            .filter(Column::DepartmentId.eq(department_id))
            .filter(Column::Status.eq(STATUS_ACTIVE))
            .order_by_asc(Column::LastName)
            .order_by_asc(Column::FirstName)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Staff::from).collect())
    }

    async fn count_active_in_department(
        &self,
        tenant_id: Uuid,
        department_id: Uuid,
    ) -> AppResult<u64> {
        let count = scoped(tenant_id)
            .filter(Column::DepartmentId.eq(department_id))
            .filter(Column::Status.eq(STATUS_ACTIVE))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn count_active_with_role(&self, tenant_id: Uuid, role_id: Uuid) -> AppResult<u64> {
        let count = scoped(tenant_id)
            .filter(holds_role(role_id))
            .filter(Column::Status.eq(STATUS_ACTIVE))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn insert(&self, staff: &Staff) -> AppResult<Staff> {
        let model = ActiveModel::from(staff).insert(&self.db).await?;
        Ok(Staff::from(model))
    }

    async fn update(&self, staff: &Staff) -> AppResult<Staff> {
        let mut active = ActiveModel::from(staff);
        active.id = NotSet;
        active.tenant_id = NotSet;
        active.created_at = NotSet;

        let result = StaffEntity::update_many()
            .set(active)
            .filter(Column::Id.eq(staff.id))
            .filter(Column::TenantId.eq(staff.tenant_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("USER_NOT_FOUND", "User not found"));
        }
        Ok(staff.clone())
    }

    async fn record_login(&self, tenant_id: Uuid, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let active = ActiveModel {
            last_login_at: Set(Some(at)),
            ..Default::default()
        };
        StaffEntity::update_many()
            .set(active)
            .filter(Column::Id.eq(id))
            .filter(Column::TenantId.eq(tenant_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
