//! Role entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::StringList;
use crate::domain::{RecordStatus, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub permissions: StringList,
    pub parent_id: Option<Uuid>,
    pub is_system: bool,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Role {
    fn from(model: Model) -> Self {
        Role {
            id: model.id,
            tenant_id: model.tenant_id,
            name: model.name,
            code: model.code,
            description: model.description,
            permissions: model.permissions.0,
            parent_id: model.parent_id,
            is_system: model.is_system,
            status: RecordStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Role> for ActiveModel {
    fn from(r: &Role) -> Self {
        ActiveModel {
            id: Set(r.id),
            tenant_id: Set(r.tenant_id),
            name: Set(r.name.clone()),
            code: Set(r.code.clone()),
            description: Set(r.description.clone()),
            permissions: Set(StringList(r.permissions.clone())),
            parent_id: Set(r.parent_id),
            is_system: Set(r.is_system),
            status: Set(r.status.as_str().to_string()),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        }
    }
}
