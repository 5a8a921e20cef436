//! Department entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Department, RecordStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub head_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Department {
    fn from(model: Model) -> Self {
        Department {
            id: model.id,
            tenant_id: model.tenant_id,
            name: model.name,
            code: model.code,
            description: model.description,
            parent_id: model.parent_id,
            head_id: model.head_id,
            status: RecordStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Department> for ActiveModel {
    fn from(d: &Department) -> Self {
        ActiveModel {
            id: Set(d.id),
            tenant_id: Set(d.tenant_id),
            name: Set(d.name.clone()),
            code: Set(d.code.clone()),
            description: Set(d.description.clone()),
            parent_id: Set(d.parent_id),
            head_id: Set(d.head_id),
            status: Set(d.status.as_str().to_string()),
            created_at: Set(d.created_at),
            updated_at: Set(d.updated_at),
        }
    }
}
