//! Staff entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::UuidList;
use crate::domain::{RecordStatus, Staff};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub role_ids: UuidList,
    pub status: String,
    pub last_login_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Staff {
    fn from(model: Model) -> Self {
        Staff {
            id: model.id,
            tenant_id: model.tenant_id,
            email: model.email,
            password_hash: model.password_hash,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            job_title: model.job_title,
            department_id: model.department_id,
            role_ids: model.role_ids.0,
            status: RecordStatus::from(model.status.as_str()),
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Staff> for ActiveModel {
    fn from(s: &Staff) -> Self {
        ActiveModel {
            id: Set(s.id),
            tenant_id: Set(s.tenant_id),
            email: Set(s.email.clone()),
            password_hash: Set(s.password_hash.clone()),
            first_name: Set(s.first_name.clone()),
            last_name: Set(s.last_name.clone()),
            phone: Set(s.phone.clone()),
            job_title: Set(s.job_title.clone()),
            department_id: Set(s.department_id),
            role_ids: Set(UuidList(s.role_ids.clone())),
            status: Set(s.status.as_str().to_string()),
            last_login_at: Set(s.last_login_at),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
        }
    }
}
