//! Hospital (tenant) entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Hospital, HospitalStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hospitals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub license_number: Option<String>,
    pub timezone: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Hospital {
    fn from(model: Model) -> Self {
        Hospital {
            id: model.id,
            name: model.name,
            code: model.code,
            email: model.email,
            phone: model.phone,
            address: model.address,
            license_number: model.license_number,
            timezone: model.timezone,
            status: HospitalStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Hospital> for ActiveModel {
    fn from(h: &Hospital) -> Self {
        ActiveModel {
            id: Set(h.id),
            name: Set(h.name.clone()),
            code: Set(h.code.clone()),
            email: Set(h.email.clone()),
            phone: Set(h.phone.clone()),
            address: Set(h.address.clone()),
            license_number: Set(h.license_number.clone()),
            timezone: Set(h.timezone.clone()),
            status: Set(h.status.as_str().to_string()),
            created_at: Set(h.created_at),
            updated_at: Set(h.updated_at),
        }
    }
}
