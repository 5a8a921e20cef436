//! Patient entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::StringList;
use crate::domain::{Gender, Patient, RecordStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "patients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Date,
    pub gender: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub allergies: StringList,
    pub department_id: Option<Uuid>,
    pub primary_doctor_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Patient {
    fn from(model: Model) -> Self {
        Patient {
            id: model.id,
            tenant_id: model.tenant_id,
            mrn: model.mrn,
            first_name: model.first_name,
            last_name: model.last_name,
            date_of_birth: model.date_of_birth,
            gender: Gender::from(model.gender.as_str()),
            phone: model.phone,
            email: model.email,
            address: model.address,
            blood_group: model.blood_group,
            allergies: model.allergies.0,
            department_id: model.department_id,
            primary_doctor_id: model.primary_doctor_id,
            status: RecordStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Patient> for ActiveModel {
    fn from(p: &Patient) -> Self {
        ActiveModel {
            id: Set(p.id),
            tenant_id: Set(p.tenant_id),
            mrn: Set(p.mrn.clone()),
            first_name: Set(p.first_name.clone()),
            last_name: Set(p.last_name.clone()),
            date_of_birth: Set(p.date_of_birth),
            gender: Set(p.gender.as_str().to_string()),
            phone: Set(p.phone.clone()),
            email: Set(p.email.clone()),
            address: Set(p.address.clone()),
            blood_group: Set(p.blood_group.clone()),
            allergies: Set(StringList(p.allergies.clone())),
            department_id: Set(p.department_id),
            primary_doctor_id: Set(p.primary_doctor_id),
            status: Set(p.status.as_str().to_string()),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        }
    }
}
