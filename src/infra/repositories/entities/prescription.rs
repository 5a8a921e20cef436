//! Prescription entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::PrescriptionItems;
use crate::domain::{Prescription, PrescriptionStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "prescriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub patient_id: Uuid,
    pub prescriber_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: PrescriptionItems,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Prescription {
    fn from(model: Model) -> Self {
        Prescription {
            id: model.id,
            tenant_id: model.tenant_id,
            patient_id: model.patient_id,
            prescriber_id: model.prescriber_id,
            items: model.items.0,
            notes: model.notes,
            status: PrescriptionStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Prescription> for ActiveModel {
    fn from(p: &Prescription) -> Self {
        ActiveModel {
            id: Set(p.id),
            tenant_id: Set(p.tenant_id),
            patient_id: Set(p.patient_id),
            prescriber_id: Set(p.prescriber_id),
            items: Set(PrescriptionItems(p.items.clone())),
            notes: Set(p.notes.clone()),
            status: Set(p.status.as_str().to_string()),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        }
    }
}
