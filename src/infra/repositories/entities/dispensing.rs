//! Dispensing entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::DispensedItems;
use crate::domain::Dispensing;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "dispensings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub prescription_id: Uuid,
    pub patient_id: Uuid,
    pub pharmacist_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: DispensedItems,
    pub notes: Option<String>,
    pub dispensed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Dispensing {
    fn from(model: Model) -> Self {
        Dispensing {
            id: model.id,
            tenant_id: model.tenant_id,
            prescription_id: model.prescription_id,
            patient_id: model.patient_id,
            pharmacist_id: model.pharmacist_id,
            items: model.items.0,
            notes: model.notes,
            dispensed_at: model.dispensed_at,
        }
    }
}

impl From<&Dispensing> for ActiveModel {
    fn from(d: &Dispensing) -> Self {
        ActiveModel {
            id: Set(d.id),
            tenant_id: Set(d.tenant_id),
            prescription_id: Set(d.prescription_id),
            patient_id: Set(d.patient_id),
            pharmacist_id: Set(d.pharmacist_id),
            items: Set(DispensedItems(d.items.clone())),
            notes: Set(d.notes.clone()),
            dispensed_at: Set(d.dispensed_at),
        }
    }
}
