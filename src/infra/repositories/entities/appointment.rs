//! Appointment entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::{Appointment, AppointmentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub department_id: Option<Uuid>,
    pub scheduled_at: DateTimeUtc,
    pub ends_at: DateTimeUtc,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Appointment {
    fn from(model: Model) -> Self {
        Appointment {
            id: model.id,
            tenant_id: model.tenant_id,
            patient_id: model.patient_id,
            doctor_id: model.doctor_id,
            department_id: model.department_id,
            scheduled_at: model.scheduled_at,
            ends_at: model.ends_at,
            reason: model.reason,
            notes: model.notes,
            status: AppointmentStatus::from(model.status.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Appointment> for ActiveModel {
    fn from(a: &Appointment) -> Self {
        ActiveModel {
            id: Set(a.id),
            tenant_id: Set(a.tenant_id),
            patient_id: Set(a.patient_id),
            doctor_id: Set(a.doctor_id),
            department_id: Set(a.department_id),
            scheduled_at: Set(a.scheduled_at),
            ends_at: Set(a.ends_at),
            reason: Set(a.reason.clone()),
            notes: Set(a.notes.clone()),
            status: Set(a.status.as_str().to_string()),
            created_at: Set(a.created_at),
            updated_at: Set(a.updated_at),
        }
    }
}
