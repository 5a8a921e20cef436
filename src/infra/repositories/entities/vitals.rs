//! Vitals entity. Measurements are stored in canonical units.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::AlertList;
use crate::domain::{Measurements, Vitals};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vitals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub patient_id: Uuid,
    pub recorded_by: Uuid,
    pub temperature_c: Option<f64>,
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub oxygen_saturation: Option<f64>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub blood_glucose_mg_dl: Option<f64>,
    pub pain_score: Option<i32>,
    pub bmi: Option<f64>,
    pub notes: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub alerts: AlertList,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Vitals {
    fn from(model: Model) -> Self {
        Vitals {
            id: model.id,
            tenant_id: model.tenant_id,
            patient_id: model.patient_id,
            recorded_by: model.recorded_by,
            measurements: Measurements {
                temperature_c: model.temperature_c,
                systolic_bp: model.systolic_bp,
                diastolic_bp: model.diastolic_bp,
                heart_rate: model.heart_rate,
                respiratory_rate: model.respiratory_rate,
                oxygen_saturation: model.oxygen_saturation,
                weight_kg: model.weight_kg,
                height_cm: model.height_cm,
                blood_glucose_mg_dl: model.blood_glucose_mg_dl,
                pain_score: model.pain_score,
                bmi: model.bmi,
            },
            notes: model.notes,
            alerts: model.alerts.0,
            recorded_at: model.recorded_at,
        }
    }
}

impl From<&Vitals> for ActiveModel {
    fn from(v: &Vitals) -> Self {
        let m = &v.measurements;
        ActiveModel {
            id: Set(v.id),
            tenant_id: Set(v.tenant_id),
            patient_id: Set(v.patient_id),
            recorded_by: Set(v.recorded_by),
            temperature_c: Set(m.temperature_c),
            systolic_bp: Set(m.systolic_bp),
            diastolic_bp: Set(m.diastolic_bp),
            heart_rate: Set(m.heart_rate),
            respiratory_rate: Set(m.respiratory_rate),
            oxygen_saturation: Set(m.oxygen_saturation),
            weight_kg: Set(m.weight_kg),
            height_cm: Set(m.height_cm),
            blood_glucose_mg_dl: Set(m.blood_glucose_mg_dl),
            pain_score: Set(m.pain_score),
            bmi: Set(m.bmi),
            notes: Set(v.notes.clone()),
            alerts: Set(AlertList(v.alerts.clone())),
            recorded_at: Set(v.recorded_at),
        }
    }
}
