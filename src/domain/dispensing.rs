//! Dispensing records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::Prescription;

/// One line of a dispense request: how much of which prescription item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct DispenseLine {
    /// Zero-based index into the prescription's items
    pub item_index: usize,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DispenseRequest {
    pub prescription_id: Uuid,
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<DispenseLine>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DispensedItem {
    pub item_index: usize,
    pub medication: String,
    pub quantity: i32,
}

/// A completed hand-over of medication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Dispensing {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub prescription_id: Uuid,
    pub patient_id: Uuid,
    pub pharmacist_id: Uuid,
    pub items: Vec<DispensedItem>,
    pub notes: Option<String>,
    pub dispensed_at: DateTime<Utc>,
}

impl Dispensing {
    /// Build the record for lines already applied to `prescription`.
    pub fn record(
        prescription: &Prescription,
        pharmacist_id: Uuid,
        lines: &[DispenseLine],
        notes: Option<String>,
    ) -> Self {
        let items = lines
            .iter()
            .map(|line| DispensedItem {
                item_index: line.item_index,
                medication: prescription
                    .items
                    .get(line.item_index)
                    .map(|i| i.medication.clone())
                    .unwrap_or_default(),
                quantity: line.quantity,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            tenant_id: prescription.tenant_id,
            prescription_id: prescription.id,
            patient_id: prescription.patient_id,
            pharmacist_id,
            items,
            notes,
            dispensed_at: Utc::now(),
        }
    }
}

/// Result of a dispense: the new record and the updated prescription
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispenseOutcome {
    pub dispensing: Dispensing,
    pub prescription: Prescription,
}
