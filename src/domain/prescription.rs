//! Prescriptions and the dispensing arithmetic applied to them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::access::ResourceAttributes;
use super::dispensing::DispenseLine;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrescriptionStatus {
    Active,
    PartiallyDispensed,
    Dispensed,
    Cancelled,
}

impl PrescriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::Active => "ACTIVE",
            PrescriptionStatus::PartiallyDispensed => "PARTIALLY_DISPENSED",
            PrescriptionStatus::Dispensed => "DISPENSED",
            PrescriptionStatus::Cancelled => "CANCELLED",
        }
    }

    /// Still has medication waiting to be handed out
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            PrescriptionStatus::Active | PrescriptionStatus::PartiallyDispensed
        )
    }
}

impl From<&str> for PrescriptionStatus {
    fn from(s: &str) -> Self {
        match s {
            "ACTIVE" => PrescriptionStatus::Active,
            "PARTIALLY_DISPENSED" => PrescriptionStatus::PartiallyDispensed,
            "DISPENSED" => PrescriptionStatus::Dispensed,
            "CANCELLED" => PrescriptionStatus::Cancelled,
            other => {
                tracing::warn!(
                    status = other,
                    "Unknown prescription status, reading as CANCELLED"
                );
                PrescriptionStatus::Cancelled
            }
        }
    }
}

/// One medication line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct PrescriptionItem {
    #[validate(length(min = 1, message = "Medication is required"))]
    #[schema(example = "Amoxicillin 500mg")]
    pub medication: String,
    #[validate(length(min = 1, message = "Dosage is required"))]
    #[schema(example = "1 capsule")]
    pub dosage: String,
    #[validate(length(min = 1, message = "Frequency is required"))]
    #[schema(example = "every 8 hours")]
    pub frequency: String,
    #[schema(example = "oral")]
    pub route: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1 day"))]
    pub duration_days: Option<i32>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Filled in by dispensing; ignored on input
    #[serde(default)]
    pub dispensed_quantity: i32,
}

impl PrescriptionItem {
    pub fn remaining(&self) -> i32 {
        self.quantity - self.dispensed_quantity
    }
}

/// Prescription domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Prescription {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub patient_id: Uuid,
    pub prescriber_id: Uuid,
    pub items: Vec<PrescriptionItem>,
    pub notes: Option<String>,
    pub status: PrescriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Prescription {
    pub fn new(
        tenant_id: Uuid,
        patient_id: Uuid,
        prescriber_id: Uuid,
        items: Vec<PrescriptionItem>,
        notes: Option<String>,
    ) -> AppResult<Self> {
        if items.is_empty() {
            return Err(AppError::bad_request(
                "EMPTY_PRESCRIPTION",
                "A prescription needs at least one item",
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            tenant_id,
            patient_id,
            prescriber_id,
            items: items
                .into_iter()
                .map(|item| PrescriptionItem {
                    dispensed_quantity: 0,
                    ..item
                })
                .collect(),
            notes,
            status: PrescriptionStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn attributes(&self) -> ResourceAttributes {
        ResourceAttributes::new(self.tenant_id).owner(self.prescriber_id)
    }

    pub fn has_dispensed(&self) -> bool {
        self.items.iter().any(|i| i.dispensed_quantity > 0)
    }

    /// Only an untouched, active prescription can be cancelled.
    pub fn cancel(&mut self) -> AppResult<()> {
        if self.status != PrescriptionStatus::Active || self.has_dispensed() {
            return Err(AppError::bad_request(
                "INVALID_STATUS",
                format!(
                    "Prescription in status {} cannot be cancelled",
                    self.status.as_str()
                ),
            ));
        }
        self.status = PrescriptionStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record dispensed quantities and move the status forward.
    ///
    /// Every line is validated before anything is changed, so a rejected
    /// request leaves the prescription untouched. Several lines may target
    /// the same item; their quantities add up.
    pub fn apply_dispense(&mut self, lines: &[DispenseLine]) -> AppResult<()> {
        if !self.status.is_open() {
            return Err(AppError::bad_request(
                "INVALID_STATUS",
                format!(
                    "Prescription in status {} cannot be dispensed",
                    self.status.as_str()
                ),
            ));
        }

        let mut requested: BTreeMap<usize, i32> = BTreeMap::new();
        for line in lines {
            if line.item_index >= self.items.len() {
                return Err(AppError::bad_request(
                    "INVALID_ITEM",
                    format!("Prescription has no item {}", line.item_index),
                ));
            }
            if line.quantity < 1 {
                return Err(AppError::validation("Dispensed quantity must be at least 1"));
            }
            let total = requested.entry(line.item_index).or_default();
            *total = total
                .checked_add(line.quantity)
                .ok_or_else(|| over_dispense(&self.items[line.item_index]))?;
        }

        for (&index, &quantity) in &requested {
            let item = &self.items[index];
            if quantity > item.remaining() {
                return Err(over_dispense(item));
            }
        }

        for (index, quantity) in requested {
            self.items[index].dispensed_quantity += quantity;
        }

        self.status = if self.items.iter().all(|i| i.remaining() == 0) {
            PrescriptionStatus::Dispensed
        } else {
            PrescriptionStatus::PartiallyDispensed
        };
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn over_dispense(item: &PrescriptionItem) -> AppError {
    AppError::bad_request(
        "OVER_DISPENSE",
        format!(
            "Only {} of {} remain to be dispensed",
            item.remaining(),
            item.medication
        ),
    )
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePrescription {
    pub patient_id: Uuid,
    #[validate(nested)]
    pub items: Vec<PrescriptionItem>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PrescriptionFilter {
    pub patient_id: Option<Uuid>,
    pub status: Option<PrescriptionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(medication: &str, quantity: i32) -> PrescriptionItem {
        PrescriptionItem {
            medication: medication.into(),
            dosage: "1 tab".into(),
            frequency: "daily".into(),
            route: None,
            duration_days: Some(7),
            quantity,
            dispensed_quantity: 0,
        }
    }

    fn prescription() -> Prescription {
        Prescription::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![item("Amoxicillin", 21), item("Paracetamol", 10)],
            None,
        )
        .unwrap()
    }

    fn line(item_index: usize, quantity: i32) -> DispenseLine {
        DispenseLine {
            item_index,
            quantity,
        }
    }

    #[test]
    fn test_empty_prescription_rejected() {
        let err = Prescription::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), vec![], None)
            .unwrap_err();
        assert_eq!(err.code(), "EMPTY_PRESCRIPTION");
    }

    #[test]
    fn test_partial_then_full_dispense() {
        let mut p = prescription();
        p.apply_dispense(&[line(0, 7)]).unwrap();
        assert_eq!(p.status, PrescriptionStatus::PartiallyDispensed);
        assert_eq!(p.items[0].dispensed_quantity, 7);

        p.apply_dispense(&[line(0, 14), line(1, 10)]).unwrap();
        assert_eq!(p.status, PrescriptionStatus::Dispensed);
    }

    #[test]
    fn test_over_dispense_leaves_prescription_unchanged() {
        let mut p = prescription();
        let before = p.clone();
        let err = p.apply_dispense(&[line(1, 4), line(0, 20), line(0, 2)]).unwrap_err();
        assert_eq!(err.code(), "OVER_DISPENSE");
        assert_eq!(p, before);
    }

    #[test]
    fn test_overflowing_quantities_rejected() {
        let mut p = prescription();
        let before = p.clone();
        let err = p
            .apply_dispense(&[line(0, i32::MAX), line(0, i32::MAX)])
            .unwrap_err();
        assert_eq!(err.code(), "OVER_DISPENSE");
        assert_eq!(p, before);
    }

    #[test]
    fn test_stored_status_parsing() {
        assert_eq!(
            PrescriptionStatus::from("PARTIALLY_DISPENSED"),
            PrescriptionStatus::PartiallyDispensed
        );
        assert_eq!(PrescriptionStatus::from("CANCELLED"), PrescriptionStatus::Cancelled);
        assert_eq!(PrescriptionStatus::from("garbled"), PrescriptionStatus::Cancelled);
    }

    #[test]
    fn test_unknown_item_index() {
        let mut p = prescription();
        assert_eq!(
            p.apply_dispense(&[line(5, 1)]).unwrap_err().code(),
            "INVALID_ITEM"
        );
    }

    #[test]
    fn test_cannot_dispense_cancelled() {
        let mut p = prescription();
        p.cancel().unwrap();
        assert_eq!(
            p.apply_dispense(&[line(0, 1)]).unwrap_err().code(),
            "INVALID_STATUS"
        );
    }

    #[test]
    fn test_cannot_cancel_after_dispensing() {
        let mut p = prescription();
        p.apply_dispense(&[line(0, 1)]).unwrap();
        assert_eq!(p.cancel().unwrap_err().code(), "INVALID_STATUS");
    }
}
