//! SeaORM entity definitions
//!
//! Database rows, kept separate from the domain types. Each module converts
//! `Model -> domain` and `&domain -> ActiveModel`. List-valued columns are
//! JSONB and go through the typed wrappers below.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DispensedItem, PrescriptionItem, VitalAlert};

pub mod appointment;
pub mod department;
pub mod dispensing;
pub mod hospital;
pub mod patient;
pub mod prescription;
pub mod role;
pub mod staff;
pub mod vitals;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct UuidList(pub Vec<Uuid>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PrescriptionItems(pub Vec<PrescriptionItem>);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AlertList(pub Vec<VitalAlert>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct DispensedItems(pub Vec<DispensedItem>);
