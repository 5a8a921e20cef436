//! Record status shared by every soft-deletable entity.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{STATUS_ACTIVE, STATUS_INACTIVE};

/// Soft-delete marker: records are never removed, only made `INACTIVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => STATUS_ACTIVE,
            RecordStatus::Inactive => STATUS_INACTIVE,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RecordStatus::Active)
    }
}

impl From<&str> for RecordStatus {
    fn from(s: &str) -> Self {
        match s {
            STATUS_ACTIVE => RecordStatus::Active,
            _ => RecordStatus::Inactive,
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
