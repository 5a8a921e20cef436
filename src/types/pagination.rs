//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::{
    AppointmentView, Department, Patient, Prescription, Role, StaffResponse, Vitals,
};

/// Pagination query parameters (reusable across all list endpoints)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-indexed page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (capped at 100)
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// Page number clamped to at least 1
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Zero-based page index for the paginator
    pub fn page_index(&self) -> u64 {
        self.page() - 1
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper: `{ data, pagination }`
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    PaginatedDepartments = Paginated<Department>,
    PaginatedRoles = Paginated<Role>,
    PaginatedStaff = Paginated<StaffResponse>,
    PaginatedPatients = Paginated<Patient>,
    PaginatedVitals = Paginated<Vitals>,
    PaginatedPrescriptions = Paginated<Prescription>,
    PaginatedAppointments = Paginated<AppointmentView>
)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, params: PaginationParams, total: u64) -> Self {
        let limit = params.limit();
        Self {
            data,
            pagination: PaginationMeta {
                page: params.page(),
                limit,
                total,
                total_pages: total.div_ceil(limit),
            },
        }
    }

    /// Transform each item while keeping the pagination metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
