//! Shared types used across the API surface.

mod pagination;
mod response;

pub use pagination::{
    Paginated, PaginatedAppointments, PaginatedDepartments, PaginatedPatients,
    PaginatedPrescriptions, PaginatedRoles, PaginatedStaff, PaginatedVitals, PaginationMeta,
    PaginationParams,
};
pub use response::{Created, NoContent};
