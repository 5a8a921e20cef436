//! HTTP request handlers.

pub mod appointment_handler;
pub mod auth_handler;
pub mod department_handler;
pub mod dispensing_handler;
pub mod hospital_handler;
pub mod menu_handler;
pub mod patient_handler;
pub mod prescription_handler;
pub mod role_handler;
pub mod staff_handler;
pub mod vitals_handler;

pub use appointment_handler::appointment_routes;
pub use auth_handler::auth_routes;
pub use department_handler::department_routes;
pub use dispensing_handler::dispensing_routes;
pub use hospital_handler::{hospital_routes, onboarding_routes};
pub use menu_handler::menu_routes;
pub use patient_handler::patient_routes;
pub use prescription_handler::prescription_routes;
pub use role_handler::role_routes;
pub use staff_handler::staff_routes;
pub use vitals_handler::vitals_routes;
