//! Services
//!
//! Business logic between the HTTP routes and the entity store.

pub mod auth_service;
pub mod car_service;
pub mod dashboard_service;
pub mod driver_service;
pub mod jwt_service;
pub mod maintenance_service;
pub mod status_service;
pub mod trip_service;

pub use auth_service::AuthService;
pub use car_service::CarService;
pub use dashboard_service::DashboardService;
pub use driver_service::DriverService;
pub use jwt_service::{JwtConfig, JwtService};
pub use maintenance_service::MaintenanceService;
pub use trip_service::TripService;
