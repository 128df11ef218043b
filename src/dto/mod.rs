//! Request and response shapes of the HTTP API

pub mod api_response;
pub mod auth_dto;
pub mod car_dto;
pub mod dashboard_dto;
pub mod driver_dto;
pub mod maintenance_dto;
pub mod pagination;
pub mod trip_dto;

pub use api_response::{ApiResponse, PaginatedResponse};
pub use pagination::PageRequest;
