pub mod auth_routes;
pub mod car_routes;
pub mod dashboard_routes;
pub mod driver_routes;
pub mod maintenance_routes;
pub mod trip_routes;
