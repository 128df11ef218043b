//! Shared application state
//!
//! Cloned into every handler by the axum router.

use std::sync::Arc;

use crate::config::EnvironmentConfig;
use crate::repositories::FleetStore;
use crate::services::{
    AuthService, CarService, DashboardService, DriverService, JwtConfig, JwtService,
    MaintenanceService, TripService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub store: Arc<dyn FleetStore>,
    pub jwt: Arc<JwtService>,
    pub auth: AuthService,
    pub cars: CarService,
    pub drivers: DriverService,
    pub trips: TripService,
    pub maintenances: MaintenanceService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(store: Arc<dyn FleetStore>, config: EnvironmentConfig) -> Self {
        let jwt = Arc::new(JwtService::new(JwtConfig::new(
            config.jwt_secret.clone(),
            config.jwt_expire_hours,
        )));

        Self {
            auth: AuthService::new(store.clone(), jwt.clone(), config.bcrypt_cost),
            cars: CarService::new(store.clone()),
            drivers: DriverService::new(store.clone()),
            trips: TripService::new(store.clone()),
            maintenances: MaintenanceService::new(store.clone()),
            dashboard: DashboardService::new(store.clone()),
            config: Arc::new(config),
            store,
            jwt,
        }
    }
}
