use std::sync::Arc;
use std::time::Instant;
use crate::domain::ports::{HealthCheck, MediaStore, PropertyRepository};
use crate::domain::services::{auth_service::AuthService, ledger::BookingLedger};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub property_repo: Arc<dyn PropertyRepository>,
    pub media_store: Arc<dyn MediaStore>,
    pub health: Arc<dyn HealthCheck>,
    pub auth_service: Arc<AuthService>,
    pub ledger: Arc<BookingLedger>,
    pub started_at: Instant,
}
