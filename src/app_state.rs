use crate::config::Config;
use sea_orm::DatabaseConnection;

/// Shared per-worker state: the pool handle and the immutable configuration.
/// Handlers receive this through `web::Data`, never through globals.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
}
