//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::ServerConfig;
use backbar_db::Database;

/// Cloned per handler invocation; everything inside is cheap to clone or
/// reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        ));
        AppState {
            db,
            config: Arc::new(config),
            jwt,
        }
    }
}
