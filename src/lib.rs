pub mod api;
pub mod config;
pub mod db;
pub mod session;
pub mod ui;

pub use db::DbPool;

use config::Config;
use std::sync::Arc;

use crate::session::SessionStore;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session.clone()));
        Self {
            config,
            db,
            sessions,
        }
    }
}
