//! Shared application state handed to every handler as `web::Data<AppState>`.

use crate::audit::AuditRecorder;
use crate::config::AppConfig;
use crate::db;
use rusqlite::Connection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub audit: Arc<dyn AuditRecorder>,
}

impl AppState {
    pub fn new(config: AppConfig, audit: Arc<dyn AuditRecorder>) -> Self {
        Self {
            config: Arc::new(config),
            audit,
        }
    }

    /// Opens a fresh connection to the configured database. Each request
    /// works on its own connection; SQLite serialises the writers.
    pub fn connect(&self) -> rusqlite::Result<Connection> {
        db::open(&self.config.database_path)
    }
}

/// State backed by a migrated database file inside `dir`, with audit entries
/// kept in memory.
#[cfg(test)]
pub(crate) fn test_state(
    dir: &std::path::Path,
) -> (AppState, Arc<crate::audit::MemoryAuditRecorder>) {
    let config = AppConfig {
        database_path: dir.join("krd.sqlite"),
        output_dir: dir.join("generated"),
        ..AppConfig::default()
    };
    db::migrate(&db::open(&config.database_path).unwrap()).unwrap();
    std::fs::create_dir_all(&config.output_dir).unwrap();
    let audit = Arc::new(crate::audit::MemoryAuditRecorder::default());
    (AppState::new(config, audit.clone()), audit)
}
