use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserStore, UserStore},
    },
    config::AppConfig,
    memory::InMemoryStore,
    reports::repo::{PgReportStore, ReportStore},
};

/// Everything a handler needs; stores are injected, never global.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub reports: Arc<dyn ReportStore>,
    pub jwt: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn from_parts(
        users: Arc<dyn UserStore>,
        reports: Arc<dyn ReportStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            reports,
            jwt: JwtKeys::new(&config.jwt),
            config,
        }
    }

    /// Postgres-backed state sharing one pool between both stores.
    pub fn with_pg(db: PgPool, config: AppConfig) -> Self {
        Self::from_parts(
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgReportStore::new(db)),
            Arc::new(config),
        )
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::from_parts(store.clone(), store, Arc::new(config))
    }
}
