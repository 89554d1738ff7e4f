use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{jwt::JwtKeys, repo::PgUserRepo, services::AuthService},
    categories::{repo_types::Category, services::CategoryService},
    config::AppConfig,
    store::{
        memory::{MemoryRepo, MemoryUsers},
        postgres::PgRepo,
    },
    transactions::{repo_types::Transaction, services::TransactionService},
};

#[derive(Clone)]
pub struct AppState {
    pub keys: JwtKeys,
    pub auth: AuthService,
    pub categories: CategoryService,
    pub transactions: TransactionService,
}

impl AppState {
    /// Services backed by PostgreSQL.
    pub fn from_pool(config: &AppConfig, db: PgPool) -> Self {
        let keys = JwtKeys::from_config(&config.jwt);
        let categories = Arc::new(PgRepo::<Category>::new(db.clone()));
        let transactions = Arc::new(PgRepo::<Transaction>::new(db.clone()));

        Self {
            auth: AuthService::new(Arc::new(PgUserRepo::new(db)), keys.clone()),
            categories: CategoryService::new(categories.clone()),
            transactions: TransactionService::new(transactions, categories),
            keys,
        }
    }

    /// Same services over process-local stores; nothing is persisted.
    pub fn in_memory(config: &AppConfig) -> Self {
        let keys = JwtKeys::from_config(&config.jwt);
        let categories = Arc::new(MemoryRepo::<Category>::default());
        let transactions = Arc::new(MemoryRepo::<Transaction>::default());

        Self {
            auth: AuthService::new(Arc::new(MemoryUsers::default()), keys.clone()),
            categories: CategoryService::new(categories.clone()),
            transactions: TransactionService::new(transactions, categories),
            keys,
        }
    }
}
