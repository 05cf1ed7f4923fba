//! Database layer.
//!
//! [`UserStore`] is the only interface the rest of the crate sees. Firestore
//! backs it in production; the in-memory store serves local runs and tests.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::config::{Config, StoreBackend};
use crate::error::AppError;
use crate::models::{Board, User, UserUpdate};
use async_trait::async_trait;
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Persistent collection of user records keyed by Reddit account ID.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a record by its internal identifier.
    async fn find_by_id(&self, uid: &str) -> Result<Option<User>, AppError>;

    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<User>, AppError>;

    /// Create the record for `provider_id` if absent, then apply `update`.
    ///
    /// Returns the record as written. The provider ID is the dedup key:
    /// concurrent calls for one ID never produce two records.
    async fn upsert_by_provider_id(
        &self,
        provider_id: &str,
        update: &UserUpdate,
    ) -> Result<User, AppError>;

    /// Records ordered by the board's statistic, at most `limit` of them.
    async fn find_all_sorted_by(
        &self,
        board: Board,
        order: SortOrder,
        limit: u32,
    ) -> Result<Vec<User>, AppError>;

    async fn find_all(&self) -> Result<Vec<User>, AppError>;
}

/// Open the store selected by `config.store_backend`.
pub async fn connect(config: &Config) -> Result<Arc<dyn UserStore>, AppError> {
    match config.store_backend {
        StoreBackend::Firestore => {
            let db = FirestoreDb::new(
                &config.gcp_project_id,
                config.firestore_database_id.as_deref(),
            )
            .await?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, records are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
