// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing [`UserStore`].
//!
//! Users live in a single `users` collection whose document ID is the
//! Reddit account ID, so a provider ID can never map to two documents.

use crate::db::{collections, SortOrder, UserStore};
use crate::error::AppError;
use crate::models::{Board, User, UserUpdate};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use std::time::Duration;

/// Attempts before an upsert on a contended document gives up.
const MAX_UPSERT_ATTEMPTS: u32 = 5;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str, database_id: Option<&str>) -> Result<Self, AppError> {
        let mut options = firestore::FirestoreDbOptions::new(project_id.to_string());
        if let Some(database_id) = database_id {
            options = options.with_database_id(database_id.to_string());
        }

        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id, options).await;
        }

        let client = firestore::FirestoreDb::with_options(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(
        project_id: &str,
        options: firestore::FirestoreDbOptions,
    ) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }
}

#[async_trait]
impl UserStore for FirestoreDb {
    async fn find_by_id(&self, uid: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("uid").eq(uid)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(provider_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Read-modify-write inside one Firestore transaction, retried when a
    /// concurrent commit to the same document aborts it.
    ///
    /// The internal `uid` is minted only when the document does not exist yet.
    async fn upsert_by_provider_id(
        &self,
        provider_id: &str,
        update: &UserUpdate,
    ) -> Result<User, AppError> {
        let client = self.get_client()?;

        let mut attempt = 1;
        loop {
            match upsert_in_transaction(client, provider_id, update).await {
                Ok(user) => return Ok(user),
                Err(e) if attempt < MAX_UPSERT_ATTEMPTS => {
                    tracing::warn!(provider_id, attempt, error = %e, "User upsert failed, retrying");
                    tokio::time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn find_all_sorted_by(
        &self,
        board: Board,
        order: SortOrder,
        limit: u32,
    ) -> Result<Vec<User>, AppError> {
        let direction = match order {
            SortOrder::Ascending => firestore::FirestoreQueryDirection::Ascending,
            SortOrder::Descending => firestore::FirestoreQueryDirection::Descending,
        };

        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([(board.as_str(), direction)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// One transactional upsert attempt.
async fn upsert_in_transaction(
    client: &firestore::FirestoreDb,
    provider_id: &str,
    update: &UserUpdate,
) -> Result<User, AppError> {
    let now = format_utc_rfc3339(chrono::Utc::now());

    let mut transaction = client
        .begin_transaction()
        .await
        .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

    // Reads through this handle are part of the transaction, so the commit
    // fails if another writer touched the document after this read.
    let tx_client = client.clone_with_consistency_selector(
        firestore::FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
    );

    let existing: Option<User> = match tx_client
        .fluent()
        .select()
        .by_id_in(collections::USERS)
        .obj()
        .one(provider_id)
        .await
    {
        Ok(existing) => existing,
        Err(e) => {
            if let Err(rollback) = transaction.rollback().await {
                tracing::debug!(error = %rollback, "Transaction rollback failed");
            }
            return Err(AppError::Database(format!(
                "Failed to read user in transaction: {}",
                e
            )));
        }
    };

    let created = existing.is_none();
    let mut user =
        existing.unwrap_or_else(|| User::new(uuid::Uuid::new_v4().to_string(), provider_id, &now));
    user.apply(update, &now);

    tx_client
        .fluent()
        .update()
        .in_col(collections::USERS)
        .document_id(provider_id)
        .object(&user)
        .add_to_transaction(&mut transaction)
        .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

    transaction
        .commit()
        .await
        .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

    tracing::debug!(provider_id, created, "User upserted");

    Ok(user)
}
