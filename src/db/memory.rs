// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory [`UserStore`] for local development and tests.

use crate::db::{SortOrder, UserStore};
use crate::error::AppError;
use crate::models::{Board, User, UserUpdate};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// User records held in a concurrent map keyed by provider ID.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, uid: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.uid == uid)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(provider_id).map(|entry| entry.value().clone()))
    }

    async fn upsert_by_provider_id(
        &self,
        provider_id: &str,
        update: &UserUpdate,
    ) -> Result<User, AppError> {
        let now = format_utc_rfc3339(chrono::Utc::now());

        // The entry guard holds the shard lock for the whole read-modify-write.
        let mut entry = self
            .users
            .entry(provider_id.to_string())
            .or_insert_with(|| User::new(uuid::Uuid::new_v4().to_string(), provider_id, &now));
        entry.apply(update, &now);

        Ok(entry.value().clone())
    }

    async fn find_all_sorted_by(
        &self,
        board: Board,
        order: SortOrder,
        limit: u32,
    ) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();

        users.sort_by(|a, b| {
            let by_value = board.value_of(a).cmp(&board.value_of(b));
            let by_value = match order {
                SortOrder::Ascending => by_value,
                SortOrder::Descending => by_value.reverse(),
            };
            by_value.then_with(|| a.id.cmp(&b.id))
        });
        users.truncate(limit as usize);

        Ok(users)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameStats, Profile};

    fn update(name: &str, max_win_streak: i64) -> UserUpdate {
        UserUpdate {
            profile: Some(Profile {
                id: name.to_string(),
                name: name.to_string(),
                icon_img: String::new(),
            }),
            token: None,
            stats: Some(GameStats {
                max_win_streak,
                ..GameStats::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_provider_id() {
        let store = MemoryStore::new();

        let first = store
            .upsert_by_provider_id("abc123", &update("u1", 1))
            .await
            .unwrap();
        let second = store
            .upsert_by_provider_id("abc123", &update("u1-renamed", 4))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(first.uid, second.uid);
        assert_eq!(second.name, "u1-renamed");
        assert_eq!(second.max_win_streak, 4);

        let found = store.find_by_id(&first.uid).await.unwrap().unwrap();
        assert_eq!(found, second);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_create_one_record() {
        let store = MemoryStore::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert_by_provider_id("abc123", &update("u1", i))
                        .await
                        .unwrap()
                        .uid
                })
            })
            .collect();

        let mut uids = Vec::new();
        for handle in handles {
            uids.push(handle.await.unwrap());
        }
        uids.dedup();

        assert_eq!(store.len(), 1);
        assert_eq!(uids.len(), 1);
    }

    #[tokio::test]
    async fn test_sorted_descending_with_limit() {
        let store = MemoryStore::new();
        for (name, streak) in [("a", 3), ("b", 7), ("c", 1), ("d", 5)] {
            store
                .upsert_by_provider_id(name, &update(name, streak))
                .await
                .unwrap();
        }

        let top = store
            .find_all_sorted_by(Board::MaxWinStreak, SortOrder::Descending, 3)
            .await
            .unwrap();
        let streaks: Vec<i64> = top.iter().map(|u| u.max_win_streak).collect();
        assert_eq!(streaks, vec![7, 5, 3]);

        let bottom = store
            .find_all_sorted_by(Board::MaxWinStreak, SortOrder::Ascending, 2)
            .await
            .unwrap();
        let streaks: Vec<i64> = bottom.iter().map(|u| u.max_win_streak).collect();
        assert_eq!(streaks, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let store = MemoryStore::new();
        assert!(store.find_by_id("missing").await.unwrap().is_none());
        assert!(store.find_by_provider_id("missing").await.unwrap().is_none());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
