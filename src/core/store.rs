//! Raw key-value persistence - one JSON document per collection key.
//!
//! [`KvStore`] knows nothing about collection contents. It reads and writes
//! text under a key in the `kv_store` table, replacing the previous value
//! wholesale. Typed access and fail-soft behavior live in the facade.

use crate::{
    entities::{KvEntry, kv_entry},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::fmt;
use tracing::{debug, instrument};

/// The named collections the platform persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    /// Student accounts
    Students,
    /// Practice tests
    Tests,
    /// Lessons
    Lessons,
    /// Homework assignments
    Homeworks,
    /// Submitted test results
    TestResults,
    /// Admin activity log
    AdminActivities,
    /// Telegram bot credentials (singleton record)
    TelegramConfig,
    /// Admin credentials (singleton record)
    AdminSettings,
}

impl CollectionKey {
    /// Every collection, in initialization order.
    pub const ALL: [Self; 8] = [
        Self::Students,
        Self::Tests,
        Self::Lessons,
        Self::Homeworks,
        Self::TestResults,
        Self::AdminActivities,
        Self::TelegramConfig,
        Self::AdminSettings,
    ];

    /// Position of the key in [`CollectionKey::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Storage key of the collection
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Tests => "tests",
            Self::Lessons => "lessons",
            Self::Homeworks => "homeworks",
            Self::TestResults => "testResults",
            Self::AdminActivities => "adminActivities",
            Self::TelegramConfig => "telegramConfig",
            Self::AdminSettings => "adminSettings",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent key to text store over the `kv_store` table.
#[derive(Debug, Clone)]
pub struct KvStore {
    db: DatabaseConnection,
}

impl KvStore {
    /// Wraps an open connection. Tables must already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns the raw stored text for `key`, or `None` if absent.
    #[instrument(skip(self))]
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let entry = KvEntry::find_by_id(key.to_string()).one(&self.db).await?;
        debug!("Read key '{}': present = {}", key, entry.is_some());
        Ok(entry.map(|e| e.value))
    }

    /// Whether anything is stored under `key`.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Stores `value` under `key`, replacing any previous value.
    #[instrument(skip(self, value), fields(len = value.len()))]
    pub async fn put_raw(&self, key: &str, value: String) -> Result<()> {
        let now = Utc::now();

        let existing = KvEntry::find_by_id(key.to_string()).one(&self.db).await?;

        if let Some(entry) = existing {
            let mut active_model: kv_entry::ActiveModel = entry.into();
            active_model.value = Set(value);
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_entry = kv_entry::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value),
                updated_at: Set(now),
            };
            new_entry.insert(&self.db).await?;
        }

        debug!("Wrote key '{}'", key);
        Ok(())
    }

    /// Deletes `key`. Returns whether a value was removed.
    #[instrument(skip(self))]
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let result = KvEntry::delete_by_id(key.to_string()).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
