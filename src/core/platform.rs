//! Storage facade - typed, fail-soft access to the platform's collections.
//!
//! [`Platform`] is the single entry point to persistent state. It seeds
//! defaults, reads and writes whole collections, keeps the admin activity log,
//! derives student progress and relays Telegram notifications.
//!
//! Public operations never return storage errors: reads degrade to empty
//! values and writes report `false`, with the cause logged. Every write goes
//! through a per-collection lock so read-modify-write cycles on the same
//! collection cannot interleave.

use crate::{
    config::PlatformConfig,
    core::{
        notify::TelegramNotifier,
        store::{CollectionKey, KvStore},
        util,
    },
    errors::Result,
    models::{ActivityCategory, ActivityLogEntry, Homework, Student, TelegramConfig},
};
use chrono::Utc;
use rand::Rng;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The storage facade. Construct once, share by `Arc`.
#[derive(Debug)]
pub struct Platform {
    store: KvStore,
    locks: [Mutex<()>; CollectionKey::ALL.len()],
    notifier: TelegramNotifier,
    config: PlatformConfig,
}

/// One element of a stored sequence.
///
/// Elements that do not decode as `T` are kept verbatim so that rewriting
/// the collection never drops them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stored<T> {
    /// Element decoded as `T`
    Record(T),
    /// Element that did not decode, exactly as stored
    Unreadable(Value),
}

impl<T: DeserializeOwned> Stored<T> {
    fn from_value(value: Value) -> (Self, Option<serde_json::Error>) {
        match T::deserialize(&value) {
            Ok(record) => (Self::Record(record), None),
            Err(e) => (Self::Unreadable(value), Some(e)),
        }
    }
}

impl<T> Stored<T> {
    /// Mutable access to the decoded record, if this element decoded.
    pub const fn record_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Record(record) => Some(record),
            Self::Unreadable(_) => None,
        }
    }

    /// Consumes the element, keeping only a decoded record.
    pub fn into_record(self) -> Option<T> {
        match self {
            Self::Record(record) => Some(record),
            Self::Unreadable(_) => None,
        }
    }
}

impl<T> From<T> for Stored<T> {
    fn from(record: T) -> Self {
        Self::Record(record)
    }
}

/// Exclusive access to one collection for the lifetime of the guard.
///
/// Obtained from [`Platform::lock`]. Writes replace the whole collection.
pub struct CollectionLock<'a> {
    store: &'a KvStore,
    key: CollectionKey,
    _guard: MutexGuard<'a, ()>,
}

impl CollectionLock<'_> {
    /// Decodes the collection element by element for a later [`write`].
    ///
    /// Missing or malformed data is empty; undecodable elements are kept.
    ///
    /// [`write`]: CollectionLock::write
    pub async fn read_entries<T: DeserializeOwned>(&self) -> Vec<Stored<T>> {
        decode_entries(self.key, self.read_raw().await)
    }

    /// Decodes the collection as a singleton record.
    pub async fn read_record<T: DeserializeOwned>(&self) -> Option<T> {
        decode_record(self.key, self.read_raw().await)
    }

    /// Replaces the stored collection with `value`.
    ///
    /// # Errors
    /// Returns an error when `value` cannot be serialized or the write fails.
    pub async fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.store.put_raw(self.key.as_str(), text).await
    }

    async fn read_raw(&self) -> Option<String> {
        self.store
            .get_raw(self.key.as_str())
            .await
            .inspect_err(|e| error!("Error getting {}: {}", self.key, e))
            .ok()
            .flatten()
    }
}

fn decode_value(key: CollectionKey, raw: Option<String>) -> Option<Value> {
    let text = raw?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Malformed data under {}: {}", key, e);
            None
        }
    }
}

fn decode_entries<T: DeserializeOwned>(key: CollectionKey, raw: Option<String>) -> Vec<Stored<T>> {
    match decode_value(key, raw) {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let (entry, err) = Stored::from_value(item);
                if let Some(e) = err {
                    warn!("Unreadable element {} under {}: {}", i, key, e);
                }
                entry
            })
            .collect(),
        Some(_) => {
            warn!("Expected a sequence under {}", key);
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn decode_collection<T: DeserializeOwned>(key: CollectionKey, raw: Option<String>) -> Vec<T> {
    decode_entries(key, raw)
        .into_iter()
        .filter_map(Stored::into_record)
        .collect()
}

/// `null`, `false`, `0` and `""` read as an empty collection.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn decode_record<T: DeserializeOwned>(key: CollectionKey, raw: Option<String>) -> Option<T> {
    let value = decode_value(key, raw)?;
    if !value.is_object() {
        debug!("No record stored under {}", key);
        return None;
    }
    serde_json::from_value(value)
        .inspect_err(|e| warn!("Unexpected shape under {}: {}", key, e))
        .ok()
}

/// Share of completed homework for `student_id`, rounded to a whole percent.
#[must_use]
pub fn progress_percent(homeworks: &[Homework], student_id: &str) -> u32 {
    let (total, completed) = homeworks
        .iter()
        .filter(|h| h.student_id == student_id)
        .fold((0_u32, 0_u32), |(total, done), h| {
            (total + 1, done + u32::from(h.completed))
        });

    if total == 0 {
        return 0;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = ((f64::from(completed) / f64::from(total)) * 100.0).round() as u32;
    percent
}

impl Platform {
    /// Creates the facade over an open database whose tables already exist.
    ///
    /// Performs no I/O; call [`Platform::initialize`] before first use.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: PlatformConfig) -> Self {
        let locks = std::array::from_fn(|_| Mutex::new(()));
        let notifier = TelegramNotifier::new(config.telegram.api_base.clone());

        Self {
            store: KvStore::new(db),
            locks,
            notifier,
            config,
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// The raw key-value store underneath the facade
    #[must_use]
    pub const fn store(&self) -> &KvStore {
        &self.store
    }

    /// Value written for `key` when it is absent at initialization.
    #[must_use]
    pub fn default_value(&self, key: CollectionKey) -> Value {
        match key {
            CollectionKey::TelegramConfig => json!({}),
            CollectionKey::AdminSettings => json!({
                "username": self.config.admin.username,
                "password": self.config.admin.password,
            }),
            _ => json!([]),
        }
    }

    /// Seeds every absent collection with its default value.
    ///
    /// Existing keys are never touched, so repeated calls are harmless.
    /// Returns the keys that were written.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<Vec<CollectionKey>> {
        let mut seeded = Vec::new();

        for key in CollectionKey::ALL {
            let lock = self.lock(key).await;
            if self.store.contains(key.as_str()).await? {
                continue;
            }
            lock.write(&self.default_value(key)).await?;
            seeded.push(key);
        }

        if seeded.is_empty() {
            debug!("All collections already present");
        } else {
            info!("Seeded {} collection(s): {:?}", seeded.len(), seeded);
        }
        Ok(seeded)
    }

    /// Closes the database connection pool.
    ///
    /// # Errors
    /// Returns an error if the pool fails to close cleanly.
    pub async fn shutdown(&self) -> Result<()> {
        self.store.connection().clone().close().await?;
        info!("Platform storage closed");
        Ok(())
    }

    /// Takes the per-collection lock for `key`.
    pub async fn lock(&self, key: CollectionKey) -> CollectionLock<'_> {
        let guard = self.locks[key.index()].lock().await;
        CollectionLock {
            store: &self.store,
            key,
            _guard: guard,
        }
    }

    async fn read_raw(&self, key: CollectionKey) -> Option<String> {
        self.store
            .get_raw(key.as_str())
            .await
            .inspect_err(|e| error!("Error getting {}: {}", key, e))
            .ok()
            .flatten()
    }

    /// Reads the JSON value under `key`; missing, malformed or falsy data is `[]`.
    pub async fn get(&self, key: CollectionKey) -> Value {
        decode_value(key, self.read_raw(key).await)
            .filter(|value| !is_falsy(value))
            .unwrap_or_else(|| json!([]))
    }

    /// Reads `key` as a sequence of `T`; missing or malformed data is empty.
    ///
    /// Elements that do not decode as `T` are skipped.
    pub async fn get_collection<T: DeserializeOwned>(&self, key: CollectionKey) -> Vec<T> {
        decode_collection(key, self.read_raw(key).await)
    }

    /// Reads `key` as a singleton record; `None` when absent or malformed.
    pub async fn get_record<T: DeserializeOwned>(&self, key: CollectionKey) -> Option<T> {
        decode_record(key, self.read_raw(key).await)
    }

    /// Replaces the value under `key`. Returns `false` if it could not be saved.
    pub async fn save<T: Serialize + ?Sized>(&self, key: CollectionKey, value: &T) -> bool {
        let lock = self.lock(key).await;
        lock.write(value)
            .await
            .inspect_err(|e| error!("Error saving {}: {}", key, e))
            .is_ok()
    }

    /// Appends `record` to the collection under `key` atomically.
    ///
    /// Existing elements are written back exactly as stored.
    pub async fn append<T: Serialize>(&self, key: CollectionKey, record: T) -> bool {
        let lock = self.lock(key).await;
        let mut items: Vec<Stored<Value>> = lock.read_entries().await;
        let record = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(e) => {
                error!("Error encoding record for {}: {}", key, e);
                return false;
            }
        };
        items.push(record.into());
        lock.write(&items)
            .await
            .inspect_err(|e| error!("Error saving {}: {}", key, e))
            .is_ok()
    }

    /// Atomically reads, mutates and writes back the collection under `key`.
    ///
    /// `f` sees every element; ones that did not decode as `T` are
    /// [`Stored::Unreadable`] and are written back unchanged unless `f`
    /// removes them. `f` returns `None` to leave the collection untouched.
    /// The result is `None` both in that case and when the write fails.
    pub async fn modify<T, R, F>(&self, key: CollectionKey, f: F) -> Option<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<Stored<T>>) -> Option<R>,
    {
        let lock = self.lock(key).await;
        let mut items: Vec<Stored<T>> = lock.read_entries().await;
        let result = f(&mut items)?;
        match lock.write(&items).await {
            Ok(()) => Some(result),
            Err(e) => {
                error!("Error saving {}: {}", key, e);
                None
            }
        }
    }

    /// Appends an entry to the admin activity log.
    #[instrument(skip(self, action, category))]
    pub async fn log_activity(
        &self,
        action: impl Into<String>,
        category: impl Into<ActivityCategory>,
    ) -> bool {
        let entry = ActivityLogEntry {
            action: action.into(),
            category: category.into(),
            time: util::now_display(),
            timestamp: Utc::now().timestamp_millis(),
        };
        debug!("Activity [{}]: {}", entry.category, entry.action);
        self.append(CollectionKey::AdminActivities, entry).await
    }

    /// Millisecond timestamp followed by nine random base-36 characters.
    #[must_use]
    pub fn generate_id() -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
            .collect();
        format!("{}{}", Utc::now().timestamp_millis(), suffix)
    }

    /// Percentage of `student_id`'s homework that is completed.
    pub async fn calculate_progress(&self, student_id: &str) -> u32 {
        let homeworks: Vec<Homework> = self.get_collection(CollectionKey::Homeworks).await;
        progress_percent(&homeworks, student_id)
    }

    /// Recomputes `progress` and stamps `lastActive` on one student.
    ///
    /// Returns `false` if the student does not exist or the write failed.
    #[instrument(skip(self))]
    pub async fn update_student_progress(&self, student_id: &str) -> bool {
        let progress = self.calculate_progress(student_id).await;
        let last_active = util::now_iso();

        self.modify(CollectionKey::Students, |students: &mut Vec<Stored<Student>>| {
            let student = students
                .iter_mut()
                .filter_map(Stored::record_mut)
                .find(|s| s.id == student_id)?;
            student.progress = progress;
            student.last_active = Some(last_active);
            Some(())
        })
        .await
        .inspect(|_| debug!("Progress for {} is now {}%", student_id, progress))
        .is_some()
    }

    /// Sends `message` to the configured Telegram chat.
    ///
    /// Returns `false` when Telegram is not configured or delivery failed.
    pub async fn send_notification(&self, message: &str) -> bool {
        let config: TelegramConfig = self
            .get_record(CollectionKey::TelegramConfig)
            .await
            .unwrap_or_default();

        match self.notifier.send(&config, message).await {
            Ok(sent) => sent,
            Err(e) => {
                error!("Telegram error: {}", e);
                false
            }
        }
    }

    /// Sends a notification on a background task. The handle may be dropped.
    pub fn notify_detached(self: &Arc<Self>, message: impl Into<String>) -> JoinHandle<bool> {
        let platform = Arc::clone(self);
        let message = message.into();
        tokio::spawn(async move { platform.send_notification(&message).await })
    }
}
