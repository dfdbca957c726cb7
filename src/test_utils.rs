//! Shared test utilities.
//!
//! Helpers for setting up in-memory databases, initialized platforms and auth
//! services, plus builders for the records most tests need.

use crate::{
    config::{PlatformConfig, database::create_tables},
    core::{AuthService, CollectionKey, Navigator, Platform, SessionStore},
    errors::Result,
    models::{Homework, Student},
};
use sea_orm::DatabaseConnection;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates a platform over a fresh database and seeds the default collections.
pub async fn setup_platform() -> Result<Platform> {
    setup_platform_with_config(PlatformConfig::default()).await
}

/// Like [`setup_platform`] with custom configuration.
pub async fn setup_platform_with_config(config: PlatformConfig) -> Result<Platform> {
    let platform = Platform::new(setup_test_db().await?, config);
    platform.initialize().await?;
    Ok(platform)
}

/// Navigator that remembers every redirect it was asked to perform.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pages: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Pages redirected to so far, oldest first.
    #[allow(clippy::unwrap_used)]
    pub fn redirects(&self) -> Vec<String> {
        self.pages.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    #[allow(clippy::unwrap_used)]
    fn redirect_to_login(&self, page: &str) {
        self.pages.lock().unwrap().push(page.to_string());
    }
}

/// Builds an auth service over an initialized platform and an empty session.
/// Returns the navigator too so tests can inspect redirects.
pub async fn setup_auth() -> Result<(AuthService, Arc<RecordingNavigator>)> {
    let platform = Arc::new(setup_platform().await?);
    let navigator = Arc::new(RecordingNavigator::default());
    let auth = AuthService::new(
        platform,
        SessionStore::new(),
        Arc::clone(&navigator) as Arc<dyn Navigator>,
    );
    Ok((auth, navigator))
}

/// Appends a student with the given credentials to the `students` collection.
///
/// # Defaults
/// * `progress`: 0
/// * `last_active`: None
pub async fn create_test_student(
    platform: &Platform,
    id: &str,
    username: &str,
    password: &str,
    name: &str,
) -> Student {
    let student = Student {
        id: id.to_string(),
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        name: name.to_string(),
        ..Default::default()
    };
    assert!(
        platform
            .append(CollectionKey::Students, student.clone())
            .await,
        "failed to store test student {id}"
    );
    student
}

/// Appends a homework record for `student_id`.
pub async fn add_homework(platform: &Platform, student_id: &str, completed: bool) {
    let homework = Homework {
        student_id: student_id.to_string(),
        completed,
        ..Default::default()
    };
    assert!(
        platform.append(CollectionKey::Homeworks, homework).await,
        "failed to store test homework"
    );
}
