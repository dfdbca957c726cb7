//! Authentication for the two platform roles.
//!
//! Admin and student logins are independent: each role has its own session
//! flag, and logging one role out never touches the other. Credentials are
//! compared as stored, in plaintext.

use crate::{
    core::{
        platform::{Platform, Stored},
        session::{
            ADMIN_AUTHENTICATED, ADMIN_LOGIN_TIME, CURRENT_STUDENT, STUDENT_AUTHENTICATED,
            SessionStore,
        },
        store::CollectionKey,
        util,
    },
    models::{ActivityCategory, AdminSettings, Student},
};
use serde::Serialize;
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Receives navigation requests from the auth service.
///
/// The UI layer implements this to send the user to the login page.
pub trait Navigator: Send + Sync + fmt::Debug {
    /// Called when a session check fails and on logout.
    fn redirect_to_login(&self, page: &str);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn redirect_to_login(&self, page: &str) {
        info!("Redirecting to {}", page);
    }
}

/// The two authentication domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Platform administrator
    Admin,
    /// Student account
    Student,
}

impl From<&str> for Role {
    /// `"admin"` selects [`Role::Admin`]; every other user type is a student.
    fn from(user_type: &str) -> Self {
        if user_type == "admin" {
            Self::Admin
        } else {
            Self::Student
        }
    }
}

/// Why a password change was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordChangeError {
    /// No student has the given id
    #[error("Student not found")]
    StudentNotFound,
    /// The supplied current password does not match
    #[error("Current password is incorrect")]
    IncorrectPassword,
    /// The new password could not be persisted
    #[error("Failed to save password")]
    Storage,
}

/// Success message reported for a completed password change.
pub const PASSWORD_CHANGED: &str = "Password changed successfully";

/// `{success, message}` record handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    /// Whether the operation went through
    pub success: bool,
    /// Human-readable result
    pub message: String,
}

impl From<Result<(), PasswordChangeError>> for AuthOutcome {
    fn from(result: Result<(), PasswordChangeError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                message: PASSWORD_CHANGED.to_string(),
            },
            Err(e) => Self {
                success: false,
                message: e.to_string(),
            },
        }
    }
}

/// Login, session checks and password changes for admins and students.
#[derive(Debug, Clone)]
pub struct AuthService {
    platform: Arc<Platform>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl AuthService {
    /// Creates a service bound to one session.
    #[must_use]
    pub fn new(
        platform: Arc<Platform>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            platform,
            session,
            navigator,
        }
    }

    /// The storage facade this service reads credentials from
    #[must_use]
    pub const fn platform(&self) -> &Arc<Platform> {
        &self.platform
    }

    /// The session this service manages
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    fn redirect(&self) {
        self.navigator
            .redirect_to_login(&self.platform.config().login_page);
    }

    /// Logs the admin in when both fields match the stored admin record.
    ///
    /// A wrong username and a wrong password are indistinguishable.
    #[instrument(skip(self, password))]
    pub async fn admin_login(&self, username: &str, password: &str) -> bool {
        let settings: Option<AdminSettings> = self
            .platform
            .get_record(CollectionKey::AdminSettings)
            .await;

        let matches = settings.is_some_and(|s| s.matches(username, password));
        if !matches {
            debug!("Admin login rejected");
            return false;
        }

        self.session.set(ADMIN_AUTHENTICATED, "true").await;
        self.session.set(ADMIN_LOGIN_TIME, util::now_iso()).await;
        self.platform
            .log_activity("Admin logged in", ActivityCategory::Security)
            .await;
        true
    }

    /// Logs a student in and snapshots their record into the session.
    ///
    /// With duplicated credentials the first student in stored order wins.
    /// Records that fail to decode are skipped without blocking the others.
    #[instrument(skip(self, password))]
    pub async fn student_login(&self, username: &str, password: &str) -> Option<Student> {
        let students: Vec<Student> = self.platform.get_collection(CollectionKey::Students).await;
        let Some(student) = students
            .into_iter()
            .find(|s| s.matches(username, password))
        else {
            debug!("Student login rejected");
            return None;
        };

        let snapshot = serde_json::to_string(&student)
            .inspect_err(|e| error!("Could not snapshot student {}: {}", student.id, e))
            .ok()?;

        self.session.set(STUDENT_AUTHENTICATED, "true").await;
        self.session.set(CURRENT_STUDENT, snapshot).await;
        self.platform
            .log_activity(
                format!("Student logged in: {}", student.name),
                ActivityCategory::Student,
            )
            .await;
        Some(student)
    }

    /// Whether an admin is logged in. Redirects to the login page if not.
    pub async fn check_admin_auth(&self) -> bool {
        if self.session.is_flag_set(ADMIN_AUTHENTICATED).await {
            return true;
        }
        self.redirect();
        false
    }

    /// Whether a student is logged in. Redirects to the login page if not.
    pub async fn check_student_auth(&self) -> bool {
        if self.session.is_flag_set(STUDENT_AUTHENTICATED).await {
            return true;
        }
        self.redirect();
        false
    }

    /// The student snapshotted at login, if present and readable.
    pub async fn get_current_student(&self) -> Option<Student> {
        let raw = self.session.get(CURRENT_STUDENT).await?;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!("Unreadable student snapshot in session: {}", e))
            .ok()
    }

    /// Clears one role's session state and redirects to the login page.
    #[instrument(skip(self))]
    pub async fn logout(&self, role: Role) {
        match role {
            Role::Admin => {
                self.session.remove(ADMIN_AUTHENTICATED).await;
                self.session.remove(ADMIN_LOGIN_TIME).await;
            }
            Role::Student => {
                self.session.remove(STUDENT_AUTHENTICATED).await;
                self.session.remove(CURRENT_STUDENT).await;
            }
        }
        self.redirect();
    }

    /// Drops all session state for both roles without navigating.
    pub async fn end_session(&self) {
        self.session.clear().await;
    }

    /// Replaces the admin password after checking the current one.
    ///
    /// # Errors
    /// [`PasswordChangeError::IncorrectPassword`] when `current` does not match,
    /// [`PasswordChangeError::Storage`] when the new password cannot be saved.
    #[instrument(skip_all)]
    pub async fn change_admin_password(
        &self,
        current: &str,
        new: &str,
    ) -> Result<(), PasswordChangeError> {
        {
            let lock = self.platform.lock(CollectionKey::AdminSettings).await;
            let mut settings: AdminSettings = lock
                .read_record()
                .await
                .ok_or(PasswordChangeError::IncorrectPassword)?;

            if settings.password.as_deref() != Some(current) {
                return Err(PasswordChangeError::IncorrectPassword);
            }

            settings.password = Some(new.to_string());
            lock.write(&settings).await.map_err(|e| {
                error!("Error saving admin password: {}", e);
                PasswordChangeError::Storage
            })?;
        }

        self.platform
            .log_activity("Admin password changed", ActivityCategory::Security)
            .await;
        Ok(())
    }

    /// Replaces a student's password after checking the current one.
    ///
    /// If that student is the one logged in, the session snapshot is refreshed.
    ///
    /// # Errors
    /// [`PasswordChangeError::StudentNotFound`] for an unknown id,
    /// [`PasswordChangeError::IncorrectPassword`] when `current` does not match,
    /// [`PasswordChangeError::Storage`] when the collection cannot be saved.
    #[instrument(skip(self, current, new))]
    pub async fn change_student_password(
        &self,
        student_id: &str,
        current: &str,
        new: &str,
    ) -> Result<(), PasswordChangeError> {
        let updated = {
            let lock = self.platform.lock(CollectionKey::Students).await;
            let mut students: Vec<Stored<Student>> = lock.read_entries().await;
            let student = students
                .iter_mut()
                .filter_map(Stored::record_mut)
                .find(|s| s.id == student_id)
                .ok_or(PasswordChangeError::StudentNotFound)?;

            if student.password.as_deref() != Some(current) {
                return Err(PasswordChangeError::IncorrectPassword);
            }

            student.password = Some(new.to_string());
            let updated = student.clone();
            lock.write(&students).await.map_err(|e| {
                error!("Error saving students: {}", e);
                PasswordChangeError::Storage
            })?;
            updated
        };

        self.platform
            .log_activity(
                format!("Password changed for student: {}", updated.name),
                ActivityCategory::Student,
            )
            .await;

        let is_current = self
            .get_current_student()
            .await
            .is_some_and(|s| s.id == updated.id);
        if is_current {
            match serde_json::to_string(&updated) {
                Ok(snapshot) => self.session.set(CURRENT_STUDENT, snapshot).await,
                Err(e) => warn!("Could not refresh session snapshot: {}", e),
            }
        }
        Ok(())
    }
}
