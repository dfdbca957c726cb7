//! Records stored inside the platform's collections.
//!
//! Field names follow the camelCase wire format of the stored JSON. Records
//! keep any fields they do not model in `extra`, so a read-modify-write cycle
//! never drops data written by other parts of the platform.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A student account with its derived progress fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Student {
    /// Identifier produced by `Platform::generate_id`
    pub id: String,
    /// Login name, expected but not enforced to be unique
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Plaintext password; a record without one can never log in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Display name
    pub name: String,
    /// Completed homework percentage (0-100)
    pub progress: u32,
    /// ISO-8601 time of the last progress update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,
    /// Fields not modelled here (email, phone, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Singleton admin credentials record.
///
/// Absent fields stay `None` and never match any supplied credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Admin login name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Plaintext admin password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Fields not modelled here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdminSettings {
    /// Whether both fields are stored and equal the supplied pair.
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username.as_deref() == Some(username) && self.password.as_deref() == Some(password)
    }
}

impl Student {
    /// Whether both credentials are stored and equal the supplied pair.
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username.as_deref() == Some(username) && self.password.as_deref() == Some(password)
    }
}

/// A homework assignment; only the fields progress depends on are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Homework {
    /// Owning student's id (not enforced)
    pub student_id: String,
    /// Whether the student finished it
    pub completed: bool,
    /// Title, due date and everything else
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Category tag of an activity log entry.
///
/// Known tags get their own variant; anything else round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityCategory {
    /// General information (the default)
    #[default]
    Info,
    /// Logins and credential changes
    Security,
    /// Student account events
    Student,
    /// Any other tag written by the UI
    Custom(String),
}

impl ActivityCategory {
    /// Wire name of the category
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "info",
            Self::Security => "security",
            Self::Student => "student",
            Self::Custom(tag) => tag,
        }
    }
}

impl From<String> for ActivityCategory {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "info" => Self::Info,
            "security" => Self::Security,
            "student" => Self::Student,
            _ => Self::Custom(tag),
        }
    }
}

impl From<&str> for ActivityCategory {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<ActivityCategory> for String {
    fn from(category: ActivityCategory) -> Self {
        match category {
            ActivityCategory::Custom(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the admin activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLogEntry {
    /// What happened
    pub action: String,
    /// Category tag
    #[serde(rename = "type")]
    pub category: ActivityCategory,
    /// Local display time, e.g. `10/19/2026, 3:04:05 PM`
    pub time: String,
    /// Unix time in milliseconds
    pub timestamp: i64,
}

/// Target of a Telegram message: a numeric chat id or an `@channel` name.
///
/// Serializes back in whichever form it was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    /// Numeric id, negative for groups and channels
    Id(i64),
    /// Id or channel username written as a string
    Text(String),
}

impl ChatId {
    fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

/// Stored Telegram credentials. Both fields must be non-empty to send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelegramConfig {
    /// Bot token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Target chat id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
}

impl TelegramConfig {
    /// Returns `(token, chat_id)` when both are present and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &ChatId)> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        let chat_id = self.chat_id.as_ref().filter(|c| !c.is_empty())?;
        Some((token, chat_id))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_student_keeps_unknown_fields() {
        let raw = json!({
            "id": "1700000000000abc",
            "username": "anna",
            "password": "pw",
            "name": "Anna",
            "email": "anna@example.com",
            "band": 7.5
        });

        let student: Student = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(student.progress, 0);
        assert!(student.last_active.is_none());
        assert_eq!(student.extra.get("email"), Some(&json!("anna@example.com")));

        let back = serde_json::to_value(&student).unwrap();
        assert_eq!(back["band"], json!(7.5));
        assert_eq!(back["progress"], json!(0));
    }

    #[test]
    fn test_homework_wire_names() {
        let hw: Homework =
            serde_json::from_value(json!({"studentId": "s1", "completed": true, "title": "Essay"}))
                .unwrap();
        assert_eq!(hw.student_id, "s1");
        assert!(hw.completed);
        assert_eq!(hw.extra.get("title"), Some(&json!("Essay")));
    }

    #[test]
    fn test_activity_category_round_trips_custom_tags() {
        let entry: ActivityLogEntry = serde_json::from_value(json!({
            "action": "Lesson created",
            "type": "lesson",
            "time": "1/2/2026, 9:00:00 AM",
            "timestamp": 1
        }))
        .unwrap();
        assert_eq!(entry.category, ActivityCategory::Custom("lesson".to_string()));
        assert_eq!(serde_json::to_value(&entry).unwrap()["type"], json!("lesson"));

        let security: ActivityCategory = "security".into();
        assert_eq!(security, ActivityCategory::Security);
    }

    #[test]
    fn test_telegram_credentials_require_both_fields() {
        let empty = TelegramConfig::default();
        assert!(empty.credentials().is_none());

        let blank_chat = TelegramConfig {
            token: Some("t".to_string()),
            chat_id: Some(ChatId::Text(String::new())),
        };
        assert!(blank_chat.credentials().is_none());

        let full: TelegramConfig =
            serde_json::from_value(json!({"token": "t", "chatId": "42"})).unwrap();
        assert_eq!(full.credentials(), Some(("t", &ChatId::Text("42".to_string()))));
    }

    #[test]
    fn test_telegram_numeric_chat_id_keeps_its_form() {
        let config: TelegramConfig =
            serde_json::from_value(json!({"token": "t", "chatId": -100_123_456})).unwrap();
        assert_eq!(config.chat_id, Some(ChatId::Id(-100_123_456)));
        assert!(config.credentials().is_some());
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"token": "t", "chatId": -100_123_456})
        );
    }

    #[test]
    fn test_missing_credentials_never_match() {
        let admin: AdminSettings = serde_json::from_value(json!({})).unwrap();
        assert!(admin.username.is_none());
        assert!(!admin.matches("", ""));

        let student: Student =
            serde_json::from_value(json!({"id": "s1", "username": "anna", "name": "Anna"}))
                .unwrap();
        assert!(!student.matches("anna", ""));
        assert!(serde_json::to_value(&student).unwrap().get("password").is_none());
    }
}
