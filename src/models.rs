use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::parse_date;

// Identity assigned by the remote service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority level of a todo.
///
/// The remote service stores the canonical upper-case name. Anything it sends
/// that is not one of the four known levels is kept verbatim in `Other` so a
/// round trip never rewrites it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
    Other(String),
}

impl Priority {
    pub const LEVELS: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Upper-case wire name for the known levels; `Other` is sent back as
    /// received.
    pub fn as_wire(&self) -> String {
        match self {
            Priority::Low => "LOW".to_string(),
            Priority::Medium => "MEDIUM".to_string(),
            Priority::High => "HIGH".to_string(),
            Priority::Urgent => "URGENT".to_string(),
            Priority::Other(raw) => raw.clone(),
        }
    }

    /// Sort rank: urgent=4, high=3, medium=2, low=1, anything else 0.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
            Priority::Other(_) => 0,
        }
    }

    pub fn next(&self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Urgent,
            Priority::Urgent | Priority::Other(_) => Priority::Low,
        }
    }

    pub fn previous(&self) -> Priority {
        match self {
            Priority::Low | Priority::Other(_) => Priority::Urgent,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
            Priority::Urgent => Priority::High,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            _ => Priority::Other(value),
        }
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.as_wire()
    }
}

// Lower-case form used while editing
impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
            Priority::Other(raw) => write!(f, "{}", raw.to_lowercase()),
        }
    }
}

/// A todo as owned by the remote service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Todo {
    /// Calendar date portion of `due_date`, if it parses.
    pub fn due_on(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_date)
    }

    /// Milliseconds used for the default ordering. A missing or unreadable
    /// creation timestamp falls back to the numeric id.
    pub fn created_key(&self) -> i64 {
        self.created_at
            .as_deref()
            .and_then(parse_timestamp_millis)
            .unwrap_or(self.id.0 as i64)
    }
}

fn parse_timestamp_millis(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    parse_date(value)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Request body for create and update.
///
/// `due_date` is always serialized, as `null` when absent. `completed` is only
/// sent when set.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPayload {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPayload {
    /// Full replacement of `todo`'s mutable fields with completion flipped.
    pub fn toggled(todo: &Todo) -> Self {
        TodoPayload {
            title: todo.title.clone(),
            priority: todo.priority.clone(),
            due_date: todo.due_date.clone(),
            completed: Some(!todo.completed),
        }
    }
}

/// Editor-local, not yet submitted field values.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Draft {
    pub title: String,
    pub priority: Priority,
    pub due_date: String,
}

impl Draft {
    pub fn from_todo(todo: &Todo) -> Self {
        Draft {
            title: todo.title.clone(),
            priority: todo.priority.clone(),
            due_date: todo
                .due_date
                .as_deref()
                .map(|d| crate::parser::date_portion(d).to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_todo_deserializes_from_service_json() {
        let todo: Todo = serde_json::from_value(json!({
            "id": 7,
            "title": "File taxes",
            "priority": "URGENT",
            "dueDate": "2025-04-15",
            "completed": true,
            "createdAt": "2025-01-02T09:30:00.123456"
        }))
        .unwrap();

        assert_eq!(todo.id, TodoId(7));
        assert_eq!(todo.priority, Priority::Urgent);
        assert_eq!(todo.due_on(), NaiveDate::from_ymd_opt(2025, 4, 15));
        assert!(todo.completed);
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let todo: Todo = serde_json::from_value(json!({"id": 1, "title": "Buy milk"})).unwrap();
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.due_date, None);
        assert!(!todo.completed);
        assert_eq!(todo.created_key(), 1);
    }

    #[test]
    fn test_unknown_priority_is_preserved() {
        let todo: Todo =
            serde_json::from_value(json!({"id": 1, "title": "x", "priority": "SOMEDAY"})).unwrap();
        assert_eq!(todo.priority.rank(), 0);
        assert_eq!(serde_json::to_value(&todo).unwrap()["priority"], "SOMEDAY");

        let todo: Todo =
            serde_json::from_value(json!({"id": 2, "title": "y", "priority": "someday"})).unwrap();
        assert_eq!(serde_json::to_value(&todo).unwrap()["priority"], "someday");
    }

    #[test]
    fn test_priority_parsing_ignores_case() {
        assert_eq!(Priority::from("high".to_string()), Priority::High);
        assert_eq!(Priority::from("HiGh".to_string()), Priority::High);
        assert_eq!(Priority::High.to_string(), "high");
        assert_eq!(Priority::High.as_wire(), "HIGH");
    }

    #[test]
    fn test_payload_serializes_null_due_date() {
        let payload = TodoPayload {
            title: "Buy milk".to_string(),
            priority: Priority::Low,
            due_date: None,
            completed: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"title": "Buy milk", "priority": "LOW", "dueDate": null})
        );
    }

    #[test]
    fn test_toggled_payload_flips_completion() {
        let todo = Todo {
            id: TodoId(2),
            title: "File taxes".to_string(),
            priority: Priority::Urgent,
            due_date: Some("2025-04-15".to_string()),
            completed: true,
            created_at: None,
        };
        let payload = TodoPayload::toggled(&todo);
        assert_eq!(payload.completed, Some(false));
        assert_eq!(payload.due_date.as_deref(), Some("2025-04-15"));
    }

    #[test]
    fn test_draft_from_todo_truncates_due_date() {
        let todo = Todo {
            id: TodoId(3),
            title: "Ship release".to_string(),
            priority: Priority::High,
            due_date: Some("2025-06-01T00:00:00".to_string()),
            completed: false,
            created_at: None,
        };
        let draft = Draft::from_todo(&todo);
        assert_eq!(draft.due_date, "2025-06-01");
        assert_eq!(draft.priority.to_string(), "high");
    }

    #[test]
    fn test_created_key_orders_timestamps() {
        let mut older = Todo {
            id: TodoId(9),
            title: "a".to_string(),
            priority: Priority::Low,
            due_date: None,
            completed: false,
            created_at: Some("2024-01-01T00:00:00".to_string()),
        };
        let mut newer = older.clone();
        newer.created_at = Some("2024-03-01T12:00:00Z".to_string());
        assert!(older.created_key() < newer.created_key());

        older.created_at = Some("garbage".to_string());
        assert_eq!(older.created_key(), 9);
    }
}
