use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            "URGENT" => Ok(TaskPriority::Urgent),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskCategory {
    Personal,
    Work,
    Shopping,
    Health,
    Learning,
    Project,
    #[default]
    Other,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Personal => "PERSONAL",
            TaskCategory::Work => "WORK",
            TaskCategory::Shopping => "SHOPPING",
            TaskCategory::Health => "HEALTH",
            TaskCategory::Learning => "LEARNING",
            TaskCategory::Project => "PROJECT",
            TaskCategory::Other => "OTHER",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERSONAL" => Ok(TaskCategory::Personal),
            "WORK" => Ok(TaskCategory::Work),
            "SHOPPING" => Ok(TaskCategory::Shopping),
            "HEALTH" => Ok(TaskCategory::Health),
            "LEARNING" => Ok(TaskCategory::Learning),
            "PROJECT" => Ok(TaskCategory::Project),
            "OTHER" => Ok(TaskCategory::Other),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default, deserialize_with = "timestamp::deserialize_due_date")]
    pub due_date: Option<NaiveDate>,
    pub user_id: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a task. The server fills in the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update. `None` leaves a field untouched; for the clearable fields
/// `Some(None)` is sent as `null` and clears the value on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskUpdate {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_from_backend_payload() {
        let json = r#"{
            "id": 7,
            "title": "Buy milk",
            "description": null,
            "completed": false,
            "priority": "LOW",
            "category": "OTHER",
            "due_date": "2026-02-21T00:00:00",
            "user_id": 3,
            "created_at": "2026-02-05T21:53:00.123456",
            "updated_at": "2026-02-05T21:53:00.123456"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, TaskPriority::Low);
        assert_eq!(task.category, TaskCategory::Other);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 2, 21));
        assert!(task.description.is_none());
    }

    #[test]
    fn test_update_serializes_only_given_fields() {
        let update = TaskUpdate::completed(true);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn test_update_can_clear_due_date() {
        let update = TaskUpdate {
            due_date: Some(None),
            ..TaskUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "due_date": null }));
    }

    #[test]
    fn test_new_task_omits_unset_optionals() {
        let json = serde_json::to_value(NewTask::new("Buy milk")).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Buy milk" }));
    }

    #[test]
    fn test_priority_parse_is_case_insensitive() {
        assert_eq!("urgent".parse::<TaskPriority>(), Ok(TaskPriority::Urgent));
        assert_eq!("Work".parse::<TaskCategory>(), Ok(TaskCategory::Work));
        assert!("later".parse::<TaskPriority>().is_err());
    }
}
