use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;
use super::timestamp;

/// List entry returned by `GET /conversations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Always derived from the message list, never stored separately.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub conversation_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_conversation_message_count_follows_messages() {
        let json = r#"{
            "id": 4,
            "user_id": 1,
            "created_at": "2026-02-02T17:54:00",
            "updated_at": "2026-02-02T17:55:00",
            "messages": [
                {"id": 1, "role": "user", "content": "hi", "created_at": "2026-02-02T17:54:00"},
                {"id": 2, "role": "assistant", "content": "hello", "created_at": "2026-02-02T17:54:01"}
            ]
        }"#;
        let conv: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conv.message_count(), 2);
        assert_eq!(conv.messages[1].role, Role::Assistant);
    }

    #[test]
    fn test_chat_request_omits_missing_conversation() {
        let req = ChatRequest {
            message: "hello".to_string(),
            conversation_id: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({ "message": "hello" })
        );
    }
}
