use super::error::ApiError;
use super::http::ApiClient;
use crate::models::{ChatReply, ChatRequest, Conversation, ConversationSummary};

#[derive(Debug, Clone)]
pub struct ChatClient {
    api: ApiClient,
}

impl ChatClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Send a user message. Without a conversation id the backend starts a
    /// new conversation and returns its id.
    pub async fn send_message(
        &self,
        text: &str,
        conversation_id: Option<i64>,
    ) -> Result<ChatReply, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::ValidationError("Message is empty".to_string()));
        }
        let request = ChatRequest {
            message: text.to_string(),
            conversation_id,
        };
        self.api.post("/chat", &request).await
    }

    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        self.api.get("/conversations").await
    }

    pub async fn get_conversation(&self, id: i64) -> Result<Conversation, ApiError> {
        self.api.get(&format!("/conversations/{id}")).await
    }

    pub async fn delete_conversation(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete(&format!("/conversations/{id}")).await
    }
}
