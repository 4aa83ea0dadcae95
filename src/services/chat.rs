use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{ApiError, ChatClient};
use crate::models::{ChatReply, ConversationSummary, Message, Role};

/// Shown in place of an assistant reply when a send fails.
pub const SEND_FAILURE_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Default)]
struct ChatState {
    conversation_id: Option<i64>,
    messages: Vec<Message>,
    conversations: Vec<ConversationSummary>,
    loading: bool,
    /// Bumped whenever the open conversation is replaced, so a reply that
    /// lands afterwards is not appended to the wrong thread.
    epoch: u64,
}

impl ChatState {
    fn reset(&mut self) {
        self.conversation_id = None;
        self.messages.clear();
        self.epoch += 1;
    }
}

#[derive(Debug)]
pub enum SendOutcome {
    Replied(ChatReply),
    /// The user message stays in history and a notice was appended.
    Failed(ApiError),
    /// Blank input, or another send is still in flight.
    Skipped,
}

/// Chat page state: the open conversation, its local history, and the
/// conversation list.
///
/// Sending follows append-then-reconcile: the user message is appended
/// before the request resolves and is never removed; the outcome only
/// appends (the reply, or a failure notice).
#[derive(Clone)]
pub struct ChatSession {
    client: ChatClient,
    state: Arc<Mutex<ChatState>>,
}

/// Clears the in-flight flag when the send finishes or is abandoned.
struct InFlight {
    state: Arc<Mutex<ChatState>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock_state(&self.state).loading = false;
    }
}

impl ChatSession {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(ChatState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        lock_state(&self.state)
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.lock().conversation_id
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn conversations(&self) -> Vec<ConversationSummary> {
        self.lock().conversations.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub async fn send(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Skipped;
        }

        let (conversation_id, epoch) = {
            let mut state = self.lock();
            if state.loading {
                tracing::debug!("Send ignored, another message is in flight");
                return SendOutcome::Skipped;
            }
            state.loading = true;
            state.messages.push(Message::local(Role::User, text));
            (state.conversation_id, state.epoch)
        };
        let in_flight = InFlight {
            state: self.state.clone(),
        };

        let result = self.client.send_message(text, conversation_id).await;

        {
            let mut state = self.lock();
            let current = state.epoch == epoch;
            match &result {
                Ok(reply) if current => {
                    state
                        .messages
                        .push(Message::local(Role::Assistant, reply.message.clone()));
                    state.conversation_id = Some(reply.conversation_id);
                }
                Err(_) if current => {
                    state
                        .messages
                        .push(Message::local(Role::Assistant, SEND_FAILURE_NOTICE));
                }
                _ => {
                    tracing::debug!("Conversation changed while sending, reply not shown");
                }
            }
        }
        drop(in_flight);

        match result {
            Ok(reply) => {
                if let Err(e) = self.refresh_conversations().await {
                    tracing::warn!("Failed to reload conversations: {}", e);
                }
                SendOutcome::Replied(reply)
            }
            Err(e) => {
                tracing::error!("Error sending message: {}", e);
                SendOutcome::Failed(e)
            }
        }
    }

    pub async fn refresh_conversations(&self) -> Result<Vec<ConversationSummary>, ApiError> {
        let conversations = self.client.list_conversations().await?;
        self.lock().conversations = conversations.clone();
        Ok(conversations)
    }

    /// Load a stored conversation and make it the open one.
    pub async fn open(&self, id: i64) -> Result<(), ApiError> {
        let conversation = self.client.get_conversation(id).await?;
        let mut state = self.lock();
        state.reset();
        state.conversation_id = Some(conversation.id);
        state.messages = conversation.messages;
        Ok(())
    }

    /// Start an empty, unsaved conversation. The backend assigns an id on the
    /// first send.
    pub fn new_conversation(&self) {
        self.lock().reset();
    }

    /// Delete remotely. A conversation the backend no longer has is treated
    /// as gone locally too, and the `NotFoundError` is still returned.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let not_found = match self.client.delete_conversation(id).await {
            Ok(()) => None,
            Err(ApiError::NotFoundError(detail)) => {
                tracing::warn!(conversation_id = id, "Conversation already deleted on the backend");
                Some(detail)
            }
            Err(e) => return Err(e),
        };
        {
            let mut state = self.lock();
            if state.conversation_id == Some(id) {
                state.reset();
            }
            state.conversations.retain(|c| c.id != id);
        }
        if let Err(e) = self.refresh_conversations().await {
            tracing::warn!("Failed to reload conversations: {}", e);
        }
        match not_found {
            Some(detail) => Err(ApiError::NotFoundError(detail)),
            None => Ok(()),
        }
    }
}

fn lock_state(state: &Mutex<ChatState>) -> MutexGuard<'_, ChatState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use url::Url;

    fn session() -> ChatSession {
        // No session token: every call fails locally with an auth error.
        let api = ApiClient::new(Url::parse("http://127.0.0.1:9").unwrap());
        ChatSession::new(ChatClient::new(api))
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_message_and_appends_notice() {
        let chat = session();
        let outcome = chat.send("hello?").await;
        assert!(matches!(outcome, SendOutcome::Failed(ApiError::AuthError(_))));

        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, SEND_FAILURE_NOTICE);
        assert!(chat.conversation_id().is_none());
        assert!(!chat.is_loading());
    }

    #[tokio::test]
    async fn test_blank_message_is_skipped() {
        let chat = session();
        assert!(matches!(chat.send("   ").await, SendOutcome::Skipped));
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn test_new_conversation_clears_history() {
        let chat = session();
        chat.send("hi").await;
        chat.new_conversation();
        assert!(chat.messages().is_empty());
        assert!(chat.conversation_id().is_none());
    }
}
