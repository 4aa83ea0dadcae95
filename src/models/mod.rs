pub mod conversation;
pub mod message;
pub mod task;
pub mod timestamp;
pub mod user;

pub use conversation::{ChatReply, ChatRequest, Conversation, ConversationSummary};
pub use message::{Message, Role};
pub use task::{NewTask, Task, TaskCategory, TaskPriority, TaskUpdate};
pub use user::{Session, User};
