pub mod chat;
pub mod database;
pub mod export;
pub mod keep_alive;
pub mod session;
pub mod settings;
pub mod store;
pub mod tasks;

pub use chat::{ChatSession, SendOutcome};
pub use database::Database;
pub use keep_alive::{HttpPinger, KeepAliveService, Pinger};
pub use session::SessionService;
pub use settings::{Preferences, SettingsService, Theme};
pub use store::{KeyValueStore, MemoryStore};
pub use tasks::{TaskBoard, TaskOrder, TaskStats};
