pub mod auth;
pub mod chat;
pub mod error;
pub mod http;
pub mod tasks;
pub mod validate;

pub use auth::AuthClient;
pub use chat::ChatClient;
pub use error::ApiError;
pub use http::ApiClient;
pub use tasks::TaskClient;
