// Public modules
pub mod auth_token;
pub mod chat_turn;
pub mod credentials;
pub mod query;

// Re-exports
pub use auth_token::AuthToken;
pub use chat_turn::{ChatTurn, TurnRole};
pub use credentials::Credentials;
pub use query::{QueryRequest, QueryResponse};
