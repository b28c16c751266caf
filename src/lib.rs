// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod render;
pub mod session_store;
pub mod types;

// Re-exports
pub use client::{Backend, Client, ClientOptions, Endpoint};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use session_store::{FileStore, MemoryStore, SessionStore};
pub use types::*;
