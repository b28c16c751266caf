//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for choosing the backend and where the session token lives.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::ClientOptions;
use crate::error::Result;
use crate::session_store::{FileStore, MemoryStore, SessionStore};

/// Environment variable naming the session file when `--session-file` is absent.
pub const SESSION_FILE_ENV: &str = "QUERENT_SESSION_FILE";

/// Command-line arguments for the querent-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the backend.
    #[arrrg(optional, "Backend base URL (default: $QUERENT_BASE_URL or http://localhost:8080/)", "URL")]
    pub base_url: Option<String>,

    /// File holding the session token.
    #[arrrg(optional, "Session file (default: $QUERENT_SESSION_FILE or the per-user data dir)", "PATH")]
    pub session_file: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout_secs: Option<u32>,

    /// Keep the session token in memory only.
    #[arrrg(flag, "Do not persist the session token")]
    pub ephemeral: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Backend base URL; `None` defers to the client's environment lookup.
    pub base_url: Option<String>,

    /// Explicit session file; `None` defers to the environment, then the data dir.
    pub session_file: Option<PathBuf>,

    /// Whether the session token is written to disk.
    pub persist_session: bool,

    /// Optional request timeout.
    pub timeout: Option<Duration>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: from the environment or `http://localhost:8080/`
    /// - Session: persisted to the default session file
    /// - Timeout: none
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            session_file: None,
            persist_session: true,
            timeout: None,
            use_color: true,
        }
    }

    /// Sets the backend base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the session file.
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Keeps the token in memory only.
    pub fn ephemeral(mut self) -> Self {
        self.persist_session = false;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Transport options for the API client.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.timeout,
            ..ClientOptions::default()
        }
    }

    /// Where the session file lives, or `None` for an in-memory session.
    pub fn session_path(&self) -> Result<Option<PathBuf>> {
        if !self.persist_session {
            return Ok(None);
        }
        if let Some(path) = &self.session_file {
            return Ok(Some(path.clone()));
        }
        if let Ok(path) = env::var(SESSION_FILE_ENV)
            && !path.is_empty()
        {
            return Ok(Some(PathBuf::from(path)));
        }
        FileStore::default_location().map(Some)
    }

    /// Opens the configured session store.
    pub fn open_store(&self) -> Result<Arc<dyn SessionStore>> {
        Ok(match self.session_path()? {
            Some(path) => Arc::new(FileStore::new(path)),
            None => Arc::new(MemoryStore::new()),
        })
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig {
            base_url: args.base_url,
            session_file: args.session_file.map(PathBuf::from),
            persist_session: !args.ephemeral,
            timeout: args
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(|secs| Duration::from_secs(u64::from(secs))),
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.base_url.is_none());
        assert!(config.session_file.is_none());
        assert!(config.persist_session);
        assert!(config.timeout.is_none());
        assert!(config.use_color);
        assert_eq!(config.client_options(), ClientOptions::default());
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            base_url: Some("http://chat.example.com".to_string()),
            session_file: Some("/tmp/querent.json".to_string()),
            timeout_secs: Some(15),
            ephemeral: true,
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.base_url.as_deref(), Some("http://chat.example.com"));
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/querent.json")));
        assert!(!config.persist_session);
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert!(!config.use_color);
        assert_eq!(config.client_options().timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn zero_timeout_means_none() {
        let args = ChatArgs {
            timeout_secs: Some(0),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::from(args).timeout.is_none());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("http://localhost:9000")
            .with_session_file("session.json")
            .with_timeout(Some(Duration::from_secs(5)))
            .without_color();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.session_path().unwrap(), Some(PathBuf::from("session.json")));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert!(!config.use_color);

        let config = config.ephemeral();
        assert_eq!(config.session_path().unwrap(), None);
    }

    #[test]
    fn open_store_uses_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let config = ChatConfig::new().with_session_file(&path);

        config.open_store().unwrap().set_token("abc").unwrap();
        let reopened = config.open_store().unwrap();
        assert_eq!(reopened.token().unwrap(), Some("abc".to_string()));
        assert!(path.exists());
    }

    #[test]
    fn ephemeral_store_forgets() {
        let config = ChatConfig::new().ephemeral();
        config.open_store().unwrap().set_token("abc").unwrap();
        assert_eq!(config.open_store().unwrap().token().unwrap(), None);
    }
}
