use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Text typed by the user.
    User,
    /// Text returned by the backend (or the failure placeholder).
    Bot,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Bot => write!(f, "bot"),
        }
    }
}

/// One message unit in the visible conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// The producer of this turn.
    pub role: TurnRole,
    /// The message text.
    pub text: String,
}

impl ChatTurn {
    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Creates a bot turn.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Bot,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(ChatTurn::bot("4")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "bot", "text": "4"}));
        let turn: ChatTurn =
            serde_json::from_value(serde_json::json!({"role": "user", "text": "hi"})).unwrap();
        assert_eq!(turn, ChatTurn::user("hi"));
    }
}
