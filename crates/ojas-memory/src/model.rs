//! Chat message model shared by the message log and persisted snapshots.

use crate::error::MemoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MemoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(MemoryError::InvalidRole(other.to_string())),
        }
    }
}

/// A single chat turn as retained in the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Author of the turn.
    pub role: Role,
    /// Turn text.
    pub content: String,
    /// Append time.
    pub timestamp: DateTime<Utc>,
}

/// Timestamp-free view of a message used for prompt construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Role;
    use crate::MemoryError;
    use pretty_assertions::assert_eq;

    #[test]
    fn role_parses_wire_names() {
        assert_eq!("user".parse::<Role>().expect("user"), Role::User);
        assert_eq!(
            "assistant".parse::<Role>().expect("assistant"),
            Role::Assistant
        );
        assert_eq!("system".parse::<Role>().expect("system"), Role::System);
    }

    #[test]
    fn role_rejects_unknown_names() {
        let err = "tool".parse::<Role>().unwrap_err();
        assert!(matches!(err, MemoryError::InvalidRole(ref role) if role == "tool"));
        assert!("User".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).expect("serialize");
        assert_eq!(json, "\"assistant\"");
    }
}
