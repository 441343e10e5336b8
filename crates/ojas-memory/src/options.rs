//! Runtime options for the conversation memory facade.

use crate::error::MemoryError;
use crate::store::validate_key;

/// Default cap on retained chat turns.
pub const DEFAULT_MAX_MESSAGES: usize = 50;

/// Storage keys for the three persisted entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Conversation aggregate: timestamped messages plus user info.
    pub conversation: String,
    /// Lightweight role/content mirror of the message log.
    pub messages: String,
    /// Onboarding profile.
    pub profile: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            conversation: "conversation_memory".to_string(),
            messages: "chat_messages".to_string(),
            profile: "user_profile".to_string(),
        }
    }
}

/// Behavior switches for [`crate::ConversationMemory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOptions {
    /// Maximum number of retained messages.
    pub max_messages: usize,
    /// Run the extraction table over user messages.
    pub extract_user_facts: bool,
    /// Also write the role/content mirror on every conversation write.
    pub mirror_messages: bool,
    /// Keys used in the backing store.
    pub keys: StorageKeys,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            extract_user_facts: true,
            mirror_messages: true,
            keys: StorageKeys::default(),
        }
    }
}

impl MemoryOptions {
    /// Reject settings the facade cannot honor.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if self.max_messages == 0 {
            return Err(MemoryError::InvalidOptions(
                "max_messages must be at least 1".to_string(),
            ));
        }
        let keys = [
            &self.keys.conversation,
            &self.keys.messages,
            &self.keys.profile,
        ];
        for key in keys {
            validate_key(key).map_err(|_| {
                MemoryError::InvalidOptions(format!(
                    "storage key {key:?} must be non-empty ASCII letters, digits, '_', '-' or '.' \
                     and must not start with '.'"
                ))
            })?;
        }
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(MemoryError::InvalidOptions(
                "storage keys must be distinct".to_string(),
            ));
        }
        Ok(())
    }
}
