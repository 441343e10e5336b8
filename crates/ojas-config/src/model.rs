//! Configuration schema for Ojas.

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory under the home directory holding config and data.
pub const DEFAULT_HOME_DIR: &str = ".ojas";
/// Data directory name under [`DEFAULT_HOME_DIR`].
pub const DEFAULT_DATA_DIR: &str = "data";
/// Retained chat turns when `memory.max_messages` is unset.
pub const DEFAULT_MAX_MESSAGES: usize = 50;

/// Root config for Ojas.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OjasConfig {
    #[serde(default, rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemorySettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Conversation window and extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemorySettings {
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    #[serde(default = "default_true")]
    pub extract_user_facts: bool,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            extract_user_facts: true,
        }
    }
}

/// Where and under which keys state is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageSettings {
    /// Data directory; defaults to `~/.ojas/data`.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_conversation_key")]
    pub conversation_key: String,
    #[serde(default = "default_messages_key")]
    pub messages_key: String,
    #[serde(default = "default_profile_key")]
    pub profile_key: String,
    #[serde(default = "default_true")]
    pub mirror_messages: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: None,
            conversation_key: default_conversation_key(),
            messages_key: default_messages_key(),
            profile_key: default_profile_key(),
            mirror_messages: true,
        }
    }
}

impl StorageSettings {
    /// Configured data directory, or the default under the home directory.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(PathBuf::from(path)),
            None => UserDirs::new().map(|dirs| {
                dirs.home_dir()
                    .join(DEFAULT_HOME_DIR)
                    .join(DEFAULT_DATA_DIR)
            }),
        }
    }
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

fn default_true() -> bool {
    true
}

fn default_conversation_key() -> String {
    "conversation_memory".to_string()
}

fn default_messages_key() -> String {
    "chat_messages".to_string()
}

fn default_profile_key() -> String {
    "user_profile".to_string()
}
