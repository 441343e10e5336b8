//! Config loading and config-to-runtime mapping.

use anyhow::Context;
use log::{debug, info};
use ojas_config::OjasConfig;
use ojas_memory::{MemoryOptions, StorageKeys};
use std::path::Path;

/// Load the explicit config file, or the layered stack from the cwd.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<OjasConfig> {
    if let Some(path) = path {
        info!("loading config from path: {}", path.display());
        return OjasConfig::load_from_path(path).context("failed to load config");
    }
    let cwd = std::env::current_dir().context("cwd")?;
    info!("loading layered config from cwd: {}", cwd.display());
    let layered = OjasConfig::load_layered(&cwd).context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

/// Translate memory and storage config into facade options.
pub(crate) fn memory_options(config: &OjasConfig) -> MemoryOptions {
    MemoryOptions {
        max_messages: config.memory.max_messages,
        extract_user_facts: config.memory.extract_user_facts,
        mirror_messages: config.storage.mirror_messages,
        keys: StorageKeys {
            conversation: config.storage.conversation_key.clone(),
            messages: config.storage.messages_key.clone(),
            profile: config.storage.profile_key.clone(),
        },
    }
}
