//! Layered `ojas.json5` configuration for the conversation memory.
//!
//! Settings come from up to five layers (user home, project root, cwd, the
//! repo `.ojas` directory, then explicit runtime files). Each layer is checked
//! against the schema before it is merged, and the merged result is checked
//! once more for memory window and storage key rules.

mod error;
mod loader;
mod model;

pub use error::ConfigError;
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Memory and storage settings.
pub use model::*;
