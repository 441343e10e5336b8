//! Bounded conversational memory and personalization extraction for Ojas.
//!
//! The crate keeps a capped window of chat turns, derives personalization
//! attributes from user text with a fixed rule table, merges them into a
//! durable record, and renders that record as a prompt digest.

pub mod error;
pub mod extract;
pub mod gateway;
pub mod memory;
pub mod messages;
pub mod model;
pub mod options;
pub mod profile;
pub mod render;
pub mod store;
pub mod user_profile;

/// Memory error type.
pub use error::MemoryError;
/// Extraction rule table.
pub use extract::{ExtractionRule, Extractor, FieldSetter};
/// Typed persistence over a key/value store.
pub use gateway::PersistenceGateway;
/// Conversation memory facade and its persisted snapshot.
pub use memory::{ConversationMemory, ConversationSnapshot, SNAPSHOT_VERSION};
pub use messages::MessageLog;
/// Chat message model.
pub use model::{ChatMessage, Message, Role};
pub use options::{DEFAULT_MAX_MESSAGES, MemoryOptions, StorageKeys};
/// Personalization record.
pub use profile::{Dinacharya, HealthData, Preferences, ProfileRecord};
pub use render::{CONTEXT_HEADER, render_context};
/// Storage contract and built-in stores.
pub use store::{FileStore, InMemoryStore, KeyValueStore};
pub use user_profile::{DailyRoutine, ProfileSettings, UserProfile};
