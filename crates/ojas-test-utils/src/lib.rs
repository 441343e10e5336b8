//! Test helpers shared across Ojas crates.

pub mod store;

pub use store::{FailingStore, RecordingStore, StoreOp, seeded_store};
