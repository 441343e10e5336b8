//! Conversation memory facade: the single entry point for chat state.
//!
//! `ConversationMemory` owns the message log and the personalization record,
//! runs extraction over user turns, and persists after every mutation. It is
//! built once with [`ConversationMemory::init`] and handed to callers by
//! reference; a mutex serializes each load, compute, and persist sequence.
//!
//! Persistence failures never reach callers. They are logged and exposed via
//! [`ConversationMemory::last_persist_error`], and the in-memory state stays
//! authoritative for the rest of the session. Each failed key keeps its
//! intended write (save or remove) until a later write to that key succeeds
//! or [`ConversationMemory::dispose`] replays it.

use crate::error::MemoryError;
use crate::extract::Extractor;
use crate::gateway::PersistenceGateway;
use crate::messages::MessageLog;
use crate::model::{ChatMessage, Message, Role};
use crate::options::MemoryOptions;
use crate::profile::{HealthData, ProfileRecord};
use crate::render::render_context;
use crate::store::KeyValueStore;
use crate::user_profile::UserProfile;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Current persisted snapshot schema.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted form of the conversation aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnapshot {
    #[serde(default = "default_snapshot_version")]
    pub version: u32,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub user_info: ProfileRecord,
}

impl Default for ConversationSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            messages: Vec::new(),
            user_info: ProfileRecord::default(),
        }
    }
}

fn default_snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Borrowed snapshot used for writes.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    version: u32,
    messages: Vec<&'a Message>,
    user_info: &'a ProfileRecord,
}

/// Intended write for a key whose last attempt failed.
#[derive(Debug)]
enum PendingWrite {
    Conversation,
    Mirror,
    Profile(Box<UserProfile>),
    Remove,
}

#[derive(Debug, Default)]
struct WriteLedger {
    pending: BTreeMap<String, PendingWrite>,
    last_error: Option<String>,
}

struct ConversationState {
    log: MessageLog,
    user_info: ProfileRecord,
}

impl ConversationState {
    fn empty(capacity: usize) -> Self {
        Self {
            log: MessageLog::new(capacity),
            user_info: ProfileRecord::default(),
        }
    }
}

/// Bounded chat memory plus merged personalization attributes.
pub struct ConversationMemory {
    gateway: PersistenceGateway,
    extractor: Extractor,
    options: MemoryOptions,
    state: Mutex<ConversationState>,
    writes: Mutex<WriteLedger>,
}

impl ConversationMemory {
    /// Validate options, compile the built-in rules, and load stored state.
    pub fn init(
        store: Arc<dyn KeyValueStore>,
        options: MemoryOptions,
    ) -> Result<Self, MemoryError> {
        Self::init_with_extractor(store, options, Extractor::new()?)
    }

    /// Like [`ConversationMemory::init`] with a caller-supplied rule table.
    pub fn init_with_extractor(
        store: Arc<dyn KeyValueStore>,
        options: MemoryOptions,
        extractor: Extractor,
    ) -> Result<Self, MemoryError> {
        options.validate()?;
        let gateway = PersistenceGateway::new(store);
        let state = load_state(&gateway, &options);
        info!(
            "conversation memory initialized (messages={}, max_messages={}, rules={})",
            state.log.len(),
            options.max_messages,
            extractor.rules().len()
        );
        Ok(Self {
            gateway,
            extractor,
            options,
            state: Mutex::new(state),
            writes: Mutex::new(WriteLedger::default()),
        })
    }

    /// Release the facade, replaying every write that has not yet succeeded.
    pub fn dispose(self) {
        let state = self.state.lock();
        let pending = std::mem::take(&mut self.writes.lock().pending);
        if !pending.is_empty() {
            info!("retrying unsaved writes (count={})", pending.len());
            self.run_writes(&state, pending);
            if let Some(error) = self.last_persist_error() {
                warn!("conversation memory disposed with unsaved changes: {error}");
            }
        }
        info!("conversation memory disposed (messages={})", state.log.len());
    }

    /// Append a turn; user turns also run through the extraction table.
    pub fn add_message(&self, role: Role, content: impl Into<String>) {
        let content = content.into();
        let mut state = self.state.lock();
        if role == Role::User && self.options.extract_user_facts {
            let fragment = self.extractor.extract(&content);
            if !fragment.is_empty() {
                debug!("merging extracted user info");
                state.user_info.merge(sanitize(fragment));
            }
        }
        debug!(
            "appending message (role={}, content_len={})",
            role,
            content.len()
        );
        state.log.push(role, content);
        self.persist_conversation(&state);
    }

    /// The last `count` turns oldest-first; defaults to the full window.
    pub fn recent_messages(&self, count: Option<usize>) -> Vec<ChatMessage> {
        let count = count.unwrap_or(self.options.max_messages);
        self.state.lock().log.recent(count)
    }

    /// Every retained turn with its timestamp.
    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().log.messages().cloned().collect()
    }

    /// Merge a fragment into the personalization record.
    pub fn update_user_info(&self, fragment: ProfileRecord) {
        let mut state = self.state.lock();
        state.user_info.merge(sanitize(fragment));
        debug!("user info updated");
        self.persist_conversation(&state);
    }

    /// Replace `healthData.lastReported` with the given metrics.
    pub fn report_health_metrics<I, K>(&self, metrics: I)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let last_reported: BTreeMap<String, f64> = metrics
            .into_iter()
            .map(|(metric, value)| (metric.into(), value))
            .collect();
        self.update_user_info(ProfileRecord {
            health_data: HealthData {
                last_reported: Some(last_reported),
                ..HealthData::default()
            },
            ..ProfileRecord::default()
        });
    }

    /// Snapshot of the personalization record.
    pub fn user_info(&self) -> ProfileRecord {
        self.state.lock().user_info.clone()
    }

    /// Prompt digest of the personalization record.
    pub fn context_for_prompt(&self) -> String {
        render_context(&self.state.lock().user_info)
    }

    /// Reset messages and user info and delete every persisted entry.
    pub fn clear_memory(&self) {
        let mut state = self.state.lock();
        *state = ConversationState::empty(self.options.max_messages);
        let keys = &self.options.keys;
        self.run_writes(
            &state,
            [&keys.conversation, &keys.messages, &keys.profile]
                .map(|key| (key.clone(), PendingWrite::Remove)),
        );
        info!("conversation memory cleared");
    }

    /// Stored onboarding profile, if any.
    pub fn user_profile(&self) -> Option<UserProfile> {
        self.gateway.load(&self.options.keys.profile)
    }

    pub fn save_user_profile(&self, profile: &UserProfile) {
        let state = self.state.lock();
        let write = PendingWrite::Profile(Box::new(profile.clone()));
        self.run_writes(&state, [(self.options.keys.profile.clone(), write)]);
        debug!("user profile saved");
    }

    pub fn clear_user_profile(&self) {
        let state = self.state.lock();
        self.run_writes(
            &state,
            [(self.options.keys.profile.clone(), PendingWrite::Remove)],
        );
        debug!("user profile cleared");
    }

    /// Most recent write failure, kept while any failed write is unresolved.
    pub fn last_persist_error(&self) -> Option<String> {
        self.writes.lock().last_error.clone()
    }

    fn persist_conversation(&self, state: &ConversationState) {
        let keys = &self.options.keys;
        let mut writes = vec![(keys.conversation.clone(), PendingWrite::Conversation)];
        if self.options.mirror_messages {
            writes.push((keys.messages.clone(), PendingWrite::Mirror));
        }
        self.run_writes(state, writes);
    }

    /// Attempt each write and reconcile the pending set with the outcome.
    fn run_writes<I>(&self, state: &ConversationState, writes: I)
    where
        I: IntoIterator<Item = (String, PendingWrite)>,
    {
        for (key, write) in writes {
            let result = self.apply(state, &key, &write);
            let mut ledger = self.writes.lock();
            match result {
                Ok(()) => {
                    ledger.pending.remove(&key);
                }
                Err(err) => {
                    warn!("failed to persist memory (key={key}): {err}");
                    ledger.last_error = Some(format!("{key}: {err}"));
                    ledger.pending.insert(key, write);
                }
            }
        }
        let mut ledger = self.writes.lock();
        if ledger.pending.is_empty() {
            ledger.last_error = None;
        }
    }

    fn apply(
        &self,
        state: &ConversationState,
        key: &str,
        write: &PendingWrite,
    ) -> Result<(), MemoryError> {
        match write {
            PendingWrite::Conversation => {
                let snapshot = SnapshotRef {
                    version: SNAPSHOT_VERSION,
                    messages: state.log.messages().collect(),
                    user_info: &state.user_info,
                };
                self.gateway.save(key, &snapshot)
            }
            PendingWrite::Mirror => self.gateway.save(key, &state.log.recent(state.log.len())),
            PendingWrite::Profile(profile) => self.gateway.save(key, &**profile),
            PendingWrite::Remove => self.gateway.remove(key),
        }
    }
}

fn load_state(gateway: &PersistenceGateway, options: &MemoryOptions) -> ConversationState {
    let snapshot: ConversationSnapshot = gateway.load(&options.keys.conversation);
    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            "ignoring conversation snapshot with unsupported version {}",
            snapshot.version
        );
        return ConversationState::empty(options.max_messages);
    }
    ConversationState {
        log: MessageLog::from_messages(snapshot.messages, options.max_messages),
        user_info: snapshot.user_info,
    }
}

/// JSON cannot carry NaN or infinity, so such metrics would corrupt the
/// stored snapshot.
fn sanitize(mut fragment: ProfileRecord) -> ProfileRecord {
    if let Some(metrics) = fragment.health_data.last_reported.as_mut() {
        metrics.retain(|metric, value| {
            let finite = value.is_finite();
            if !finite {
                warn!("dropping non-finite health metric (metric={metric})");
            }
            finite
        });
    }
    fragment
}
