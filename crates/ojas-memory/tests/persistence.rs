//! Persistence behavior of the conversation memory facade.

use ojas_memory::{
    ChatMessage, ConversationMemory, FileStore, InMemoryStore, KeyValueStore, MemoryOptions,
    ProfileRecord, Role, UserProfile,
};
use ojas_test_utils::{FailingStore, RecordingStore, StoreOp, seeded_store};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

fn sample_profile() -> UserProfile {
    UserProfile {
        name: "Asha".to_string(),
        email: "asha@example.com".to_string(),
        primary_dosha: "vata".to_string(),
        secondary_dosha: Some("pitta".to_string()),
        dietary_preferences: vec!["vegetarian".to_string()],
        ..UserProfile::default()
    }
}

/// A new instance over the same storage sees the same log and record.
#[test]
fn state_round_trips_through_file_store() {
    let temp = tempdir().expect("tempdir");
    let store = Arc::new(FileStore::new(temp.path()).expect("store"));

    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    memory.add_message(Role::User, "My agni is variable");
    memory.add_message(Role::Assistant, "Let's look at your meals.");
    memory.report_health_metrics([("energy", 3.0)]);
    let messages = memory.messages();
    let info = memory.user_info();
    memory.dispose();

    let reloaded = ConversationMemory::init(store, MemoryOptions::default()).expect("reload");
    assert_eq!(reloaded.messages(), messages);
    assert_eq!(reloaded.user_info(), info);
    assert_eq!(info.health_data.agni.as_deref(), Some("variable"));
}

/// Corrupt entries load as empty defaults instead of failing.
#[test]
fn corrupt_entries_load_as_defaults() {
    let store = seeded_store([
        ("conversation_memory", "{\"messages\": [oops"),
        ("user_profile", "not json"),
    ]);
    let memory = ConversationMemory::init(store, MemoryOptions::default()).expect("memory");

    assert!(memory.messages().is_empty());
    assert_eq!(memory.user_info(), ProfileRecord::default());
    assert_eq!(memory.user_profile(), None);
}

/// The mirror entry tracks the log as role/content pairs.
#[test]
fn mirror_entry_matches_recent_messages() {
    let store = Arc::new(InMemoryStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    memory.add_message(Role::User, "hello");
    memory.add_message(Role::Assistant, "namaste");

    let raw = store.get("chat_messages").expect("get").expect("mirror");
    let mirror: Vec<ChatMessage> = serde_json::from_str(&raw).expect("parse");
    assert_eq!(mirror, memory.recent_messages(None));
    assert!(!raw.contains("timestamp"));
}

/// Every mutation writes the aggregate and its mirror.
#[test]
fn mutations_write_aggregate_and_mirror() {
    let store = Arc::new(RecordingStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    memory.add_message(Role::User, "hi");
    memory.update_user_info(ProfileRecord::default());

    let expected = vec![
        StoreOp::Set("conversation_memory".to_string()),
        StoreOp::Set("chat_messages".to_string()),
        StoreOp::Set("conversation_memory".to_string()),
        StoreOp::Set("chat_messages".to_string()),
    ];
    assert_eq!(store.ops(), expected);
}

/// Clearing memory removes all three persisted entries.
#[test]
fn clear_memory_removes_all_keys() {
    let store = Arc::new(RecordingStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    memory.add_message(Role::User, "I am pitta");
    memory.save_user_profile(&sample_profile());
    store.clear_ops();

    memory.clear_memory();

    assert_eq!(
        store.ops(),
        vec![
            StoreOp::Remove("conversation_memory".to_string()),
            StoreOp::Remove("chat_messages".to_string()),
            StoreOp::Remove("user_profile".to_string()),
        ]
    );
    for key in ["conversation_memory", "chat_messages", "user_profile"] {
        assert_eq!(store.get(key).expect("get"), None);
    }
    assert_eq!(memory.user_profile(), None);
}

/// Write failures are reported without losing in-memory state.
#[test]
fn write_failures_are_non_fatal() {
    let store = Arc::new(FailingStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");

    memory.add_message(Role::User, "My dosha is vata");
    let error = memory.last_persist_error().expect("error recorded");
    assert!(error.contains("quota"));
    assert_eq!(memory.recent_messages(None).len(), 1);
    assert_eq!(memory.user_info().preferences.dosha.as_deref(), Some("vata"));
    assert_eq!(store.inner().get("conversation_memory").expect("get"), None);

    store.set_failing(false);
    memory.add_message(Role::Assistant, "Noted.");
    assert_eq!(memory.last_persist_error(), None);
    assert!(
        store
            .inner()
            .get("conversation_memory")
            .expect("get")
            .is_some()
    );
}

/// The onboarding profile is stored independently of conversation state.
#[test]
fn user_profile_accessors() {
    let store = Arc::new(InMemoryStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    assert_eq!(memory.user_profile(), None);

    let profile = sample_profile();
    memory.save_user_profile(&profile);
    assert_eq!(memory.user_profile(), Some(profile.clone()));
    assert!(memory.messages().is_empty());

    let reloaded = ConversationMemory::init(store, MemoryOptions::default()).expect("reload");
    assert_eq!(reloaded.user_profile(), Some(profile));

    reloaded.clear_user_profile();
    assert_eq!(reloaded.user_profile(), None);
}

/// A smaller configured window trims a larger stored log on load.
#[test]
fn reload_with_smaller_window_trims_oldest() {
    let store = Arc::new(InMemoryStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    for idx in 0..5 {
        memory.add_message(Role::User, format!("turn {idx}"));
    }

    let options = MemoryOptions {
        max_messages: 2,
        ..MemoryOptions::default()
    };
    let reloaded = ConversationMemory::init(store, options).expect("reload");
    let contents: Vec<String> = reloaded
        .recent_messages(None)
        .into_iter()
        .map(|message| message.content)
        .collect();
    assert_eq!(contents, vec!["turn 3".to_string(), "turn 4".to_string()]);
}

/// Disposing retries a failed write once storage recovers.
#[test]
fn dispose_retries_failed_write() {
    let store = Arc::new(FailingStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    memory.add_message(Role::User, "I suffer from headaches");
    assert!(memory.last_persist_error().is_some());

    store.set_failing(false);
    memory.dispose();

    let reloaded = ConversationMemory::init(store, MemoryOptions::default()).expect("reload");
    assert_eq!(reloaded.recent_messages(None).len(), 1);
    assert_eq!(
        reloaded.user_info().health_data.conditions,
        Some(vec!["headaches".to_string()])
    );
}

/// A clear whose removes failed is replayed as removes on dispose.
#[test]
fn dispose_replays_failed_clear_as_removes() {
    let store = Arc::new(FailingStore::new());
    store.set_failing(false);
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    memory.save_user_profile(&sample_profile());
    memory.add_message(Role::User, "My dosha is pitta");

    store.set_failing(true);
    memory.clear_memory();
    assert!(memory.last_persist_error().is_some());

    store.set_failing(false);
    memory.dispose();

    for key in ["conversation_memory", "chat_messages", "user_profile"] {
        assert_eq!(store.inner().get(key).expect("get"), None);
    }
    let reloaded = ConversationMemory::init(store, MemoryOptions::default()).expect("reload");
    assert_eq!(reloaded.user_profile(), None);
    assert!(reloaded.messages().is_empty());
    assert!(reloaded.user_info().is_empty());
}

/// A successful profile write does not hide an unsaved conversation.
#[test]
fn unrelated_success_keeps_conversation_pending() {
    let store = Arc::new(FailingStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    memory.add_message(Role::User, "I experience insomnia");

    store.set_failing(false);
    memory.save_user_profile(&sample_profile());
    let error = memory.last_persist_error().expect("conversation still unsaved");
    assert!(error.contains("quota"));
    assert_eq!(store.inner().get("conversation_memory").expect("get"), None);

    memory.dispose();
    let reloaded = ConversationMemory::init(store, MemoryOptions::default()).expect("reload");
    assert_eq!(reloaded.recent_messages(None).len(), 1);
    assert_eq!(reloaded.user_profile(), Some(sample_profile()));
}

/// A later successful write to the same key resolves the earlier failure.
#[test]
fn later_write_to_same_key_resolves_failure() {
    let store = Arc::new(FailingStore::new());
    let memory =
        ConversationMemory::init(store.clone(), MemoryOptions::default()).expect("memory");
    memory.clear_user_profile();
    assert!(memory.last_persist_error().is_some());

    store.set_failing(false);
    memory.save_user_profile(&sample_profile());
    assert_eq!(memory.last_persist_error(), None);

    memory.dispose();
    assert!(store.inner().get("user_profile").expect("get").is_some());
}
