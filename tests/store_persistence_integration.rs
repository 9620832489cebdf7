//! Integration tests for persisting conversation state through sled
//!
//! Covers the write-through of every mutation, reopening the database, and
//! recovery from corrupt stored entries.

use std::sync::Arc;

use chatgenie::conversation::{
    ConversationStore, Message, CHATS_KEY, CURRENT_CHAT_KEY, DEFAULT_CHAT_ID,
};
use chatgenie::storage::{KeyValueStore, SledStore};

mod common;

#[test]
fn test_state_round_trips_through_reopened_database() {
    let (storage, tmp) = common::create_temp_store();
    let path = storage.path().to_path_buf();

    let expected = {
        let mut store = ConversationStore::load(Arc::new(storage));
        store.append_message(DEFAULT_CHAT_ID, Message::user(1, "Hello", "2025-01-01 12:00:00"));
        store.append_message(DEFAULT_CHAT_ID, Message::bot(2, "Hi there", "2025-01-01 12:00:01"));
        let second = store.new_chat();
        store.append_message(
            &second,
            Message::error(3, "Failed to send message: Request timed out", "2025-01-01 12:01:00"),
        );
        store.select_chat(DEFAULT_CHAT_ID);
        store.state().clone()
    };

    let reopened = SledStore::open(&path).expect("failed to reopen store");
    let loaded = ConversationStore::load(Arc::new(reopened));

    assert_eq!(loaded.state(), &expected);
    assert_eq!(loaded.current_chat().title, "Hello");
    drop(tmp);
}

#[test]
fn test_persisted_entries_use_client_key_names() {
    let (storage, _tmp) = common::create_temp_store();
    let storage = Arc::new(storage);

    let mut store = ConversationStore::load(storage.clone());
    store.append_message(DEFAULT_CHAT_ID, Message::user(7, "Hello", "2025-01-01 12:00:00"));

    let chats = storage.get(CHATS_KEY).unwrap().expect("chats entry written");
    let json: serde_json::Value = serde_json::from_str(&chats).unwrap();
    assert_eq!(json[0]["id"], "default");
    assert_eq!(json[0]["messages"][0]["isUser"], true);
    assert_eq!(
        storage.get(CURRENT_CHAT_KEY).unwrap().as_deref(),
        Some(DEFAULT_CHAT_ID)
    );
}

#[test]
fn test_corrupt_chats_entry_falls_back_to_seed() {
    let (storage, _tmp) = common::create_temp_store();
    storage.set(CHATS_KEY, "[{\"id\": 12").unwrap();
    storage.set(CURRENT_CHAT_KEY, "whatever").unwrap();

    let store = ConversationStore::load(Arc::new(storage));

    assert_eq!(store.chats().len(), 1);
    assert_eq!(store.current_chat_id(), DEFAULT_CHAT_ID);
}

#[test]
fn test_delete_is_durable() {
    let (storage, _tmp) = common::create_temp_store();
    let path = storage.path().to_path_buf();

    let remaining = {
        let mut store = ConversationStore::load(Arc::new(storage));
        let keep = store.new_chat();
        store.delete_chat(DEFAULT_CHAT_ID);
        keep
    };

    let store = ConversationStore::load(Arc::new(SledStore::open(&path).unwrap()));
    assert_eq!(store.chats().len(), 1);
    assert_eq!(store.current_chat_id(), remaining);
}
