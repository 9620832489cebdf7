use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use chatgenie::clock::ManualClock;
use chatgenie::config::EndpointConfig;
use chatgenie::conversation::ConversationStore;
use chatgenie::exchange::{HttpChatClient, MessageExchange};
use chatgenie::storage::{MemoryStore, SledStore};
use chatgenie::ChatSession;

#[allow(dead_code)]
pub fn create_temp_store() -> (SledStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SledStore::open(tmp.path().join("chat_store")).expect("failed to open sled store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// HTTP client pointed at a mock server
#[allow(dead_code)]
pub fn http_client(base_url: &str) -> HttpChatClient {
    let config = EndpointConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 30,
    };
    HttpChatClient::new(&config).expect("failed to build http client")
}

/// Session over an in-memory store talking HTTP to `base_url`
#[allow(dead_code)]
pub fn http_session(base_url: &str, username: &str) -> ChatSession {
    let store = ConversationStore::load(Arc::new(MemoryStore::new()));
    let exchange = MessageExchange::new(
        Arc::new(http_client(base_url)),
        Arc::new(ManualClock::at_default()),
    );
    ChatSession::new(store, exchange, username)
}
