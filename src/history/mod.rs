mod file;

pub use self::file::{ iso_timestamp, SnapshotLog };

use crate::models::chat::{ ChatMessage, Role };
use log::{ error, info };
use thiserror::Error;

pub const DEFAULT_PERSONA: &str = "You are a helpful assistant.";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Conversation file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Conversation JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The single transcript shared by every client, plus its snapshot log.
#[derive(Debug)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
    log: SnapshotLog,
}

impl ConversationStore {
    pub fn new(log: SnapshotLog) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::System, DEFAULT_PERSONA)],
            log,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn log(&self) -> &SnapshotLog {
        &self.log
    }

    pub fn set_persona(&mut self, persona: &str) {
        match self.messages.first_mut() {
            Some(first) if first.role == Role::System => {
                first.content = persona.to_string();
            }
            _ => {
                self.messages.insert(0, ChatMessage::new(Role::System, persona));
            }
        }
    }

    pub fn append_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    /// Writes a snapshot of the current transcript. Failures are logged, never returned.
    pub async fn persist(&self) {
        match self.log.append(&self.messages).await {
            Ok(count) => info!(
                "Saved conversation snapshot #{} to {}",
                count,
                self.log.path().display()
            ),
            Err(e) => error!("Could not save conversation to {}: {}", self.log.path().display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ConversationStore {
        ConversationStore::new(SnapshotLog::new(dir.path().join("conversation.json")))
    }

    #[test]
    fn starts_with_default_system_message() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.messages(), &[ChatMessage::new(Role::System, DEFAULT_PERSONA)]);
    }

    #[test]
    fn latest_persona_wins_at_index_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set_persona("You are a pirate.");
        store.append_message(Role::User, "ahoy");
        store.set_persona("You are a poet.");
        store.set_persona("You are terse.");

        assert_eq!(store.len(), 2);
        assert_eq!(store.messages()[0], ChatMessage::new(Role::System, "You are terse."));
        assert_eq!(store.messages()[1].role, Role::User);
    }

    #[test]
    fn persona_is_inserted_when_first_entry_is_not_system() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConversationStore {
            messages: vec![ChatMessage::new(Role::User, "hello")],
            log: SnapshotLog::new(dir.path().join("conversation.json")),
        };
        store.set_persona("Be brief.");

        assert_eq!(store.len(), 2);
        assert_eq!(store.messages()[0], ChatMessage::new(Role::System, "Be brief."));
        assert_eq!(store.messages()[1], ChatMessage::new(Role::User, "hello"));
    }

    #[tokio::test]
    async fn persisted_snapshot_matches_live_length() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        for i in 0..4 {
            store.append_message(Role::User, format!("question {}", i));
            store.append_message(Role::Assistant, format!("answer {}", i));
            store.persist().await;
        }

        let snapshots = store.log().load().await.unwrap();
        assert_eq!(snapshots.len(), 4);
        assert_eq!(snapshots.last().unwrap().conversation.len(), store.len());
        assert_eq!(store.len(), 9);
    }

    #[tokio::test]
    async fn persist_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConversationStore::new(
            SnapshotLog::new(dir.path().join("nope").join("conversation.json"))
        );
        store.append_message(Role::User, "hi");
        store.persist().await;
        assert_eq!(store.len(), 2);
    }
}
