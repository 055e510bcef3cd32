//! Preferences that survive restarts.
//!
//! Stored as one JSON document under [`STATE_KEY`]. Only the model choice
//! and the agent flag are kept by default; the transcript is included when
//! the policy asks for it.

use quill_proto::ModelId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    storage::{StateStore, StorageError},
    transcript::Transcript,
};

/// Storage key for the persisted document.
pub const STATE_KEY: &str = "chat-storage";

/// What gets written to storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Model and agent flag only.
    #[default]
    PreferencesOnly,
    /// Preferences plus the committed transcript.
    WithTranscript,
}

/// Persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Selected model.
    pub selected_model: ModelId,
    /// Agent mode flag.
    pub is_agent: bool,
    /// Transcript, under [`PersistPolicy::WithTranscript`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Transcript>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self { selected_model: ModelId::default(), is_agent: true, messages: None }
    }
}

/// Read the persisted document. `None` if nothing was saved yet.
///
/// # Errors
///
/// - `StorageError::Io` if the store fails
/// - `StorageError::Serialization` if the stored bytes do not decode
pub fn load_state<S: StateStore>(store: &S) -> Result<Option<PersistedState>, StorageError> {
    let Some(bytes) = store.load(STATE_KEY)? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Write the persisted document.
///
/// # Errors
///
/// - `StorageError::Io` if the store fails
pub fn save_state<S: StateStore>(store: &S, state: &PersistedState) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(state)?;
    debug!(bytes = bytes.len(), "saving client state");
    store.save(STATE_KEY, &bytes)
}

#[cfg(test)]
mod tests {
    use quill_proto::ContentItem;

    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_match_first_launch() {
        let state = PersistedState::default();
        assert_eq!(state.selected_model, ModelId::Claude37);
        assert!(state.is_agent);
    }

    #[test]
    fn preferences_wire_shape() {
        let state = PersistedState { selected_model: ModelId::Gpt4, is_agent: false, messages: None };
        insta::assert_json_snapshot!(state, @r#"
        {
          "selectedModel": "gpt4",
          "isAgent": false
        }
        "#);
    }

    #[test]
    fn round_trip_through_store() {
        let store = MemoryStore::new();
        assert_eq!(load_state(&store).unwrap(), None);

        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        transcript.commit(vec![ContentItem::text("hello")]);
        let state = PersistedState {
            selected_model: ModelId::KimiK2,
            is_agent: true,
            messages: Some(transcript),
        };

        save_state(&store, &state).unwrap();
        assert_eq!(load_state(&store).unwrap(), Some(state));
    }

    #[test]
    fn unknown_model_is_serialization_error() {
        let store = MemoryStore::new();
        store.save(STATE_KEY, br#"{"selectedModel":"gpt2","isAgent":true}"#).unwrap();
        assert!(matches!(load_state(&store), Err(StorageError::Serialization(_))));
    }
}
