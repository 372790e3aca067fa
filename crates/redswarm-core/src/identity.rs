//! User and thread identity
//!
//! A user ID is a stable hash of a session fingerprint plus a date bucket:
//! the same user on the same day maps to the same ID, which is what gives
//! a returning user conversational continuity without being a credential.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Placeholder conversation ID used until the user starts a new chat.
pub const DEFAULT_CONVERSATION: &str = "default";

/// Derive a user ID from a process/browser fingerprint and a date bucket.
pub fn derive_user_id(fingerprint: &str, date: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update(date.format("%Y%m%d").to_string().as_bytes());
    let digest = hasher.finalize();
    format!("user_{}", &hex::encode(digest)[..16])
}

/// Per-turn thread addressing.
///
/// `fresh_thread` tells the executor to discard any existing checkpoint
/// before the turn runs; it is set when the user starts a new chat so the
/// new conversation cannot reuse an old thread's state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThreadConfig {
    pub user_id: String,
    pub conversation_id: String,
    #[serde(default)]
    pub fresh_thread: bool,
}

impl ThreadConfig {
    pub fn new(user_id: impl Into<String>, conversation_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: conversation_id.unwrap_or(DEFAULT_CONVERSATION).to_string(),
            fresh_thread: false,
        }
    }

    /// Start a new conversation under the same user: fresh UUID, fresh
    /// thread state.
    pub fn with_new_conversation(&self) -> Self {
        Self {
            user_id: self.user_id.clone(),
            conversation_id: Uuid::new_v4().to_string(),
            fresh_thread: true,
        }
    }

    pub fn thread_id(&self) -> String {
        format!("thread_{}_{}", self.user_id, self.conversation_id)
    }

    /// Memory namespace for the store: `(user_id, "memories")`.
    pub fn memory_namespace(&self) -> (String, String) {
        (self.user_id.clone(), "memories".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn user_id_stable_within_day() {
        let a = derive_user_id("pid-42_alice", date(2026, 8, 1));
        let b = derive_user_id("pid-42_alice", date(2026, 8, 1));
        assert_eq!(a, b);
        assert!(a.starts_with("user_"));
        assert_eq!(a.len(), "user_".len() + 16);
    }

    #[test]
    fn user_id_rotates_with_date_bucket() {
        let today = derive_user_id("pid-42_alice", date(2026, 8, 1));
        let tomorrow = derive_user_id("pid-42_alice", date(2026, 8, 2));
        assert_ne!(today, tomorrow);
    }

    #[test]
    fn thread_id_shape() {
        let config = ThreadConfig::new("user_abc", None);
        assert_eq!(config.thread_id(), "thread_user_abc_default");
        assert!(!config.fresh_thread);
    }

    #[test]
    fn new_conversation_isolates_thread() {
        let config = ThreadConfig::new("user_abc", None);
        let fresh = config.with_new_conversation();
        assert_eq!(fresh.user_id, config.user_id);
        assert_ne!(fresh.conversation_id, config.conversation_id);
        assert!(fresh.fresh_thread);
        assert_ne!(fresh.thread_id(), config.thread_id());
        // memory namespace is per-user, so it survives the new chat
        assert_eq!(fresh.memory_namespace(), config.memory_namespace());
    }
}
