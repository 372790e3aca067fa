//! Per-thread state and the checkpointer that persists it

use dashmap::DashMap;
use redswarm_core::{Message, Result};
use serde::{Deserialize, Serialize};

/// Everything one conversation carries between turns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThreadState {
    pub thread_id: String,
    /// Active agent; `None` until the first turn routes to the default.
    pub current_agent: Option<String>,
    pub messages: Vec<Message>,
    /// Cumulative LLM calls across the thread's lifetime.
    pub step_count: u64,
}

impl ThreadState {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            current_agent: None,
            messages: Vec::new(),
            step_count: 0,
        }
    }
}

/// Thread persistence. One writer per thread; `save` replaces the whole
/// state atomically, which gives turn n+1 read-your-writes over turn n.
#[async_trait::async_trait]
pub trait Checkpointer: Send + Sync {
    async fn load(&self, thread_id: &str) -> Result<Option<ThreadState>>;
    async fn save(&self, state: ThreadState) -> Result<()>;
    async fn reset(&self, thread_id: &str) -> Result<()>;
}

#[derive(Default)]
pub struct InMemoryCheckpointer {
    states: DashMap<String, ThreadState>,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Checkpointer for InMemoryCheckpointer {
    async fn load(&self, thread_id: &str) -> Result<Option<ThreadState>> {
        Ok(self.states.get(thread_id).map(|s| s.clone()))
    }

    async fn save(&self, state: ThreadState) -> Result<()> {
        self.states.insert(state.thread_id.clone(), state);
        Ok(())
    }

    async fn reset(&self, thread_id: &str) -> Result<()> {
        self.states.remove(thread_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_save_roundtrip() {
        let checkpointer = InMemoryCheckpointer::new();
        assert!(checkpointer.load("t1").await.unwrap().is_none());

        let mut state = ThreadState::new("t1");
        state.current_agent = Some("planner".into());
        state.messages.push(Message::user("u_1", "hello"));
        state.step_count = 3;
        checkpointer.save(state).await.unwrap();

        let loaded = checkpointer.load("t1").await.unwrap().unwrap();
        assert_eq!(loaded.current_agent.as_deref(), Some("planner"));
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.step_count, 3);
    }

    #[tokio::test]
    async fn threads_are_isolated() {
        let checkpointer = InMemoryCheckpointer::new();
        let mut a = ThreadState::new("thread_a");
        a.messages.push(Message::user("u_1", "from a"));
        checkpointer.save(a).await.unwrap();

        assert!(checkpointer.load("thread_b").await.unwrap().is_none());
        let b = ThreadState::new("thread_b");
        checkpointer.save(b).await.unwrap();

        let a = checkpointer.load("thread_a").await.unwrap().unwrap();
        assert_eq!(a.messages.len(), 1);
        let b = checkpointer.load("thread_b").await.unwrap().unwrap();
        assert!(b.messages.is_empty());
    }

    #[tokio::test]
    async fn reset_destroys_state() {
        let checkpointer = InMemoryCheckpointer::new();
        checkpointer.save(ThreadState::new("t1")).await.unwrap();
        checkpointer.reset("t1").await.unwrap();
        assert!(checkpointer.load("t1").await.unwrap().is_none());
        // resetting a missing thread is fine
        checkpointer.reset("t1").await.unwrap();
    }
}
