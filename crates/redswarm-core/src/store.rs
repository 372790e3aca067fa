//! Long-term memory store
//!
//! Orthogonal to thread state: records live under a `(user_id, "memories")`
//! namespace and survive across conversations. Only the memory tools touch
//! this surface; thread state never sees it.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Store namespace: `(user_id, kind)`.
pub type Namespace = (String, String);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn put(&self, namespace: &Namespace, key: &str, value: &str) -> Result<()>;

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<MemoryRecord>>;

    /// Returns whether a record was actually removed.
    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<bool>;

    /// Ranked substring search within one namespace.
    async fn search(
        &self,
        namespace: &Namespace,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>>;

    async fn list(&self, namespace: &Namespace) -> Result<Vec<MemoryRecord>>;
}

/// In-memory reference implementation over a concurrent map. Writes within
/// a namespace are atomic per key; there are no cross-key transactions.
#[derive(Default)]
pub struct InMemoryStore {
    records: DashMap<(Namespace, String), MemoryRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Occurrences of each whitespace-separated query term in the record,
/// case-insensitive. Zero means no match.
fn match_score(record: &MemoryRecord, query: &str) -> usize {
    let haystack = format!("{} {}", record.key, record.value).to_lowercase();
    query
        .split_whitespace()
        .map(|term| haystack.matches(&term.to_lowercase()).count())
        .sum()
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn put(&self, namespace: &Namespace, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::storage("memory key must not be empty"));
        }
        self.records.insert(
            (namespace.clone(), key.to_string()),
            MemoryRecord {
                key: key.to_string(),
                value: value.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<MemoryRecord>> {
        Ok(self
            .records
            .get(&(namespace.clone(), key.to_string()))
            .map(|r| r.clone()))
    }

    async fn delete(&self, namespace: &Namespace, key: &str) -> Result<bool> {
        Ok(self
            .records
            .remove(&(namespace.clone(), key.to_string()))
            .is_some())
    }

    async fn search(
        &self,
        namespace: &Namespace,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>> {
        let mut scored: Vec<(usize, MemoryRecord)> = self
            .records
            .iter()
            .filter(|entry| &entry.key().0 == namespace)
            .map(|entry| (match_score(entry.value(), query), entry.value().clone()))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.key.cmp(&b.1.key)));
        Ok(scored.into_iter().take(limit).map(|(_, r)| r).collect())
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<MemoryRecord>> {
        let mut records: Vec<MemoryRecord> = self
            .records
            .iter()
            .filter(|entry| &entry.key().0 == namespace)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(user: &str) -> Namespace {
        (user.to_string(), "memories".to_string())
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = InMemoryStore::new();
        let namespace = ns("user_a");

        store
            .put(&namespace, "target", "10.0.0.5 runs ssh on 2222")
            .await
            .unwrap();
        let record = store.get(&namespace, "target").await.unwrap().unwrap();
        assert_eq!(record.value, "10.0.0.5 runs ssh on 2222");

        assert!(store.delete(&namespace, "target").await.unwrap());
        assert!(!store.delete(&namespace, "target").await.unwrap());
        assert!(store.get(&namespace, "target").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_key_rejected() {
        let store = InMemoryStore::new();
        assert!(store.put(&ns("user_a"), "", "value").await.is_err());
    }

    #[tokio::test]
    async fn search_ranks_by_term_occurrences() {
        let store = InMemoryStore::new();
        let namespace = ns("user_a");
        store
            .put(&namespace, "note1", "ssh open on host, ssh weak password")
            .await
            .unwrap();
        store.put(&namespace, "note2", "ssh mentioned once").await.unwrap();
        store.put(&namespace, "note3", "nothing relevant").await.unwrap();

        let hits = store.search(&namespace, "SSH", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, "note1");
        assert_eq!(hits[1].key, "note2");

        let limited = store.search(&namespace, "ssh", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn namespaces_are_isolated() {
        let store = InMemoryStore::new();
        store.put(&ns("user_a"), "k", "alpha secret").await.unwrap();
        store.put(&ns("user_b"), "k", "bravo secret").await.unwrap();

        let a = store.search(&ns("user_a"), "secret", 10).await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].value, "alpha secret");

        assert_eq!(store.list(&ns("user_b")).await.unwrap().len(), 1);
    }
}
