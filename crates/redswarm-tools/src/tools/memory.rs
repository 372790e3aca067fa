//! Memory tools — the agents' window onto the per-user store
//!
//! Ordinary tools from the graph's perspective; their side effect is on the
//! store, never on thread state.

use crate::registry::{Tool, ToolOutcome};
use redswarm_core::{Namespace, Store};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub struct ManageMemoryTool {
    store: Arc<dyn Store>,
    namespace: Namespace,
}

impl ManageMemoryTool {
    pub fn new(store: Arc<dyn Store>, namespace: Namespace) -> Self {
        Self { store, namespace }
    }
}

#[async_trait::async_trait]
impl Tool for ManageMemoryTool {
    fn name(&self) -> &str {
        "manage_memory"
    }

    fn description(&self) -> &str {
        "Create, update, or delete a long-term memory. Memories persist \
         across conversations for this user."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "One of: create, update, delete"
                },
                "key": {
                    "type": "string",
                    "description": "Memory key; generated for create when omitted"
                },
                "content": {
                    "type": "string",
                    "description": "Memory content (required for create/update)"
                }
            },
            "required": ["action"]
        })
    }

    async fn invoke(&self, args: Value) -> ToolOutcome {
        let action = args["action"].as_str().unwrap_or_default();
        let key = args["key"].as_str();
        let content = args["content"].as_str();

        match action {
            "create" | "update" => {
                let Some(content) = content else {
                    return ToolOutcome::error(format!("{} requires content", action));
                };
                let key = key
                    .map(String::from)
                    .unwrap_or_else(|| Uuid::new_v4().simple().to_string()[..8].to_string());
                match self.store.put(&self.namespace, &key, content).await {
                    Ok(()) => ToolOutcome::text(format!("Memory {} saved", key)),
                    Err(e) => ToolOutcome::error(e.to_string()),
                }
            }
            "delete" => {
                let Some(key) = key else {
                    return ToolOutcome::error("delete requires a key");
                };
                match self.store.delete(&self.namespace, key).await {
                    Ok(true) => ToolOutcome::text(format!("Memory {} deleted", key)),
                    Ok(false) => ToolOutcome::text(format!("No memory named {}", key)),
                    Err(e) => ToolOutcome::error(e.to_string()),
                }
            }
            other => ToolOutcome::error(format!(
                "unknown action '{}'; expected create, update, or delete",
                other
            )),
        }
    }
}

pub struct SearchMemoryTool {
    store: Arc<dyn Store>,
    namespace: Namespace,
}

impl SearchMemoryTool {
    pub fn new(store: Arc<dyn Store>, namespace: Namespace) -> Self {
        Self { store, namespace }
    }
}

#[async_trait::async_trait]
impl Tool for SearchMemoryTool {
    fn name(&self) -> &str {
        "search_memory"
    }

    fn description(&self) -> &str {
        "Search this user's long-term memories and return the best matches."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query"},
                "limit": {"type": "integer", "description": "Max results (default 5)"}
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, args: Value) -> ToolOutcome {
        let query = args["query"].as_str().unwrap_or_default();
        let limit = args["limit"].as_u64().unwrap_or(5) as usize;
        match self.store.search(&self.namespace, query, limit).await {
            Ok(records) if records.is_empty() => ToolOutcome::text("No memories found"),
            Ok(records) => ToolOutcome::text(
                records
                    .iter()
                    .map(|r| format!("{}: {}", r.key, r.value))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redswarm_core::InMemoryStore;

    fn setup() -> (Arc<InMemoryStore>, Namespace) {
        (
            Arc::new(InMemoryStore::new()),
            ("user_a".to_string(), "memories".to_string()),
        )
    }

    #[tokio::test]
    async fn create_search_delete_cycle() {
        let (store, namespace) = setup();
        let manage = ManageMemoryTool::new(store.clone(), namespace.clone());
        let search = SearchMemoryTool::new(store.clone(), namespace.clone());

        let outcome = manage
            .invoke(json!({
                "action": "create",
                "key": "target-notes",
                "content": "host 10.0.0.5 exposes ssh"
            }))
            .await;
        assert_eq!(outcome, ToolOutcome::text("Memory target-notes saved"));

        let outcome = search.invoke(json!({"query": "ssh"})).await;
        assert!(outcome.to_content_string().contains("target-notes"));

        let outcome = manage
            .invoke(json!({"action": "delete", "key": "target-notes"}))
            .await;
        assert_eq!(outcome, ToolOutcome::text("Memory target-notes deleted"));

        let outcome = search.invoke(json!({"query": "ssh"})).await;
        assert_eq!(outcome, ToolOutcome::text("No memories found"));
    }

    #[tokio::test]
    async fn create_generates_key_when_missing() {
        let (store, namespace) = setup();
        let manage = ManageMemoryTool::new(store.clone(), namespace.clone());
        let outcome = manage
            .invoke(json!({"action": "create", "content": "remember this"}))
            .await;
        let text = outcome.to_content_string();
        assert!(text.starts_with("Memory ") && text.ends_with(" saved"));
        assert_eq!(store.list(&namespace).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_action_is_error_content() {
        let (store, namespace) = setup();
        let manage = ManageMemoryTool::new(store, namespace);
        let outcome = manage.invoke(json!({"action": "recall"})).await;
        assert!(outcome.is_error());
    }
}
