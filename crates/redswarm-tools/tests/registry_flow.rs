//! Registry-level flows over a recording terminal stub: default-session
//! reuse, per-agent bindings, and the full default registry surface.

use redswarm_core::InMemoryStore;
use redswarm_terminal::{Result, TerminalError, TerminalExec};
use redswarm_tools::{create_default_registry, ToolOutcome};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingExec {
    counter: AtomicU32,
    history: Mutex<Vec<(String, String)>>,
}

impl RecordingExec {
    fn history(&self) -> Vec<(String, String)> {
        self.history.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TerminalExec for RecordingExec {
    async fn create_session(&self) -> Result<String> {
        Ok(format!("{:08x}", self.counter.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn session_list(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }

    async fn command_exec(&self, session_id: &str, command: &str) -> Result<String> {
        if session_id == "deadbeef" {
            return Err(TerminalError::UnknownSession(session_id.to_string()));
        }
        self.history
            .lock()
            .unwrap()
            .push((session_id.to_string(), command.to_string()));
        Ok(format!("captured: {}", command))
    }

    async fn kill_session(&self, _session_id: &str) -> Result<()> {
        Ok(())
    }

    async fn kill_server(&self) -> Result<()> {
        Ok(())
    }
}

fn setup() -> (Arc<RecordingExec>, Arc<redswarm_tools::ToolRegistry>) {
    let exec = Arc::new(RecordingExec::default());
    let store = Arc::new(InMemoryStore::new());
    let namespace = ("user_t".to_string(), "memories".to_string());
    let registry = Arc::new(create_default_registry(
        exec.clone(),
        store,
        namespace,
        &["planner", "reconnaissance", "summary"],
    ));
    (exec, registry)
}

#[tokio::test]
async fn default_registry_has_the_full_surface() {
    let (_, registry) = setup();
    let names = registry.list();
    for expected in [
        "nmap",
        "curl",
        "dig",
        "whois",
        "hydra",
        "searchsploit",
        "sshpass",
        "command_exec",
        "terminal_create_session",
        "terminal_session_list",
        "terminal_kill_session",
        "terminal_kill_server",
        "manage_memory",
        "search_memory",
        "handoff_to_planner",
        "handoff_to_reconnaissance",
        "handoff_to_summary",
    ] {
        assert!(names.contains(&expected), "missing tool {}", expected);
    }
}

#[tokio::test]
async fn shell_tools_share_one_lazily_created_session() {
    let (exec, registry) = setup();

    let first = registry
        .invoke("nmap", json!({"target": "127.0.0.1"}))
        .await;
    assert!(matches!(first, ToolOutcome::Text(_)));

    let second = registry
        .invoke("whois", json!({"target": "example.com"}))
        .await;
    assert!(matches!(second, ToolOutcome::Text(_)));

    let history = exec.history();
    assert_eq!(history.len(), 2);
    // one session created, both commands ran in it
    assert_eq!(history[0].0, "00000001");
    assert_eq!(history[1].0, "00000001");
    assert_eq!(history[0].1, "nmap  127.0.0.1");
    assert_eq!(history[1].1, "whois  example.com");
}

#[tokio::test]
async fn explicit_session_overrides_the_shared_one() {
    let (exec, registry) = setup();
    registry
        .invoke(
            "nmap",
            json!({"target": "10.0.0.1", "session_id": "cafe0001"}),
        )
        .await;
    assert_eq!(exec.history()[0].0, "cafe0001");
}

#[tokio::test]
async fn dead_session_surfaces_as_error_content() {
    let (_, registry) = setup();
    let outcome = registry
        .invoke(
            "command_exec",
            json!({"session_id": "deadbeef", "command": "ls"}),
        )
        .await;
    assert!(outcome.is_error());
    assert!(outcome.to_content_string().contains("unknown session"));
}

#[tokio::test]
async fn binding_hides_other_agents_tools() {
    let (_, registry) = setup();
    let planner = registry.bind(&["handoff_to_reconnaissance", "manage_memory"]);

    let schema_names: Vec<String> = planner
        .schemas()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert!(schema_names.contains(&"handoff_to_reconnaissance".to_string()));
    assert!(!schema_names.contains(&"nmap".to_string()));

    let outcome = planner.invoke("nmap", json!({"target": "127.0.0.1"})).await;
    assert!(outcome.is_error());

    let outcome = planner.invoke("handoff_to_reconnaissance", json!({})).await;
    assert_eq!(
        outcome,
        ToolOutcome::Handoff {
            target: "reconnaissance".into()
        }
    );
}

#[tokio::test]
async fn rendered_command_exposed_for_shell_tools_only() {
    let (_, registry) = setup();
    let binding = registry.bind(&["nmap", "manage_memory"]);

    let args = json!({"target": "127.0.0.1", "options": "-sV"});
    assert_eq!(
        binding.rendered_command("nmap", &args).as_deref(),
        Some("nmap -sV 127.0.0.1")
    );
    assert_eq!(
        binding.rendered_command("manage_memory", &json!({"action": "create"})),
        None
    );
}
