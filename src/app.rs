//! CLI session wiring: model selection, swarm construction, the
//! interactive loop, log listing, and replay.

use anyhow::{bail, Context};
use chrono::Utc;
use futures::StreamExt;
use redswarm_agent::processor::parse_tool_name;
use redswarm_agent::{
    build_default_swarm, Checkpointer, ExecutorConfig, InMemoryCheckpointer, SwarmGraph,
    WorkflowExecutor,
};
use redswarm_core::{
    derive_user_id, EnvConfig, InMemoryStore, McpConfig, MessageKind, ModelConfig, ThreadConfig,
    WorkflowEvent,
};
use redswarm_llm::{build_provider, list_available_models, LlmProvider};
use redswarm_log::{list_sessions, load_session, replay, SessionLogger};
use redswarm_terminal::{serve, TerminalClient, TerminalExec, TmuxPool};
use redswarm_tools::create_default_registry;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const LOGS_DIR: &str = "logs";
const MCP_CONFIG_PATH: &str = "mcp_config.json";
const AGENTS: &[&str] = &["planner", "reconnaissance", "initial_access", "summary"];

pub fn run_models() -> anyhow::Result<()> {
    println!("Available models:");
    for model in list_available_models() {
        let marker = if model.api_key_available { "+" } else { "-" };
        println!(
            "  [{}] {:28} {:10} {}",
            marker, model.config.display_name, model.config.provider, model.config.model_name
        );
    }
    println!("\n[+] usable now   [-] missing API key");
    Ok(())
}

pub fn run_logs(limit: usize) -> anyhow::Result<()> {
    let sessions = list_sessions(LOGS_DIR, limit);
    if sessions.is_empty() {
        println!("No stored sessions under {}/", LOGS_DIR);
        return Ok(());
    }
    for session in sessions {
        println!(
            "{}  {}  {:3} events  {}  {}",
            session.session_id,
            session.start_time.format("%Y-%m-%d %H:%M:%S"),
            session.event_count,
            session.model_label.as_deref().unwrap_or("unknown model"),
            session.preview
        );
    }
    Ok(())
}

pub fn run_replay(session_id: &str) -> anyhow::Result<()> {
    let log = load_session(LOGS_DIR, session_id)
        .with_context(|| format!("could not load session {}", session_id))?;
    println!(
        "Replaying session {} ({}, started {})\n",
        log.session_id,
        log.model.as_deref().unwrap_or("unknown model"),
        log.start_time.format("%Y-%m-%d %H:%M:%S")
    );
    for event in replay(&log) {
        render_event(&event, true);
    }
    Ok(())
}

pub fn run_config() -> anyhow::Result<()> {
    let env = EnvConfig::from_env();
    println!("Environment:");
    println!("  debug_mode:       {}", env.debug_mode);
    println!("  docker_container: {}", env.docker_container);
    println!("  chat_height:      {}", env.chat_height);
    println!(
        "  terminal_url:     {}",
        env.terminal_url.as_deref().unwrap_or("(in-process tmux pool)")
    );

    let mcp = McpConfig::load_or_default(MCP_CONFIG_PATH);
    let agents: Vec<&str> = mcp.agents().collect();
    if agents.is_empty() {
        println!("\nNo {} found; using built-in agent set", MCP_CONFIG_PATH);
    } else {
        println!("\nAgents bound in {}:", MCP_CONFIG_PATH);
        for agent in agents {
            let servers = mcp
                .servers_for(agent)
                .map(|s| s.keys().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            println!("  {:16} [{}]", agent, servers);
        }
    }

    let available = list_available_models()
        .into_iter()
        .filter(|m| m.api_key_available)
        .count();
    println!("\nModels with credentials: {}", available);
    Ok(())
}

pub async fn run_serve_terminal(port: u16) -> anyhow::Result<()> {
    let env = EnvConfig::from_env();
    let pool: Arc<dyn TerminalExec> = Arc::new(TmuxPool::new(&env.docker_container));
    let addr = format!("127.0.0.1:{}", port)
        .parse()
        .context("invalid bind address")?;
    println!(
        "Terminal server on http://{}/rpc (container: {})",
        addr, env.docker_container
    );
    serve(pool, addr).await?;
    Ok(())
}

pub async fn run_chat(
    provider_flag: Option<String>,
    model_flag: Option<String>,
    terminal_url: Option<String>,
) -> anyhow::Result<()> {
    let env = EnvConfig::from_env();
    let mcp = McpConfig::load_or_default(MCP_CONFIG_PATH);
    let model = select_model(provider_flag.as_deref(), model_flag.as_deref())?;
    let provider = build_provider(&model)?;

    // Identity: same process + user + day → same thread and memories.
    let fingerprint = format!(
        "{}_{}",
        std::process::id(),
        std::env::var("USER").unwrap_or_else(|_| "unknown".into())
    );
    let user_id = derive_user_id(&fingerprint, Utc::now().date_naive());
    let mut thread = ThreadConfig::new(&user_id, Some("cli"));

    let terminal = make_terminal(&env, terminal_url.or_else(|| mcp_terminal_url(&mcp)));
    let store = Arc::new(InMemoryStore::new());
    let registry = Arc::new(create_default_registry(
        terminal,
        store,
        thread.memory_namespace(),
        AGENTS,
    ));
    let graph = Arc::new(build_default_swarm(&registry)?);
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(InMemoryCheckpointer::new());
    let logger = Arc::new(SessionLogger::new(LOGS_DIR));
    logger.start_session(&model.display_name);

    let mut current_model = model;
    let mut executor = make_executor(
        &graph,
        provider,
        &checkpointer,
        &logger,
        &current_model,
    );

    println!(
        "redswarm ready — model: {} ({}), user: {}",
        current_model.display_name, current_model.provider, user_id
    );
    println!("Type a request, or 'help' for commands.\n");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("redswarm> ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "quit" | "exit" | "q" => break,
            "help" => print_help(),
            "llm" => println!(
                "Model: {} ({}, {}), temperature {}",
                current_model.display_name,
                current_model.provider,
                current_model.model_name,
                current_model.temperature
            ),
            "tools" => print_tools(&graph),
            "clear" => print!("\x1b[2J\x1b[H"),
            "new" => {
                thread = thread.with_new_conversation();
                logger.start_session(&current_model.display_name);
                println!("Started a new conversation ({})", thread.conversation_id);
            }
            command if command.starts_with("model-change") => {
                let parts: Vec<&str> = command.split_whitespace().collect();
                if parts.len() != 3 {
                    println!("Usage: model-change <provider> <model_name>");
                    continue;
                }
                match select_model(Some(parts[1]), Some(parts[2])) {
                    Ok(new_model) => match build_provider(&new_model) {
                        Ok(new_provider) => {
                            current_model = new_model;
                            executor = make_executor(
                                &graph,
                                new_provider,
                                &checkpointer,
                                &logger,
                                &current_model,
                            );
                            logger.start_session(&current_model.display_name);
                            println!("Switched to {}", current_model.display_name);
                        }
                        Err(e) => println!("Model change failed: {}", e),
                    },
                    Err(e) => println!("Model change failed: {}", e),
                }
            }
            request => {
                run_workflow(&executor, request, &thread).await;
            }
        }
    }

    logger.end_session();
    println!("Goodbye.");
    Ok(())
}

async fn run_workflow(executor: &WorkflowExecutor, input: &str, thread: &ThreadConfig) {
    let stream = executor.execute(input.to_string(), thread.clone());
    futures::pin_mut!(stream);
    while let Some(event) = stream.next().await {
        render_event(&event, false);
    }
}

fn render_event(event: &WorkflowEvent, show_user: bool) {
    match event {
        WorkflowEvent::Message {
            message_type: MessageKind::User,
            content,
            ..
        } => {
            if show_user {
                println!("you> {}\n", content);
            }
        }
        WorkflowEvent::Message {
            message_type: MessageKind::Ai,
            agent_name,
            content,
            tool_calls,
            ..
        } => {
            if !content.is_empty() {
                println!("[{}] {}", agent_name, content);
            }
            for call in tool_calls {
                println!("[{}] -> {}", agent_name, parse_tool_name(&call.name));
            }
        }
        WorkflowEvent::Message {
            message_type: MessageKind::Tool,
            tool_name,
            content,
            ..
        } => {
            let label = tool_name
                .as_deref()
                .map(parse_tool_name)
                .unwrap_or_else(|| "Tool".to_string());
            println!("({}) {}", label, content);
        }
        WorkflowEvent::WorkflowComplete { step_count } => {
            println!("-- complete ({} steps)\n", step_count);
        }
        WorkflowEvent::Error { error } => {
            eprintln!("!! {}", error);
        }
    }
}

fn print_help() {
    println!(
        "Commands:\n\
         \x20 help                          this guide\n\
         \x20 llm                           show the current model\n\
         \x20 model-change <provider> <m>   switch models mid-session\n\
         \x20 tools                         list agents and their tools\n\
         \x20 new                           start a fresh conversation\n\
         \x20 clear                         clear the screen\n\
         \x20 quit                          exit\n\
         Anything else is sent to the swarm, e.g. 'Scan 192.168.1.1 with nmap'."
    );
}

fn print_tools(graph: &SwarmGraph) {
    for name in graph.agent_names() {
        if let Some(agent) = graph.agent(name) {
            println!("{}:", name);
            for tool in agent.tools.names() {
                println!("  - {}", tool);
            }
        }
    }
}

fn make_executor(
    graph: &Arc<SwarmGraph>,
    provider: Arc<dyn LlmProvider>,
    checkpointer: &Arc<dyn Checkpointer>,
    logger: &Arc<SessionLogger>,
    model: &ModelConfig,
) -> WorkflowExecutor {
    WorkflowExecutor::new(
        graph.clone(),
        provider,
        checkpointer.clone(),
        logger.clone(),
        ExecutorConfig {
            model: model.model_name.clone(),
            temperature: model.temperature,
            ..ExecutorConfig::default()
        },
    )
}

fn make_terminal(env: &EnvConfig, terminal_url: Option<String>) -> Arc<dyn TerminalExec> {
    let url = terminal_url.or_else(|| env.terminal_url.clone());
    match url {
        Some(url) => Arc::new(TerminalClient::new(url)),
        None => Arc::new(TmuxPool::new(&env.docker_container)),
    }
}

fn mcp_terminal_url(mcp: &McpConfig) -> Option<String> {
    mcp.0
        .values()
        .flat_map(|servers| servers.values())
        .find_map(|server| server.url.clone())
}

fn select_model(provider: Option<&str>, model_name: Option<&str>) -> anyhow::Result<ModelConfig> {
    let models = list_available_models();

    if let Some(name) = model_name {
        let found = models.iter().find(|m| {
            m.config.model_name == name
                && provider.map(|p| m.config.provider == p).unwrap_or(true)
        });
        let Some(found) = found else {
            bail!("unknown model: {}", name);
        };
        if !found.api_key_available {
            bail!(
                "model {} needs an API key for provider {}",
                name,
                found.config.provider
            );
        }
        return Ok(found.config.clone());
    }

    let candidate = models
        .iter()
        .filter(|m| m.api_key_available)
        .find(|m| provider.map(|p| m.config.provider == p).unwrap_or(true));
    match candidate {
        Some(model) => Ok(model.config.clone()),
        None => bail!(
            "no usable model{}; set an API key (ANTHROPIC_API_KEY, OPENAI_API_KEY, ...) \
             or run a local Ollama",
            provider.map(|p| format!(" for provider {}", p)).unwrap_or_default()
        ),
    }
}
