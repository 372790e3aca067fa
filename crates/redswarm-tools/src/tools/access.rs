//! Initial-access tools

use crate::registry::{Tool, ToolOutcome};
use crate::tools::shell::{render_options, SimpleShellTool};
use crate::tools::terminal::ShellContext;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn hydra(ctx: Arc<ShellContext>) -> SimpleShellTool {
    SimpleShellTool::new(
        "hydra",
        "Brute-force password attacks against network services using a \
         wordlist and attack parameters.",
        "hydra",
        "target",
        "Target specification (e.g. ssh://10.0.0.5 or \
         http-post-form://host/login.php)",
        "Hydra arguments (e.g. \"-l admin -P /usr/share/wordlists/rockyou.txt\")",
        ctx,
    )
}

pub fn searchsploit(ctx: Arc<ShellContext>) -> SimpleShellTool {
    SimpleShellTool::new(
        "searchsploit",
        "Search the Exploit Database for exploits, shellcode, and papers by \
         CVE, product, or service name.",
        "searchsploit",
        "service_name",
        "The product, service, or CVE to search for",
        "searchsploit arguments (e.g. \"-t\" for title search)",
        ctx,
    )
}

/// Non-interactive SSH password authentication via sshpass.
///
/// Host-key checking is disabled unless the caller configured it, so
/// automated connections do not hang on the fingerprint prompt.
pub struct SshpassTool {
    ctx: Arc<ShellContext>,
}

impl SshpassTool {
    pub fn new(ctx: Arc<ShellContext>) -> Self {
        Self { ctx }
    }

    pub fn render_command(&self, args: &Value) -> String {
        let target = args["target"].as_str().unwrap_or_default();
        let user = args["user"].as_str().unwrap_or_default();
        let password = args["password"].as_str().unwrap_or_default();
        let mut options = render_options(&args["options"]);

        if !options.contains("StrictHostKeyChecking") {
            let hardening = "-o \"StrictHostKeyChecking=no\" -o \"HostKeyAlgorithms=ssh-rsa\"";
            if options.is_empty() {
                options = hardening.to_string();
            } else {
                options = format!("{} {}", options, hardening);
            }
        }

        format!(
            "sshpass -p \"{}\" ssh {} {}@{}",
            password, options, user, target
        )
    }
}

#[async_trait::async_trait]
impl Tool for SshpassTool {
    fn name(&self) -> &str {
        "sshpass"
    }

    fn description(&self) -> &str {
        "Open an SSH connection with password authentication, \
         non-interactively."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "target": {
                    "type": "string",
                    "description": "Target IP or hostname to connect to"
                },
                "user": {
                    "type": "string",
                    "description": "Username to authenticate as"
                },
                "password": {
                    "type": "string",
                    "description": "Password to use for authentication"
                },
                "options": {
                    "type": ["string", "array"],
                    "description": "Extra SSH options (e.g. \"-p 2222\")"
                },
                "session_id": {
                    "type": "string",
                    "description": "Terminal session to run in; omit to reuse the shared session"
                }
            },
            "required": ["target", "user", "password"]
        })
    }

    async fn invoke(&self, args: Value) -> ToolOutcome {
        let command = self.render_command(&args);
        self.ctx.run(args["session_id"].as_str(), &command).await
    }

    fn rendered_command(&self, args: &Value) -> Option<String> {
        Some(self.render_command(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redswarm_terminal::{Result, TerminalExec};

    struct NullExec;

    #[async_trait::async_trait]
    impl TerminalExec for NullExec {
        async fn create_session(&self) -> Result<String> {
            Ok("00000000".into())
        }
        async fn session_list(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        async fn command_exec(&self, _s: &str, _c: &str) -> Result<String> {
            Ok(String::new())
        }
        async fn kill_session(&self, _s: &str) -> Result<()> {
            Ok(())
        }
        async fn kill_server(&self) -> Result<()> {
            Ok(())
        }
    }

    fn ctx() -> Arc<ShellContext> {
        ShellContext::new(Arc::new(NullExec))
    }

    #[test]
    fn sshpass_injects_host_key_options() {
        let tool = SshpassTool::new(ctx());
        let command = tool.render_command(&json!({
            "target": "192.168.1.10",
            "user": "root",
            "password": "toor"
        }));
        assert_eq!(
            command,
            "sshpass -p \"toor\" ssh -o \"StrictHostKeyChecking=no\" \
             -o \"HostKeyAlgorithms=ssh-rsa\" root@192.168.1.10"
        );
    }

    #[test]
    fn sshpass_respects_caller_host_key_config() {
        let tool = SshpassTool::new(ctx());
        let command = tool.render_command(&json!({
            "target": "example.com",
            "user": "admin",
            "password": "pw",
            "options": "-p 2222 -o StrictHostKeyChecking=yes"
        }));
        assert!(command.contains("-p 2222 -o StrictHostKeyChecking=yes"));
        assert!(!command.contains("HostKeyAlgorithms"));
    }

    #[test]
    fn hydra_renders_options_then_target() {
        let tool = hydra(ctx());
        let command = tool.render_command(&json!({
            "target": "ssh://10.0.0.5",
            "options": ["-l", "admin", "-P", "rockyou.txt"]
        }));
        assert_eq!(command, "hydra -l admin -P rockyou.txt ssh://10.0.0.5");
    }
}
