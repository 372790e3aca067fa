//! Reconnaissance tools

use crate::tools::shell::SimpleShellTool;
use crate::tools::terminal::ShellContext;
use std::sync::Arc;

pub fn nmap(ctx: Arc<ShellContext>) -> SimpleShellTool {
    SimpleShellTool::new(
        "nmap",
        "Network scanner. Scans a target host or network for open ports, \
         running services, and OS fingerprints.",
        "nmap",
        "target",
        "The target host or IP address to scan",
        "Additional nmap arguments, as a string or list of strings \
         (e.g. \"-sV -p 1-1000\")",
        ctx,
    )
}

pub fn curl(ctx: Arc<ShellContext>) -> SimpleShellTool {
    SimpleShellTool::new(
        "curl",
        "Make an HTTP request to a target URL and return the response.",
        "curl",
        "target",
        "The target URL to request",
        "Additional curl arguments (e.g. \"-I\", \"-L\")",
        ctx,
    )
}

pub fn dig(ctx: Arc<ShellContext>) -> SimpleShellTool {
    SimpleShellTool::new(
        "dig",
        "DNS lookup. Queries DNS records (A, MX, NS, TXT, ...) for a domain.",
        "dig",
        "target",
        "The domain name to query (e.g. example.com)",
        "Query arguments (e.g. \"MX\", \"A\", \"ANY\")",
        ctx,
    )
}

pub fn whois(ctx: Arc<ShellContext>) -> SimpleShellTool {
    SimpleShellTool::new(
        "whois",
        "WHOIS lookup. Retrieves registration information for a domain or IP: \
         registrar, contacts, creation and expiration dates, name servers.",
        "whois",
        "target",
        "The domain name or IP address to query",
        "WHOIS arguments (e.g. \"-h\", \"-I\")",
        ctx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use redswarm_terminal::{Result, TerminalExec};
    use serde_json::json;

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

    #[test]
    fn nmap_renders_options_then_target() {
        let tool = nmap(ShellContext::new(Arc::new(NullExec)));
        let command = tool.render_command(&json!({
            "target": "192.168.1.1",
            "options": "-sV -p 1-1000"
        }));
        assert_eq!(command, "nmap -sV -p 1-1000 192.168.1.1");
    }

    #[test]
    fn nmap_without_options_keeps_source_spacing() {
        let tool = nmap(ShellContext::new(Arc::new(NullExec)));
        let command = tool.render_command(&json!({"target": "127.0.0.1"}));
        assert_eq!(command, "nmap  127.0.0.1");
    }

    #[test]
    fn dig_accepts_list_options() {
        let tool = dig(ShellContext::new(Arc::new(NullExec)));
        let command = tool.render_command(&json!({
            "target": "example.com",
            "options": ["MX", "+short"]
        }));
        assert_eq!(command, "dig MX +short example.com");
    }
}
