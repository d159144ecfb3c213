//! `/bash` and `!` shell escapes.
//!
//! One-shot `sh -c` execution with a hard timeout. Output is capped with
//! middle-omission truncation: chat surfaces reject huge messages, and the
//! head (invocation context) plus tail (final result or error) carry the
//! useful signal.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use wintermute_core::config::WintermuteConfig;

pub const BASH_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum characters of command output forwarded to chat.
pub const BASH_MAX_OUTPUT_CHARS: usize = 3_500;

/// Extract the shell command from a normalized body, if it is a bash
/// invocation at all. `/bash` alone yields an empty command (usage reply).
pub fn extract_bash_invocation(body: &str) -> Option<&str> {
    if body == "/bash" {
        return Some("");
    }
    if let Some(rest) = body.strip_prefix("/bash ") {
        return Some(rest);
    }
    body.strip_prefix('!')
}

/// Run a `/bash` invocation and produce the reply text.
pub async fn handle_bash_command(config: &WintermuteConfig, invocation: &str) -> String {
    if !config.commands.bash {
        return "⚠️ /bash is disabled. Set commands.bash=true to enable.".to_string();
    }
    let command = invocation.trim();
    if command.is_empty() {
        return "⚙️ Usage: /bash <command>".to_string();
    }
    debug!(command, "bash: exec");

    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // dropping the wait future on timeout must also kill the child
        .kill_on_drop(true)
        .spawn();
    let child = match child {
        Ok(child) => child,
        Err(error) => return format!("⚠️ Failed to run command: {error}"),
    };

    match tokio::time::timeout(BASH_TIMEOUT, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let exit_code = output.status.code().unwrap_or(-1);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);

            let mut combined = String::new();
            if !stdout.trim_end().is_empty() {
                combined.push_str(stdout.trim_end());
            }
            if !stderr.trim_end().is_empty() {
                if !combined.is_empty() {
                    combined.push('\n');
                }
                combined.push_str("[stderr]\n");
                combined.push_str(stderr.trim_end());
            }
            if exit_code != 0 {
                combined.push_str(&format!("\n[exit code: {exit_code}]"));
            }
            if combined.is_empty() {
                combined = "(no output)".to_string();
            }
            let truncated = truncate_middle(&combined, BASH_MAX_OUTPUT_CHARS);
            format!("```\n{truncated}\n```")
        }
        Ok(Err(error)) => format!("⚠️ Failed to run command: {error}"),
        Err(_) => format!("⚠️ Command timed out after {}s.", BASH_TIMEOUT.as_secs()),
    }
}

/// Truncate `output` to at most `max_chars` characters, keeping the first
/// and last halves and noting how much was omitted. Splits on character
/// boundaries so multi-byte sequences are never broken.
pub fn truncate_middle(output: &str, max_chars: usize) -> String {
    if output.len() <= max_chars {
        return output.to_owned();
    }
    let chars: Vec<char> = output.chars().collect();
    let total = chars.len();
    if total <= max_chars {
        return output.to_owned();
    }
    let half = max_chars / 2;
    let head: String = chars[..half].iter().collect();
    let tail: String = chars[total - half..].iter().collect();
    let omitted = total - max_chars;
    format!("{head}\n\n... [output truncated: {omitted} chars omitted] ...\n\n{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> WintermuteConfig {
        let mut config = WintermuteConfig::default();
        config.commands.bash = true;
        config
    }

    #[test]
    fn extracts_slash_and_bang_forms() {
        assert_eq!(extract_bash_invocation("/bash"), Some(""));
        assert_eq!(extract_bash_invocation("/bash ls -la"), Some("ls -la"));
        assert_eq!(extract_bash_invocation("!uptime"), Some("uptime"));
        assert_eq!(extract_bash_invocation("/bashful"), None);
        assert_eq!(extract_bash_invocation("hello"), None);
    }

    #[tokio::test]
    async fn disabled_flag_reply() {
        let config = WintermuteConfig::default();
        let reply = handle_bash_command(&config, "echo hi").await;
        assert_eq!(reply, "⚠️ /bash is disabled. Set commands.bash=true to enable.");
    }

    #[tokio::test]
    async fn empty_command_shows_usage() {
        let reply = handle_bash_command(&enabled(), "   ").await;
        assert_eq!(reply, "⚙️ Usage: /bash <command>");
    }

    #[tokio::test]
    async fn captures_stdout() {
        let reply = handle_bash_command(&enabled(), "echo hi").await;
        assert!(reply.contains("hi"), "{reply}");
        assert!(reply.starts_with("```"));
    }

    #[tokio::test]
    async fn reports_exit_code_and_stderr() {
        let reply = handle_bash_command(&enabled(), "echo oops >&2; exit 3").await;
        assert!(reply.contains("[stderr]"), "{reply}");
        assert!(reply.contains("oops"), "{reply}");
        assert!(reply.contains("[exit code: 3]"), "{reply}");
    }

    #[tokio::test]
    async fn silent_success_reports_no_output() {
        let reply = handle_bash_command(&enabled(), "true").await;
        assert!(reply.contains("(no output)"), "{reply}");
    }

    #[test]
    fn truncation_preserves_head_and_tail() {
        let input = format!("{}{}{}", "A".repeat(2_000), "B".repeat(4_000), "C".repeat(2_000));
        let result = truncate_middle(&input, BASH_MAX_OUTPUT_CHARS);
        assert!(result.starts_with('A'));
        assert!(result.ends_with('C'));
        assert!(result.contains("output truncated"));
    }

    #[test]
    fn short_output_untouched() {
        assert_eq!(truncate_middle("hello", BASH_MAX_OUTPUT_CHARS), "hello");
    }
}
