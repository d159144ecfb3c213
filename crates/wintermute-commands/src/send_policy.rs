//! `/send` parsing: per-session delivery override on top of the config
//! default.

use wintermute_core::types::SendPolicy;

/// What the sender asked for. `Inherit` clears the session override so the
/// config-level policy applies again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPolicyDirective {
    Allow,
    Deny,
    Inherit,
}

impl SendPolicyDirective {
    /// User-facing label; `/send` speaks on/off, not allow/deny.
    pub fn label(self) -> &'static str {
        match self {
            SendPolicyDirective::Allow => "on",
            SendPolicyDirective::Deny => "off",
            SendPolicyDirective::Inherit => "inherit",
        }
    }

    /// Session-entry value this directive stores, if any.
    pub fn as_policy(self) -> Option<SendPolicy> {
        match self {
            SendPolicyDirective::Allow => Some(SendPolicy::Allow),
            SendPolicyDirective::Deny => Some(SendPolicy::Deny),
            SendPolicyDirective::Inherit => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendPolicyCommand {
    pub has_command: bool,
    pub mode: Option<SendPolicyDirective>,
}

pub fn parse_send_policy_command(body: &str) -> SendPolicyCommand {
    let Some(rest) = crate::activation::command_rest(body, "/send") else {
        return SendPolicyCommand {
            has_command: false,
            mode: None,
        };
    };
    let mode = match rest.trim().to_lowercase().as_str() {
        "on" | "allow" => Some(SendPolicyDirective::Allow),
        "off" | "deny" => Some(SendPolicyDirective::Deny),
        "inherit" => Some(SendPolicyDirective::Inherit),
        _ => None,
    };
    SendPolicyCommand {
        has_command: true,
        mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_all_spellings() {
        assert_eq!(
            parse_send_policy_command("/send on").mode,
            Some(SendPolicyDirective::Allow)
        );
        assert_eq!(
            parse_send_policy_command("/send allow").mode,
            Some(SendPolicyDirective::Allow)
        );
        assert_eq!(
            parse_send_policy_command("/send OFF").mode,
            Some(SendPolicyDirective::Deny)
        );
        assert_eq!(
            parse_send_policy_command("/send deny").mode,
            Some(SendPolicyDirective::Deny)
        );
        assert_eq!(
            parse_send_policy_command("/send inherit").mode,
            Some(SendPolicyDirective::Inherit)
        );
    }

    #[test]
    fn bare_or_unknown_needs_usage() {
        let parsed = parse_send_policy_command("/send");
        assert!(parsed.has_command);
        assert_eq!(parsed.mode, None);

        let parsed = parse_send_policy_command("/send maybe");
        assert!(parsed.has_command);
        assert_eq!(parsed.mode, None);
    }

    #[test]
    fn labels_match_the_usage_text() {
        assert_eq!(SendPolicyDirective::Allow.label(), "on");
        assert_eq!(SendPolicyDirective::Deny.label(), "off");
        assert_eq!(SendPolicyDirective::Inherit.label(), "inherit");
    }

    #[test]
    fn unrelated_bodies_do_not_match() {
        assert!(!parse_send_policy_command("/sending now").has_command);
        assert!(!parse_send_policy_command("send on").has_command);
    }
}
