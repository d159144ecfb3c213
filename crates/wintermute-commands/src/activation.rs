//! `/activation` parsing: how a group session decides when to respond.

use wintermute_core::types::GroupActivation;

/// Parse result for `/activation`. `has_command` without a mode means the
/// sender typed the command with a missing or unrecognized mode and should
/// get a usage reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationCommand {
    pub has_command: bool,
    pub mode: Option<GroupActivation>,
}

pub fn parse_activation_command(body: &str) -> ActivationCommand {
    let Some(rest) = command_rest(body, "/activation") else {
        return ActivationCommand {
            has_command: false,
            mode: None,
        };
    };
    let mode = match rest.trim().to_lowercase().as_str() {
        "mention" => Some(GroupActivation::Mention),
        "always" => Some(GroupActivation::Always),
        _ => None,
    };
    ActivationCommand {
        has_command: true,
        mode,
    }
}

/// Split `body` into the text after `command`, if `body` invokes it.
pub(crate) fn command_rest<'a>(body: &'a str, command: &str) -> Option<&'a str> {
    if body == command {
        return Some("");
    }
    body.strip_prefix(command)
        .filter(|rest| rest.starts_with(' '))
}
