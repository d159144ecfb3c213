//! Text-command resolution and dispatch for Wintermute.
//!
//! A connector hands every inbound message body to this crate. The
//! normalization pipeline folds surface quirks (colon syntax, `@bot`
//! mention suffixes, case, aliases) into one canonical `/command` form,
//! the registry maps aliases to command definitions, and the dispatch
//! chain runs the handlers in a fixed order where the first match wins.

pub mod abort;
pub mod activation;
pub mod auth;
pub mod bash;
pub mod config_cmd;
pub mod debug_cmd;
pub mod dispatch;
pub mod mentions;
pub mod normalize;
pub mod queue;
pub mod registry;
pub mod send_policy;
pub mod status;

pub use auth::{resolve_command_authorization, CommandAuthorization};
pub use dispatch::{
    build_command_context, dispatch_command, CommandContext, CommandHost, DispatchOutcome,
    DispatchRequest, InlineDirectives, MsgContext, ReplyPayload, RestartBackend, RestartOutcome,
    UsageProbe,
};
pub use normalize::{
    is_command_message, normalize_command_body, resolve_text_alias, resolve_text_command,
    text_commands_allowed, NormalizeOptions, ResolvedCommand,
};
pub use registry::{
    CommandDefinition, CommandRegistry, CommandScope, CommandSource, RegistryError,
};
