//! File-backed session state for Wintermute conversations.
//!
//! One JSON object maps session keys to entries. Keys come in a structured
//! `agent:{agent_id}:{rest}` form with a legacy fallback on the bare `rest`,
//! so stores written before the agent prefix existed keep resolving.

pub mod error;
pub mod key;
pub mod policy;
pub mod store;
pub mod types;

pub use error::SessionError;
pub use key::SessionKey;
pub use policy::resolve_send_policy;
pub use store::SessionStore;
pub use types::{now_ms, SessionEntry};
