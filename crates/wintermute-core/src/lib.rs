//! Core configuration and shared types for Wintermute.
//!
//! Everything the command layer needs to read, validate and mutate the
//! runtime configuration lives here: the typed config model, dotted-path
//! addressing into the raw file, whole-object validation, the on-disk
//! store and the in-memory `/debug` override layer.

pub mod config;
pub mod error;
pub mod overrides;
pub mod paths;
pub mod store;
pub mod types;
pub mod validate;

pub use config::{
    default_config_path, WintermuteConfig, RUN_END_WAIT_MS, USAGE_FETCH_TIMEOUT_MS,
};
pub use error::{Result, WintermuteError};
pub use overrides::RuntimeOverrides;
pub use store::{ConfigSnapshot, ConfigStore};
pub use types::{ChatType, GroupActivation, QueueDrop, QueueMode, SendPolicy};
pub use validate::{validate_config_object, ConfigIssue, ConfigValidation};
