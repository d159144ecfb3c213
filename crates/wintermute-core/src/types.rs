use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a message arrived in a direct chat or a group chat.
///
/// Several dispatch gates depend on this: `/activation` only applies to
/// groups, and send-policy defaults can differ per chat type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    #[default]
    Direct,
    Group,
}

impl ChatType {
    pub fn is_group(self) -> bool {
        matches!(self, ChatType::Group)
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatType::Direct => f.write_str("direct"),
            ChatType::Group => f.write_str("group"),
        }
    }
}

/// Resolved send policy for a session: may replies be delivered at all.
///
/// `Deny` drops the message silently at the end of the dispatch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendPolicy {
    Allow,
    Deny,
}

impl fmt::Display for SendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendPolicy::Allow => f.write_str("allow"),
            SendPolicy::Deny => f.write_str("deny"),
        }
    }
}

/// Group activation mode: reply to every message or only when mentioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupActivation {
    Mention,
    Always,
}

impl fmt::Display for GroupActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupActivation::Mention => f.write_str("mention"),
            GroupActivation::Always => f.write_str("always"),
        }
    }
}

/// Followup-queue behavior while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueMode {
    /// Batch queued messages and deliver them together after the run.
    Collect,
    /// Keep only the most recent queued message.
    Latest,
    /// Drop followups entirely.
    Off,
}

impl fmt::Display for QueueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueMode::Collect => f.write_str("collect"),
            QueueMode::Latest => f.write_str("latest"),
            QueueMode::Off => f.write_str("off"),
        }
    }
}

/// Which end of a full followup queue gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueDrop {
    Oldest,
    Newest,
}

impl fmt::Display for QueueDrop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueDrop::Oldest => f.write_str("oldest"),
            QueueDrop::Newest => f.write_str("newest"),
        }
    }
}
