//! Free-text cancellation phrases.
//!
//! Anyone in the chat can interrupt a runaway response by typing one of
//! these, so the matcher is strict: the whole message must be the phrase,
//! optionally punctuated, never embedded in longer text.

const ABORT_PHRASES: &[&str] = &["stop", "esc", "escape", "abort", "cancel", "halt", "wait"];

/// Whether `body` is an interrupt phrase on its own.
pub fn is_abort_trigger(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return false;
    }
    let bare = trimmed.trim_end_matches(['!', '.']).trim_end();
    ABORT_PHRASES
        .iter()
        .any(|phrase| bare.eq_ignore_ascii_case(phrase))
}
