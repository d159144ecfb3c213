//! Removing bot mentions and quoted-reply scaffolding from message text.
//!
//! Group surfaces prepend `@botname` to address the assistant; quoted
//! replies arrive with `>`-prefixed context lines. Neither is part of the
//! command the sender typed, so both are stripped before normalization.

use regex::RegexBuilder;

/// Remove every `@botname` token (case-insensitive) from `text`.
///
/// Only whole tokens are removed: `@botname` must end at a word boundary,
/// so other mentions and longer handles stay untouched. One trailing space
/// is swallowed with the mention to avoid double gaps.
pub fn strip_mentions(text: &str, bot_username: Option<&str>) -> String {
    let Some(bot) = bot_username.map(str::trim).filter(|name| !name.is_empty()) else {
        return text.to_string();
    };
    let pattern = format!(r"@{}\b ?", regex::escape(bot.trim_start_matches('@')));
    let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
        return text.to_string();
    };
    re.replace_all(text, "").trim().to_string()
}

/// Drop leading quoted-reply lines (`> ...`) and blank separators, keeping
/// everything from the first non-quoted line on.
pub fn strip_structural_prefixes(text: &str) -> String {
    let mut rest = text;
    loop {
        let trimmed = rest.trim_start_matches(['\r', '\n']);
        let Some(line_end) = trimmed.find('\n') else {
            return if trimmed.trim_start().starts_with('>') {
                String::new()
            } else {
                trimmed.to_string()
            };
        };
        let line = &trimmed[..line_end];
        if line.trim_start().starts_with('>') || line.trim().is_empty() {
            rest = &trimmed[line_end + 1..];
        } else {
            return trimmed.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bot_mention_anywhere() {
        assert_eq!(strip_mentions("@bot /status", Some("bot")), "/status");
        assert_eq!(strip_mentions("/status @bot", Some("bot")), "/status");
        assert_eq!(strip_mentions("@Bot hello", Some("bot")), "hello");
    }

    #[test]
    fn keeps_other_mentions() {
        assert_eq!(strip_mentions("@alice hi", Some("bot")), "@alice hi");
        assert_eq!(strip_mentions("@botanist hi", Some("bot")), "@botanist hi");
    }

    #[test]
    fn no_username_is_a_no_op() {
        assert_eq!(strip_mentions("@bot hi", None), "@bot hi");
        assert_eq!(strip_mentions("@bot hi", Some("  ")), "@bot hi");
    }

    #[test]
    fn accepts_at_prefixed_username() {
        assert_eq!(strip_mentions("@bot /help", Some("@bot")), "/help");
    }

    #[test]
    fn quoted_prefix_lines_are_dropped() {
        let body = "> earlier message\n> more context\n\n/compact keep decisions";
        assert_eq!(strip_structural_prefixes(body), "/compact keep decisions");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_structural_prefixes("/compact"), "/compact");
        assert_eq!(
            strip_structural_prefixes("first\n> quoted later"),
            "first\n> quoted later"
        );
    }

    #[test]
    fn all_quoted_becomes_empty() {
        assert_eq!(strip_structural_prefixes("> only quotes"), "");
    }
}
