//! Outbound message sanitizing.
//!
//! Generated text can reproduce anything the model was fed, including raw
//! Discord user mentions (`<@123456789>`). Posting those back would ping the
//! mentioned user, so every outbound message goes through
//! [`mask_discord_pings`] first.
//!
//! A mention marker is exactly `<@`, one or more ASCII digits, then `>`.
//! Other forms (`<@!id>`, `<@&id>`, `@everyone`) are left alone.

/// Opening sequence of a user mention marker.
const MENTION_OPEN: &str = "<@";

/// Closing character of a user mention marker.
const MENTION_CLOSE: char = '>';

/// Replacement text for every redacted mention.
pub const DISCORD_PING_REDACTION: &str = "@[DISCORD PING REDACTED]";

/// Replace every Discord user mention in `message` with
/// [`DISCORD_PING_REDACTION`].
///
/// Text outside of mention markers is copied through unchanged. The scan is
/// a single left-to-right pass, so the cost is linear in the message length.
pub fn mask_discord_pings(message: &str) -> String {
    let mut masked = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(start) = rest.find(MENTION_OPEN) {
        let (before, candidate) = rest.split_at(start);
        masked.push_str(before);

        if let Some(after) = strip_mention(candidate) {
            masked.push_str(DISCORD_PING_REDACTION);
            rest = after;
        } else {
            // Not a mention: keep the '<' and resume scanning right after it.
            let (open, after) = candidate.split_at(1);
            masked.push_str(open);
            rest = after;
        }
    }

    masked.push_str(rest);
    masked
}

/// Whether `message` contains at least one Discord user mention marker.
pub fn contains_discord_ping(message: &str) -> bool {
    message
        .match_indices(MENTION_OPEN)
        .any(|(start, _)| message.get(start..).and_then(strip_mention).is_some())
}

/// If `candidate` starts with a complete mention marker, return the text
/// that follows it.
fn strip_mention(candidate: &str) -> Option<&str> {
    let digits = candidate.strip_prefix(MENTION_OPEN)?;
    let digit_count = digits.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }
    let (_, tail) = digits.split_at(digit_count);
    tail.strip_prefix(MENTION_CLOSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_mention_is_redacted() {
        assert_eq!(
            mask_discord_pings("hello <@123456789>!"),
            "hello @[DISCORD PING REDACTED]!"
        );
    }

    #[test]
    fn every_mention_is_redacted_independently() {
        let masked = mask_discord_pings("<@1><@22> and <@333>");
        assert_eq!(
            masked,
            "@[DISCORD PING REDACTED]@[DISCORD PING REDACTED] and @[DISCORD PING REDACTED]"
        );
    }

    #[test]
    fn text_without_mentions_is_untouched() {
        for text in [
            "",
            "plain text",
            "<@> <@abc> <@12 <@!12> <@&34> @everyone",
            "юникод <@ 1> текст",
            "<<@@>>",
        ] {
            assert!(!contains_discord_ping(text), "{text:?}");
            assert_eq!(mask_discord_pings(text), text);
        }
    }

    #[test]
    fn mention_after_false_start_is_found() {
        assert_eq!(
            mask_discord_pings("<@<@42>"),
            "<@@[DISCORD PING REDACTED]"
        );
        assert_eq!(mask_discord_pings("<<@7>>"), "<@[DISCORD PING REDACTED]>");
    }

    #[test]
    fn masking_is_idempotent() {
        for text in [
            "ping <@1> and <@2>",
            "<@<@42>",
            "nothing to see",
            "<@99999999999999999999999>",
        ] {
            let once = mask_discord_pings(text);
            assert!(!contains_discord_ping(&once));
            assert_eq!(mask_discord_pings(&once), once);
        }
    }

    #[test]
    fn contains_detects_markers() {
        assert!(contains_discord_ping("hi <@5>"));
        assert!(contains_discord_ping("<@x <@5>"));
        assert!(!contains_discord_ping("hi <@5"));
    }
}
