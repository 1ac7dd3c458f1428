//! Rewriting of Gitter attachment markup.
//!
//! Gitter renders uploads as markdown links into `files.gitter.im`. Telegram
//! shows that markup literally, so attachments are reduced to their bare URL.

use std::sync::LazyLock;

use fancy_regex::Regex;
use tracing::warn;

/// `[![name](https://files.gitter.im/org/room/id/thumb/name)](full-url)`
static THUMBNAIL_LINK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"^\[!\[[^\]]+\]\(https?://files\.gitter\.im/[^/]+/[^/]+/[^/]+/thumb/[^)]+\)\]\(([^)]+)\)$")
});

/// `[name](https://files.gitter.im/org/room/id/name)` at the end of the text.
static FILE_LINK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"\[[^\]]+\]\((https://files\.gitter\.im/[^/]+/[^/]+/[^/]+/[^/)]+)\)$")
});

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Invalid attachment pattern '{}': {}", pattern, e);
            None
        }
    }
}

/// First capture group of `regex` in `text`, if it matches.
fn capture(regex: &LazyLock<Option<Regex>>, text: &str) -> Option<String> {
    let regex = regex.as_ref()?;
    match regex.captures(text) {
        Ok(captures) => captures
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        Err(e) => {
            warn!("Attachment pattern match error: {}", e);
            None
        }
    }
}

/// Reduce Gitter attachment markup to a plain URL.
///
/// A thumbnail-wrapped image becomes its full-size target, a trailing file
/// link becomes its URL, anything else is returned unchanged.
pub fn normalize(raw: &str) -> String {
    capture(&THUMBNAIL_LINK, raw)
        .or_else(|| capture(&FILE_LINK, raw))
        .unwrap_or_else(|| raw.to_string())
}
