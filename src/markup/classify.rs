//! Line Classifier: markup/HTML text to an ordered block sequence.
//!
//! Accepts arbitrary input and never fails: saved bodies may carry HTML
//! from a rich-text editor, pasted fragments, or hand edits. Block-level
//! tags become explicit newlines, list items gain a bullet marker, the
//! four standard entities are decoded, and any leftover tag is stripped.
//! Unknown lines degrade to `Body`.

use std::sync::LazyLock;

use regex::Regex;

use super::{Block, BULLET_MARKERS, HEADING_DELIMITER};

static LIST_ITEM_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<li(?:\s[^>]*)?>").expect("list-item regex"));

static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:p|div)(?:\s[^>]*)?>|<br\s*/?>|</li\s*>|</?(?:ul|ol)(?:\s[^>]*)?>")
        .expect("block-break regex")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("tag regex"));

/// Classifies markup text into typed blocks, one per source line.
pub fn classify(text: &str) -> Vec<Block> {
    let normalized = normalize(text);
    normalized.lines().map(classify_line).collect()
}

/// Converts block-level HTML to explicit newlines, decodes entities, and
/// strips any remaining tag.
fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n");

    // List items become bullet lines; every other block-level tag is a break.
    let text = LIST_ITEM_OPEN.replace_all(&text, "\n\u{2022} ");
    let text = BLOCK_BREAK.replace_all(&text, "\n");

    // The four standard entities. &amp; is decoded last so that literal
    // "&amp;lt;" survives as "&lt;" text rather than becoming a tag.
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");

    ANY_TAG.replace_all(&text, "").into_owned()
}

fn classify_line(line: &str) -> Block {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Block::Blank;
    }

    if trimmed.len() > 2
        && trimmed.starts_with(HEADING_DELIMITER)
        && trimmed.ends_with(HEADING_DELIMITER)
    {
        let inner = &trimmed[1..trimmed.len() - 1];
        return Block::Heading(inner.trim().to_string());
    }

    for marker in BULLET_MARKERS {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Block::Bullet(rest.trim().to_string());
        }
    }

    Block::Body(trimmed.to_string())
}
