//! Report markup: the canonical persisted text form of a report body.
//!
//! Wire grammar (stable across renderer/codec versions):
//! - `*...*` wraps a heading line
//! - `". "` or `"• "` prefixes a bullet line
//! - a blank line is a paragraph break
//! - anything else is plain body text
//!
//! `classify` is the single parser both consumers (display renderer,
//! document codec) depend on. The grammar must never live anywhere else.

pub mod classify;
pub mod render;
pub mod template;

pub use classify::classify;

use serde::{Deserialize, Serialize};

/// Heading lines start and end with this character.
pub const HEADING_DELIMITER: char = '*';

/// Accepted bullet-line prefixes, checked in order.
pub const BULLET_MARKERS: [&str; 2] = [". ", "\u{2022} "];

/// A classified unit of markup text. Block order is line order in the
/// source text; every consumer relies on that ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Block {
    Heading(String),
    Bullet(String),
    Body(String),
    Blank,
}

/// Canonical serialisation back to markup text.
///
/// For classifier-produced blocks, `classify(to_markup(blocks)) == blocks`.
pub fn to_markup(blocks: &[Block]) -> String {
    let lines: Vec<String> = blocks
        .iter()
        .map(|block| match block {
            Block::Heading(text) => format!("*{text}*"),
            Block::Bullet(text) => format!(". {text}"),
            Block::Body(text) => text.clone(),
            Block::Blank => String::new(),
        })
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_markup_rewraps_each_variant() {
        let blocks = vec![
            Block::Heading("1. OPERATIONAL NARRATIVE".into()),
            Block::Body("Quiet day at the post.".into()),
            Block::Blank,
            Block::Bullet("Checked documents".into()),
        ];
        let text = to_markup(&blocks);
        assert_eq!(
            text,
            "*1. OPERATIONAL NARRATIVE*\nQuiet day at the post.\n\n. Checked documents"
        );
    }

    #[test]
    fn classify_inverts_to_markup() {
        let blocks = vec![
            Block::Heading("5. FORCE DISCIPLINE".into()),
            Block::Bullet("Casualties: None reported.".into()),
            Block::Blank,
            Block::Body("OC 2BN: OC MAJ KASULE".into()),
        ];
        assert_eq!(classify(&to_markup(&blocks)), blocks);
    }
}
