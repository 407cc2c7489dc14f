//! Display Renderer: blocks to presentation nodes for on-screen viewing.
//!
//! A pure projection with no business logic. Delimiters and markers are
//! already stripped by the classifier; this module only assigns
//! presentation roles. The codec-only all-caps heading heuristic does NOT
//! apply here (see `export::document`).

use serde::{Deserialize, Serialize};

use super::Block;

/// Presentation element, serialised to the viewing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DisplayNode {
    SectionTitle(String),
    ListItem(String),
    Paragraph(String),
    ParagraphBreak,
}

/// Projects classified blocks into display nodes, preserving order.
pub fn render(blocks: &[Block]) -> Vec<DisplayNode> {
    blocks
        .iter()
        .map(|block| match block {
            Block::Heading(text) => DisplayNode::SectionTitle(text.clone()),
            Block::Bullet(text) => DisplayNode::ListItem(text.clone()),
            Block::Body(text) => DisplayNode::Paragraph(text.clone()),
            Block::Blank => DisplayNode::ParagraphBreak,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{classify, to_markup};

    #[test]
    fn each_block_maps_to_its_node() {
        let blocks = vec![
            Block::Heading("5. FORCE DISCIPLINE".into()),
            Block::Bullet("Casualties: None reported.".into()),
            Block::Blank,
            Block::Body("OC 2BN: OC MAJ KASULE".into()),
        ];
        assert_eq!(
            render(&blocks),
            vec![
                DisplayNode::SectionTitle("5. FORCE DISCIPLINE".into()),
                DisplayNode::ListItem("Casualties: None reported.".into()),
                DisplayNode::ParagraphBreak,
                DisplayNode::Paragraph("OC 2BN: OC MAJ KASULE".into()),
            ]
        );
    }

    #[test]
    fn all_caps_body_stays_a_paragraph() {
        // The all-caps heading heuristic belongs to the document codec only.
        let nodes = render(&classify("SECURITY STATUS"));
        assert_eq!(nodes, vec![DisplayNode::Paragraph("SECURITY STATUS".into())]);
    }

    #[test]
    fn render_classify_is_idempotent() {
        let text = "*1. OPERATIONAL NARRATIVE*\nQuiet day.\n\n. Checked documents\nSECURITY STATUS";
        let once = render(&classify(text));
        let twice = render(&classify(&to_markup(&classify(text))));
        assert_eq!(once, twice);
    }
}
