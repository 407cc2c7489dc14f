//! Document Codec: blocks plus attachments to portable PDF bytes.
//!
//! PDF generation via `printpdf`. This consumer adds one styling rule the
//! display renderer does not have: an all-caps Body line (trimmed,
//! non-empty, at least 4 characters, equal to its own upper-cased form)
//! is styled as a heading even without delimiter wrapping. The asymmetry
//! is a literal contract of the export format, kept until stakeholders
//! say otherwise.
//!
//! Attachments are appended after all text in stored order. A single
//! undecodable attachment is logged and skipped; only a failure of the
//! packing step itself aborts the document.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference,
};
use tracing::warn;

use crate::config::{ATTACHMENT_DISPLAY_HEIGHT_PX, ATTACHMENT_DISPLAY_WIDTH_PX};
use crate::markup::Block;
use crate::media;
use crate::models::report::MediaAttachment;

use super::ExportError;

/// Metadata rendered into the document frame.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    pub title: String,
    pub date_label: String,
    pub unit: String,
    pub signing_officer: String,
}

/// Finished export: binary blob plus a filesystem-safe filename.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

// A4 page with fixed 20 mm margins.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;

/// Attachments render at 96 dpi inside a fixed display box.
const ATTACHMENT_DPI: f32 = 96.0;

const FOOTER: &str = "Generated by Opsbrief - field reporting system.";

/// Encodes blocks, attachments, and metadata into PDF bytes.
///
/// Packing is CPU-bound and runs under `spawn_blocking`.
pub async fn encode_document(
    blocks: Vec<Block>,
    attachments: Vec<MediaAttachment>,
    meta: DocumentMeta,
) -> Result<ExportedDocument, ExportError> {
    tokio::task::spawn_blocking(move || encode_document_blocking(&blocks, &attachments, &meta))
        .await
        .map_err(|e| ExportError::Packing(format!("export task failed: {e}")))?
}

/// Synchronous packing path.
pub fn encode_document_blocking(
    blocks: &[Block],
    attachments: &[MediaAttachment],
    meta: &DocumentMeta,
) -> Result<ExportedDocument, ExportError> {
    let title = meta.title.to_uppercase();
    let (doc, page1, layer1) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let font = builtin(&doc, BuiltinFont::Helvetica)?;
    let bold = builtin(&doc, BuiltinFont::HelveticaBold)?;
    let italic = builtin(&doc, BuiltinFont::HelveticaOblique)?;

    let mut page = PageCursor::new(&doc, doc.get_page(page1).get_layer(layer1));

    // Title and metadata block
    page.text(&title, 14.0, MARGIN, &bold, 10.0);
    page.text(&format!("Date: {}", meta.date_label), 9.0, MARGIN, &font, 4.5);
    page.text(&format!("Unit: {}", meta.unit), 9.0, MARGIN, &font, 8.0);

    // Body
    for block in blocks {
        match block {
            Block::Heading(text) => {
                page.ensure_space(10.0);
                page.text(text, 11.0, MARGIN, &bold, 6.0);
            }
            Block::Bullet(text) => {
                for (i, line) in wrap_text(text, 76).iter().enumerate() {
                    page.ensure_space(5.0);
                    let prefixed = if i == 0 {
                        format!("\u{2022} {line}")
                    } else {
                        format!("  {line}")
                    };
                    page.text(&prefixed, 10.0, MARGIN + 5.0, &font, 5.0);
                }
            }
            Block::Body(text) if is_pseudo_heading(text) => {
                // All-caps body lines get heading styling in the export.
                page.ensure_space(10.0);
                page.text(text, 11.0, MARGIN, &bold, 6.0);
            }
            Block::Body(text) => {
                for line in wrap_text(text, 80) {
                    page.ensure_space(5.0);
                    page.text(&line, 10.0, MARGIN, &font, 5.0);
                }
            }
            Block::Blank => page.gap(4.0),
        }
    }

    // Attachments, original order, fixed display box
    for attachment in attachments {
        match embed_attachment(&mut page, attachment) {
            Ok(()) => {}
            Err(e) => {
                warn!(position = attachment.position, error = %e, "Skipping undecodable attachment");
            }
        }
    }

    // Signature block and provenance footer
    page.gap(8.0);
    page.ensure_space(16.0);
    page.text(
        &format!("OC {}: OC {}", meta.unit, meta.signing_officer),
        10.0,
        MARGIN,
        &bold,
        8.0,
    );
    page.text(FOOTER, 8.0, MARGIN, &italic, 4.0);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Packing(format!("PDF save error: {e}")))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| ExportError::Packing(format!("PDF buffer error: {e}")))?;

    Ok(ExportedDocument {
        bytes,
        filename: format!("{}.pdf", sanitize_title(&meta.title)),
    })
}

/// Saves an exported document into the given directory.
pub fn export_to_file(document: &ExportedDocument, dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&document.filename);
    std::fs::write(&path, &document.bytes)?;
    Ok(path)
}

/// Codec-only heading heuristic: a trimmed, non-empty line of at least 4
/// characters that equals its own upper-cased form.
pub fn is_pseudo_heading(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().count() >= 4 && trimmed == trimmed.to_uppercase()
}

/// Replaces filesystem-illegal characters with `-`. Empty titles fall
/// back to "report".
pub fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        "report".to_string()
    } else {
        sanitized
    }
}

fn builtin(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, ExportError> {
    doc.add_builtin_font(font)
        .map_err(|e| ExportError::Packing(format!("PDF font error: {e}")))
}

/// Decodes one attachment and draws it in the fixed display box.
fn embed_attachment(page: &mut PageCursor<'_>, attachment: &MediaAttachment) -> Result<(), String> {
    let bytes = media::decode_attachment(&attachment.encoded).map_err(|e| e.to_string())?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    let rgb = decoded.to_rgb8();
    let (w, h) = (rgb.width(), rgb.height());
    if w == 0 || h == 0 {
        return Err("empty image".into());
    }

    let box_h_mm = px_to_mm(ATTACHMENT_DISPLAY_HEIGHT_PX);

    page.gap(4.0);
    page.ensure_space(box_h_mm + 4.0);
    let y_bottom = page.y - box_h_mm;

    let pdf_image = Image::from_dynamic_image(&image::DynamicImage::ImageRgb8(rgb));
    pdf_image.add_to_layer(
        page.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN)),
            translate_y: Some(Mm(y_bottom)),
            scale_x: Some(ATTACHMENT_DISPLAY_WIDTH_PX as f32 / w as f32),
            scale_y: Some(ATTACHMENT_DISPLAY_HEIGHT_PX as f32 / h as f32),
            dpi: Some(ATTACHMENT_DPI),
            ..Default::default()
        },
    );

    page.y = y_bottom - 4.0;
    Ok(())
}

fn px_to_mm(px: u32) -> f32 {
    px as f32 * 25.4 / ATTACHMENT_DPI
}

/// Tracks the write position and starts a new page when a block would
/// cross the bottom margin.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl<'a> PageCursor<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef, advance: f32) {
        self.ensure_space(advance);
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.y -= advance;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        // Char counts, not byte lengths: non-ASCII text must not wrap early.
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
