//! Multi-report consolidation: window selection, synthesis, and the
//! briefing document path.
//!
//! Both abort conditions fire before the synthesis collaborator is ever
//! called: `EmptyWindow` when no report-days are available for the
//! requested range, `NoContent` when the selected reports carry no
//! transcript text. Callers surface them as distinct messages.

pub mod synthesis;
pub mod windower;

pub use synthesis::{ConsolidatedBriefing, SynthesisClient, SynthesisError};
pub use windower::{select_window, ConsolidationWindow};

use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

use crate::db::{repository, DatabaseError};
use crate::export::{encode_document, DocumentMeta, ExportError, ExportedDocument};
use crate::markup::{classify, template};

#[derive(Error, Debug)]
pub enum ConsolidationError {
    #[error("No report days available for the requested range")]
    EmptyWindow,

    #[error("Selected reports contain no transcript content")]
    NoContent,

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Runs one consolidation: window the stored reports, build day-prefixed
/// transcripts, make the single synthesis call. Never retries.
pub fn run_consolidation(
    conn: &Connection,
    client: &dyn SynthesisClient,
    day_count: usize,
) -> Result<ConsolidatedBriefing, ConsolidationError> {
    let reports = repository::list_reports_ascending(conn)?;
    let window = select_window(&reports, day_count)?;

    let transcripts: Vec<String> = window
        .reports
        .iter()
        .filter(|r| !r.markup_text.trim().is_empty())
        .map(|r| format!("[{}] {}", r.day_label, r.markup_text))
        .collect();

    if transcripts.is_empty() {
        return Err(ConsolidationError::NoContent);
    }

    info!(
        days = window.day_labels.len(),
        reports = window.reports.len(),
        transcripts = transcripts.len(),
        "Running consolidation"
    );

    Ok(client.synthesize(&transcripts, window.day_labels.len())?)
}

/// Renders a briefing through the same compile → classify → codec path
/// daily reports use.
pub async fn briefing_document(
    briefing: &ConsolidatedBriefing,
    day_count: usize,
    meta: DocumentMeta,
) -> Result<ExportedDocument, ConsolidationError> {
    let markup = template::compile_briefing(briefing, day_count);
    let blocks = classify(&markup);
    Ok(encode_document(blocks, vec![], meta).await?)
}
