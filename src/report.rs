//! Report domain operations: submission, attachment management, and
//! document export over a database connection.
//!
//! The editing session owns its fields and prepared attachments
//! exclusively until the single save handoff here; after that the
//! compiled markup text is the persisted form and the fields are gone.

use chrono::Local;
use rusqlite::Connection;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{MAX_ARTICLE_PHOTOS, MAX_DAILY_ATTACHMENTS};
use crate::db::{repository, DatabaseError};
use crate::export::{encode_document, DocumentMeta, ExportError, ExportedDocument};
use crate::markup::{classify, template};
use crate::models::article::{ArticleRecord, ArticleSubmission};
use crate::models::enums::ReportStatus;
use crate::models::report::{MediaAttachment, ReportFields, ReportRecord};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("A report holds at most {limit} attachments")]
    AttachmentLimit { limit: usize },

    #[error("An article holds at most one photo")]
    PhotoLimit,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Compiles the fields and persists the finished report.
///
/// The attachment cap is enforced before anything touches the database;
/// a rejected submission leaves no rows behind. Attachment rows keep
/// upload order.
pub fn submit_daily_report(
    conn: &Connection,
    fields: &ReportFields,
    owner_id: &str,
    attachments: Vec<MediaAttachment>,
) -> Result<ReportRecord, ReportError> {
    if attachments.len() > MAX_DAILY_ATTACHMENTS {
        return Err(ReportError::AttachmentLimit {
            limit: MAX_DAILY_ATTACHMENTS,
        });
    }

    let markup_text = template::compile_daily_report(fields);
    let attachments = renumber(attachments);

    let record = ReportRecord {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        day_label: fields.date_label.clone(),
        unit: fields.unit.clone(),
        title: format!("{} SITREP - {}", fields.unit, fields.date_label),
        signing_officer: fields.signing_officer.clone(),
        markup_text,
        attachments,
        status: ReportStatus::Submitted,
        created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    repository::insert_report(conn, &record)?;
    info!(
        report_id = %record.id,
        day_label = %record.day_label,
        attachments = record.attachments.len(),
        "Report submitted"
    );
    Ok(record)
}

/// Overwrites the markup body wholesale. There is no structured re-edit;
/// the flat text is the persisted form.
pub fn update_report_text(
    conn: &Connection,
    report_id: &str,
    markup_text: &str,
) -> Result<(), ReportError> {
    repository::update_report_text(conn, report_id, markup_text)?;
    Ok(())
}

/// Appends prepared attachments to an existing report.
///
/// A batch that would push the report past the cap is rejected whole;
/// the stored count is unchanged on rejection.
pub fn attach_report_media(
    conn: &Connection,
    report_id: &str,
    attachments: Vec<MediaAttachment>,
) -> Result<(), ReportError> {
    let current = repository::count_attachments(conn, report_id)?;
    if current + attachments.len() > MAX_DAILY_ATTACHMENTS {
        return Err(ReportError::AttachmentLimit {
            limit: MAX_DAILY_ATTACHMENTS,
        });
    }
    repository::append_attachments(conn, report_id, &attachments, current)?;
    Ok(())
}

/// Removes the attachment at the given index; remaining positions are
/// compacted by the repository.
pub fn remove_report_attachment(
    conn: &Connection,
    report_id: &str,
    index: usize,
) -> Result<(), ReportError> {
    repository::remove_attachment_at(conn, report_id, index)?;
    Ok(())
}

/// Replaces a report's attachments wholesale, cap enforced.
pub fn replace_report_attachments(
    conn: &Connection,
    report_id: &str,
    attachments: Vec<MediaAttachment>,
) -> Result<(), ReportError> {
    if attachments.len() > MAX_DAILY_ATTACHMENTS {
        return Err(ReportError::AttachmentLimit {
            limit: MAX_DAILY_ATTACHMENTS,
        });
    }
    repository::replace_attachments(conn, report_id, &renumber(attachments))?;
    Ok(())
}

pub fn get_report(conn: &Connection, report_id: &str) -> Result<ReportRecord, ReportError> {
    Ok(repository::get_report(conn, report_id)?)
}

pub fn list_reports_ascending(conn: &Connection) -> Result<Vec<ReportRecord>, ReportError> {
    Ok(repository::list_reports_ascending(conn)?)
}

pub fn delete_report(conn: &Connection, report_id: &str) -> Result<(), ReportError> {
    repository::delete_report(conn, report_id)?;
    Ok(())
}

pub fn set_report_status(
    conn: &Connection,
    report_id: &str,
    status: ReportStatus,
) -> Result<(), ReportError> {
    repository::set_report_status(conn, report_id, status)?;
    Ok(())
}

/// Exports a stored report: classify the persisted markup, decode the
/// attachments at export time, pack through the document codec.
pub async fn report_document(
    conn: &Connection,
    report_id: &str,
) -> Result<ExportedDocument, ReportError> {
    let record = repository::get_report(conn, report_id)?;
    let blocks = classify(&record.markup_text);
    let meta = DocumentMeta {
        title: record.title,
        date_label: record.day_label,
        unit: record.unit,
        signing_officer: record.signing_officer,
    };
    Ok(encode_document(blocks, record.attachments, meta).await?)
}

/// Persists a magazine article with its optional photo, 1-photo cap.
pub fn submit_article(
    conn: &Connection,
    submission: &ArticleSubmission,
    owner_id: &str,
    photos: Vec<MediaAttachment>,
) -> Result<ArticleRecord, ReportError> {
    if photos.len() > MAX_ARTICLE_PHOTOS {
        return Err(ReportError::PhotoLimit);
    }

    let record = ArticleRecord {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        title: submission.title.clone(),
        author: submission.author.clone(),
        body_text: submission.body_text.clone(),
        photo: photos.into_iter().next(),
        created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    repository::insert_article(conn, &record)?;
    info!(article_id = %record.id, has_photo = record.photo.is_some(), "Article submitted");
    Ok(record)
}

fn renumber(mut attachments: Vec<MediaAttachment>) -> Vec<MediaAttachment> {
    for (position, attachment) in attachments.iter_mut().enumerate() {
        attachment.position = position;
    }
    attachments
}
