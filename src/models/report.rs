use serde::{Deserialize, Serialize};

use super::enums::ReportStatus;

/// One recorded incident inside the security-situation section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub time: String,
    pub description: String,
}

/// Structured input for composing a daily situation report.
///
/// Exists only inside an editing session: the compiled markup text is the
/// persisted form, the fields are discarded after submission. All list
/// fields are insertion-ordered and rendered in that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFields {
    pub date_label: String,
    pub unit: String,
    /// Attachment-day ordinal, e.g. "14th".
    pub attachment_day: String,
    pub narrative: String,
    pub security_status: String,
    pub incidents: Vec<Incident>,
    pub action_taken: Option<String>,
    pub duties: Vec<String>,
    pub casualties: String,
    pub disciplinary_cases: String,
    pub challenges: Vec<String>,
    pub recommendations: Vec<String>,
    pub overall_summary: String,
    pub signing_officer: String,
    pub supplementary: Option<String>,
}

/// A compressed, size-bounded evidence photo owned by exactly one report.
///
/// `encoded` is a self-describing data URL (`data:image/jpeg;base64,...`).
/// Attachments are never mutated after creation: only replaced wholesale
/// or removed by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub encoded: String,
    pub width: u32,
    pub height: u32,
    pub position: usize,
}

/// Persisted report record as stored by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    pub owner_id: String,
    /// Free-text day label, the windowing key for consolidation.
    pub day_label: String,
    pub unit: String,
    pub title: String,
    pub signing_officer: String,
    pub markup_text: String,
    pub attachments: Vec<MediaAttachment>,
    pub status: ReportStatus,
    /// `%Y-%m-%d %H:%M:%S`, sortable as text.
    pub created_at: String,
}
