use serde::{Deserialize, Serialize};

use super::report::MediaAttachment;

/// Structured input for a magazine-style article submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleSubmission {
    pub title: String,
    pub author: String,
    pub body_text: String,
}

/// Persisted magazine article with at most one profile photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub author: String,
    pub body_text: String,
    pub photo: Option<MediaAttachment>,
    /// `%Y-%m-%d %H:%M:%S`, sortable as text.
    pub created_at: String,
}
