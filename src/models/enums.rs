use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(ReportStatus {
    Draft => "draft",
    Submitted => "submitted",
    Archived => "archived",
});

str_enum!(AttachmentKind {
    DailyReport => "daily_report",
    ArticlePhoto => "article_photo",
});

impl AttachmentKind {
    /// Longest edge allowed after compression, in pixels.
    pub fn max_dimension(&self) -> u32 {
        match self {
            Self::DailyReport => crate::config::DAILY_ATTACHMENT_MAX_DIMENSION,
            Self::ArticlePhoto => crate::config::ARTICLE_PHOTO_MAX_DIMENSION,
        }
    }

    /// Attachment count cap enforced at persistence time.
    pub fn max_count(&self) -> usize {
        match self {
            Self::DailyReport => crate::config::MAX_DAILY_ATTACHMENTS,
            Self::ArticlePhoto => crate::config::MAX_ARTICLE_PHOTOS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn report_status_round_trip() {
        for status in [ReportStatus::Draft, ReportStatus::Submitted, ReportStatus::Archived] {
            assert_eq!(ReportStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn invalid_status_is_rejected() {
        let result = ReportStatus::from_str("pending");
        assert!(matches!(result, Err(DatabaseError::InvalidEnum { .. })));
    }

    #[test]
    fn attachment_kind_caps() {
        assert_eq!(AttachmentKind::DailyReport.max_count(), 4);
        assert_eq!(AttachmentKind::ArticlePhoto.max_count(), 1);
        assert_eq!(AttachmentKind::DailyReport.max_dimension(), 600);
        assert_eq!(AttachmentKind::ArticlePhoto.max_dimension(), 400);
    }
}
