use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Opsbrief";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum evidence photos attached to a daily situation report.
pub const MAX_DAILY_ATTACHMENTS: usize = 4;

/// Maximum profile photos attached to a magazine article submission.
pub const MAX_ARTICLE_PHOTOS: usize = 1;

/// Longest edge (pixels) for daily-report evidence photos after compression.
pub const DAILY_ATTACHMENT_MAX_DIMENSION: u32 = 600;

/// Longest edge (pixels) for article profile photos after compression.
pub const ARTICLE_PHOTO_MAX_DIMENSION: u32 = 400;

/// JPEG re-encode quality for all stored attachments (0.6-0.7 band).
pub const ATTACHMENT_JPEG_QUALITY: u8 = 65;

/// Attachment display box inside exported documents, in pixels at 96 dpi.
pub const ATTACHMENT_DISPLAY_WIDTH_PX: u32 = 500;
pub const ATTACHMENT_DISPLAY_HEIGHT_PX: u32 = 330;

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    "opsbrief=info".to_string()
}

/// Get the application data directory
/// ~/Opsbrief/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Opsbrief")
}

/// Get the exports directory (generated documents land here)
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Get the default database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("opsbrief.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Opsbrief"));
    }

    #[test]
    fn exports_dir_under_app_data() {
        let exports = exports_dir();
        let app = app_data_dir();
        assert!(exports.starts_with(app));
        assert!(exports.ends_with("exports"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn daily_cap_exceeds_article_cap() {
        assert!(MAX_DAILY_ATTACHMENTS > MAX_ARTICLE_PHOTOS);
    }
}
