//! Image Attachment Pipeline: raw uploads to bounded, encoded attachments.
//!
//! Every stored attachment goes through the same path: byte validation,
//! decode, EXIF orientation correction, aspect-ratio-preserving downscale
//! to the kind's dimension cap, JPEG re-encode at fixed quality, base64
//! data URL. Compression is CPU-bound and runs under `spawn_blocking`;
//! batches are an ordered parallel map: results come back in upload
//! order no matter which compression finishes first.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use thiserror::Error;
use tracing::debug;

use crate::config::ATTACHMENT_JPEG_QUALITY;
use crate::models::enums::AttachmentKind;
use crate::models::report::MediaAttachment;

/// Maximum upload size before rejecting. Prevents OOM on corrupt files.
const MAX_IMAGE_BYTES: usize = 25 * 1024 * 1024; // 25 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Image data too small to be a valid image")]
    TooSmall,

    #[error("Image data exceeds {0} MB limit")]
    TooLarge(usize),

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Could not encode image: {0}")]
    Encode(String),
}

/// Compresses one upload into a stored attachment.
///
/// Suspends the calling task while the CPU-bound work runs on the
/// blocking pool; never blocks other tasks.
pub async fn prepare_attachment(
    bytes: Vec<u8>,
    kind: AttachmentKind,
) -> Result<MediaAttachment, MediaError> {
    tokio::task::spawn_blocking(move || prepare_attachment_blocking(&bytes, kind))
        .await
        .map_err(|e| MediaError::Encode(format!("image task failed: {e}")))?
}

/// Ordered concurrent batch: one result per upload, in upload order.
pub async fn prepare_attachments(
    uploads: Vec<Vec<u8>>,
    kind: AttachmentKind,
) -> Vec<Result<MediaAttachment, MediaError>> {
    let tasks = uploads.into_iter().map(|bytes| prepare_attachment(bytes, kind));
    futures_util::future::join_all(tasks).await
}

/// Synchronous compression path. Exposed for callers already off the
/// async runtime.
pub fn prepare_attachment_blocking(
    bytes: &[u8],
    kind: AttachmentKind,
) -> Result<MediaAttachment, MediaError> {
    validate_image_bytes(bytes)?;

    let img = image::load_from_memory(bytes).map_err(|e| MediaError::Decode(e.to_string()))?;
    let img = apply_orientation(img, read_exif_orientation(bytes));

    let (orig_w, orig_h) = img.dimensions();
    let cap = kind.max_dimension();
    let (w, h) = compute_fit_dimensions(orig_w, orig_h, cap);

    let resized = if (w, h) == (orig_w, orig_h) {
        img
    } else {
        img.resize_exact(w, h, FilterType::CatmullRom)
    };

    let mut cursor = Cursor::new(Vec::new());
    resized
        .to_rgb8()
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(ATTACHMENT_JPEG_QUALITY))
        .map_err(|e| MediaError::Encode(e.to_string()))?;
    let jpeg = cursor.into_inner();

    debug!(
        kind = kind.as_str(),
        from = format!("{orig_w}x{orig_h}"),
        to = format!("{w}x{h}"),
        jpeg_size = jpeg.len(),
        "Attachment compressed"
    );

    Ok(MediaAttachment {
        encoded: format!("data:image/jpeg;base64,{}", BASE64.encode(&jpeg)),
        width: w,
        height: h,
        position: 0,
    })
}

/// Decodes a stored attachment back to raw image bytes.
/// Accepts a data URL or bare base64.
pub fn decode_attachment(encoded: &str) -> Result<Vec<u8>, MediaError> {
    let payload = match encoded.split_once("base64,") {
        Some((_, rest)) => rest,
        None => encoded,
    };
    BASE64
        .decode(payload.trim())
        .map_err(|e| MediaError::Decode(e.to_string()))
}

/// Validate upload bytes before decoding.
/// Returns early error for clearly invalid input: saves decode time.
fn validate_image_bytes(bytes: &[u8]) -> Result<(), MediaError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(MediaError::TooSmall);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge(MAX_IMAGE_BYTES / (1024 * 1024)));
    }
    Ok(())
}

/// Read EXIF orientation tag (0x0112) from raw image bytes.
/// Returns 1 (normal) if no EXIF data or tag not present.
fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let reader = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(r) => r,
        Err(_) => return 1,
    };

    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply EXIF orientation transform to a `DynamicImage`.
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        1 => img,
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Compute dimensions where neither edge exceeds `cap`, preserving the
/// aspect ratio. Small images are NOT upscaled.
pub fn compute_fit_dimensions(width: u32, height: u32, cap: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (1, 1);
    }

    let scale = (cap as f32 / width as f32).min(cap as f32 / height as f32);
    let scale = scale.min(1.0); // Don't upscale

    let new_w = ((width as f32 * scale).round() as u32).max(1).min(cap);
    let new_h = ((height as f32 * scale).round() as u32).max(1).min(cap);

    (new_w, new_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// PNG bytes for a solid-color test image.
    fn make_test_image(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([90, 120, 150]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    // ── compute_fit_dimensions ──

    #[test]
    fn fit_landscape_under_cap() {
        let (w, h) = compute_fit_dimensions(1200, 800, 600);
        assert_eq!(w, 600);
        assert_eq!(h, 400);
    }

    #[test]
    fn fit_portrait_under_cap() {
        let (w, h) = compute_fit_dimensions(500, 1000, 600);
        assert_eq!(h, 600);
        assert_eq!(w, 300);
    }

    #[test]
    fn fit_small_image_not_upscaled() {
        let (w, h) = compute_fit_dimensions(200, 150, 600);
        assert_eq!((w, h), (200, 150));
    }

    #[test]
    fn fit_zero_dimensions_clamped() {
        let (w, h) = compute_fit_dimensions(0, 0, 600);
        assert!(w >= 1 && h >= 1);
    }

    // ── prepare_attachment ──

    #[tokio::test]
    async fn oversized_upload_is_bounded() {
        let png = make_test_image(1800, 1200);
        let attachment = prepare_attachment(png, AttachmentKind::DailyReport)
            .await
            .unwrap();

        assert_eq!(attachment.width, 600);
        assert_eq!(attachment.height, 400);
        assert!(attachment.encoded.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn article_photo_uses_smaller_cap() {
        let png = make_test_image(1000, 1000);
        let attachment = prepare_attachment(png, AttachmentKind::ArticlePhoto)
            .await
            .unwrap();
        assert_eq!(attachment.width, 400);
        assert_eq!(attachment.height, 400);
    }

    #[tokio::test]
    async fn stored_attachment_decodes_to_jpeg() {
        let png = make_test_image(300, 200);
        let attachment = prepare_attachment(png, AttachmentKind::DailyReport)
            .await
            .unwrap();

        let jpeg = decode_attachment(&attachment.encoded).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (300, 200));
    }

    #[tokio::test]
    async fn too_small_upload_rejected() {
        let result = prepare_attachment(vec![0x89, 0x50], AttachmentKind::DailyReport).await;
        assert!(matches!(result, Err(MediaError::TooSmall)));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_decode() {
        let garbage = [0xDE, 0xAD, 0xBE, 0xEF].repeat(25);
        let result = prepare_attachment(garbage, AttachmentKind::DailyReport).await;
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }

    #[tokio::test]
    async fn batch_preserves_upload_order() {
        // Mixed sizes so compressions finish out of order; results must
        // still come back in upload order.
        let uploads = vec![
            make_test_image(1600, 1200),
            make_test_image(100, 100),
            make_test_image(800, 600),
        ];
        let results = prepare_attachments(uploads, AttachmentKind::DailyReport).await;

        assert_eq!(results.len(), 3);
        let widths: Vec<u32> = results
            .into_iter()
            .map(|r| r.unwrap().width)
            .collect();
        assert_eq!(widths, vec![600, 100, 600]);
    }

    #[tokio::test]
    async fn batch_reports_per_upload_failures() {
        let uploads = vec![make_test_image(200, 200), vec![0u8; 100]];
        let results = prepare_attachments(uploads, AttachmentKind::DailyReport).await;

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(MediaError::Decode(_))));
    }

    #[test]
    fn decode_attachment_accepts_bare_base64() {
        let decoded = decode_attachment(&BASE64.encode(b"hello")).unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn decode_attachment_rejects_garbage() {
        assert!(matches!(
            decode_attachment("data:image/jpeg;base64,!!!"),
            Err(MediaError::Decode(_))
        ));
    }
}
