//! Display helpers shared by the upload page and the admin dashboard.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human readable size using 1024-based units and at most two decimals.
///
/// Trailing zeros are dropped, so `1536` renders as `"1.5 KB"` and `1048576`
/// as `"1 MB"`. Values past the gigabyte range stay in GB.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Render an upload timestamp like "Jan 5, 2025, 02:30 PM" in the given zone
pub fn format_uploaded_at<Tz>(uploaded_at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    uploaded_at
        .with_timezone(tz)
        .format("%b %-d, %Y, %I:%M %p")
        .to_string()
}

/// Coarse category of a file, used to pick an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Pdf,
    Document,
    Image,
    Archive,
    Text,
    Other,
}

impl FileCategory {
    /// Classify a MIME type by substring, first match wins:
    /// pdf, word/document, image, zip/compressed, text/markdown.
    pub fn for_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();

        if mime.contains("pdf") {
            FileCategory::Pdf
        } else if mime.contains("word") || mime.contains("document") {
            FileCategory::Document
        } else if mime.contains("image") {
            FileCategory::Image
        } else if mime.contains("zip") || mime.contains("compressed") {
            FileCategory::Archive
        } else if mime.contains("text") || mime.contains("markdown") {
            FileCategory::Text
        } else {
            FileCategory::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_format_size_zero() {
        assert_eq!(format_size(0), "0 Bytes");
    }

    #[test]
    fn test_format_size_trims_trailing_zeros() {
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1 MB");
        assert_eq!(format_size(1024), "1 KB");
    }

    #[test]
    fn test_format_size_below_one_kilobyte() {
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
    }

    #[test]
    fn test_format_size_two_decimals() {
        // 1.2345 MB
        assert_eq!(format_size(1_294_467), "1.23 MB");
        assert_eq!(format_size(100 * 1024 * 1024), "100 MB");
    }

    #[test]
    fn test_format_size_clamps_at_gigabytes() {
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_file_category_priority_order() {
        assert_eq!(FileCategory::for_mime("application/pdf"), FileCategory::Pdf);
        assert_eq!(
            FileCategory::for_mime("application/msword"),
            FileCategory::Document
        );
        assert_eq!(
            FileCategory::for_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            FileCategory::Document
        );
        assert_eq!(FileCategory::for_mime("image/png"), FileCategory::Image);
        assert_eq!(FileCategory::for_mime("application/zip"), FileCategory::Archive);
        assert_eq!(
            FileCategory::for_mime("application/x-zip-compressed"),
            FileCategory::Archive
        );
        assert_eq!(FileCategory::for_mime("text/markdown"), FileCategory::Text);
        assert_eq!(FileCategory::for_mime("text/plain"), FileCategory::Text);
        assert_eq!(
            FileCategory::for_mime("application/octet-stream"),
            FileCategory::Other
        );
    }

    #[test]
    fn test_format_uploaded_at_uses_given_zone() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 5, 14, 30, 0).unwrap();
        assert_eq!(format_uploaded_at(ts, &Utc), "Jan 5, 2025, 02:30 PM");

        let plus_seven = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(format_uploaded_at(ts, &plus_seven), "Jan 5, 2025, 09:30 PM");
    }
}
