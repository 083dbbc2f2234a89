//! Row data handed to the presentation layer.

use serde::Serialize;

use super::category::Category;
use super::session::{AnalysisSession, FileRecord};

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human readable size with 1024-based units and two decimals at most.
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_with(bytes, 2)
}

/// Like [`format_bytes`] with a chosen number of decimals; trailing zeros
/// are dropped, so 1536 bytes is `1.5 KB` rather than `1.50 KB`.
pub fn format_bytes_with(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit + 1 < UNITS.len() && bytes >= 1u64 << (10 * (unit + 1)) {
        unit += 1;
    }

    let scaled = bytes as f64 / (1u64 << (10 * unit)) as f64;
    // Halves round up: 1.125 KB is 1.13 KB.
    let factor = 10f64.powi(decimals as i32);
    let rounded = (scaled * factor).round() / factor;
    let mut text = format!("{rounded:.decimals$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    format!("{text} {}", UNITS[unit])
}

/// One bar of the category breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: Category,
    pub total_bytes: u64,
    /// Share of the session total, rounded to one decimal.
    pub percent_of_total: f64,
    pub is_zero: bool,
}

/// One line of the file table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRow {
    pub path: String,
    pub size_bytes: u64,
    pub category: Category,
    pub is_previewable: bool,
}

impl From<&FileRecord> for FileRow {
    fn from(record: &FileRecord) -> Self {
        Self {
            path: record.path.clone(),
            size_bytes: record.size,
            category: record.category,
            is_previewable: record.category == Category::Images,
        }
    }
}

/// Non-empty categories, largest first; equal totals keep
/// [`Category::DISPLAY_ORDER`].
pub fn category_rows(session: &AnalysisSession) -> Vec<CategoryRow> {
    let total = session.total_uncompressed_size;
    let mut rows: Vec<_> = Category::DISPLAY_ORDER
        .iter()
        .map(|&category| (category, session.category_totals.get(category)))
        .filter(|&(_, bytes)| bytes > 0)
        .map(|(category, bytes)| {
            let percent = bytes as f64 / total as f64 * 100.0;
            CategoryRow {
                category,
                total_bytes: bytes,
                percent_of_total: (percent * 10.0).round() / 10.0,
                is_zero: false,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_bytes.cmp(&a.total_bytes));
    rows
}

pub fn file_rows<'a, I>(records: I) -> Vec<FileRow>
where
    I: IntoIterator<Item = &'a FileRecord>,
{
    records.into_iter().map(FileRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::session::aggregate;
    use crate::analysis::session::tests::{file, small_deck};

    #[test]
    fn formats_reference_sizes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(1), "1 Bytes");
        assert_eq!(format_bytes(1023), "1023 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 + 300 * 1024), "5.29 MB");
        assert_eq!(format_bytes(3 << 30), "3 GB");
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(format_bytes(1152), "1.13 KB");
        assert_eq!(format_bytes(1664), "1.63 KB");
        assert_eq!(format_bytes_with(2560, 0), "3 KB");
    }

    #[test]
    fn gigabytes_is_the_largest_unit() {
        assert_eq!(format_bytes(2048u64 << 30), "2048 GB");
    }

    #[test]
    fn decimals_are_configurable() {
        assert_eq!(format_bytes_with(1536, 0), "2 KB");
        assert_eq!(format_bytes_with(1100, 3), "1.074 KB");
        assert_eq!(format_bytes_with(1100, 1), "1.1 KB");
    }

    #[test]
    fn category_rows_skip_empty_and_sort_by_size() {
        let session = aggregate("deck.pptx", small_deck());
        let rows = category_rows(&session);

        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.category, r.total_bytes, r.percent_of_total))
            .collect();
        assert_eq!(
            summary,
            [
                (Category::EmbeddedFonts, 4096, 61.5),
                (Category::Images, 2048, 30.8),
                (Category::Slides, 512, 7.7),
            ]
        );
        assert!(rows.iter().all(|r| !r.is_zero));
    }

    #[test]
    fn equal_category_totals_keep_display_order() {
        let session = aggregate(
            "x",
            vec![
                file("ppt/theme/theme1.xml", 100),
                file("ppt/media/a.emf", 100),
                file("ppt/media/a.png", 100),
                file("ppt/fonts/f.ttf", 100),
                file("ppt/media/a.mp3", 100),
            ],
        );
        let order: Vec<_> = category_rows(&session).iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            [
                Category::Images,
                Category::Audio,
                Category::EmbeddedFonts,
                Category::Structure,
                Category::OtherMedia,
            ]
        );
    }

    #[test]
    fn only_images_are_previewable() {
        let session = aggregate("deck.pptx", small_deck());
        let rows = file_rows(&session.files);
        let previewable: Vec<_> = rows
            .iter()
            .map(|r| (r.path.as_str(), r.is_previewable))
            .collect();
        assert_eq!(
            previewable,
            [
                ("ppt/fonts/font1.ttf", false),
                ("ppt/media/image1.png", true),
                ("ppt/slides/slide1.xml", false),
            ]
        );
    }

    #[test]
    fn rows_serialize_with_labels() {
        let session = aggregate("deck.pptx", small_deck());
        let json = serde_json::to_value(file_rows(&session.files[1..2])).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "path": "ppt/media/image1.png",
                "size_bytes": 2048,
                "category": "Images",
                "is_previewable": true,
            }])
        );
    }
}
