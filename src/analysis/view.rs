//! Choosing which files to display.

use serde::Serialize;

use super::category::Category;
use super::session::FileRecord;

/// What the file table shows. Independent of any loaded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayConfig {
    pub max_files_shown: u32,
    pub show_images: bool,
    pub show_slides: bool,
    pub show_other_categories: bool,
}

impl DisplayConfig {
    pub const MIN_FILES: u32 = 1;
    pub const MAX_FILES: u32 = 500;
    pub const DEFAULT_FILES: u32 = 40;

    /// The limit actually applied, clamped to `[MIN_FILES, MAX_FILES]`.
    pub fn effective_limit(&self) -> usize {
        self.max_files_shown.clamp(Self::MIN_FILES, Self::MAX_FILES) as usize
    }

    /// Set the limit from any integer, clamping it into range.
    pub fn set_limit(&mut self, value: i64) {
        self.max_files_shown =
            value.clamp(Self::MIN_FILES as i64, Self::MAX_FILES as i64) as u32;
    }

    pub fn shows(&self, category: Category) -> bool {
        match category {
            Category::Images => self.show_images,
            Category::Slides => self.show_slides,
            _ => self.show_other_categories,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_files_shown: Self::DEFAULT_FILES,
            show_images: true,
            show_slides: false,
            show_other_categories: false,
        }
    }
}

/// Leading integer of `input`, the way a number field reads it.
///
/// Surrounding whitespace and trailing garbage are ignored (`"12abc"` is 12);
/// input without leading digits yields `None`.
pub fn parse_limit(input: &str) -> Option<i64> {
    let s = input.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Anything too long for an i64 is far outside the limit range anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// The files to display: category flags applied, then the leading
/// `effective_limit()` records of what remains.
pub fn select_visible<'a>(files: &'a [FileRecord], config: &DisplayConfig) -> Vec<&'a FileRecord> {
    files
        .iter()
        .filter(|f| config.shows(f.category))
        .take(config.effective_limit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::session::aggregate;
    use crate::analysis::session::tests::{file, small_deck};

    fn paths<'a>(records: &[&'a FileRecord]) -> Vec<&'a str> {
        records.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.max_files_shown, 40);
        assert!(config.show_images);
        assert!(!config.show_slides);
        assert!(!config.show_other_categories);
    }

    #[test]
    fn default_config_on_small_deck_shows_only_the_image() {
        let session = aggregate("deck.pptx", small_deck());
        for limit in [1, 2, 40, 500, 10_000] {
            let config = DisplayConfig {
                max_files_shown: limit,
                ..DisplayConfig::default()
            };
            assert_eq!(
                paths(&select_visible(&session.files, &config)),
                ["ppt/media/image1.png"],
                "limit {limit}"
            );
        }
    }

    #[test]
    fn flags_select_categories() {
        let session = aggregate("deck.pptx", small_deck());
        let config = DisplayConfig {
            show_images: false,
            show_slides: true,
            show_other_categories: true,
            ..DisplayConfig::default()
        };
        assert_eq!(
            paths(&select_visible(&session.files, &config)),
            ["ppt/fonts/font1.ttf", "ppt/slides/slide1.xml"]
        );

        let nothing = DisplayConfig {
            show_images: false,
            ..DisplayConfig::default()
        };
        assert!(select_visible(&session.files, &nothing).is_empty());
    }

    #[test]
    fn limit_keeps_the_largest_visible_files() {
        let entries: Vec<_> = (0..700u64)
            .map(|i| file(&format!("ppt/media/image{i}.png"), i))
            .collect();
        let session = aggregate("big.pptx", entries);

        let mut config = DisplayConfig::default();
        let visible = select_visible(&session.files, &config);
        assert_eq!(visible.len(), 40);
        assert_eq!(visible[0].size, 699);
        assert_eq!(visible[39].size, 660);

        config.max_files_shown = 0;
        assert_eq!(select_visible(&session.files, &config).len(), 1);

        config.max_files_shown = 501;
        assert_eq!(select_visible(&session.files, &config).len(), 500);
    }

    #[test]
    fn selection_respects_limit_and_flags_for_every_combination() {
        let session = aggregate(
            "mixed.pptx",
            (0..60u64).flat_map(|i| {
                [
                    file(&format!("ppt/media/image{i}.png"), 1000 + i),
                    file(&format!("ppt/slides/slide{i}.xml"), 500 + i),
                    file(&format!("ppt/theme/theme{i}.xml"), 10 + i),
                ]
            }),
        );

        for mask in 0..8u8 {
            for limit in [0, 1, 7, 40, 100, 600] {
                let config = DisplayConfig {
                    max_files_shown: limit,
                    show_images: mask & 1 != 0,
                    show_slides: mask & 2 != 0,
                    show_other_categories: mask & 4 != 0,
                };
                let visible = select_visible(&session.files, &config);
                assert!(visible.len() <= config.effective_limit());
                assert!(visible.iter().all(|f| config.shows(f.category)));
                assert!(visible.windows(2).all(|w| w[0].size >= w[1].size));
            }
        }
    }

    #[test]
    fn set_limit_clamps() {
        let mut config = DisplayConfig::default();
        config.set_limit(-3);
        assert_eq!(config.max_files_shown, 1);
        config.set_limit(9_999);
        assert_eq!(config.max_files_shown, 500);
        config.set_limit(25);
        assert_eq!(config.max_files_shown, 25);
    }

    #[test]
    fn parse_limit_reads_a_leading_integer() {
        assert_eq!(parse_limit("25"), Some(25));
        assert_eq!(parse_limit("  7 "), Some(7));
        assert_eq!(parse_limit("12abc"), Some(12));
        assert_eq!(parse_limit("-4"), Some(-4));
        assert_eq!(parse_limit("+9"), Some(9));
        assert_eq!(parse_limit("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_limit(""), None);
        assert_eq!(parse_limit("abc"), None);
        assert_eq!(parse_limit("-"), None);
        assert_eq!(parse_limit("1.5"), Some(1));
    }
}
