//! Aggregating archive entries into a size breakdown.

use serde::Serialize;
use std::cmp::Reverse;
use std::ops::Index;

use super::category::{Category, categorize};

/// One entry of an archive listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub is_directory: bool,
    pub uncompressed_size: u64,
}

/// A contained file with its category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub size: u64,
    pub category: Category,
}

/// Uncompressed bytes per category; every category is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals([u64; Category::COUNT]);

impl CategoryTotals {
    pub fn get(&self, category: Category) -> u64 {
        self.0[category.index()]
    }

    fn add(&mut self, category: Category, size: u64) {
        let slot = &mut self.0[category.index()];
        *slot = slot.saturating_add(size);
    }

    /// All categories in declaration order, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.iter().map(|&c| (c, self.get(c)))
    }

    pub fn sum(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, &n| acc.saturating_add(n))
    }
}

impl Index<Category> for CategoryTotals {
    type Output = u64;

    fn index(&self, category: Category) -> &u64 {
        &self.0[category.index()]
    }
}

/// The analysis of one loaded presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSession {
    pub filename_label: String,
    pub total_uncompressed_size: u64,
    pub category_totals: CategoryTotals,
    /// Largest first; equal sizes keep archive order.
    pub files: Vec<FileRecord>,
}

impl AnalysisSession {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Build a session from an archive listing.
///
/// Directory entries contribute neither size nor a record.
pub fn aggregate<I>(filename_label: impl Into<String>, entries: I) -> AnalysisSession
where
    I: IntoIterator<Item = ArchiveEntry>,
{
    let mut total = 0u64;
    let mut totals = CategoryTotals::default();
    let mut files = Vec::new();

    for entry in entries.into_iter().filter(|e| !e.is_directory) {
        let category = categorize(&entry.path);
        let size = entry.uncompressed_size;
        total = total.saturating_add(size);
        totals.add(category, size);
        files.push(FileRecord {
            path: entry.path,
            size,
            category,
        });
    }

    // sort_by_key is stable
    files.sort_by_key(|f| Reverse(f.size));

    AnalysisSession {
        filename_label: filename_label.into(),
        total_uncompressed_size: total,
        category_totals: totals,
        files,
    }
}
