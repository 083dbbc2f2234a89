//! Size breakdown of a presentation archive.
//!
//! Everything here is synchronous and free of I/O: entries go in, a
//! [`AnalysisSession`] comes out, and views over it are recomputed on demand.
//!
//! - [`category`]: ordered path rules assigning each entry a [`Category`]
//! - [`session`]: aggregation into totals and a size-sorted file list
//! - [`view`]: [`DisplayConfig`] and the visible-file selection
//! - [`report`]: presentation rows and byte formatting

pub mod category;
pub mod report;
pub mod session;
pub mod view;

pub use category::{Category, categorize};
pub use report::{CategoryRow, FileRow, category_rows, file_rows, format_bytes, format_bytes_with};
pub use session::{AnalysisSession, ArchiveEntry, CategoryTotals, FileRecord, aggregate};
pub use view::{DisplayConfig, parse_limit, select_visible};
