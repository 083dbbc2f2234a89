//! # pptx-weigh
//!
//! Find out what makes a PowerPoint file big.
//!
//! A `.pptx` is a ZIP archive. This crate reads its central directory (from a
//! local file, from memory, or from an HTTP server via Range requests), sorts
//! every entry into one of eight storage categories, and reports per-category
//! totals together with the largest files.
//!
//! ## Features
//!
//! - Category breakdown: images, video, audio, other media, fonts, slides, embeds, structure
//! - Size-sorted file listing with category filters and a count limit
//! - On-demand content fetch of single entries (STORED and DEFLATE)
//! - Remote archives over HTTP Range requests, reading only the directory
//!
//! ## Example
//!
//! ```no_run
//! use pptx_weigh::{Controller, DisplayConfig, LoadState, format_bytes};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut controller = Controller::new(DisplayConfig::default());
//!     if controller.load("talk.pptx").await == LoadState::Ready {
//!         for file in controller.visible() {
//!             println!("{:>10}  {}", format_bytes(file.size), file.path);
//!         }
//!     }
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod io;
pub mod render;
pub mod repl;
pub mod zip;

pub use analysis::{
    AnalysisSession, ArchiveEntry, Category, DisplayConfig, FileRecord, aggregate, categorize,
    format_bytes, select_visible,
};
pub use cli::Cli;
pub use controller::{Controller, LoadState, Toggle};
pub use error::{ArchiveError, LoadError, PreviewError};
pub use io::{HttpRangeReader, LocalFileReader, MemoryReader, ReadAt};
pub use crate::zip::ArchiveReader;
