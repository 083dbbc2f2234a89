//! ZIP archive reading.
//!
//! A `.pptx` is a ZIP container. This module reads its central directory to
//! list entries and their uncompressed sizes without touching entry data,
//! which keeps remote inspection over HTTP Range requests cheap. Content is
//! fetched per entry on demand.
//!
//! - [`structures`]: fixed-layout records (EOCD, ZIP64, header constants)
//! - [`parser`]: central directory and local header parsing
//! - [`archive`]: the opened archive with path lookup and content fetch
//!
//! ## Supported Features
//!
//! - Standard ZIP format and ZIP64 extensions
//! - STORED and DEFLATE entries
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support

mod archive;
mod parser;
mod structures;

pub use archive::ArchiveReader;
pub use parser::ZipParser;
pub use structures::*;
