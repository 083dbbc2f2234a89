use flate2::read::DeflateDecoder;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use crate::analysis::ArchiveEntry;
use crate::error::ArchiveError;
use crate::io::ReadAt;

use super::parser::ZipParser;
use super::structures::{CentralEntry, CompressionMethod};

/// An opened archive: its listing plus on-demand access to entry content.
pub struct ArchiveReader<R: ReadAt + ?Sized> {
    parser: ZipParser<R>,
    entries: Vec<CentralEntry>,
    by_path: HashMap<String, usize>,
}

impl<R: ReadAt + ?Sized> ArchiveReader<R> {
    /// Read the central directory of `reader`.
    ///
    /// A name listed more than once is kept once, at its first position,
    /// with the record of its last occurrence.
    pub async fn open(reader: Arc<R>) -> Result<Self, ArchiveError> {
        let parser = ZipParser::new(reader);
        let listed = parser.read_central_directory().await?;

        let mut entries: Vec<CentralEntry> = Vec::with_capacity(listed.len());
        let mut by_path: HashMap<String, usize> = HashMap::with_capacity(listed.len());
        for entry in listed {
            if let Some(&i) = by_path.get(&entry.file_name) {
                tracing::debug!(path = %entry.file_name, "duplicate entry name");
                entries[i] = entry;
            } else {
                by_path.insert(entry.file_name.clone(), entries.len());
                entries.push(entry);
            }
        }

        Ok(Self {
            parser,
            entries,
            by_path,
        })
    }

    /// Entries in directory order, as the analysis sees them.
    pub fn entries(&self) -> impl Iterator<Item = ArchiveEntry> + '_ {
        self.entries.iter().map(|e| ArchiveEntry {
            path: e.file_name.clone(),
            is_directory: e.is_directory,
            uncompressed_size: e.uncompressed_size,
        })
    }

    pub fn central_entries(&self) -> &[CentralEntry] {
        &self.entries
    }

    pub fn reader(&self) -> &Arc<R> {
        self.parser.reader()
    }

    /// Size of the archive itself, compressed.
    pub fn source_size(&self) -> u64 {
        self.parser.reader().size()
    }

    /// Fetch and decompress the content of the file entry at `path`.
    pub async fn fetch(&self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        let entry = self
            .by_path
            .get(path)
            .map(|&i| &self.entries[i])
            .filter(|e| !e.is_directory)
            .ok_or_else(|| ArchiveError::EntryNotFound(path.to_string()))?;

        let method = entry.compression_method;
        if !matches!(method, CompressionMethod::Stored | CompressionMethod::Deflate) {
            return Err(ArchiveError::UnsupportedCompression {
                path: path.to_string(),
                method: method.as_u16(),
            });
        }

        let data_offset = self.parser.data_offset(entry).await?;
        let fits = data_offset
            .checked_add(entry.compressed_size)
            .is_some_and(|end| end <= self.source_size());
        if !fits {
            return Err(ArchiveError::Malformed("entry data range"));
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut raw)
            .await
            .map_err(ArchiveError::read)?;

        let data = match method {
            CompressionMethod::Deflate => inflate(path, &raw, entry.uncompressed_size)?,
            _ => raw,
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(ArchiveError::Corrupt {
                path: path.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!(
                        "expected {} bytes, got {}",
                        entry.uncompressed_size,
                        data.len()
                    ),
                ),
            });
        }

        tracing::debug!(path, bytes = data.len(), ?method, "fetched entry");
        Ok(data)
    }
}

fn inflate(path: &str, raw: &[u8], expected: u64) -> Result<Vec<u8>, ArchiveError> {
    let mut out = Vec::with_capacity(expected.min(64 << 20) as usize);
    // One byte past the expected size is enough to detect an oversized stream.
    DeflateDecoder::new(raw)
        .take(expected.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|source| ArchiveError::Corrupt {
            path: path.to_string(),
            source,
        })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryReader;
    use crate::zip::test_support::{Fixture, RawEntry, Zip64Fixture};

    async fn open(bytes: Vec<u8>) -> ArchiveReader<MemoryReader> {
        ArchiveReader::open(Arc::new(MemoryReader::new(bytes)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fetches_stored_content() {
        let png = [0x89u8, b'P', b'N', b'G', 1, 2, 3];
        let archive = open(
            Fixture::new()
                .dir("ppt/media/")
                .file("ppt/media/image1.png", &png)
                .build(),
        )
        .await;

        assert_eq!(archive.fetch("ppt/media/image1.png").await.unwrap(), png);
    }

    #[tokio::test]
    async fn fetches_deflated_content() {
        let xml = "<p:sld>".repeat(200);
        let archive = open(
            Fixture::new()
                .deflated("ppt/slides/slide1.xml", xml.as_bytes())
                .build(),
        )
        .await;

        let entry = &archive.central_entries()[0];
        assert_eq!(entry.compression_method, CompressionMethod::Deflate);
        assert!(entry.compressed_size < entry.uncompressed_size);
        assert_eq!(
            archive.fetch("ppt/slides/slide1.xml").await.unwrap(),
            xml.as_bytes()
        );
    }

    #[tokio::test]
    async fn unknown_paths_and_directories_are_not_found() {
        let archive = open(
            Fixture::new()
                .dir("ppt/media/")
                .file("ppt/media/image1.png", b"png")
                .build(),
        )
        .await;

        for path in ["ppt/media/image2.png", "ppt/media/"] {
            assert!(matches!(
                archive.fetch(path).await,
                Err(ArchiveError::EntryNotFound(p)) if p == path
            ));
        }
    }

    #[tokio::test]
    async fn entries_carry_sizes_and_directory_flags() {
        let archive = open(
            Fixture::new()
                .dir("ppt/")
                .file("ppt/presentation.xml", &[0u8; 97])
                .build(),
        )
        .await;

        let entries: Vec<_> = archive.entries().collect();
        assert_eq!(
            entries,
            vec![
                ArchiveEntry {
                    path: "ppt/".into(),
                    is_directory: true,
                    uncompressed_size: 0,
                },
                ArchiveEntry {
                    path: "ppt/presentation.xml".into(),
                    is_directory: false,
                    uncompressed_size: 97,
                },
            ]
        );
    }

    #[tokio::test]
    async fn fetches_from_a_zip64_archive() {
        let archive = open(
            Zip64Fixture::new()
                .entry(RawEntry::stored("ppt/media/image1.png", b"\x89PNG"))
                .build(),
        )
        .await;
        assert_eq!(
            archive.fetch("ppt/media/image1.png").await.unwrap(),
            b"\x89PNG"
        );
    }

    #[tokio::test]
    async fn saturated_uncompressed_size_is_corrupt_not_a_panic() {
        use flate2::{Compression, write::DeflateEncoder};
        use std::io::Write;

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"<p:sld/>").unwrap();
        let archive = open(
            Zip64Fixture::new()
                .entry(RawEntry {
                    method: 8,
                    data: encoder.finish().unwrap(),
                    uncompressed_size: u64::MAX,
                    ..RawEntry::stored("ppt/slides/slide1.xml", b"")
                })
                .build(),
        )
        .await;

        assert_eq!(archive.entries().next().unwrap().uncompressed_size, u64::MAX);
        assert!(matches!(
            archive.fetch("ppt/slides/slide1.xml").await,
            Err(ArchiveError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_names_keep_the_last_record() {
        let archive = open(
            Zip64Fixture::new()
                .entry(RawEntry::stored("ppt/media/image1.png", b"old"))
                .entry(RawEntry::stored("ppt/slides/slide1.xml", b"<p:sld/>"))
                .entry(RawEntry::stored("ppt/media/image1.png", b"newer"))
                .build(),
        )
        .await;

        let entries: Vec<_> = archive.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "ppt/media/image1.png");
        assert_eq!(entries[0].uncompressed_size, 5);
        assert_eq!(archive.fetch("ppt/media/image1.png").await.unwrap(), b"newer");
    }
}
