//! Central directory parsing.
//!
//! Reads the ZIP structures a size breakdown needs from any source that
//! implements [`ReadAt`].
//!
//! ## Parsing Strategy
//!
//! ZIP files are read from the end:
//! 1. Find the End of Central Directory (EOCD) record at the file's end
//! 2. If its fields are saturated, follow the ZIP64 locator to the ZIP64 record
//! 3. Read the Central Directory, which lists every entry with its sizes
//! 4. Only when content is fetched, read that entry's Local File Header
//!
//! Listing therefore touches only the tail of the archive, which keeps
//! remote sources down to a couple of Range requests.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::error::ArchiveError;
use crate::io::ReadAt;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// Bounds the backward search for an EOCD followed by a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// MS-DOS directory bit of the external file attributes.
const DOS_DIRECTORY_ATTR: u32 = 0x10;

/// Reads ZIP structures from any [`ReadAt`] source.
///
/// Usually driven through [`ArchiveReader`](super::ArchiveReader), which
/// keeps the listing and resolves paths for content fetches.
///
/// ## Example
///
/// ```ignore
/// let parser = ZipParser::new(reader);
/// for entry in parser.read_central_directory().await? {
///     let offset = parser.data_offset(&entry).await?;
///     // entry.compressed_size bytes of data start at offset
/// }
/// ```
pub struct ZipParser<R: ReadAt + ?Sized> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt + ?Sized> ZipParser<R> {
    /// Create a parser for `reader`.
    ///
    /// # Arguments
    ///
    /// * `reader` - A shared reader implementing [`ReadAt`]; its size is
    ///   read once here
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    async fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), ArchiveError> {
        self.reader
            .read_exact_at(offset, buf)
            .await
            .map_err(ArchiveError::read)
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Tries the last 22 bytes first, then searches backwards through the
    /// largest comment the format allows.
    ///
    /// # Returns
    ///
    /// The EOCD record and its offset in the archive.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::NotAnArchive`] when no record whose comment runs to
    /// the end of the file exists.
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64), ArchiveError> {
        let eocd_size = EndOfCentralDirectory::SIZE as u64;
        if self.size < eocd_size {
            return Err(ArchiveError::NotAnArchive);
        }

        // Common case: no archive comment, the record is the last 22 bytes.
        let offset = self.size - eocd_size;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.read_exact_at(offset, &mut buf).await?;
        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && buf[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::from_bytes(&buf)?, offset));
        }

        let search_size = (MAX_COMMENT_SIZE + eocd_size).min(self.size);
        let search_start = self.size - search_size;
        let mut buf = vec![0u8; search_size as usize];
        self.read_exact_at(search_start, &mut buf).await?;

        for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
            if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            // The comment must run exactly to the end of the file.
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, search_start + i as u64));
            }
        }

        Err(ArchiveError::NotAnArchive)
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// # Arguments
    ///
    /// * `eocd_offset` - Offset of the regular EOCD; the locator sits just
    ///   before it
    async fn read_zip64_eocd(
        &self,
        eocd_offset: u64,
    ) -> Result<Zip64EndOfCentralDirectory, ArchiveError> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64Locator::SIZE as u64)
            .ok_or(ArchiveError::Malformed("zip64 locator"))?;
        let mut locator_buf = vec![0u8; Zip64Locator::SIZE];
        self.read_exact_at(locator_offset, &mut locator_buf).await?;
        let locator = Zip64Locator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64EndOfCentralDirectory::MIN_SIZE];
        self.read_exact_at(locator.eocd64_offset, &mut eocd64_buf)
            .await?;
        Zip64EndOfCentralDirectory::from_bytes(&eocd64_buf)
    }

    /// Read every central directory record, in directory order.
    ///
    /// # Returns
    ///
    /// One [`CentralEntry`] per record, directories included, with ZIP64
    /// sizes and offsets already applied.
    ///
    /// # Errors
    ///
    /// * [`ArchiveError::NotAnArchive`] if no EOCD is found
    /// * [`ArchiveError::DirectoryOutOfBounds`] if the directory does not
    ///   fit inside the archive
    /// * [`ArchiveError::Malformed`] or [`ArchiveError::Truncated`] if a
    ///   record is damaged
    pub async fn read_central_directory(&self) -> Result<Vec<CentralEntry>, ArchiveError> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset).await?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        let in_bounds = cd_offset
            .checked_add(cd_size)
            .is_some_and(|end| end <= self.size);
        if !in_bounds {
            return Err(ArchiveError::DirectoryOutOfBounds {
                offset: cd_offset,
                size: cd_size,
                archive_size: self.size,
            });
        }

        tracing::debug!(cd_offset, cd_size, total_entries, "reading central directory");

        let mut cd_data = vec![0u8; cd_size as usize];
        self.read_exact_at(cd_offset, &mut cd_data).await?;

        // A lying entry count must not drive a huge allocation.
        let capacity = total_entries.min(cd_size / CDFH_MIN_SIZE as u64) as usize;
        let mut entries = Vec::with_capacity(capacity);
        let mut cursor = Cursor::new(cd_data.as_slice());
        for _ in 0..total_entries {
            entries.push(parse_cdfh(&mut cursor)?);
        }

        Ok(entries)
    }

    /// Offset of an entry's (possibly compressed) data.
    ///
    /// The local header repeats the name and carries its own extra field,
    /// whose length may differ from the central directory's copy.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::Malformed`] if no local header signature is found at
    /// the entry's recorded offset.
    pub async fn data_offset(&self, entry: &CentralEntry) -> Result<u64, ArchiveError> {
        let mut lfh = [0u8; LFH_SIZE];
        self.read_exact_at(entry.lfh_offset, &mut lfh).await?;
        if &lfh[0..4] != LFH_SIGNATURE {
            return Err(ArchiveError::Malformed("local file header"));
        }

        let name_len = u16::from_le_bytes([lfh[26], lfh[27]]) as u64;
        let extra_len = u16::from_le_bytes([lfh[28], lfh[29]]) as u64;
        Ok(entry.lfh_offset + LFH_SIZE as u64 + name_len + extra_len)
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}

fn skip(cursor: &mut Cursor<&[u8]>, n: u64) {
    cursor.set_position(cursor.position() + n);
}

fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<CentralEntry, ArchiveError> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if &sig[..] != CDFH_SIGNATURE {
        return Err(ArchiveError::Malformed("central directory file header"));
    }

    // version made by, version needed, flags
    skip(cursor, 6);
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    // modification time, date and crc32
    skip(cursor, 8);
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let name_len = cursor.read_u16::<LittleEndian>()?;
    let extra_len = cursor.read_u16::<LittleEndian>()? as u64;
    let comment_len = cursor.read_u16::<LittleEndian>()? as u64;
    // disk number start, internal attributes
    skip(cursor, 4);
    let external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name = vec![0u8; name_len as usize];
    cursor.read_exact(&mut name)?;
    let file_name = String::from_utf8_lossy(&name).into_owned();
    let is_directory = file_name.ends_with('/') || (external_attrs & DOS_DIRECTORY_ATTR) != 0;

    let extra_end = cursor.position() + extra_len;
    while cursor.position() + 4 <= extra_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()? as u64;
        // A field overrunning the extra area is cut at its end.
        let field_end = (cursor.position() + field_size).min(extra_end);

        if header_id == ZIP64_EXTRA_ID {
            // Only the fields saturated in the fixed header are present, in this order.
            for value in [&mut uncompressed_size, &mut compressed_size, &mut lfh_offset] {
                if *value != 0xFFFF_FFFF {
                    continue;
                }
                if cursor.position() + 8 > field_end {
                    return Err(ArchiveError::Malformed("zip64 extra field"));
                }
                *value = cursor.read_u64::<LittleEndian>()?;
            }
        }
        cursor.set_position(field_end);
    }

    cursor.set_position(extra_end + comment_len);
    if cursor.position() > cursor.get_ref().len() as u64 {
        return Err(ArchiveError::Malformed("central directory file header"));
    }

    Ok(CentralEntry {
        file_name,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        lfh_offset,
        is_directory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryReader;
    use crate::zip::test_support::{Fixture, RawEntry, Zip64Fixture};

    fn parser(bytes: Vec<u8>) -> ZipParser<MemoryReader> {
        ZipParser::new(Arc::new(MemoryReader::new(bytes)))
    }

    #[tokio::test]
    async fn lists_entries_in_directory_order() {
        let bytes = Fixture::new()
            .dir("ppt/")
            .file("ppt/slides/slide1.xml", b"<p:sld/>")
            .file("ppt/media/image1.png", &[7u8; 300])
            .build();

        let entries = parser(bytes).read_central_directory().await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, ["ppt/", "ppt/slides/slide1.xml", "ppt/media/image1.png"]);
        assert!(entries[0].is_directory);
        assert!(!entries[1].is_directory);
        assert_eq!(entries[1].uncompressed_size, 8);
        assert_eq!(entries[2].uncompressed_size, 300);
    }

    #[tokio::test]
    async fn finds_eocd_behind_a_comment() {
        let bytes = Fixture::new()
            .file("docProps/app.xml", b"<Properties/>")
            .comment("exported by a slide tool")
            .build();

        let p = parser(bytes);
        let (eocd, _) = p.find_eocd().await.unwrap();
        assert_eq!(eocd.comment_len as usize, "exported by a slide tool".len());
        let entries = p.read_central_directory().await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn rejects_data_that_is_not_a_zip() {
        let err = parser(b"definitely not a presentation, just some text".to_vec())
            .read_central_directory()
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::NotAnArchive));

        let err = parser(Vec::new()).read_central_directory().await.unwrap_err();
        assert!(matches!(err, ArchiveError::NotAnArchive));
    }

    #[tokio::test]
    async fn rejects_directory_outside_the_archive() {
        let mut bytes = Fixture::new().file("a.xml", b"x").build();
        let eocd = bytes.len() - EndOfCentralDirectory::SIZE;
        bytes[eocd + 16..eocd + 20].copy_from_slice(&0x00FF_FFFFu32.to_le_bytes());

        let err = parser(bytes).read_central_directory().await.unwrap_err();
        assert!(matches!(err, ArchiveError::DirectoryOutOfBounds { .. }));
    }

    #[tokio::test]
    async fn reads_zip64_records_and_extra_fields() {
        let bytes = Zip64Fixture::new()
            .entry(RawEntry::stored("ppt/media/image1.png", &[1u8; 300]))
            .entry(RawEntry {
                uncompressed_size: 6 << 30,
                ..RawEntry::stored("ppt/media/video1.mp4", b"mp4")
            })
            .build();

        let entries = parser(bytes).read_central_directory().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].uncompressed_size, 300);
        assert_eq!(entries[0].compressed_size, 300);
        assert_eq!(entries[0].lfh_offset, 0);
        assert_eq!(entries[1].file_name, "ppt/media/video1.mp4");
        assert_eq!(entries[1].uncompressed_size, 6 << 30);
        assert_eq!(entries[1].compressed_size, 3);
        assert_eq!(entries[1].lfh_offset, (30 + 20 + 20 + 300) as u64);
    }

    #[tokio::test]
    async fn zip64_data_offset_skips_the_local_extra_field() {
        let bytes = Zip64Fixture::new()
            .entry(RawEntry::stored("a.xml", b"<a/>"))
            .build();

        let p = parser(bytes);
        let entries = p.read_central_directory().await.unwrap();
        assert_eq!(p.data_offset(&entries[0]).await.unwrap(), 30 + 5 + 20);
    }

    #[tokio::test]
    async fn rejects_a_cut_zip64_extra_field() {
        // header plus the uncompressed size; compressed size and offset are missing
        let bytes = Zip64Fixture::new()
            .entry(RawEntry::stored("ppt/slides/slide1.xml", b"<p:sld/>"))
            .cut_extra_to(12)
            .build();

        let err = parser(bytes).read_central_directory().await.unwrap_err();
        assert!(matches!(err, ArchiveError::Malformed("zip64 extra field")));
    }

    #[tokio::test]
    async fn dos_directory_attribute_marks_a_directory() {
        let bytes = Zip64Fixture::new()
            .entry(RawEntry {
                external_attrs: 0x10,
                ..RawEntry::stored("ppt/media", b"")
            })
            .entry(RawEntry {
                external_attrs: 0x20,
                ..RawEntry::stored("ppt/media/image1.png", b"png")
            })
            .build();

        let entries = parser(bytes).read_central_directory().await.unwrap();
        assert!(entries[0].is_directory);
        assert!(!entries[1].is_directory);
    }
}
