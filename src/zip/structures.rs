//! On-disk ZIP records.
//!
//! Each record keeps only the fields listing and fetching rely on. All
//! multi-byte values are little-endian, as the format requires.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::ArchiveError;

/// ZIP compression methods
///
/// Presentations only use STORED and DEFLATE; anything else is kept as its
/// raw method number so it can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// End of Central Directory record, 22 bytes plus comment
pub struct EndOfCentralDirectory {
    /// Total number of central directory records
    pub total_entries: u16,
    /// Size of the central directory in bytes
    pub cd_size: u32,
    /// Offset of the central directory from the start of the archive
    pub cd_offset: u32,
    /// Length of the trailing archive comment
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Parse a record from at least [`Self::SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::Malformed`] if the data is short or the signature
    /// does not match.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ArchiveError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ArchiveError::Malformed("end of central directory"));
        }

        // Skip the disk numbers; multi-disk archives are not a pptx thing.
        let mut cursor = Cursor::new(&data[8..]);
        let _disk_entries = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// True when any field is saturated, meaning the real value lives in
    /// the ZIP64 record.
    pub fn is_zip64(&self) -> bool {
        self.total_entries == 0xFFFF || self.cd_size == 0xFFFFFFFF || self.cd_offset == 0xFFFFFFFF
    }
}

/// ZIP64 End of Central Directory Locator, 20 bytes
pub struct Zip64Locator {
    /// Offset of the ZIP64 End of Central Directory record
    pub eocd64_offset: u64,
}

impl Zip64Locator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArchiveError> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ArchiveError::Malformed("zip64 locator"));
        }

        let mut cursor = Cursor::new(&data[8..]);
        Ok(Self {
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory record, 56 bytes minimum
pub struct Zip64EndOfCentralDirectory {
    /// Total number of central directory records
    pub total_entries: u64,
    /// Size of the central directory in bytes
    pub cd_size: u64,
    /// Offset of the central directory from the start of the archive
    pub cd_offset: u64,
}

impl Zip64EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArchiveError> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ArchiveError::Malformed("zip64 end of central directory"));
        }

        // record size, versions, disk numbers and per-disk count come first
        let mut cursor = Cursor::new(&data[32..]);
        Ok(Self {
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header, 46 bytes before the variable fields
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header, 30 bytes before the variable fields
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Extra field tag carrying 64-bit sizes and offsets
pub const ZIP64_EXTRA_ID: u16 = 0x0001;

/// One central directory record, as much of it as listing and fetching need
#[derive(Debug, Clone)]
pub struct CentralEntry {
    /// Path inside the archive, decoded lossily as UTF-8
    pub file_name: String,
    pub compression_method: CompressionMethod,
    /// Size of the stored data in bytes
    pub compressed_size: u64,
    /// Size after decompression in bytes
    pub uncompressed_size: u64,
    /// Offset of the entry's Local File Header
    pub lfh_offset: u64,
    /// Name ends with `/` or the MS-DOS directory attribute is set
    pub is_directory: bool,
}
