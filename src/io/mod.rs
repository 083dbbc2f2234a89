//! Random-access byte sources an archive can be read from.

mod http;
mod local;
mod memory;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;
pub use memory::MemoryReader;

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer.
    ///
    /// May return fewer bytes than requested; zero means end of source.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Bytes moved over the network so far, for remote sources.
    fn transferred_bytes(&self) -> Option<u64> {
        None
    }

    /// Fill `buf` completely from `offset`, failing on a premature end.
    async fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_at(offset + filled as u64, &mut buf[filled..]).await?;
            if n == 0 {
                bail!(
                    "Unexpected end of data at offset {} ({} of {} bytes read)",
                    offset + filled as u64,
                    filled,
                    buf.len()
                );
            }
            filled += n;
        }
        Ok(())
    }
}

pub fn is_http_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Open a local path or an `http(s)://` URL.
pub async fn open_source(input: &str) -> Result<Arc<dyn ReadAt>> {
    if is_http_url(input) {
        Ok(Arc::new(HttpRangeReader::new(input.to_string()).await?))
    } else {
        Ok(Arc::new(LocalFileReader::new(Path::new(input))?))
    }
}

/// Short display name for an input: its last path segment.
pub fn source_label(input: &str) -> String {
    let trimmed = if is_http_url(input) {
        input.split(['?', '#']).next().unwrap_or(input)
    } else {
        input
    };
    trimmed
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(input)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_the_last_segment() {
        assert_eq!(source_label("decks/q3-review.pptx"), "q3-review.pptx");
        assert_eq!(source_label("C:\\Users\\me\\talk.pptx"), "talk.pptx");
        assert_eq!(
            source_label("https://example.com/files/all-hands.pptx?sig=abc"),
            "all-hands.pptx"
        );
        assert_eq!(source_label("plain.pptx"), "plain.pptx");
    }

    #[test]
    fn recognises_urls() {
        assert!(is_http_url("https://example.com/a.pptx"));
        assert!(is_http_url("http://example.com/a.pptx"));
        assert!(!is_http_url("httpdocs/a.pptx"));
    }

    #[tokio::test]
    async fn read_exact_at_fails_on_short_source() {
        let reader = MemoryReader::new(b"abc".to_vec());
        let mut buf = [0u8; 2];
        reader.read_exact_at(1, &mut buf).await.unwrap();
        assert_eq!(&buf, b"bc");
        assert!(reader.read_exact_at(2, &mut buf).await.is_err());
        assert_eq!(reader.transferred_bytes(), None);
    }
}
