//! Decoded source file snapshots.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::encoding::{self, ByteOrderMark};
use crate::{HostError, HostResult};

/// A file read through an [`IoHost`](crate::IoHost).
///
/// Identity is the normalized absolute path. Buffers are shared, so cloning
/// is cheap and every clone observes the same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    raw: Arc<[u8]>,
    marker: ByteOrderMark,
    text: Arc<str>,
}

impl SourceFile {
    /// Decode raw bytes read from `path`.
    pub fn decode(path: impl Into<PathBuf>, raw: impl Into<Arc<[u8]>>) -> HostResult<Self> {
        let path = path.into();
        let raw: Arc<[u8]> = raw.into();
        let (marker, text) = encoding::decode(&raw).map_err(|e| HostError::Decode {
            path: path.clone(),
            marker: ByteOrderMark::detect(&raw),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path,
            raw,
            marker,
            text: text.into(),
        })
    }

    /// Build a snapshot from text that was never on disk.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            raw: Arc::from(text.as_bytes()),
            marker: ByteOrderMark::Absent,
            text: Arc::from(text),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn marker(&self) -> ByteOrderMark {
        self.marker
    }

    /// Decoded text, marker excluded.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Directory containing this file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_keeps_raw_bytes_and_strips_marker() {
        let raw = vec![0xEF, 0xBB, 0xBF, b'x'];
        let file = SourceFile::decode("/p/a.ts", raw.clone()).unwrap();
        assert_eq!(file.raw(), raw.as_slice());
        assert_eq!(file.text(), "x");
        assert_eq!(file.marker(), ByteOrderMark::Utf8);
        assert_eq!(file.directory(), Path::new("/p"));
    }

    #[test]
    fn decode_failure_names_the_file() {
        let err = SourceFile::decode("/p/bad.ts", vec![0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(err.to_string().contains("bad.ts"));
    }
}
