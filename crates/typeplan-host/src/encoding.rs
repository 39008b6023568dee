//! Byte-order-mark detection and text decoding.
//!
//! Only the first two bytes are inspected. A UTF-8 marker is recognized by
//! `EF BB` and then skipped as a full three-byte marker.

use std::fmt;

/// Encoding marker found at the start of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrderMark {
    /// No marker; the content is decoded as UTF-8.
    #[default]
    Absent,
    /// `EF BB BF`
    Utf8,
    /// `FE FF`
    Utf16Be,
    /// `FF FE`
    Utf16Le,
}

impl ByteOrderMark {
    /// Detect the marker from the leading bytes of a file.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes {
            [0xFE, 0xFF, ..] => ByteOrderMark::Utf16Be,
            [0xFF, 0xFE, ..] => ByteOrderMark::Utf16Le,
            [0xEF, 0xBB, ..] => ByteOrderMark::Utf8,
            _ => ByteOrderMark::Absent,
        }
    }

    /// The marker bytes as written to disk.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            ByteOrderMark::Absent => &[],
            ByteOrderMark::Utf8 => &[0xEF, 0xBB, 0xBF],
            ByteOrderMark::Utf16Be => &[0xFE, 0xFF],
            ByteOrderMark::Utf16Le => &[0xFF, 0xFE],
        }
    }

    pub fn is_present(self) -> bool {
        self != ByteOrderMark::Absent
    }
}

impl fmt::Display for ByteOrderMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ByteOrderMark::Absent => "utf-8",
            ByteOrderMark::Utf8 => "utf-8 (bom)",
            ByteOrderMark::Utf16Be => "utf-16be",
            ByteOrderMark::Utf16Le => "utf-16le",
        })
    }
}

/// Reason a byte buffer could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid UTF-8 at byte {0}")]
    InvalidUtf8(usize),

    #[error("odd number of bytes in UTF-16 content")]
    OddLength,

    #[error("unpaired UTF-16 surrogate")]
    UnpairedSurrogate,
}

/// Decode raw file content, returning the detected marker and the text
/// without the marker.
pub fn decode(bytes: &[u8]) -> Result<(ByteOrderMark, String), DecodeError> {
    let marker = ByteOrderMark::detect(bytes);
    let body = bytes.get(marker.as_bytes().len()..).unwrap_or(&[]);

    let text = match marker {
        ByteOrderMark::Absent | ByteOrderMark::Utf8 => String::from_utf8(body.to_vec())
            .map_err(|e| DecodeError::InvalidUtf8(e.utf8_error().valid_up_to()))?,
        ByteOrderMark::Utf16Be => {
            // Swap each pair into little-endian order, then share the LE path.
            let swapped: Vec<u8> = body
                .chunks(2)
                .flat_map(|pair| pair.iter().rev().copied())
                .collect();
            decode_utf16le(&swapped)?
        }
        ByteOrderMark::Utf16Le => decode_utf16le(body)?,
    };

    Ok((marker, text))
}

fn decode_utf16le(body: &[u8]) -> Result<String, DecodeError> {
    if body.len() % 2 != 0 {
        return Err(DecodeError::OddLength);
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| DecodeError::UnpairedSurrogate)
}

/// Encode text for writing, prefixed with the marker's bytes.
pub fn encode(text: &str, marker: ByteOrderMark) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 3);
    out.extend_from_slice(marker.as_bytes());
    match marker {
        ByteOrderMark::Absent | ByteOrderMark::Utf8 => out.extend_from_slice(text.as_bytes()),
        ByteOrderMark::Utf16Be => {
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_be_bytes());
            }
        }
        ByteOrderMark::Utf16Le => {
            for unit in text.encode_utf16() {
                out.extend_from_slice(&unit.to_le_bytes());
            }
        }
    }
    out
}
