// Encoding utilities for ID3v2 text fields

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{UTF_16BE, UTF_16LE};
use serde::{Serialize, Serializer};
use tracing::warn;

/// One of the four text encodings an ID3v2 frame can declare.
///
/// Encodings are compared by their on-wire key only.
#[derive(Debug, Clone, Copy, Eq)]
pub struct Encoding {
    name: &'static str,
    key: u8,
    terminator: &'static [u8],
}

impl Encoding {
    /// ISO-8859-1, one byte per character.
    pub const ISO_8859_1: Encoding = Encoding {
        name: "ISO-8859-1",
        key: 0,
        terminator: &[0],
    };

    /// UTF-16 preceded by a byte order mark.
    pub const UTF_16: Encoding = Encoding {
        name: "UTF-16",
        key: 1,
        terminator: &[0, 0],
    };

    /// Big-endian UTF-16 without a byte order mark (ID3v2.4 only).
    pub const UTF_16BE: Encoding = Encoding {
        name: "UTF-16BE",
        key: 2,
        terminator: &[0, 0],
    };

    /// UTF-8 (ID3v2.4 only).
    pub const UTF_8: Encoding = Encoding {
        name: "UTF-8",
        key: 3,
        terminator: &[0],
    };

    /// Look an encoding up by the byte stored in a frame body.
    pub fn from_key(key: u8) -> Option<Encoding> {
        ENCODINGS.get(key as usize).copied()
    }

    /// Like [`Encoding::from_key`], falling back to ISO-8859-1 for unknown keys.
    pub fn from_byte(byte: u8) -> Encoding {
        Self::from_key(byte).unwrap_or_else(|| {
            warn!(byte, "unknown text encoding byte, assuming ISO-8859-1");
            Encoding::ISO_8859_1
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    /// The byte sequence that ends a terminated string in this encoding.
    pub fn terminator(&self) -> &'static [u8] {
        self.terminator
    }

    /// UTF-16BE and UTF-8 exist only in ID3v2.4.
    pub fn is_v4_only(&self) -> bool {
        self.key >= 2
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for Encoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

static ENCODINGS: [Encoding; 4] = [
    Encoding::ISO_8859_1,
    Encoding::UTF_16,
    Encoding::UTF_16BE,
    Encoding::UTF_8,
];

/// Decode text stored in `from`.
///
/// Malformed input never fails: the raw bytes are reinterpreted as text instead.
pub fn decode(data: &[u8], from: Encoding) -> String {
    match from.key {
        0 => data.iter().map(|&b| b as char).collect(),
        1 => {
            if data.len() < 2 {
                return String::new();
            }
            match data[..2] {
                [0xFF, 0xFE] => decode_utf16(UTF_16LE, &data[2..], data),
                [0xFE, 0xFF] => decode_utf16(UTF_16BE, &data[2..], data),
                _ => decode_utf16(UTF_16BE, data, data),
            }
        }
        2 => decode_utf16(UTF_16BE, data, data),
        _ => String::from_utf8_lossy(data).into_owned(),
    }
}

fn decode_utf16(codec: &'static encoding_rs::Encoding, body: &[u8], raw: &[u8]) -> String {
    match codec.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => text.into_owned(),
        None => {
            warn!(
                encoding = codec.name(),
                len = raw.len(),
                "malformed text, keeping raw bytes"
            );
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}

/// Encode `text` into `to`.
///
/// UTF-16 is always written big-endian; only [`Encoding::UTF_16`] gets the `FE FF` mark.
/// Characters ISO-8859-1 cannot represent are replaced with `?`.
pub fn encode(text: &str, to: Encoding) -> Cow<'_, [u8]> {
    match to.key {
        0 => {
            let mut replaced = 0usize;
            let bytes: Vec<u8> = text
                .chars()
                .map(|c| match u8::try_from(c as u32) {
                    Ok(b) => b,
                    Err(_) => {
                        replaced += 1;
                        b'?'
                    }
                })
                .collect();
            if replaced > 0 {
                warn!(replaced, "characters outside ISO-8859-1 replaced with '?'");
            }
            Cow::Owned(bytes)
        }
        1 => {
            let mut bytes = vec![0xFE, 0xFF];
            bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
            Cow::Owned(bytes)
        }
        2 => Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        _ => Cow::Borrowed(text.as_bytes()),
    }
}

/// Exact number of bytes [`encode`] produces for `text`.
pub fn encoded_size(text: &str, to: Encoding) -> usize {
    if to == Encoding::UTF_8 {
        text.len()
    } else {
        encode(text, to).len()
    }
}
