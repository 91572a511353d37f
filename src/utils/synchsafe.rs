// Synch-safe and plain 32-bit size codec

use crate::error::{Id3Error, Result};

/// Largest value a 4-byte synch-safe integer can carry (28 bits).
pub const MAX_SYNCHSAFE: u32 = (1 << 28) - 1;

/// Decode a synch-safe integer (7 bits per byte, big-endian).
pub fn decode_synchsafe(bytes: [u8; 4]) -> Result<u32> {
    let mut value = 0u32;
    for byte in bytes {
        if byte & 0x80 != 0 {
            return Err(Id3Error::InvalidSizeFormat);
        }
        value = (value << 7) | byte as u32;
    }
    Ok(value)
}

/// Decode an ordinary big-endian 32-bit integer.
pub fn decode_plain(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Encode `value` as a synch-safe integer no larger than `max`.
pub fn encode_synchsafe(value: u32, max: u32) -> Result<[u8; 4]> {
    if value > max || value > MAX_SYNCHSAFE {
        return Err(Id3Error::SizeTooLarge {
            size: value as u64,
            max: max.min(MAX_SYNCHSAFE),
        });
    }

    let mut bytes = [0u8; 4];
    let mut rest = value;
    for byte in bytes.iter_mut().rev() {
        *byte = (rest & 0x7F) as u8;
        rest >>= 7;
    }
    Ok(bytes)
}

/// Decode a frame size using the form dictated by the tag version.
pub fn decode_frame_size(bytes: [u8; 4], version: u8) -> Result<u32> {
    if version >= 4 {
        decode_synchsafe(bytes)
    } else {
        Ok(decode_plain(bytes))
    }
}

/// Encode a frame size using the form dictated by the tag version.
pub fn encode_frame_size(size: u32, version: u8) -> Result<[u8; 4]> {
    if version >= 4 {
        encode_synchsafe(size, MAX_SYNCHSAFE)
    } else {
        Ok(size.to_be_bytes())
    }
}
