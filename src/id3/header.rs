// ID3v2 tag header: "ID3", version, revision, flags, synch-safe size

use std::io::Read;

use tracing::debug;

use crate::error::{Id3Error, Result};
use crate::utils::io::read_full;
use crate::utils::synchsafe::{decode_synchsafe, encode_synchsafe, MAX_SYNCHSAFE};

/// Size of the tag header (and of the optional v2.4 footer).
pub const HEADER_SIZE: usize = 10;

const ID: [u8; 3] = *b"ID3";
const FLAG_EXTENDED_HEADER: u8 = 0x40;
const FLAG_FOOTER: u8 = 0x10;

/// Parsed ID3v2 tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub version: u8,
    pub revision: u8,
    pub flags: u8,
    /// Size of the frame area that follows the header.
    pub frames_area_size: u32,
}

impl TagHeader {
    /// A header for a tag that does not exist on disk yet.
    pub fn fresh() -> Self {
        TagHeader {
            version: 4,
            revision: 0,
            flags: 0,
            frames_area_size: 0,
        }
    }

    /// Read the header from the first bytes of `reader`.
    ///
    /// Returns `Ok(None)` when the source does not start with an ID3v2 tag,
    /// including an empty source.
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let mut buffer = [0u8; HEADER_SIZE];
        match read_full(reader, &mut buffer)? {
            0 => return Ok(None),
            n if n < HEADER_SIZE => return Err(Id3Error::ShortHeader),
            _ => {}
        }

        if buffer[0..3] != ID {
            return Ok(None);
        }

        let version = buffer[3];
        if version < 3 {
            return Err(Id3Error::UnsupportedVersion(version));
        }

        let header = TagHeader {
            version,
            revision: buffer[4],
            flags: buffer[5],
            frames_area_size: decode_synchsafe([buffer[6], buffer[7], buffer[8], buffer[9]])?,
        };
        debug!(
            version = header.version,
            size = header.frames_area_size,
            flags = header.flags,
            "found ID3v2 header"
        );
        Ok(Some(header))
    }

    /// Whether an extended header sits in front of the first frame.
    pub fn has_extended_header(&self) -> bool {
        self.flags & FLAG_EXTENDED_HEADER != 0
    }

    /// Whether a v2.4 footer follows the frame area.
    pub fn has_footer(&self) -> bool {
        self.version >= 4 && self.flags & FLAG_FOOTER != 0
    }

    /// Total bytes the tag occupies at the start of the file.
    pub fn tag_size(&self) -> u64 {
        let footer = if self.has_footer() { HEADER_SIZE } else { 0 };
        (HEADER_SIZE + footer) as u64 + self.frames_area_size as u64
    }
}

/// Build a header with zeroed revision and flags.
pub fn write_header(version: u8, frames_area_size: u32) -> Result<[u8; HEADER_SIZE]> {
    let size = encode_synchsafe(frames_area_size, MAX_SYNCHSAFE)?;
    let mut header = [0u8; HEADER_SIZE];
    header[0..3].copy_from_slice(&ID);
    header[3] = version;
    header[6..10].copy_from_slice(&size);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let bytes = write_header(3, 1000).unwrap();
        assert_eq!(&bytes[0..6], b"ID3\x03\x00\x00");
        let header = TagHeader::read(&mut &bytes[..]).unwrap().unwrap();
        assert_eq!(header.version, 3);
        assert_eq!(header.frames_area_size, 1000);
        assert_eq!(header.tag_size(), 1010);
    }

    #[test]
    fn test_no_tag_is_not_an_error() {
        let mut data: &[u8] = b"\xFF\xFB\x90\x00audio-data";
        assert!(TagHeader::read(&mut data).unwrap().is_none());
        let mut empty: &[u8] = &[];
        assert!(TagHeader::read(&mut empty).unwrap().is_none());
    }

    #[test]
    fn test_short_header() {
        let mut data: &[u8] = b"ID3\x04";
        assert!(matches!(TagHeader::read(&mut data), Err(Id3Error::ShortHeader)));
    }

    #[test]
    fn test_rejects_old_versions() {
        let mut data: &[u8] = b"ID3\x02\x00\x00\x00\x00\x00\x00";
        assert!(matches!(
            TagHeader::read(&mut data),
            Err(Id3Error::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_invalid_size_format() {
        let mut data: &[u8] = b"ID3\x04\x00\x00\x00\x00\x80\x00";
        assert!(matches!(
            TagHeader::read(&mut data),
            Err(Id3Error::InvalidSizeFormat)
        ));
    }

    #[test]
    fn test_footer_extends_tag_size() {
        let mut data: &[u8] = b"ID3\x04\x00\x10\x00\x00\x00\x20";
        let header = TagHeader::read(&mut data).unwrap().unwrap();
        assert!(header.has_footer());
        assert_eq!(header.tag_size(), 52);
    }

    #[test]
    fn test_write_header_too_large() {
        assert!(matches!(
            write_header(4, MAX_SYNCHSAFE + 1),
            Err(Id3Error::SizeTooLarge { .. })
        ));
    }
}
