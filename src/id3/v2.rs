// ID3v2 frame area: the frame directory walk and its serializer

use std::io::{Read, Write};

use tracing::{debug, trace, warn};

use crate::error::{Id3Error, Result};
use crate::id3::frames::{parse_body, Frame, FrameId, UnknownFrame, FRAME_HEADER_SIZE};
use crate::id3::header::TagHeader;
use crate::utils::io::{read_array, skip};
use crate::utils::synchsafe::{decode_frame_size, decode_plain, decode_synchsafe, encode_frame_size};

/// ID3v2 frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub id: [u8; 4],
    pub size: u32,
    pub flags: u16,
}

impl FrameHeader {
    /// Read a frame header, decoding the size in the form `version` uses.
    pub fn read<R: Read>(reader: &mut R, version: u8) -> Result<Self> {
        let buffer: [u8; FRAME_HEADER_SIZE] = read_array(reader)?;
        let id = [buffer[0], buffer[1], buffer[2], buffer[3]];
        let size = decode_frame_size([buffer[4], buffer[5], buffer[6], buffer[7]], version)?;
        let flags = u16::from_be_bytes([buffer[8], buffer[9]]);
        Ok(FrameHeader { id, size, flags })
    }

    /// Padding starts with a zero ID or a zero size.
    pub fn is_padding(&self) -> bool {
        self.id == [0; 4] || self.size == 0
    }
}

/// Walk the frame area that follows `header` and hand every decoded frame to `sink`.
///
/// A non-empty `filter` keeps only the listed IDs; other bodies are skipped unread.
/// Returns the number of frames delivered.
pub fn read_frames<R, F>(
    reader: &mut R,
    header: &TagHeader,
    filter: &[FrameId],
    mut sink: F,
) -> Result<usize>
where
    R: Read,
    F: FnMut(FrameId, Frame),
{
    let mut remaining = header.frames_area_size;
    if header.has_extended_header() {
        remaining = skip_extended_header(reader, header.version, remaining)?;
    }

    let mut delivered = 0;
    while remaining > 0 {
        if remaining < FRAME_HEADER_SIZE as u32 {
            trace!(remaining, "frame area ends in a partial header, treating as padding");
            break;
        }

        let frame_header = FrameHeader::read(reader, header.version)?;
        remaining -= FRAME_HEADER_SIZE as u32;

        if frame_header.is_padding() {
            trace!(remaining, "reached padding");
            break;
        }

        if frame_header.size > remaining {
            return Err(Id3Error::BodyOverflow {
                id: String::from_utf8_lossy(&frame_header.id).into_owned(),
                size: frame_header.size,
                remaining,
            });
        }
        remaining -= frame_header.size;

        let (id, valid) = match FrameId::new(frame_header.id) {
            Ok(id) => (id, true),
            Err(e) => {
                warn!(
                    error = %e,
                    size = frame_header.size,
                    "keeping frame with nonstandard id as raw bytes"
                );
                (FrameId::raw(frame_header.id), false)
            }
        };

        if !filter.is_empty() && !filter.contains(&id) {
            trace!(%id, size = frame_header.size, "frame filtered out");
            skip(reader, frame_header.size as u64)?;
            continue;
        }

        let mut body = vec![0u8; frame_header.size as usize];
        reader.read_exact(&mut body)?;
        let frame = if valid {
            parse_body(id, &body, header.version)?
        } else {
            Frame::Unknown(UnknownFrame::new(body))
        };
        debug!(%id, kind = frame.kind(), size = frame_header.size, "parsed frame");

        sink(id, frame);
        delivered += 1;
    }

    Ok(delivered)
}

/// Skip the extended header and return what is left of the frame area.
fn skip_extended_header<R: Read>(reader: &mut R, version: u8, remaining: u32) -> Result<u32> {
    let size_bytes: [u8; 4] = read_array(reader)?;
    // v2.3 counts only the bytes after the size field, v2.4 counts the whole header
    let rest = if version >= 4 {
        decode_synchsafe(size_bytes)?.saturating_sub(4)
    } else {
        decode_plain(size_bytes)
    };

    let total = rest.saturating_add(4);
    if total > remaining {
        return Err(Id3Error::BodyOverflow {
            id: "extended header".to_string(),
            size: total,
            remaining,
        });
    }
    skip(reader, rest as u64)?;
    debug!(size = total, "skipped extended header");
    Ok(remaining - total)
}

/// Write one frame: header with zeroed flags, then the body.
pub fn write_frame<W: Write>(writer: &mut W, id: FrameId, frame: &Frame, version: u8) -> Result<()> {
    let body = frame.to_bytes(version)?;
    let size = u32::try_from(body.len()).map_err(|_| Id3Error::SizeTooLarge {
        size: body.len() as u64,
        max: u32::MAX,
    })?;

    writer.write_all(id.as_bytes())?;
    writer.write_all(&encode_frame_size(size, version)?)?;
    writer.write_all(&[0, 0])?;
    writer.write_all(&body)?;
    debug!(%id, kind = frame.kind(), size, "wrote frame");
    Ok(())
}

/// Size of the frame area the given frames occupy, headers included.
pub fn frames_area_size<'a, I>(frames: I) -> u64
where
    I: IntoIterator<Item = (FrameId, &'a Frame)>,
{
    frames
        .into_iter()
        .map(|(_, frame)| (FRAME_HEADER_SIZE + frame.size()) as u64)
        .sum()
}

/// Lay out every frame back to back. Returns the bytes written.
pub fn write_frames<'a, W, I>(writer: &mut W, frames: I, version: u8) -> Result<u64>
where
    W: Write,
    I: IntoIterator<Item = (FrameId, &'a Frame)>,
{
    let mut written = 0u64;
    for (id, frame) in frames {
        write_frame(writer, id, frame, version)?;
        written += (FRAME_HEADER_SIZE + frame.size()) as u64;
    }
    Ok(written)
}
