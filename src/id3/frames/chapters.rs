// CHAP and CTOC frames from the ID3v2 chapter addendum

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::text::TextFrame;
use super::{frame_ids, FrameId, FRAME_HEADER_SIZE};
use crate::error::{Id3Error, Result};
use crate::utils::encoding::Encoding;
use crate::utils::io::{terminated_size, write_terminated, BodyReader};
use crate::utils::synchsafe::{decode_frame_size, encode_frame_size};

/// Offset value meaning "no byte offset, use the times".
pub const IGNORED_OFFSET: u32 = u32::MAX;

const FLAG_ORDERED: u8 = 0x01;
const FLAG_TOP_LEVEL: u8 = 0x02;

/// `CHAP`: one chapter of the audio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterFrame {
    pub element_id: String,
    pub start_time: Duration,
    pub end_time: Duration,
    pub start_offset: u32,
    pub end_offset: u32,
    /// Nested `TIT2`.
    pub title: Option<TextFrame>,
    /// Nested `TIT3`.
    pub description: Option<TextFrame>,
}

impl ChapterFrame {
    /// A chapter located by time only.
    pub fn new(element_id: impl Into<String>, start_time: Duration, end_time: Duration) -> Self {
        ChapterFrame {
            element_id: element_id.into(),
            start_time,
            end_time,
            start_offset: IGNORED_OFFSET,
            end_offset: IGNORED_OFFSET,
            title: None,
            description: None,
        }
    }

    pub fn parse(body: &[u8], version: u8) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let element_id = reader.read_text_terminated(Encoding::ISO_8859_1);
        let start_time = Duration::from_millis(reader.read_be_u32()? as u64);
        let end_time = Duration::from_millis(reader.read_be_u32()? as u64);
        let start_offset = reader.read_be_u32()?;
        let end_offset = reader.read_be_u32()?;

        let mut chapter = ChapterFrame {
            element_id,
            start_time,
            end_time,
            start_offset,
            end_offset,
            title: None,
            description: None,
        };

        while let Some((id, sub_body)) = read_sub_frame(&mut reader, version)? {
            match FrameId::new(id) {
                Ok(frame_ids::TITLE) => chapter.title = Some(TextFrame::parse(sub_body)?),
                Ok(frame_ids::SUBTITLE) => {
                    chapter.description = Some(TextFrame::parse(sub_body)?)
                }
                _ => debug!(
                    id = %String::from_utf8_lossy(&id),
                    chapter = %chapter.element_id,
                    "skipping chapter sub-frame"
                ),
            }
        }

        Ok(chapter)
    }

    /// Times are stored as 32-bit milliseconds.
    pub fn validate(&self) -> Result<()> {
        millis(self.start_time)?;
        millis(self.end_time)?;
        Ok(())
    }

    pub fn size(&self) -> usize {
        terminated_size(&self.element_id, Encoding::ISO_8859_1)
            + 16
            + sub_frame_size(&self.title)
            + sub_frame_size(&self.description)
    }

    pub fn write_body<W: Write>(&self, writer: &mut W, version: u8) -> Result<()> {
        write_terminated(writer, &self.element_id, Encoding::ISO_8859_1)?;
        writer.write_all(&millis(self.start_time)?.to_be_bytes())?;
        writer.write_all(&millis(self.end_time)?.to_be_bytes())?;
        writer.write_all(&self.start_offset.to_be_bytes())?;
        writer.write_all(&self.end_offset.to_be_bytes())?;
        write_sub_frame(writer, frame_ids::TITLE, &self.title, version)?;
        write_sub_frame(writer, frame_ids::SUBTITLE, &self.description, version)?;
        Ok(())
    }
}

/// `CTOC`: an ordered or unordered list of chapters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterTocFrame {
    pub element_id: String,
    pub top_level: bool,
    pub ordered: bool,
    pub child_element_ids: Vec<String>,
    /// Nested `TIT2`.
    pub description: Option<TextFrame>,
}

impl ChapterTocFrame {
    pub fn new(element_id: impl Into<String>, child_element_ids: Vec<String>) -> Self {
        ChapterTocFrame {
            element_id: element_id.into(),
            top_level: true,
            ordered: true,
            child_element_ids,
            description: None,
        }
    }

    pub fn parse(body: &[u8], version: u8) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let element_id = reader.read_text_terminated(Encoding::ISO_8859_1);
        let flags = reader.read_u8()?;
        let count = reader.read_u8()?;

        let mut child_element_ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if reader.is_empty() {
                return Err(Id3Error::TruncatedFrame);
            }
            child_element_ids.push(reader.read_text_terminated(Encoding::ISO_8859_1));
        }

        let mut description = None;
        while let Some((id, sub_body)) = read_sub_frame(&mut reader, version)? {
            if id == *frame_ids::TITLE.as_bytes() {
                description = Some(TextFrame::parse(sub_body)?);
            } else {
                debug!(
                    id = %String::from_utf8_lossy(&id),
                    toc = %element_id,
                    "skipping table of contents sub-frame"
                );
            }
        }

        Ok(ChapterTocFrame {
            element_id,
            top_level: flags & FLAG_TOP_LEVEL != 0,
            ordered: flags & FLAG_ORDERED != 0,
            child_element_ids,
            description,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.child_element_ids.len() > u8::MAX as usize {
            return Err(Id3Error::SizeTooLarge {
                size: self.child_element_ids.len() as u64,
                max: u8::MAX as u32,
            });
        }
        Ok(())
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.ordered {
            flags |= FLAG_ORDERED;
        }
        if self.top_level {
            flags |= FLAG_TOP_LEVEL;
        }
        flags
    }

    pub fn size(&self) -> usize {
        let children: usize = self
            .child_element_ids
            .iter()
            .map(|child| terminated_size(child, Encoding::ISO_8859_1))
            .sum();
        terminated_size(&self.element_id, Encoding::ISO_8859_1)
            + 2
            + children
            + sub_frame_size(&self.description)
    }

    pub fn write_body<W: Write>(&self, writer: &mut W, version: u8) -> Result<()> {
        self.validate()?;
        write_terminated(writer, &self.element_id, Encoding::ISO_8859_1)?;
        writer.write_all(&[self.flags(), self.child_element_ids.len() as u8])?;
        for child in &self.child_element_ids {
            write_terminated(writer, child, Encoding::ISO_8859_1)?;
        }
        write_sub_frame(writer, frame_ids::TITLE, &self.description, version)?;
        Ok(())
    }
}

fn millis(duration: Duration) -> Result<u32> {
    let millis = duration.as_millis();
    u32::try_from(millis).map_err(|_| Id3Error::SizeTooLarge {
        size: u64::try_from(millis).unwrap_or(u64::MAX),
        max: u32::MAX,
    })
}

/// Read one embedded frame, or `None` at the end of the body or at padding.
fn read_sub_frame<'a>(
    reader: &mut BodyReader<'a>,
    version: u8,
) -> Result<Option<([u8; 4], &'a [u8])>> {
    if reader.remaining() < FRAME_HEADER_SIZE {
        return Ok(None);
    }

    let raw_id = reader.read_array::<4>()?;
    let size = decode_frame_size(reader.read_array::<4>()?, version)?;
    let _flags = reader.read_array::<2>()?;

    if raw_id == [0; 4] || size == 0 {
        return Ok(None);
    }
    let body = reader.read_bytes(size as usize)?;
    Ok(Some((raw_id, body)))
}

fn sub_frame_size(frame: &Option<TextFrame>) -> usize {
    frame
        .as_ref()
        .map_or(0, |frame| FRAME_HEADER_SIZE + frame.size())
}

fn write_sub_frame<W: Write>(
    writer: &mut W,
    id: FrameId,
    frame: &Option<TextFrame>,
    version: u8,
) -> Result<()> {
    if let Some(frame) = frame {
        writer.write_all(id.as_bytes())?;
        writer.write_all(&encode_frame_size(frame.size() as u32, version)?)?;
        writer.write_all(&[0, 0])?;
        frame.write_body(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter() -> ChapterFrame {
        let mut chapter = ChapterFrame::new(
            "chp0",
            Duration::from_millis(0),
            Duration::from_millis(61_500),
        );
        chapter.title = Some(TextFrame::new(Encoding::UTF_8, "Intro"));
        chapter.description = Some(TextFrame::new(Encoding::UTF_16, "Opening words"));
        chapter
    }

    #[test]
    fn test_chapter_round_trip() {
        for version in [3, 4] {
            let frame = chapter();
            let mut out = Vec::new();
            frame.write_body(&mut out, version).unwrap();
            assert_eq!(out.len(), frame.size());
            assert_eq!(ChapterFrame::parse(&out, version).unwrap(), frame);
        }
    }

    #[test]
    fn test_chapter_layout() {
        let frame = ChapterFrame::new("c", Duration::from_secs(1), Duration::from_secs(2));
        let mut out = Vec::new();
        frame.write_body(&mut out, 4).unwrap();
        assert_eq!(
            out,
            b"c\x00\x00\x00\x03\xE8\x00\x00\x07\xD0\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF"
        );
    }

    #[test]
    fn test_chapter_time_out_of_range() {
        let end = Duration::from_millis(u32::MAX as u64 + 1);
        let frame = ChapterFrame::new("c", Duration::ZERO, end);
        assert!(matches!(frame.validate(), Err(Id3Error::SizeTooLarge { .. })));
        assert!(frame.write_body(&mut Vec::new(), 4).is_err());

        let last = ChapterFrame::new("c", Duration::ZERO, Duration::from_millis(u32::MAX as u64));
        assert!(last.validate().is_ok());
    }

    #[test]
    fn test_chapter_skips_unknown_sub_frames() {
        let mut body = b"c\x00".to_vec();
        body.extend_from_slice(&[0u8; 16]);
        body.extend_from_slice(b"WXXX\x00\x00\x00\x02\x00\x00\x00x");
        body.extend_from_slice(b"TIT2\x00\x00\x00\x03\x00\x00\x03ab");
        let frame = ChapterFrame::parse(&body, 4).unwrap();
        assert_eq!(frame.title.unwrap().text, "ab");
        assert!(frame.description.is_none());
    }

    #[test]
    fn test_toc_round_trip() {
        let mut frame = ChapterTocFrame::new("toc", vec!["chp0".into(), "chp1".into()]);
        frame.ordered = false;
        frame.description = Some(TextFrame::new(Encoding::ISO_8859_1, "Chapters"));
        for version in [3, 4] {
            let mut out = Vec::new();
            frame.write_body(&mut out, version).unwrap();
            assert_eq!(out.len(), frame.size());
            assert_eq!(&out[..6], b"toc\x00\x02\x02");
            assert_eq!(ChapterTocFrame::parse(&out, version).unwrap(), frame);
        }
    }

    #[test]
    fn test_toc_skips_unexpected_sub_frames() {
        let mut body = b"toc\x00\x03\x01a\x00".to_vec();
        body.extend_from_slice(b"TIT3\x00\x00\x00\x02\x00\x00\x00x");
        let frame = ChapterTocFrame::parse(&body, 4).unwrap();
        assert!(frame.top_level && frame.ordered);
        assert_eq!(frame.child_element_ids, vec!["a".to_string()]);
        assert!(frame.description.is_none());
    }

    #[test]
    fn test_toc_too_many_children() {
        let children = (0..300).map(|i| format!("c{i}")).collect();
        let frame = ChapterTocFrame::new("toc", children);
        assert!(matches!(
            frame.write_body(&mut Vec::new(), 4),
            Err(Id3Error::SizeTooLarge { max: 255, .. })
        ));
    }
}
