// USLT and SYLT lyrics frames

use std::io::Write;

use serde::Serialize;

use super::{check_language, write_language};
use crate::error::Result;
use crate::utils::encoding::{self, Encoding};
use crate::utils::io::{terminated_size, write_terminated, BodyReader};

/// `USLT`: plain lyrics keyed by language and content descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsynchronisedLyricsFrame {
    pub encoding: Encoding,
    pub language: String,
    pub content_descriptor: String,
    pub lyrics: String,
}

impl UnsynchronisedLyricsFrame {
    pub fn new(
        encoding: Encoding,
        language: impl Into<String>,
        content_descriptor: impl Into<String>,
        lyrics: impl Into<String>,
    ) -> Self {
        UnsynchronisedLyricsFrame {
            encoding,
            language: language.into(),
            content_descriptor: content_descriptor.into(),
            lyrics: lyrics.into(),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let encoding = Encoding::from_byte(reader.read_u8()?);
        let language = encoding::decode(&reader.read_array::<3>()?, Encoding::ISO_8859_1);
        let content_descriptor = reader.read_text_terminated(encoding);
        let lyrics = reader.read_text_rest(encoding);
        Ok(UnsynchronisedLyricsFrame {
            encoding,
            language,
            content_descriptor,
            lyrics,
        })
    }

    pub fn validate(&self) -> Result<()> {
        check_language(&self.language)
    }

    pub fn size(&self) -> usize {
        1 + 3
            + terminated_size(&self.content_descriptor, self.encoding)
            + encoding::encoded_size(&self.lyrics, self.encoding)
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.validate()?;
        writer.write_all(&[self.encoding.key()])?;
        write_language(writer, &self.language)?;
        write_terminated(writer, &self.content_descriptor, self.encoding)?;
        writer.write_all(&encoding::encode(&self.lyrics, self.encoding))?;
        Ok(())
    }
}

/// Unit of the timestamps in a SYLT frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimestampFormat {
    /// Absolute time in MPEG frames.
    MpegFrames,
    /// Absolute time in milliseconds.
    Milliseconds,
    Undefined(u8),
}

impl TimestampFormat {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => TimestampFormat::MpegFrames,
            2 => TimestampFormat::Milliseconds,
            other => TimestampFormat::Undefined(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            TimestampFormat::MpegFrames => 1,
            TimestampFormat::Milliseconds => 2,
            TimestampFormat::Undefined(other) => other,
        }
    }
}

/// One line of synchronised text and the moment it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncedText {
    pub text: String,
    pub timestamp: u32,
}

/// `SYLT`: lyrics or other text aligned to the audio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynchronisedLyricsFrame {
    pub encoding: Encoding,
    pub language: String,
    pub timestamp_format: TimestampFormat,
    /// 0 other, 1 lyrics, 2 transcription, 3 movement, 4 events,
    /// 5 chord, 6 trivia, 7 web page URLs, 8 image URLs.
    pub content_type: u8,
    pub content_descriptor: String,
    pub synced_texts: Vec<SyncedText>,
}

impl SynchronisedLyricsFrame {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let encoding = Encoding::from_byte(reader.read_u8()?);
        let language = encoding::decode(&reader.read_array::<3>()?, Encoding::ISO_8859_1);
        let timestamp_format = TimestampFormat::from_u8(reader.read_u8()?);
        let content_type = reader.read_u8()?;
        let content_descriptor = reader.read_text_terminated(encoding);

        let mut synced_texts = Vec::new();
        while !reader.is_empty() {
            let text = reader.read_text_terminated(encoding);
            let timestamp = reader.read_be_u32()?;
            synced_texts.push(SyncedText { text, timestamp });
        }

        Ok(SynchronisedLyricsFrame {
            encoding,
            language,
            timestamp_format,
            content_type,
            content_descriptor,
            synced_texts,
        })
    }

    pub fn validate(&self) -> Result<()> {
        check_language(&self.language)
    }

    pub fn size(&self) -> usize {
        let entries: usize = self
            .synced_texts
            .iter()
            .map(|entry| terminated_size(&entry.text, self.encoding) + 4)
            .sum();
        1 + 3 + 1 + 1 + terminated_size(&self.content_descriptor, self.encoding) + entries
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.validate()?;
        writer.write_all(&[self.encoding.key()])?;
        write_language(writer, &self.language)?;
        writer.write_all(&[self.timestamp_format.to_u8(), self.content_type])?;
        write_terminated(writer, &self.content_descriptor, self.encoding)?;
        for entry in &self.synced_texts {
            write_terminated(writer, &entry.text, self.encoding)?;
            writer.write_all(&entry.timestamp.to_be_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Id3Error;

    fn sylt() -> SynchronisedLyricsFrame {
        SynchronisedLyricsFrame {
            encoding: Encoding::UTF_16,
            language: "eng".to_string(),
            timestamp_format: TimestampFormat::Milliseconds,
            content_type: 1,
            content_descriptor: "verse".to_string(),
            synced_texts: vec![
                SyncedText {
                    text: "Hello".to_string(),
                    timestamp: 0,
                },
                SyncedText {
                    text: "world".to_string(),
                    timestamp: 1500,
                },
            ],
        }
    }

    #[test]
    fn test_uslt_language_validation() {
        let bad = UnsynchronisedLyricsFrame::new(Encoding::UTF_8, "en", "", "la la");
        assert!(matches!(
            bad.write_body(&mut Vec::new()),
            Err(Id3Error::InvalidLanguageLength(_))
        ));

        let good = UnsynchronisedLyricsFrame::new(Encoding::UTF_8, "eng", "", "la la");
        let mut out = Vec::new();
        good.write_body(&mut out).unwrap();
        assert_eq!(out, b"\x03eng\x00la la");
        assert_eq!(out.len(), good.size());
        assert_eq!(UnsynchronisedLyricsFrame::parse(&out).unwrap(), good);
    }

    #[test]
    fn test_uslt_latin1_language_written_back() {
        let body = b"\x00\xE9ng\x00words";
        let frame = UnsynchronisedLyricsFrame::parse(body).unwrap();
        let mut out = Vec::new();
        frame.write_body(&mut out).unwrap();
        assert_eq!(out, body);
        assert_eq!(out.len(), frame.size());
    }

    #[test]
    fn test_sylt_round_trip() {
        let frame = sylt();
        let mut out = Vec::new();
        frame.write_body(&mut out).unwrap();
        assert_eq!(out.len(), frame.size());
        assert_eq!(SynchronisedLyricsFrame::parse(&out).unwrap(), frame);
    }

    #[test]
    fn test_sylt_missing_timestamp_is_truncated() {
        let body = b"\x00eng\x02\x01\x00line\x00\x00\x00";
        assert!(matches!(
            SynchronisedLyricsFrame::parse(body),
            Err(Id3Error::TruncatedFrame)
        ));
    }

    #[test]
    fn test_sylt_entries_latin1() {
        let body = b"\x00eng\x02\x01d\x00one\x00\x00\x00\x00\x0Atwo\x00\x00\x00\x01\x00";
        let frame = SynchronisedLyricsFrame::parse(body).unwrap();
        assert_eq!(frame.content_descriptor, "d");
        assert_eq!(frame.synced_texts.len(), 2);
        assert_eq!(frame.synced_texts[0].timestamp, 10);
        assert_eq!(frame.synced_texts[1].text, "two");
        assert_eq!(frame.synced_texts[1].timestamp, 256);
    }
}
