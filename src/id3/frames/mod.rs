//! Frame catalog.
//!
//! Every frame kind this crate understands is a variant of [`Frame`]. Bodies are
//! parsed by [`parse_body`], which picks a codec from the frame ID, and written back
//! by [`Frame::write_body`]. IDs with no codec become [`UnknownFrame`]s and keep their
//! bytes untouched.

pub mod chapters;
pub mod lyrics;
pub mod picture;
pub mod stats;
pub mod text;
pub mod unknown;

pub use chapters::{ChapterFrame, ChapterTocFrame, IGNORED_OFFSET};
pub use lyrics::{
    SyncedText, SynchronisedLyricsFrame, TimestampFormat, UnsynchronisedLyricsFrame,
};
pub use picture::{PictureFrame, PictureType};
pub use stats::{PopularimeterFrame, UfidFrame};
pub use text::{CommentFrame, TextFrame, UserDefinedTextFrame};
pub use unknown::UnknownFrame;

use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Id3Error, Result};
use crate::utils::encoding::{self, Encoding};

/// Size of a frame header: 4-byte ID, 4-byte size, 2 flag bytes.
pub const FRAME_HEADER_SIZE: usize = 10;

/// A four character frame identifier such as `TIT2`.
///
/// Only uppercase ASCII letters and digits are valid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId([u8; 4]);

impl FrameId {
    /// Validate raw identifier bytes.
    pub fn new(id: [u8; 4]) -> Result<Self> {
        let id = FrameId(id);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(Id3Error::InvalidFrameId(id.to_string()))
        }
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Keep identifier bytes that failed validation so the frame can be written back.
    pub(crate) fn raw(id: [u8; 4]) -> Self {
        FrameId(id)
    }

    /// Empty for a raw identifier that is not UTF-8.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Uppercase ASCII letters and digits only.
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    /// Generic text information frames: `T***` except `TXXX`.
    pub fn is_text(&self) -> bool {
        self.0[0] == b'T' && *self != frame_ids::USER_DEFINED_TEXT && self.is_valid()
    }
}

impl FromStr for FrameId {
    type Err = Id3Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| Id3Error::InvalidFrameId(s.to_string()))?;
        FrameId::new(bytes)
    }
}

impl TryFrom<&str> for FrameId {
    type Error = Id3Error;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameId({})", self)
    }
}

impl Serialize for FrameId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Frame identifiers with a dedicated codec, plus the common text frames.
pub mod frame_ids {
    use super::FrameId;

    pub const TITLE: FrameId = FrameId(*b"TIT2");
    pub const SUBTITLE: FrameId = FrameId(*b"TIT3");
    pub const ARTIST: FrameId = FrameId(*b"TPE1");
    pub const ALBUM_ARTIST: FrameId = FrameId(*b"TPE2");
    pub const ALBUM: FrameId = FrameId(*b"TALB");
    pub const COMPOSER: FrameId = FrameId(*b"TCOM");
    pub const GENRE: FrameId = FrameId(*b"TCON");
    pub const TRACK: FrameId = FrameId(*b"TRCK");
    pub const DISC: FrameId = FrameId(*b"TPOS");
    pub const BPM: FrameId = FrameId(*b"TBPM");
    pub const LENGTH: FrameId = FrameId(*b"TLEN");
    pub const YEAR: FrameId = FrameId(*b"TYER");
    pub const RECORDING_TIME: FrameId = FrameId(*b"TDRC");
    pub const USER_DEFINED_TEXT: FrameId = FrameId(*b"TXXX");
    pub const COMMENT: FrameId = FrameId(*b"COMM");
    pub const PICTURE: FrameId = FrameId(*b"APIC");
    pub const UNSYNCHRONISED_LYRICS: FrameId = FrameId(*b"USLT");
    pub const SYNCHRONISED_LYRICS: FrameId = FrameId(*b"SYLT");
    pub const UFID: FrameId = FrameId(*b"UFID");
    pub const POPULARIMETER: FrameId = FrameId(*b"POPM");
    pub const CHAPTER: FrameId = FrameId(*b"CHAP");
    pub const CHAPTER_TOC: FrameId = FrameId(*b"CTOC");
}

/// One decoded frame body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    Text(TextFrame),
    UserDefinedText(UserDefinedTextFrame),
    Comment(CommentFrame),
    Picture(PictureFrame),
    UnsynchronisedLyrics(UnsynchronisedLyricsFrame),
    SynchronisedLyrics(SynchronisedLyricsFrame),
    Ufid(UfidFrame),
    Popularimeter(PopularimeterFrame),
    Chapter(ChapterFrame),
    ChapterToc(ChapterTocFrame),
    Unknown(UnknownFrame),
}

impl Frame {
    /// Exact size of the body [`Frame::write_body`] emits, without the frame header.
    pub fn size(&self) -> usize {
        match self {
            Frame::Text(f) => f.size(),
            Frame::UserDefinedText(f) => f.size(),
            Frame::Comment(f) => f.size(),
            Frame::Picture(f) => f.size(),
            Frame::UnsynchronisedLyrics(f) => f.size(),
            Frame::SynchronisedLyrics(f) => f.size(),
            Frame::Ufid(f) => f.size(),
            Frame::Popularimeter(f) => f.size(),
            Frame::Chapter(f) => f.size(),
            Frame::ChapterToc(f) => f.size(),
            Frame::Unknown(f) => f.size(),
        }
    }

    /// Check every field that could make serialization fail.
    pub fn validate(&self) -> Result<()> {
        match self {
            Frame::Comment(f) => f.validate(),
            Frame::UnsynchronisedLyrics(f) => f.validate(),
            Frame::SynchronisedLyrics(f) => f.validate(),
            Frame::Chapter(f) => f.validate(),
            Frame::ChapterToc(f) => f.validate(),
            _ => Ok(()),
        }
    }

    /// Serialize the body. `version` selects the size form of nested sub-frames.
    pub fn write_body<W: Write>(&self, writer: &mut W, version: u8) -> Result<()> {
        match self {
            Frame::Chapter(f) => f.write_body(writer, version),
            Frame::ChapterToc(f) => f.write_body(writer, version),
            Frame::Text(f) => f.write_body(writer),
            Frame::UserDefinedText(f) => f.write_body(writer),
            Frame::Comment(f) => f.write_body(writer),
            Frame::Picture(f) => f.write_body(writer),
            Frame::UnsynchronisedLyrics(f) => f.write_body(writer),
            Frame::SynchronisedLyrics(f) => f.write_body(writer),
            Frame::Ufid(f) => f.write_body(writer),
            Frame::Popularimeter(f) => f.write_body(writer),
            Frame::Unknown(f) => f.write_body(writer),
        }
    }

    /// Serialize the body into a fresh buffer.
    pub fn to_bytes(&self, version: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.size());
        self.write_body(&mut buffer, version)?;
        Ok(buffer)
    }

    /// This frame as it must be written for `version`.
    ///
    /// v2.3 only knows ISO-8859-1 and UTF-16 with BOM, so UTF-16BE and UTF-8 text
    /// is rewritten as UTF-16 there.
    pub fn for_version(&self, version: u8) -> Cow<'_, Frame> {
        if version >= 4 || !self.encodings().iter().any(Encoding::is_v4_only) {
            return Cow::Borrowed(self);
        }
        let mut frame = self.clone();
        for encoding in frame.encodings_mut() {
            if encoding.is_v4_only() {
                *encoding = Encoding::UTF_16;
            }
        }
        Cow::Owned(frame)
    }

    /// Text encodings declared by this frame and its sub-frames.
    pub fn encodings(&self) -> Vec<Encoding> {
        match self {
            Frame::Text(f) => vec![f.encoding],
            Frame::UserDefinedText(f) => vec![f.encoding],
            Frame::Comment(f) => vec![f.encoding],
            Frame::Picture(f) => vec![f.encoding],
            Frame::UnsynchronisedLyrics(f) => vec![f.encoding],
            Frame::SynchronisedLyrics(f) => vec![f.encoding],
            Frame::Chapter(f) => f
                .title
                .iter()
                .chain(f.description.iter())
                .map(|text| text.encoding)
                .collect(),
            Frame::ChapterToc(f) => f.description.iter().map(|text| text.encoding).collect(),
            Frame::Ufid(_) | Frame::Popularimeter(_) | Frame::Unknown(_) => Vec::new(),
        }
    }

    fn encodings_mut(&mut self) -> Vec<&mut Encoding> {
        match self {
            Frame::Text(f) => vec![&mut f.encoding],
            Frame::UserDefinedText(f) => vec![&mut f.encoding],
            Frame::Comment(f) => vec![&mut f.encoding],
            Frame::Picture(f) => vec![&mut f.encoding],
            Frame::UnsynchronisedLyrics(f) => vec![&mut f.encoding],
            Frame::SynchronisedLyrics(f) => vec![&mut f.encoding],
            Frame::Chapter(f) => f
                .title
                .iter_mut()
                .chain(f.description.iter_mut())
                .map(|text| &mut text.encoding)
                .collect(),
            Frame::ChapterToc(f) => f
                .description
                .iter_mut()
                .map(|text| &mut text.encoding)
                .collect(),
            Frame::Ufid(_) | Frame::Popularimeter(_) | Frame::Unknown(_) => Vec::new(),
        }
    }

    /// Key deciding which frames of a repeatable kind replace each other.
    ///
    /// `None` marks a singleton kind: at most one such frame per ID.
    pub fn unique_key(&self) -> Option<String> {
        match self {
            Frame::Text(_) => None,
            Frame::UserDefinedText(f) => Some(f.description.clone()),
            Frame::Comment(f) => Some(format!("{}:{}", f.language, f.description)),
            Frame::Picture(f) => Some(f.description.clone()),
            Frame::UnsynchronisedLyrics(f) => {
                Some(format!("{}:{}", f.language, f.content_descriptor))
            }
            Frame::SynchronisedLyrics(f) => {
                Some(format!("{}:{}", f.language, f.content_descriptor))
            }
            Frame::Ufid(f) => Some(f.owner_identifier.clone()),
            Frame::Popularimeter(f) => Some(f.email.clone()),
            Frame::Chapter(f) => Some(f.element_id.clone()),
            Frame::ChapterToc(f) => Some(f.element_id.clone()),
            Frame::Unknown(f) => Some(f.unique_id().to_string()),
        }
    }

    /// Short name of the frame kind, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Text(_) => "text",
            Frame::UserDefinedText(_) => "user-defined text",
            Frame::Comment(_) => "comment",
            Frame::Picture(_) => "picture",
            Frame::UnsynchronisedLyrics(_) => "unsynchronised lyrics",
            Frame::SynchronisedLyrics(_) => "synchronised lyrics",
            Frame::Ufid(_) => "unique file identifier",
            Frame::Popularimeter(_) => "popularimeter",
            Frame::Chapter(_) => "chapter",
            Frame::ChapterToc(_) => "chapter table of contents",
            Frame::Unknown(_) => "unknown",
        }
    }

    /// Whether this kind of frame may be stored under `id`.
    pub fn fits(&self, id: FrameId) -> bool {
        use frame_ids::*;
        match self {
            Frame::Text(_) => id.is_text(),
            Frame::UserDefinedText(_) => id == USER_DEFINED_TEXT,
            Frame::Comment(_) => id == COMMENT,
            Frame::Picture(_) => id == PICTURE,
            Frame::UnsynchronisedLyrics(_) => id == UNSYNCHRONISED_LYRICS,
            Frame::SynchronisedLyrics(_) => id == SYNCHRONISED_LYRICS,
            Frame::Ufid(_) => id == UFID,
            Frame::Popularimeter(_) => id == POPULARIMETER,
            Frame::Chapter(_) => id == CHAPTER,
            Frame::ChapterToc(_) => id == CHAPTER_TOC,
            Frame::Unknown(_) => !has_codec(id),
        }
    }

    /// The ID a frame of this kind is normally stored under, if it has only one.
    pub fn canonical_id(&self) -> Option<FrameId> {
        use frame_ids::*;
        Some(match self {
            Frame::UserDefinedText(_) => USER_DEFINED_TEXT,
            Frame::Comment(_) => COMMENT,
            Frame::Picture(_) => PICTURE,
            Frame::UnsynchronisedLyrics(_) => UNSYNCHRONISED_LYRICS,
            Frame::SynchronisedLyrics(_) => SYNCHRONISED_LYRICS,
            Frame::Ufid(_) => UFID,
            Frame::Popularimeter(_) => POPULARIMETER,
            Frame::Chapter(_) => CHAPTER,
            Frame::ChapterToc(_) => CHAPTER_TOC,
            Frame::Text(_) | Frame::Unknown(_) => return None,
        })
    }
}

/// Whether frames under `id` are decoded rather than kept as raw bytes.
pub fn has_codec(id: FrameId) -> bool {
    use frame_ids::*;
    id.is_text()
        || matches!(
            id,
            USER_DEFINED_TEXT
                | COMMENT
                | PICTURE
                | UNSYNCHRONISED_LYRICS
                | SYNCHRONISED_LYRICS
                | UFID
                | POPULARIMETER
                | CHAPTER
                | CHAPTER_TOC
        )
}

/// Parse a frame body, choosing the codec from `id`.
pub fn parse_body(id: FrameId, body: &[u8], version: u8) -> Result<Frame> {
    use frame_ids::*;

    if id.is_text() {
        return Ok(Frame::Text(TextFrame::parse(body)?));
    }

    let frame = match id {
        USER_DEFINED_TEXT => Frame::UserDefinedText(UserDefinedTextFrame::parse(body)?),
        COMMENT => Frame::Comment(CommentFrame::parse(body)?),
        PICTURE => Frame::Picture(PictureFrame::parse(body)?),
        UNSYNCHRONISED_LYRICS => {
            Frame::UnsynchronisedLyrics(UnsynchronisedLyricsFrame::parse(body)?)
        }
        SYNCHRONISED_LYRICS => Frame::SynchronisedLyrics(SynchronisedLyricsFrame::parse(body)?),
        UFID => Frame::Ufid(UfidFrame::parse(body)?),
        POPULARIMETER => Frame::Popularimeter(PopularimeterFrame::parse(body)?),
        CHAPTER => Frame::Chapter(ChapterFrame::parse(body, version)?),
        CHAPTER_TOC => Frame::ChapterToc(ChapterTocFrame::parse(body, version)?),
        _ => Frame::Unknown(UnknownFrame::new(body.to_vec())),
    };
    Ok(frame)
}

/// Fail with [`Id3Error::InvalidLanguageLength`] unless `language` is three
/// ISO-8859-1 characters.
pub(crate) fn check_language(language: &str) -> Result<()> {
    let latin1 = language.chars().all(|c| u32::from(c) <= 0xFF);
    if latin1 && language.chars().count() == 3 {
        Ok(())
    } else {
        Err(Id3Error::InvalidLanguageLength(language.to_string()))
    }
}

/// Write a checked language code as its three ISO-8859-1 bytes.
pub(crate) fn write_language<W: Write>(writer: &mut W, language: &str) -> Result<()> {
    writer.write_all(&encoding::encode(language, Encoding::ISO_8859_1))?;
    Ok(())
}
