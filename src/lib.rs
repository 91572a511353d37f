//! oxid3 - read and write ID3v2.3 / ID3v2.4 tags in MP3 files.
//!
//! ```no_run
//! use oxid3::{Options, Tag};
//!
//! let mut tag = Tag::open("song.mp3", &Options::default())?;
//! tag.set_title("New title");
//! tag.save()?;
//! # Ok::<(), oxid3::Id3Error>(())
//! ```
//!
//! Saving rewrites only the tag region; the audio that follows it is copied
//! byte for byte.

pub mod error;
pub mod field_mapping;
pub mod id3;
pub mod utils;

use std::path::Path;

use serde::Serialize;

pub use error::{Id3Error, Result};
pub use field_mapping::{FieldMappings, StandardField, ValueConverter};
pub use id3::frames::{
    frame_ids, ChapterFrame, ChapterTocFrame, CommentFrame, Frame, FrameId, PictureFrame,
    PictureType, PopularimeterFrame, SyncedText, SynchronisedLyricsFrame, TimestampFormat,
    TextFrame, UfidFrame, UnknownFrame, UnsynchronisedLyricsFrame, UserDefinedTextFrame,
};
pub use id3::{Options, Tag};
pub use utils::encoding::Encoding;

/// Open `path` and parse its ID3v2 tag.
pub fn open<P: AsRef<Path>>(path: P, options: &Options) -> Result<Tag> {
    Tag::open(path, options)
}

/// Summary of the common fields of a tag.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    pub version: String,
    pub tag_size: u64,
    pub frame_count: usize,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub composer: Option<String>,
    pub year: Option<String>,
    pub track: Option<String>,
    pub disc: Option<String>,
    pub genre: Option<String>,
    pub bpm: Option<String>,
    pub comment: Option<String>,
    pub lyrics: Option<String>,
    pub pictures: usize,
}

impl Metadata {
    pub fn from_tag(tag: &Tag) -> Self {
        Metadata {
            version: format!("2.{}", tag.version()),
            tag_size: tag.size(),
            frame_count: tag.count(),
            title: tag.field(StandardField::Title),
            artist: tag.field(StandardField::Artist),
            album_artist: tag.field(StandardField::AlbumArtist),
            album: tag.field(StandardField::Album),
            composer: tag.field(StandardField::Composer),
            year: tag.field(StandardField::Year),
            track: tag.field(StandardField::Track),
            disc: tag.field(StandardField::Disc),
            genre: tag
                .field(StandardField::Genre)
                .map(|genre| ValueConverter::resolve_genre(&genre)),
            bpm: tag.field(StandardField::Bpm),
            comment: tag.field(StandardField::Comment),
            lyrics: tag.field(StandardField::Lyrics),
            pictures: tag.pictures().len(),
        }
    }
}
