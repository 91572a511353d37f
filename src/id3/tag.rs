// In-memory ID3v2 tag: parsing, editing and the save pipeline

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Id3Error, Result};
use crate::field_mapping::{FieldMappings, StandardField};
use crate::id3::frames::{
    frame_ids, ChapterFrame, ChapterTocFrame, CommentFrame, Frame, FrameId, PictureFrame,
    PictureType, PopularimeterFrame, SynchronisedLyricsFrame, TextFrame, UfidFrame, UnknownFrame,
    UnsynchronisedLyricsFrame, UserDefinedTextFrame,
};
use crate::id3::header::{write_header, TagHeader, HEADER_SIZE};
use crate::id3::sequence::FrameSequence;
use crate::id3::v2;
use crate::utils::encoding::Encoding;
use crate::utils::synchsafe::MAX_SYNCHSAFE;

/// How much of a tag to decode when opening it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Decode frames at all. `false` reads only the header.
    pub parse: bool,
    /// Frame IDs to keep. Empty keeps everything.
    pub parse_frames: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            parse: true,
            parse_frames: Vec::new(),
        }
    }
}

impl Options {
    /// Read the header only. Saving still replaces the original tag.
    pub fn header_only() -> Self {
        Options {
            parse: false,
            parse_frames: Vec::new(),
        }
    }

    /// Decode only the listed frame IDs.
    pub fn only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Options {
            parse: true,
            parse_frames: ids.into_iter().map(Into::into).collect(),
        }
    }

    fn filter(&self) -> Result<Vec<FrameId>> {
        self.parse_frames.iter().map(|id| id.parse()).collect()
    }
}

/// An ID3v2.3 or ID3v2.4 tag.
#[derive(Debug, Clone)]
pub struct Tag {
    version: u8,
    default_encoding: Encoding,
    /// Bytes the tag occupied in its source, header and footer included.
    original_size: u64,
    frames: FrameSequence,
    path: Option<PathBuf>,
}

impl Default for Tag {
    fn default() -> Self {
        Self::new()
    }
}

impl Tag {
    /// An empty version 4 tag that is not attached to any file.
    pub fn new() -> Self {
        Tag {
            version: 4,
            default_encoding: default_encoding_for(4),
            original_size: 0,
            frames: FrameSequence::new(),
            path: None,
        }
    }

    /// Open `path` and parse its tag. A file without a tag yields an empty one.
    pub fn open<P: AsRef<Path>>(path: P, options: &Options) -> Result<Self> {
        let mut tag = Tag::new();
        tag.reopen(path, options)?;
        Ok(tag)
    }

    /// Parse a tag from the start of `reader`.
    pub fn read_from<R: Read>(reader: &mut R, options: &Options) -> Result<Self> {
        let mut tag = Tag::new();
        tag.load(reader, options)?;
        Ok(tag)
    }

    /// Discard the current contents and parse `reader` instead.
    ///
    /// The tag is detached from any file it was opened from.
    pub fn reset<R: Read>(&mut self, reader: &mut R, options: &Options) -> Result<()> {
        self.load(reader, options)?;
        self.path = None;
        Ok(())
    }

    /// Discard the current contents and parse the file at `path` instead.
    pub fn reopen<P: AsRef<Path>>(&mut self, path: P, options: &Options) -> Result<()> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        self.load(&mut reader, options)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Parse `reader` and replace the contents only once the whole tag was read.
    /// On error the tag, including its original size, is left as it was.
    fn load<R: Read>(&mut self, reader: &mut R, options: &Options) -> Result<()> {
        let filter = options.filter()?;
        let mut frames = FrameSequence::new();

        let Some(header) = TagHeader::read(reader)? else {
            debug!("no ID3v2 tag found, starting empty");
            self.version = 4;
            self.default_encoding = default_encoding_for(4);
            self.original_size = 0;
            self.frames = frames;
            return Ok(());
        };

        if options.parse {
            let count = v2::read_frames(reader, &header, &filter, |id, frame| {
                frames.add(id, frame);
            })?;
            debug!(count, stored = frames.count(), "read frames");
        }

        self.version = header.version;
        self.default_encoding = default_encoding_for(header.version);
        self.original_size = header.tag_size();
        self.frames = frames;
        Ok(())
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Choose the version used on the next write. Only 3 and 4 are supported.
    ///
    /// Also resets the default encoding to the one that version prefers.
    pub fn set_version(&mut self, version: u8) -> Result<()> {
        if !(3..=4).contains(&version) {
            return Err(Id3Error::UnsupportedVersion(version));
        }
        self.version = version;
        self.default_encoding = default_encoding_for(version);
        Ok(())
    }

    /// Encoding the convenience setters use for new frames.
    pub fn default_encoding(&self) -> Encoding {
        self.default_encoding
    }

    pub fn set_default_encoding(&mut self, encoding: Encoding) {
        self.default_encoding = encoding;
    }

    /// File this tag was opened from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bytes the tag occupied in its source; 0 when the source had none.
    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    // ---- generic frame access ----

    /// Store `frame` under `id`, replacing a frame with the same uniqueness key.
    pub fn add_frame(&mut self, id: FrameId, frame: Frame) -> Result<()> {
        check_fits(id, &frame)?;
        self.frames.add(id, frame);
        Ok(())
    }

    /// Make `frame` the only frame under `id`.
    pub fn set_frame(&mut self, id: FrameId, frame: Frame) -> Result<()> {
        check_fits(id, &frame)?;
        self.frames.set(id, frame);
        Ok(())
    }

    /// All frames stored under `id`.
    pub fn get_frames(&self, id: FrameId) -> Vec<&Frame> {
        self.frames.frames(id).collect()
    }

    /// The first frame stored under `id`.
    pub fn get_frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.frames(id).next()
    }

    /// Remove every frame under `id`. Returns how many were removed.
    pub fn delete_frames(&mut self, id: FrameId) -> usize {
        self.frames.delete(id)
    }

    /// Remove one frame of a repeatable kind by its uniqueness key.
    pub fn delete_frame_with_key(&mut self, id: FrameId, key: &str) -> Option<Frame> {
        self.frames.delete_keyed(id, key)
    }

    pub fn delete_all_frames(&mut self) {
        self.frames.clear();
    }

    /// Number of live frames.
    pub fn count(&self) -> usize {
        self.frames.count()
    }

    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Every frame with its ID, in write order.
    pub fn all_frames(&self) -> Vec<(FrameId, &Frame)> {
        self.frames.iter().collect()
    }

    /// IDs that currently hold frames.
    pub fn frame_ids(&self) -> Vec<FrameId> {
        self.frames.ids().collect()
    }

    // ---- text frames ----

    pub fn text_frame(&self, id: FrameId) -> Option<&TextFrame> {
        match self.get_frame(id)? {
            Frame::Text(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn text(&self, id: FrameId) -> Option<&str> {
        self.text_frame(id).map(|frame| frame.text.as_str())
    }

    /// Set a text frame using the default encoding.
    pub fn set_text(&mut self, id: FrameId, text: impl Into<String>) -> Result<()> {
        let frame = Frame::Text(TextFrame::new(self.default_encoding, text));
        self.set_frame(id, frame)
    }

    pub fn title(&self) -> Option<&str> {
        self.text(frame_ids::TITLE)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_known_text(frame_ids::TITLE, title);
    }

    pub fn artist(&self) -> Option<&str> {
        self.text(frame_ids::ARTIST)
    }

    pub fn set_artist(&mut self, artist: impl Into<String>) {
        self.set_known_text(frame_ids::ARTIST, artist);
    }

    pub fn album(&self) -> Option<&str> {
        self.text(frame_ids::ALBUM)
    }

    pub fn set_album(&mut self, album: impl Into<String>) {
        self.set_known_text(frame_ids::ALBUM, album);
    }

    pub fn genre(&self) -> Option<&str> {
        self.text(frame_ids::GENRE)
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.set_known_text(frame_ids::GENRE, genre);
    }

    pub fn track(&self) -> Option<&str> {
        self.text(frame_ids::TRACK)
    }

    pub fn set_track(&mut self, track: impl Into<String>) {
        self.set_known_text(frame_ids::TRACK, track);
    }

    /// Recording year: `TYER` on v2.3, `TDRC` on v2.4, falling back to the other.
    pub fn year(&self) -> Option<&str> {
        let (primary, fallback) = if self.version >= 4 {
            (frame_ids::RECORDING_TIME, frame_ids::YEAR)
        } else {
            (frame_ids::YEAR, frame_ids::RECORDING_TIME)
        };
        self.text(primary).or_else(|| self.text(fallback))
    }

    pub fn set_year(&mut self, year: impl Into<String>) {
        let id = if self.version >= 4 {
            frame_ids::RECORDING_TIME
        } else {
            frame_ids::YEAR
        };
        self.set_known_text(id, year);
    }

    /// Frame ID that holds `field` in this tag's version.
    pub fn common_id(&self, field: StandardField) -> FrameId {
        FieldMappings::frame_id(field, self.version)
    }

    /// Value of a standard field. Comments and lyrics yield their first frame's text,
    /// the cover yields its description.
    pub fn field(&self, field: StandardField) -> Option<String> {
        match field {
            StandardField::Year => self.year().map(str::to_string),
            StandardField::Comment => self.comments().first().map(|c| c.text.clone()),
            StandardField::Lyrics => self
                .unsynchronised_lyrics()
                .first()
                .map(|l| l.lyrics.clone()),
            StandardField::Cover => self.front_cover().map(|p| p.description.clone()),
            text => self.text(self.common_id(text)).map(str::to_string),
        }
    }

    /// Set a standard field from a string using the default encoding.
    ///
    /// Comments and lyrics are stored with language `eng` and an empty description.
    /// The cover cannot be set from text and leaves the tag untouched; returns
    /// `false` in that case.
    pub fn set_field(&mut self, field: StandardField, value: impl Into<String>) -> bool {
        let encoding = self.default_encoding;
        match field {
            StandardField::Comment => {
                self.add_comment(CommentFrame::new(encoding, "eng", "", value));
            }
            StandardField::Lyrics => {
                self.add_unsynchronised_lyrics(UnsynchronisedLyricsFrame::new(
                    encoding, "eng", "", value,
                ));
            }
            StandardField::Cover => return false,
            text => {
                let id = self.common_id(text);
                self.set_known_text(id, value);
            }
        }
        true
    }

    /// Remove every frame that holds `field`. Returns how many were removed.
    pub fn remove_field(&mut self, field: StandardField) -> usize {
        match field {
            StandardField::Year => {
                self.frames.delete(frame_ids::YEAR) + self.frames.delete(frame_ids::RECORDING_TIME)
            }
            other => {
                let id = self.common_id(other);
                self.frames.delete(id)
            }
        }
    }

    fn set_known_text(&mut self, id: FrameId, text: impl Into<String>) {
        let frame = Frame::Text(TextFrame::new(self.default_encoding, text));
        self.frames.set(id, frame);
    }

    // ---- repeatable kinds ----

    pub fn user_defined_texts(&self) -> Vec<&UserDefinedTextFrame> {
        self.frames
            .frames(frame_ids::USER_DEFINED_TEXT)
            .filter_map(|frame| match frame {
                Frame::UserDefinedText(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn add_user_defined_text(&mut self, frame: UserDefinedTextFrame) {
        self.frames
            .add(frame_ids::USER_DEFINED_TEXT, Frame::UserDefinedText(frame));
    }

    pub fn comments(&self) -> Vec<&CommentFrame> {
        self.frames
            .frames(frame_ids::COMMENT)
            .filter_map(|frame| match frame {
                Frame::Comment(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    /// Add a comment. A comment with the same language and description is replaced.
    pub fn add_comment(&mut self, frame: CommentFrame) {
        self.frames.add(frame_ids::COMMENT, Frame::Comment(frame));
    }

    pub fn delete_comment(&mut self, language: &str, description: &str) -> Option<CommentFrame> {
        match self
            .frames
            .delete_keyed(frame_ids::COMMENT, &format!("{language}:{description}"))?
        {
            Frame::Comment(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn pictures(&self) -> Vec<&PictureFrame> {
        self.frames
            .frames(frame_ids::PICTURE)
            .filter_map(|frame| match frame {
                Frame::Picture(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    /// Add a picture. A picture with the same description is replaced.
    pub fn add_picture(&mut self, frame: PictureFrame) {
        self.frames.add(frame_ids::PICTURE, Frame::Picture(frame));
    }

    /// The front cover, or the first picture if none is marked as one.
    pub fn front_cover(&self) -> Option<&PictureFrame> {
        let pictures = self.pictures();
        pictures
            .iter()
            .find(|p| p.picture_type == PictureType::CoverFront)
            .or_else(|| pictures.first())
            .copied()
    }

    pub fn delete_picture(&mut self, description: &str) -> Option<PictureFrame> {
        match self.frames.delete_keyed(frame_ids::PICTURE, description)? {
            Frame::Picture(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn unsynchronised_lyrics(&self) -> Vec<&UnsynchronisedLyricsFrame> {
        self.frames
            .frames(frame_ids::UNSYNCHRONISED_LYRICS)
            .filter_map(|frame| match frame {
                Frame::UnsynchronisedLyrics(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn add_unsynchronised_lyrics(&mut self, frame: UnsynchronisedLyricsFrame) {
        self.frames.add(
            frame_ids::UNSYNCHRONISED_LYRICS,
            Frame::UnsynchronisedLyrics(frame),
        );
    }

    pub fn synchronised_lyrics(&self) -> Vec<&SynchronisedLyricsFrame> {
        self.frames
            .frames(frame_ids::SYNCHRONISED_LYRICS)
            .filter_map(|frame| match frame {
                Frame::SynchronisedLyrics(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn add_synchronised_lyrics(&mut self, frame: SynchronisedLyricsFrame) {
        self.frames.add(
            frame_ids::SYNCHRONISED_LYRICS,
            Frame::SynchronisedLyrics(frame),
        );
    }

    pub fn ufids(&self) -> Vec<&UfidFrame> {
        self.frames
            .frames(frame_ids::UFID)
            .filter_map(|frame| match frame {
                Frame::Ufid(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn add_ufid(&mut self, frame: UfidFrame) {
        self.frames.add(frame_ids::UFID, Frame::Ufid(frame));
    }

    pub fn popularimeters(&self) -> Vec<&PopularimeterFrame> {
        self.frames
            .frames(frame_ids::POPULARIMETER)
            .filter_map(|frame| match frame {
                Frame::Popularimeter(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn add_popularimeter(&mut self, frame: PopularimeterFrame) {
        self.frames
            .add(frame_ids::POPULARIMETER, Frame::Popularimeter(frame));
    }

    pub fn chapters(&self) -> Vec<&ChapterFrame> {
        self.frames
            .frames(frame_ids::CHAPTER)
            .filter_map(|frame| match frame {
                Frame::Chapter(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn add_chapter(&mut self, frame: ChapterFrame) {
        self.frames.add(frame_ids::CHAPTER, Frame::Chapter(frame));
    }

    pub fn chapter_tocs(&self) -> Vec<&ChapterTocFrame> {
        self.frames
            .frames(frame_ids::CHAPTER_TOC)
            .filter_map(|frame| match frame {
                Frame::ChapterToc(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn add_chapter_toc(&mut self, frame: ChapterTocFrame) {
        self.frames.add(frame_ids::CHAPTER_TOC, Frame::ChapterToc(frame));
    }

    /// Frames kept as raw bytes, with their IDs.
    pub fn unknown_frames(&self) -> Vec<(FrameId, &UnknownFrame)> {
        self.frames
            .iter()
            .filter_map(|(id, frame)| match frame {
                Frame::Unknown(f) => Some((id, f)),
                _ => None,
            })
            .collect()
    }

    // ---- writing ----

    /// Frames as they will be written in this tag's version.
    fn frames_to_write(&self) -> Vec<(FrameId, Cow<'_, Frame>)> {
        self.frames
            .iter()
            .map(|(id, frame)| (id, frame.for_version(self.version)))
            .collect()
    }

    fn frames_area_size(frames: &[(FrameId, Cow<'_, Frame>)]) -> Result<u32> {
        let size = v2::frames_area_size(frames.iter().map(|(id, frame)| (*id, &**frame)));
        u32::try_from(size)
            .ok()
            .filter(|&size| size <= MAX_SYNCHSAFE)
            .ok_or(Id3Error::SizeTooLarge {
                size,
                max: MAX_SYNCHSAFE,
            })
    }

    /// Bytes [`Tag::write_to`] would emit; 0 for a tag without frames.
    pub fn size(&self) -> u64 {
        let frames = self.frames_to_write();
        match v2::frames_area_size(frames.iter().map(|(id, frame)| (*id, &**frame))) {
            0 => 0,
            area => HEADER_SIZE as u64 + area,
        }
    }

    /// Serialize the tag. Returns the number of bytes written.
    ///
    /// A tag without frames writes nothing. Every frame is validated before the
    /// header goes out. On v2.3, text in UTF-16BE or UTF-8 is written as UTF-16.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<u64> {
        for (_, frame) in self.frames.iter() {
            frame.validate()?;
        }

        let frames = self.frames_to_write();
        let area = Self::frames_area_size(&frames)?;
        if area == 0 {
            return Ok(0);
        }

        writer.write_all(&write_header(self.version, area)?)?;
        let written = v2::write_frames(
            writer,
            frames.iter().map(|(id, frame)| (*id, &**frame)),
            self.version,
        )?;
        Ok(HEADER_SIZE as u64 + written)
    }

    /// Replace the tag region of the file this tag was opened from.
    ///
    /// The audio after the original tag is copied unchanged into a sibling file,
    /// which then replaces the original.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(Id3Error::NoFile)?;

        let mut tag_bytes = Vec::with_capacity(self.size() as usize);
        self.write_to(&mut tag_bytes)?;

        let mut original = File::open(&path)?;
        let metadata = original.metadata()?;
        let offset = self.original_size.min(metadata.len());
        original.seek(SeekFrom::Start(offset))?;

        let temp_path = temp_sibling(&path);
        let staged = stage(&temp_path, &tag_bytes, &mut original, metadata.permissions());
        drop(original);
        if let Err(e) = staged {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        info!(
            path = %path.display(),
            old_size = self.original_size,
            new_size = tag_bytes.len(),
            "saved tag"
        );
        self.original_size = tag_bytes.len() as u64;
        Ok(())
    }
}

/// v2.3 has no UTF-8, so it gets the lossless UTF-16 instead.
fn default_encoding_for(version: u8) -> Encoding {
    if version >= 4 {
        Encoding::UTF_8
    } else {
        Encoding::UTF_16
    }
}

fn check_fits(id: FrameId, frame: &Frame) -> Result<()> {
    if frame.fits(id) {
        return Ok(());
    }
    let expected = match frame.canonical_id() {
        Some(canonical) => canonical.to_string(),
        None => format!("an id for a {} frame", frame.kind()),
    };
    Err(Id3Error::UnexpectedFrameId {
        expected,
        found: id.to_string(),
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.oxid3-tmp"))
}

/// Write the new tag and the rest of `audio` to `temp_path`.
fn stage(
    temp_path: &Path,
    tag_bytes: &[u8],
    audio: &mut File,
    permissions: fs::Permissions,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(temp_path)?);
    out.write_all(tag_bytes)?;
    let copied = io::copy(audio, &mut out)?;
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.set_permissions(permissions)?;
    file.sync_all()?;
    debug!(audio_bytes = copied, "staged new file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample() -> Tag {
        let mut tag = Tag::new();
        tag.set_title("Song");
        tag.set_artist("Band");
        tag.add_comment(CommentFrame::new(Encoding::UTF_8, "eng", "", "nice"));
        tag
    }

    fn reparse(tag: &Tag) -> Tag {
        let mut bytes = Vec::new();
        tag.write_to(&mut bytes).unwrap();
        Tag::read_from(&mut &bytes[..], &Options::default()).unwrap()
    }

    #[test]
    fn test_empty_tag_writes_nothing() {
        let tag = Tag::new();
        let mut out = Vec::new();
        assert_eq!(tag.write_to(&mut out).unwrap(), 0);
        assert!(out.is_empty());
        assert_eq!(tag.size(), 0);
    }

    #[test]
    fn test_write_and_read_back() {
        let tag = sample();
        let mut out = Vec::new();
        let written = tag.write_to(&mut out).unwrap();
        assert_eq!(written, out.len() as u64);
        assert_eq!(written, tag.size());
        assert_eq!(&out[..5], b"ID3\x04\x00");

        let parsed = reparse(&tag);
        assert_eq!(parsed.title(), Some("Song"));
        assert_eq!(parsed.artist(), Some("Band"));
        assert_eq!(parsed.comments()[0].text, "nice");
        assert_eq!(parsed.count(), 3);
        assert_eq!(parsed.original_size(), written);
    }

    #[test]
    fn test_comment_overwrite() {
        let mut tag = Tag::new();
        tag.add_comment(CommentFrame::new(Encoding::UTF_8, "B", "B", "x"));
        tag.add_comment(CommentFrame::new(Encoding::UTF_8, "B", "B", "y"));
        let comments = tag.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "y");
    }

    #[test]
    fn test_invalid_language_fails_before_writing() {
        let mut tag = sample();
        tag.add_unsynchronised_lyrics(UnsynchronisedLyricsFrame::new(
            Encoding::UTF_8,
            "en",
            "",
            "words",
        ));
        let mut out = Vec::new();
        assert!(matches!(
            tag.write_to(&mut out),
            Err(Id3Error::InvalidLanguageLength(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_version_3_year_and_sizes() {
        let mut tag = Tag::new();
        tag.set_version(3).unwrap();
        assert_eq!(tag.default_encoding(), Encoding::UTF_16);
        tag.set_default_encoding(Encoding::ISO_8859_1);
        tag.set_year("1999");
        assert!(tag.text(frame_ids::YEAR).is_some());

        let parsed = reparse(&tag);
        assert_eq!(parsed.version(), 3);
        assert_eq!(parsed.year(), Some("1999"));
        assert_eq!(parsed.default_encoding(), Encoding::UTF_16);
        assert!(tag.set_version(2).is_err());
    }

    #[test]
    fn test_version_3_writes_only_v3_encodings() {
        let mut tag = Tag::new();
        tag.set_title("Song");
        tag.add_comment(CommentFrame::new(Encoding::UTF_16BE, "eng", "", "note"));
        let mut chapter = ChapterFrame::new("c", Duration::ZERO, Duration::from_secs(1));
        chapter.title = Some(TextFrame::new(Encoding::UTF_8, "Intro"));
        tag.add_chapter(chapter);
        tag.set_version(3).unwrap();

        let mut out = Vec::new();
        let written = tag.write_to(&mut out).unwrap();
        assert_eq!(written, tag.size());
        assert_eq!(out[3], 3);

        let parsed = reparse(&tag);
        assert_eq!(parsed.version(), 3);
        for (_, frame) in parsed.all_frames() {
            assert!(frame.encodings().iter().all(|e| !e.is_v4_only()));
        }
        assert_eq!(parsed.title(), Some("Song"));
        assert_eq!(parsed.comments()[0].text, "note");
        assert_eq!(parsed.chapters()[0].title.as_ref().unwrap().text, "Intro");

        // the tag itself keeps its encodings
        assert_eq!(tag.comments()[0].encoding, Encoding::UTF_16BE);
    }

    #[test]
    fn test_failed_reset_keeps_contents() {
        let mut tag = sample();
        let mut bytes = Vec::new();
        tag.write_to(&mut bytes).unwrap();
        tag.reset(&mut &bytes[..], &Options::default()).unwrap();
        let size = tag.original_size();

        // declares a 100 byte frame in a 20 byte area
        let broken = b"ID3\x04\x00\x00\x00\x00\x00\x14TIT2\x00\x00\x00\x64\x00\x00\x03abcdefghij";
        assert!(matches!(
            tag.reset(&mut &broken[..], &Options::default()),
            Err(Id3Error::BodyOverflow { .. })
        ));
        assert_eq!(tag.original_size(), size);
        assert_eq!(tag.title(), Some("Song"));
        assert_eq!(tag.count(), 3);
    }

    #[test]
    fn test_add_frame_checks_kind() {
        let mut tag = Tag::new();
        let comment = Frame::Comment(CommentFrame::new(Encoding::UTF_8, "eng", "", "x"));
        assert!(matches!(
            tag.add_frame(frame_ids::TITLE, comment.clone()),
            Err(Id3Error::UnexpectedFrameId { ref expected, ref found })
                if expected == "COMM" && found == "TIT2"
        ));
        tag.add_frame(frame_ids::COMMENT, comment).unwrap();

        let text = Frame::Text(TextFrame::new(Encoding::UTF_8, "x"));
        assert!(tag.add_frame(frame_ids::USER_DEFINED_TEXT, text.clone()).is_err());
        tag.add_frame("TPE3".parse().unwrap(), text).unwrap();
        assert_eq!(tag.count(), 2);
    }

    #[test]
    fn test_header_only_and_filter() {
        let mut bytes = Vec::new();
        sample().write_to(&mut bytes).unwrap();

        let tag = Tag::read_from(&mut &bytes[..], &Options::header_only()).unwrap();
        assert_eq!(tag.count(), 0);
        assert_eq!(tag.original_size(), bytes.len() as u64);

        let tag = Tag::read_from(&mut &bytes[..], &Options::only(["TPE1"])).unwrap();
        assert_eq!(tag.count(), 1);
        assert_eq!(tag.artist(), Some("Band"));

        assert!(matches!(
            Tag::read_from(&mut &bytes[..], &Options::only(["bad"])),
            Err(Id3Error::InvalidFrameId(_))
        ));
    }

    #[test]
    fn test_reset_replaces_contents() {
        let mut bytes = Vec::new();
        sample().write_to(&mut bytes).unwrap();

        let mut tag = Tag::new();
        tag.set_album("Old");
        tag.reset(&mut &bytes[..], &Options::default()).unwrap();
        assert_eq!(tag.album(), None);
        assert_eq!(tag.title(), Some("Song"));

        tag.reset(&mut &b"no tag here"[..], &Options::default()).unwrap();
        assert!(!tag.has_frames());
        assert_eq!(tag.original_size(), 0);
    }

    #[test]
    fn test_standard_fields() {
        let mut tag = Tag::new();
        assert!(tag.set_field(StandardField::Album, "Record"));
        assert!(tag.set_field(StandardField::Year, "2001"));
        assert!(tag.set_field(StandardField::Comment, "note"));
        assert!(!tag.set_field(StandardField::Cover, "x"));

        assert_eq!(tag.common_id(StandardField::Year), frame_ids::RECORDING_TIME);
        assert_eq!(tag.field(StandardField::Album).as_deref(), Some("Record"));
        assert_eq!(tag.field(StandardField::Year).as_deref(), Some("2001"));
        assert_eq!(tag.field(StandardField::Comment).as_deref(), Some("note"));
        assert_eq!(tag.field(StandardField::Cover), None);

        assert_eq!(tag.remove_field(StandardField::Year), 1);
        assert_eq!(tag.count(), 2);
    }

    #[test]
    fn test_save_without_file() {
        let mut tag = sample();
        assert!(matches!(tag.save(), Err(Id3Error::NoFile)));
    }

    #[test]
    fn test_unknown_frames_survive() {
        let mut tag = Tag::new();
        let id: FrameId = "PRIV".parse().unwrap();
        tag.add_frame(id, Frame::Unknown(UnknownFrame::new(b"owner\0data".to_vec())))
            .unwrap();
        let parsed = reparse(&tag);
        let unknown = parsed.unknown_frames();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].0, id);
        assert_eq!(unknown[0].1.body(), b"owner\0data");
    }

    #[test]
    fn test_front_cover_prefers_type() {
        let mut tag = Tag::new();
        tag.add_picture(PictureFrame::new(
            Encoding::UTF_8,
            "image/png",
            PictureType::CoverBack,
            "a",
            vec![1],
        ));
        tag.add_picture(PictureFrame::new(
            Encoding::UTF_8,
            "image/png",
            PictureType::CoverFront,
            "b",
            vec![2],
        ));
        assert_eq!(tag.front_cover().unwrap().picture_data, vec![2]);
        assert!(tag.delete_picture("b").is_some());
        assert_eq!(tag.front_cover().unwrap().picture_data, vec![1]);
    }
}
