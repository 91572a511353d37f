// Error types for ID3v2 parsing and writing

/// Errors that can occur while reading, editing or saving an ID3v2 tag.
#[derive(Debug, thiserror::Error)]
pub enum Id3Error {
    /// The source ended before a full 10-byte tag header could be read.
    #[error("source is shorter than an ID3v2 header")]
    ShortHeader,

    /// The tag declares a major version this crate cannot handle.
    #[error("unsupported ID3v2 version 2.{0}")]
    UnsupportedVersion(u8),

    /// A synch-safe integer had the high bit set in one of its bytes.
    #[error("invalid synch-safe size: high bit set")]
    InvalidSizeFormat,

    /// A size does not fit the 28-bit synch-safe range.
    #[error("size too large ({size} bytes, max {max})")]
    SizeTooLarge { size: u64, max: u32 },

    /// A frame claims more body bytes than remain in the tag's frame area.
    #[error("frame {id} declares {size} bytes but only {remaining} remain in the tag")]
    BodyOverflow {
        id: String,
        size: u32,
        remaining: u32,
    },

    /// A frame kind was paired with a frame ID it cannot live under.
    #[error("unexpected frame id {found} (expected {expected})")]
    UnexpectedFrameId { expected: String, found: String },

    /// A language code that is not exactly three characters long.
    #[error("language code must be exactly 3 characters, got {0:?}")]
    InvalidLanguageLength(String),

    /// A frame identifier that is not four uppercase ASCII letters or digits.
    #[error("invalid frame id {0:?}")]
    InvalidFrameId(String),

    /// A frame body ended before all of its mandatory fields were read.
    #[error("frame body is truncated")]
    TruncatedFrame,

    /// The tag was not opened from a file, so there is nothing to save to.
    #[error("tag was not opened from a file")]
    NoFile,

    /// An I/O error from the underlying source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Id3Error>;
