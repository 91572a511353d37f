// APIC attached picture frame

use std::io::Write;

use base64::Engine;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::utils::encoding::{self, Encoding};
use crate::utils::io::{terminated_size, write_terminated, BodyReader};

/// Picture types according to the ID3v2 APIC frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PictureType {
    Other,
    FileIcon,
    OtherFileIcon,
    CoverFront,
    CoverBack,
    LeafletPage,
    Media,
    LeadArtist,
    Artist,
    Conductor,
    Band,
    Composer,
    Lyricist,
    RecordingLocation,
    DuringRecording,
    DuringPerformance,
    VideoScreenCapture,
    BrightColouredFish,
    Illustration,
    BandLogo,
    PublisherLogo,
    /// A code outside the table, kept so it is written back unchanged.
    Undefined(u8),
}

impl PictureType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => PictureType::Other,
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            other => PictureType::Undefined(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            PictureType::Other => 0,
            PictureType::FileIcon => 1,
            PictureType::OtherFileIcon => 2,
            PictureType::CoverFront => 3,
            PictureType::CoverBack => 4,
            PictureType::LeafletPage => 5,
            PictureType::Media => 6,
            PictureType::LeadArtist => 7,
            PictureType::Artist => 8,
            PictureType::Conductor => 9,
            PictureType::Band => 10,
            PictureType::Composer => 11,
            PictureType::Lyricist => 12,
            PictureType::RecordingLocation => 13,
            PictureType::DuringRecording => 14,
            PictureType::DuringPerformance => 15,
            PictureType::VideoScreenCapture => 16,
            PictureType::BrightColouredFish => 17,
            PictureType::Illustration => 18,
            PictureType::BandLogo => 19,
            PictureType::PublisherLogo => 20,
            PictureType::Undefined(code) => code,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File Icon",
            PictureType::OtherFileIcon => "Other File Icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording Location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
            PictureType::Undefined(_) => "Undefined",
        }
    }
}

/// `APIC`: an embedded image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PictureFrame {
    pub encoding: Encoding,
    pub mime_type: String,
    pub picture_type: PictureType,
    pub description: String,
    #[serde(serialize_with = "serialize_base64")]
    pub picture_data: Vec<u8>,
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
}

impl PictureFrame {
    pub fn new(
        encoding: Encoding,
        mime_type: impl Into<String>,
        picture_type: PictureType,
        description: impl Into<String>,
        picture_data: Vec<u8>,
    ) -> Self {
        PictureFrame {
            encoding,
            mime_type: mime_type.into(),
            picture_type,
            description: description.into(),
            picture_data,
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let encoding = Encoding::from_byte(reader.read_u8()?);
        let mime_type = reader.read_text_terminated(Encoding::ISO_8859_1);
        let picture_type = PictureType::from_u8(reader.read_u8()?);
        let description = reader.read_text_terminated(encoding);
        let picture_data = reader.read_rest().to_vec();
        Ok(PictureFrame {
            encoding,
            mime_type,
            picture_type,
            description,
            picture_data,
        })
    }

    pub fn size(&self) -> usize {
        1 + terminated_size(&self.mime_type, Encoding::ISO_8859_1)
            + 1
            + terminated_size(&self.description, self.encoding)
            + self.picture_data.len()
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.encoding.key()])?;
        write_terminated(writer, &self.mime_type, Encoding::ISO_8859_1)?;
        writer.write_all(&[self.picture_type.to_u8()])?;
        write_terminated(writer, &self.description, self.encoding)?;
        writer.write_all(&self.picture_data)?;
        Ok(())
    }

    /// File extension for the image's MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tiff",
            _ => "jpg",
        }
    }
}

/// Guess a MIME type from an image file extension.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "image/jpeg",
    }
}
