// Standard metadata field mapping
//
// Maps the handful of fields most tools care about (title, artist, year, ...)
// onto ID3v2 frame IDs. The year moved from TYER in v2.3 to TDRC in v2.4,
// which is the only mapping that depends on the tag version.

use std::str::FromStr;

use serde::Serialize;

use crate::id3::frames::{frame_ids, FrameId};

/// Standard metadata fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardField {
    Title,
    Artist,
    AlbumArtist,
    Album,
    Composer,
    Year,
    Track,
    Disc,
    Genre,
    Bpm,
    Comment,
    Lyrics,
    Cover,
}

impl StandardField {
    pub const ALL: [StandardField; 13] = [
        StandardField::Title,
        StandardField::Artist,
        StandardField::AlbumArtist,
        StandardField::Album,
        StandardField::Composer,
        StandardField::Year,
        StandardField::Track,
        StandardField::Disc,
        StandardField::Genre,
        StandardField::Bpm,
        StandardField::Comment,
        StandardField::Lyrics,
        StandardField::Cover,
    ];

    /// Get standard field name (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardField::Title => "title",
            StandardField::Artist => "artist",
            StandardField::AlbumArtist => "album_artist",
            StandardField::Album => "album",
            StandardField::Composer => "composer",
            StandardField::Year => "year",
            StandardField::Track => "track",
            StandardField::Disc => "disc",
            StandardField::Genre => "genre",
            StandardField::Bpm => "bpm",
            StandardField::Comment => "comment",
            StandardField::Lyrics => "lyrics",
            StandardField::Cover => "cover",
        }
    }
}

impl FromStr for StandardField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        StandardField::ALL
            .into_iter()
            .find(|field| field.as_str() == lower || (lower == "date" && *field == StandardField::Year))
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

/// Frame ID mappings
pub struct FieldMappings;

impl FieldMappings {
    /// Frame ID holding `field` in a tag of the given major version.
    pub fn frame_id(field: StandardField, version: u8) -> FrameId {
        match field {
            StandardField::Title => frame_ids::TITLE,
            StandardField::Artist => frame_ids::ARTIST,
            StandardField::AlbumArtist => frame_ids::ALBUM_ARTIST,
            StandardField::Album => frame_ids::ALBUM,
            StandardField::Composer => frame_ids::COMPOSER,
            StandardField::Year if version >= 4 => frame_ids::RECORDING_TIME,
            StandardField::Year => frame_ids::YEAR,
            StandardField::Track => frame_ids::TRACK,
            StandardField::Disc => frame_ids::DISC,
            StandardField::Genre => frame_ids::GENRE,
            StandardField::Bpm => frame_ids::BPM,
            StandardField::Comment => frame_ids::COMMENT,
            StandardField::Lyrics => frame_ids::UNSYNCHRONISED_LYRICS,
            StandardField::Cover => frame_ids::PICTURE,
        }
    }

    /// Convert a frame ID back to a standard field
    pub fn from_frame_id(id: FrameId) -> Option<StandardField> {
        use frame_ids::*;
        Some(match id {
            TITLE => StandardField::Title,
            ARTIST => StandardField::Artist,
            ALBUM_ARTIST => StandardField::AlbumArtist,
            ALBUM => StandardField::Album,
            COMPOSER => StandardField::Composer,
            RECORDING_TIME | YEAR => StandardField::Year,
            TRACK => StandardField::Track,
            DISC => StandardField::Disc,
            GENRE => StandardField::Genre,
            BPM => StandardField::Bpm,
            COMMENT => StandardField::Comment,
            UNSYNCHRONISED_LYRICS => StandardField::Lyrics,
            PICTURE => StandardField::Cover,
            _ => return None,
        })
    }
}

/// The 80 genres of the original ID3v1 table, referenced by number from `TCON`.
const GENRES: [&str; 80] = [
    "Blues",
    "Classic Rock",
    "Country",
    "Dance",
    "Disco",
    "Funk",
    "Grunge",
    "Hip-Hop",
    "Jazz",
    "Metal",
    "New Age",
    "Oldies",
    "Other",
    "Pop",
    "R&B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Pranks",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz+Funk",
    "Fusion",
    "Trance",
    "Classical",
    "Instrumental",
    "Acid",
    "House",
    "Game",
    "Sound Clip",
    "Gospel",
    "Noise",
    "AlternRock",
    "Bass",
    "Soul",
    "Punk",
    "Space",
    "Meditative",
    "Instrumental Pop",
    "Instrumental Rock",
    "Ethnic",
    "Gothic",
    "Darkwave",
    "Techno-Industrial",
    "Electronic",
    "Pop-Folk",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native American",
    "Cabaret",
    "New Wave",
    "Psychadelic",
    "Rave",
    "Showtunes",
    "Trailer",
    "Lo-Fi",
    "Tribal",
    "Acid Punk",
    "Acid Jazz",
    "Polka",
    "Retro",
    "Musical",
    "Rock & Roll",
    "Hard Rock",
];

/// Metadata value converter for ID3-specific value formats
pub struct ValueConverter;

impl ValueConverter {
    /// Look up a numeric ID3v1 genre
    pub fn parse_genre_id3v1(genre_id: u8) -> Option<&'static str> {
        GENRES.get(genre_id as usize).copied()
    }

    /// Resolve `TCON` content: `(17)`, `(17)Rock`, `17`, `(RX)` or plain text.
    ///
    /// A refinement after the references wins over them.
    pub fn resolve_genre(genre: &str) -> String {
        let trimmed = genre.trim();
        if let Some(name) = lookup_reference(trimmed) {
            return name.to_string();
        }

        let mut rest = trimmed;
        let mut names = Vec::new();
        while let Some(after_paren) = rest.strip_prefix('(') {
            // "((" escapes a literal parenthesis in the refinement
            if after_paren.starts_with('(') {
                rest = after_paren;
                break;
            }
            let Some(close) = after_paren.find(')') else {
                break;
            };
            let reference = &after_paren[..close];
            names.push(lookup_reference(reference).unwrap_or(reference).to_string());
            rest = &after_paren[close + 1..];
        }

        match (rest.trim(), names.is_empty()) {
            ("", false) => names.join(", "),
            ("", true) => String::new(),
            (refinement, _) => refinement.to_string(),
        }
    }
}

fn lookup_reference(reference: &str) -> Option<&'static str> {
    match reference {
        "RX" => Some("Remix"),
        "CR" => Some("Cover"),
        digits => digits
            .parse::<u8>()
            .ok()
            .and_then(ValueConverter::parse_genre_id3v1),
    }
}
