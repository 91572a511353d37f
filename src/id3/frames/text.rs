// Text information, user-defined text and comment frames

use std::io::Write;

use serde::Serialize;

use super::{check_language, write_language};
use crate::error::Result;
use crate::utils::encoding::{self, Encoding};
use crate::utils::io::{terminated_size, write_terminated, BodyReader};

/// Any `T***` frame other than `TXXX`.
///
/// Body: encoding byte, then the text. No terminator is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextFrame {
    pub encoding: Encoding,
    pub text: String,
}

impl TextFrame {
    pub fn new(encoding: Encoding, text: impl Into<String>) -> Self {
        TextFrame {
            encoding,
            text: text.into(),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let encoding = Encoding::from_byte(reader.read_u8()?);
        let text = reader.read_text_rest(encoding);
        Ok(TextFrame { encoding, text })
    }

    pub fn size(&self) -> usize {
        1 + encoding::encoded_size(&self.text, self.encoding)
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.encoding.key()])?;
        writer.write_all(&encoding::encode(&self.text, self.encoding))?;
        Ok(())
    }
}

/// `TXXX`: a free-form description/value pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDefinedTextFrame {
    pub encoding: Encoding,
    pub description: String,
    pub value: String,
}

impl UserDefinedTextFrame {
    pub fn new(
        encoding: Encoding,
        description: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        UserDefinedTextFrame {
            encoding,
            description: description.into(),
            value: value.into(),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let encoding = Encoding::from_byte(reader.read_u8()?);
        let description = reader.read_text_terminated(encoding);
        let value = reader.read_text_rest(encoding);
        Ok(UserDefinedTextFrame {
            encoding,
            description,
            value,
        })
    }

    pub fn size(&self) -> usize {
        1 + terminated_size(&self.description, self.encoding)
            + encoding::encoded_size(&self.value, self.encoding)
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[self.encoding.key()])?;
        write_terminated(writer, &self.description, self.encoding)?;
        writer.write_all(&encoding::encode(&self.value, self.encoding))?;
        Ok(())
    }
}

/// `COMM`: a comment keyed by language and description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentFrame {
    pub encoding: Encoding,
    /// ISO-639-2 code, exactly three characters.
    pub language: String,
    pub description: String,
    pub text: String,
}

impl CommentFrame {
    pub fn new(
        encoding: Encoding,
        language: impl Into<String>,
        description: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        CommentFrame {
            encoding,
            language: language.into(),
            description: description.into(),
            text: text.into(),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let encoding = Encoding::from_byte(reader.read_u8()?);
        let language = encoding::decode(&reader.read_array::<3>()?, Encoding::ISO_8859_1);
        let description = reader.read_text_terminated(encoding);
        let text = reader.read_text_rest(encoding);
        Ok(CommentFrame {
            encoding,
            language,
            description,
            text,
        })
    }

    pub fn validate(&self) -> Result<()> {
        check_language(&self.language)
    }

    pub fn size(&self) -> usize {
        1 + 3
            + terminated_size(&self.description, self.encoding)
            + encoding::encoded_size(&self.text, self.encoding)
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.validate()?;
        writer.write_all(&[self.encoding.key()])?;
        write_language(writer, &self.language)?;
        write_terminated(writer, &self.description, self.encoding)?;
        writer.write_all(&encoding::encode(&self.text, self.encoding))?;
        Ok(())
    }
}
