// I/O utilities for reading and writing frame bodies

use std::io::{self, Read, Write};

use crate::error::{Id3Error, Result};
use crate::utils::encoding::{self, Encoding};

/// Read a fixed-size array from a reader.
pub fn read_array<R: Read, const N: usize>(reader: &mut R) -> io::Result<[u8; N]> {
    let mut buffer = [0u8; N];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Read as many bytes as the reader can provide, up to `buf.len()`.
///
/// Unlike `read_exact`, a short source is reported through the return value.
pub fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Skip exactly `count` bytes of a reader.
pub fn skip<R: Read>(reader: &mut R, count: u64) -> io::Result<()> {
    let copied = io::copy(&mut reader.take(count), &mut io::sink())?;
    if copied < count {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "source ended inside a frame body",
        ));
    }
    Ok(())
}

/// Write `text` in `enc` followed by that encoding's terminator.
pub fn write_terminated<W: Write>(writer: &mut W, text: &str, enc: Encoding) -> io::Result<()> {
    writer.write_all(&encoding::encode(text, enc))?;
    writer.write_all(enc.terminator())
}

/// Byte count of `text` in `enc` plus its terminator.
pub fn terminated_size(text: &str, enc: Encoding) -> usize {
    encoding::encoded_size(text, enc) + enc.terminator().len()
}

/// Cursor over an in-memory frame body.
pub struct BodyReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BodyReader { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_be_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Id3Error::TruncatedFrame);
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    /// Everything that is left in the body.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }

    /// Bytes up to the next terminator of `enc`, consuming the terminator.
    ///
    /// A missing terminator takes the rest of the body.
    pub fn read_terminated(&mut self, enc: Encoding) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        let width = enc.terminator().len();

        let end = (0..rest.len().saturating_sub(width - 1))
            .step_by(width)
            .find(|&i| rest[i..i + width].iter().all(|&b| b == 0));

        match end {
            Some(end) => {
                self.pos += end + width;
                &rest[..end]
            }
            None => self.read_rest(),
        }
    }

    pub fn read_text_terminated(&mut self, enc: Encoding) -> String {
        encoding::decode(self.read_terminated(enc), enc)
    }

    /// Decode the rest of the body, dropping trailing NULs other taggers leave behind.
    pub fn read_text_rest(&mut self, enc: Encoding) -> String {
        let text = encoding::decode(self.read_rest(), enc);
        match text.trim_end_matches('\0').len() {
            len if len == text.len() => text,
            len => text[..len].to_string(),
        }
    }
}
