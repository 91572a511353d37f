// UFID unique file identifier and POPM popularimeter frames

use std::io::Write;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::utils::encoding::Encoding;
use crate::utils::io::{terminated_size, write_terminated, BodyReader};

/// `UFID`: an identifier issued by the owner of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UfidFrame {
    pub owner_identifier: String,
    pub identifier: Vec<u8>,
}

impl UfidFrame {
    pub fn new(owner_identifier: impl Into<String>, identifier: impl Into<Vec<u8>>) -> Self {
        UfidFrame {
            owner_identifier: owner_identifier.into(),
            identifier: identifier.into(),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let owner_identifier = reader.read_text_terminated(Encoding::ISO_8859_1);
        let identifier = reader.read_rest().to_vec();
        Ok(UfidFrame {
            owner_identifier,
            identifier,
        })
    }

    pub fn size(&self) -> usize {
        terminated_size(&self.owner_identifier, Encoding::ISO_8859_1) + self.identifier.len()
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_terminated(writer, &self.owner_identifier, Encoding::ISO_8859_1)?;
        writer.write_all(&self.identifier)?;
        Ok(())
    }
}

/// Minimum width of the play counter on the wire.
const MIN_COUNTER_BYTES: usize = 4;

/// `POPM`: a per-user rating and play counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularimeterFrame {
    pub email: String,
    /// 1 is worst, 255 is best, 0 is unknown.
    pub rating: u8,
    #[serde(serialize_with = "serialize_decimal")]
    pub counter: BigUint,
}

fn serialize_decimal<S: Serializer>(
    value: &BigUint,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_str_radix(10))
}

impl PopularimeterFrame {
    pub fn new(email: impl Into<String>, rating: u8, counter: impl Into<BigUint>) -> Self {
        PopularimeterFrame {
            email: email.into(),
            rating,
            counter: counter.into(),
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut reader = BodyReader::new(body);
        let email = reader.read_text_terminated(Encoding::ISO_8859_1);
        let rating = reader.read_u8()?;
        let counter = BigUint::from_bytes_be(reader.read_rest());
        Ok(PopularimeterFrame {
            email,
            rating,
            counter,
        })
    }

    fn counter_bytes(&self) -> Vec<u8> {
        let digits = if self.counter.is_zero() {
            Vec::new()
        } else {
            self.counter.to_bytes_be()
        };
        let pad = MIN_COUNTER_BYTES.saturating_sub(digits.len());
        let mut bytes = vec![0u8; pad];
        bytes.extend(digits);
        bytes
    }

    pub fn size(&self) -> usize {
        let digits = ((self.counter.bits() + 7) / 8) as usize;
        terminated_size(&self.email, Encoding::ISO_8859_1) + 1 + digits.max(MIN_COUNTER_BYTES)
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_terminated(writer, &self.email, Encoding::ISO_8859_1)?;
        writer.write_all(&[self.rating])?;
        writer.write_all(&self.counter_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ufid_round_trip() {
        let frame = UfidFrame::new("http://musicbrainz.org", b"f1e2d3".to_vec());
        let mut out = Vec::new();
        frame.write_body(&mut out).unwrap();
        assert_eq!(out, b"http://musicbrainz.org\x00f1e2d3");
        assert_eq!(out.len(), frame.size());
        assert_eq!(UfidFrame::parse(&out).unwrap(), frame);
    }

    #[test]
    fn test_counter_padded_to_four_bytes() {
        let frame = PopularimeterFrame::new("x@y.z", 196, 1u32);
        let mut out = Vec::new();
        frame.write_body(&mut out).unwrap();
        assert_eq!(out, b"x@y.z\x00\xC4\x00\x00\x00\x01");
        assert_eq!(out.len(), frame.size());

        let zero = PopularimeterFrame::new("", 0, 0u32);
        assert_eq!(zero.size(), 1 + 1 + 4);
        let mut out = Vec::new();
        zero.write_body(&mut out).unwrap();
        assert_eq!(out, b"\x00\x00\x00\x00\x00\x00");
    }

    #[test]
    fn test_counter_wider_than_u32() {
        let big = BigUint::from(u64::MAX) * 256u32 + 7u32;
        let frame = PopularimeterFrame::new("a", 1, big.clone());
        let mut out = Vec::new();
        frame.write_body(&mut out).unwrap();
        assert_eq!(out.len(), frame.size());
        assert_eq!(out.len(), 2 + 1 + 9);
        let parsed = PopularimeterFrame::parse(&out).unwrap();
        assert_eq!(parsed.counter, big);
    }

    #[test]
    fn test_counter_may_be_absent() {
        let frame = PopularimeterFrame::parse(b"a\x00\x05").unwrap();
        assert_eq!(frame.rating, 5);
        assert!(frame.counter.is_zero());
    }
}
