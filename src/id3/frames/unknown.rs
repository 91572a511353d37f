// Frames without a dedicated codec

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::Result;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A frame body kept as raw bytes and written back unchanged.
///
/// Every instance gets its own id, so unknown frames never replace each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownFrame {
    #[serde(skip)]
    body: Vec<u8>,
    unique_id: u64,
}

impl UnknownFrame {
    pub fn new(body: Vec<u8>) -> Self {
        UnknownFrame {
            body,
            unique_id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn unique_id(&self) -> u64 {
        self.unique_id
    }

    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn write_body<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct() {
        let a = UnknownFrame::new(vec![1]);
        let b = UnknownFrame::new(vec![1]);
        assert_ne!(a.unique_id(), b.unique_id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_body_written_verbatim() {
        let frame = UnknownFrame::new(vec![0, 0xFF, 7]);
        let mut out = Vec::new();
        frame.write_body(&mut out).unwrap();
        assert_eq!(out, vec![0, 0xFF, 7]);
        assert_eq!(frame.size(), 3);
    }
}
