// ID3v2 tag handling
pub mod frames;
pub mod header;
pub mod sequence;
pub mod tag;
pub mod v2;

pub use tag::{Options, Tag};
