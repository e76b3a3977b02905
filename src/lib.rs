//! # Bitmap RLE Scheme
//!
//! A binary stream is cut into maximal runs of identical bits. Every run is
//! stored as one 8-bit unsigned run length, MSB first.
//!
//! ```text
//!  bits:   0 0 0 0 0 | 1 1 1 | 0 0
//!           run = 5   run = 3  run = 2
//!  bytes:  0x05        0x03     0x02
//! ```
//!
//! Runs alternate polarity and the first run is always a run of 0s. A stream
//! starting with 1 therefore begins with a zero-length run (`0x00`).
//!
//! A run can hold at most 255 bits. Longer runs are split, see
//! [`OverflowPolicy`]: the default inserts a zero-length run of the opposite
//! bit after every full `0xFF`, so polarity keeps alternating and the decoder
//! reproduces the input exactly. [`OverflowPolicy::Restart`] writes the legacy
//! form without the separator, which the decoder reads back as a polarity
//! change.
//!
//! The encoding carries no length. Compressed output is always byte aligned;
//! expanded output is padded with 0 bits up to the next byte boundary.
//!
//! Compression pays off only for long runs. Alternating single bits cost one
//! byte per bit.

#[macro_use]
extern crate log;

pub mod bitio;
pub mod bitmap;
mod derle;
mod error;
mod rle;

pub use bitio::{BitIn, BitInput, BitOut, BitOutput};
pub use derle::{expand, expand_bytes, DeRle};
pub use error::{Error, Result};
pub use rle::{compress, compress_bits, OverflowPolicy, Rle};

use std::str::FromStr;

/// width of one encoded run length
const RUN_LENGTH_BITS: u32 = 8;
const MAX_RUN_LENGTH: u16 = (1 << RUN_LENGTH_BITS) - 1;

/// Bit counts on both sides of a transform.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Stats {
    pub bits_read: u64,
    pub bits_written: u64,
}

/// Direction selected on the command line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Expand,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "-" | "compress" => Ok(Mode::Compress),
            "+" | "expand" => Ok(Mode::Expand),
            other => Err(Error::InvalidMode(other.to_owned())),
        }
    }
}
