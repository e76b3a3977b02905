//! Bit-level input and output collaborators of the codec.
//!
//! Bits are read and written MSB first. Fixed-width integers are big-endian
//! and may be 1 to 32 bits wide.

use crate::{Error, Result};
use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use std::io::{self, BufRead};

const MAX_WIDTH: u32 = u32::BITS;

#[inline(always)]
fn check_width(width: u32) -> Result<()> {
    if width == 0 || width > MAX_WIDTH {
        return Err(Error::InvalidWidth(width));
    }
    Ok(())
}

pub trait BitInput {
    /// Whether every bit has been consumed.
    fn is_exhausted(&mut self) -> Result<bool>;

    /// Reads one bit, failing with [`Error::EndOfStream`] when exhausted.
    fn read_bit(&mut self) -> Result<bool>;

    /// Reads `width` bits as a big-endian unsigned integer.
    fn read_bits(&mut self, width: u32) -> Result<u32> {
        check_width(width)?;
        let mut value = 0;
        for _ in 0..width {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }
}

pub trait BitOutput {
    fn write_bit(&mut self, bit: bool) -> Result<()>;

    /// Writes the low `width` bits of `value`, MSB first.
    fn write_bits(&mut self, width: u32, value: u32) -> Result<()> {
        check_width(width)?;
        if width < MAX_WIDTH && value >> width != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{value} does not fit in {width} bits"),
            )
            .into());
        }
        for shift in (0..width).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Pads the last partial byte with 0 bits and flushes.
    fn close(&mut self) -> Result<()>;
}

impl<T: BitInput + ?Sized> BitInput for &mut T {
    fn is_exhausted(&mut self) -> Result<bool> {
        (**self).is_exhausted()
    }

    fn read_bit(&mut self) -> Result<bool> {
        (**self).read_bit()
    }

    fn read_bits(&mut self, width: u32) -> Result<u32> {
        (**self).read_bits(width)
    }
}

impl<T: BitOutput + ?Sized> BitOutput for &mut T {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        (**self).write_bit(bit)
    }

    fn write_bits(&mut self, width: u32, value: u32) -> Result<()> {
        (**self).write_bits(width, value)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Reads bits from a byte stream.
pub struct BitIn<R: BufRead> {
    reader: BitReader<R, BigEndian>,
}

impl<R: BufRead> BitIn<R> {
    pub fn new(reader: R) -> BitIn<R> {
        BitIn {
            reader: BitReader::endian(reader, BigEndian),
        }
    }
}

#[inline(always)]
fn end_of_stream(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::EndOfStream
    } else {
        Error::Io(err)
    }
}

impl<R: BufRead> BitInput for BitIn<R> {
    /// Bits are left while the reader sits inside a byte; on a byte
    /// boundary the underlying buffer decides.
    fn is_exhausted(&mut self) -> Result<bool> {
        match self.reader.reader() {
            Some(reader) => Ok(reader.fill_buf()?.is_empty()),
            None => Ok(false),
        }
    }

    fn read_bit(&mut self) -> Result<bool> {
        self.reader.read_bit().map_err(end_of_stream)
    }

    fn read_bits(&mut self, width: u32) -> Result<u32> {
        check_width(width)?;
        let value = self.reader.read::<u32>(width).map_err(end_of_stream)?;
        trace!("read {value:#x} in {width} bits");
        Ok(value)
    }
}

/// Writes bits to a byte stream.
pub struct BitOut<W: io::Write> {
    writer: BitWriter<W, BigEndian>,
}

impl<W: io::Write> BitOut<W> {
    pub fn new(writer: W) -> BitOut<W> {
        BitOut {
            writer: BitWriter::endian(writer, BigEndian),
        }
    }

    /// Returns the inner writer. Bits of an unfinished byte are dropped, so
    /// call [`BitOutput::close`] first.
    pub fn into_inner(self) -> W {
        self.writer.into_writer()
    }
}

impl<W: io::Write> BitOutput for BitOut<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.writer.write_bit(bit)?;
        Ok(())
    }

    fn write_bits(&mut self, width: u32, value: u32) -> Result<()> {
        check_width(width)?;
        self.writer.write(width, value)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.byte_align()?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<'a> BitInput for &'a [bool] {
    fn is_exhausted(&mut self) -> Result<bool> {
        Ok(self.is_empty())
    }

    fn read_bit(&mut self) -> Result<bool> {
        let (&bit, rest) = self.split_first().ok_or(Error::EndOfStream)?;
        *self = rest;
        Ok(bit)
    }
}

/// Collects bits in memory. Nothing is padded on close.
impl BitOutput for Vec<bool> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.push(bit);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
