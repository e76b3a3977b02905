use crate::bitio::{BitIn, BitInput, BitOutput};
use crate::{Error, Result, Stats, RUN_LENGTH_BITS};
use std::io;

pub struct DeRle<O> {
    is_one: bool,
    stats: Stats,
    output: O,
}

impl<O: BitOutput> DeRle<O> {
    pub fn new(output: O) -> DeRle<O> {
        DeRle {
            is_one: false,
            stats: Stats::default(),
            output,
        }
    }

    /// Writes `run_length` copies of the current bit, then flips polarity.
    #[inline(always)]
    pub fn update(&mut self, run_length: u8) -> Result<()> {
        trace!("decode run: is_one={}, length={run_length}", self.is_one);
        for _ in 0..run_length {
            self.output.write_bit(self.is_one)?;
        }
        self.stats.bits_read += RUN_LENGTH_BITS as u64;
        self.stats.bits_written += run_length as u64;
        self.is_one = !self.is_one;
        Ok(())
    }

    #[inline(always)]
    pub fn finalize(mut self) -> Result<Stats> {
        self.output.close()?;
        debug!(
            "expanded {} bits into {} bits",
            self.stats.bits_read, self.stats.bits_written
        );
        Ok(self.stats)
    }

    /// Closes the output after a failure, padding the bits decoded so far,
    /// and hands the failure back.
    pub fn abort(mut self, err: Error) -> Error {
        warn!("expansion stopped after {} bits: {err}", self.stats.bits_read);
        if let Err(close_err) = self.output.close() {
            warn!("closing output failed: {close_err}");
        }
        err
    }
}

impl<O: BitOutput> io::Write for DeRle<O> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for run_length in buf.iter() {
            self.update(*run_length)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Rebuilds the bit stream from run lengths read 8 bits at a time.
///
/// The first run is a run of 0s. The output is closed in every case,
/// including when a run length is cut short or writing fails.
pub fn expand<I, O>(input: &mut I, output: O) -> Result<Stats>
where
    I: BitInput + ?Sized,
    O: BitOutput,
{
    let mut derle = DeRle::new(output);
    match feed(input, &mut derle) {
        Ok(()) => derle.finalize(),
        Err(err) => Err(derle.abort(err)),
    }
}

fn feed<I, O>(input: &mut I, derle: &mut DeRle<O>) -> Result<()>
where
    I: BitInput + ?Sized,
    O: BitOutput,
{
    while !input.is_exhausted()? {
        let run_length = input.read_bits(RUN_LENGTH_BITS)?;
        derle.update(run_length as u8)?;
    }
    Ok(())
}

pub fn expand_bytes(bytes: &[u8]) -> Result<Vec<bool>> {
    let mut bits: Vec<bool> = Vec::new();
    expand(&mut BitIn::new(bytes), &mut bits)?;
    Ok(bits)
}
