use crate::bitio::{BitInput, BitOut, BitOutput};
use crate::{Error, Result, Stats, MAX_RUN_LENGTH, RUN_LENGTH_BITS};
use std::io;

/// How a run longer than 255 bits is split.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Emit `0xFF`, then a zero-length run of the opposite bit, then keep
    /// counting. Decodes back to the input.
    #[default]
    Split,
    /// Emit `0xFF` and keep counting, as older encoders did. The decoder
    /// flips polarity after the `0xFF`, so runs of 256 bits or more do not
    /// survive a round trip.
    Restart,
}

pub struct Rle<O> {
    status: RleStatus,
    policy: OverflowPolicy,
    stats: Stats,
    output: O,
}

#[derive(Debug, Copy, Clone)]
enum RleStatus {
    Run { is_one: bool, counter: u16 },
    Wait,
}

impl<O: BitOutput> Rle<O> {
    pub fn new(output: O) -> Self {
        Self::with_policy(output, OverflowPolicy::default())
    }

    pub fn with_policy(output: O, policy: OverflowPolicy) -> Self {
        Rle {
            status: RleStatus::Wait,
            policy,
            stats: Stats::default(),
            output,
        }
    }

    #[inline(always)]
    pub fn update(&mut self, bit: bool) -> Result<()> {
        self.stats.bits_read += 1;
        match self.status {
            RleStatus::Wait => {
                if bit {
                    trace!("stream starts with 1, emit empty run of 0s");
                    self.emit(0)?;
                }
                self.status = RleStatus::Run {
                    is_one: bit,
                    counter: 1,
                };
                trace!("transit to {:?}", self.status);
            }
            RleStatus::Run { is_one, counter } if is_one == bit => {
                let counter = counter + 1;
                if counter > MAX_RUN_LENGTH {
                    trace!("run overflow, cut at {MAX_RUN_LENGTH}");
                    self.emit(MAX_RUN_LENGTH as u8)?;
                    if self.policy == OverflowPolicy::Split {
                        self.emit(0)?;
                    }
                    self.status = RleStatus::Run { is_one, counter: 1 };
                } else {
                    self.status = RleStatus::Run { is_one, counter };
                }
            }
            RleStatus::Run { counter, .. } => {
                self.emit(counter as u8)?;
                self.status = RleStatus::Run {
                    is_one: bit,
                    counter: 1,
                };
                trace!("transit to {:?}", self.status);
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn emit(&mut self, run_length: u8) -> Result<()> {
        trace!("encode run {run_length}");
        self.output.write_bits(RUN_LENGTH_BITS, run_length as u32)?;
        self.stats.bits_written += RUN_LENGTH_BITS as u64;
        Ok(())
    }

    /// Emits the pending run and closes the output.
    pub fn finalize(mut self) -> Result<Stats> {
        let status = self.status;
        trace!("last run: {:?}", status);
        if let RleStatus::Run { counter, .. } = status {
            if let Err(err) = self.emit(counter as u8) {
                return Err(self.abort(err));
            }
        }
        self.output.close()?;
        debug!(
            "compressed {} bits into {} bits",
            self.stats.bits_read, self.stats.bits_written
        );
        Ok(self.stats)
    }

    /// Closes the output after a failure and hands the failure back.
    /// The pending run is dropped.
    pub fn abort(mut self, err: Error) -> Error {
        warn!("compression stopped after {} bits: {err}", self.stats.bits_read);
        if let Err(close_err) = self.output.close() {
            warn!("closing output failed: {close_err}");
        }
        err
    }
}

impl<O: BitOutput> io::Write for Rle<O> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf.iter() {
            for shift in (0..8).rev() {
                self.update((byte >> shift) & 1 == 1)?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run-length encodes every bit of `input` into `output`.
///
/// An empty input writes nothing. The output is closed in every case,
/// including when reading or writing fails.
pub fn compress<I, O>(input: &mut I, output: O, policy: OverflowPolicy) -> Result<Stats>
where
    I: BitInput + ?Sized,
    O: BitOutput,
{
    let mut rle = Rle::with_policy(output, policy);
    match feed(input, &mut rle) {
        Ok(()) => rle.finalize(),
        Err(err) => Err(rle.abort(err)),
    }
}

fn feed<I, O>(input: &mut I, rle: &mut Rle<O>) -> Result<()>
where
    I: BitInput + ?Sized,
    O: BitOutput,
{
    while !input.is_exhausted()? {
        rle.update(input.read_bit()?)?;
    }
    Ok(())
}

pub fn compress_bits(mut bits: &[bool], policy: OverflowPolicy) -> Result<Vec<u8>> {
    let mut out = BitOut::new(Vec::new());
    compress(&mut bits, &mut out, policy)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{compress, compress_bits, OverflowPolicy, Rle};
    use crate::bitio::{BitInput, BitOut, BitOutput};
    use crate::testing::setup;
    use crate::{Error, Result};
    use std::io;
    use std::io::Write;

    const TEST_VECTOR: [(&str, &str); 12] = [
        ("", ""),
        ("00", "08"),
        ("FF", "0008"),
        ("0F", "0404"),
        ("F0", "000404"),
        ("55", "0101010101010101"),
        ("AA", "000101010101010101"),
        ("00FF", "0808"),
        ("FFFF0000", "001010"),
        ("0000000F", "1c04"),
        ("8001", "00010e01"),
        ("07FF80", "050c07"),
    ];

    fn encode(input: &[u8], policy: OverflowPolicy) -> Vec<u8> {
        let mut out = BitOut::new(Vec::<u8>::new());
        let mut rle = Rle::with_policy(&mut out, policy);
        rle.write_all(input).unwrap();
        rle.finalize().unwrap();
        out.into_inner()
    }

    #[test]
    fn test_rle_encode() {
        setup();
        for (input, expected) in TEST_VECTOR.into_iter() {
            let input = hex::decode(input).unwrap();
            let expected = hex::decode(expected).unwrap();
            assert_eq!(expected, encode(&input, OverflowPolicy::Split));
        }
    }

    #[test]
    fn test_rle_update_bits() {
        setup();
        let mut out = BitOut::new(Vec::<u8>::new());
        let mut rle = Rle::new(&mut out);
        for bit in [false, false, true, false, false, false] {
            rle.update(bit).unwrap();
        }
        let stats = rle.finalize().unwrap();
        assert_eq!(stats.bits_read, 6);
        assert_eq!(stats.bits_written, 24);
        assert_eq!(out.into_inner(), [2, 1, 3]);
    }

    #[test]
    fn test_rle_short_streams() {
        setup();
        let bits = [false; 5];
        assert_eq!(compress_bits(&bits, OverflowPolicy::Split).unwrap(), [5]);
        let bits = [true, true, false, false, false];
        assert_eq!(
            compress_bits(&bits, OverflowPolicy::Split).unwrap(),
            [0, 2, 3]
        );
        assert!(compress_bits(&[], OverflowPolicy::Split)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_rle_max_run() {
        setup();
        // 255 zeros then a single one
        let mut input = vec![0u8; 31];
        input.push(0x01);
        for policy in [OverflowPolicy::Split, OverflowPolicy::Restart] {
            assert_eq!(encode(&input, policy), [0xFF, 0x01]);
        }
        let bits = [true; 255];
        assert_eq!(
            compress_bits(&bits, OverflowPolicy::Split).unwrap(),
            [0x00, 0xFF]
        );
    }

    #[test]
    fn test_rle_overflow_split() {
        setup();
        assert_eq!(encode(&[0; 32], OverflowPolicy::Split), [0xFF, 0x00, 0x01]);
        assert_eq!(
            encode(&[0xFF; 64], OverflowPolicy::Split),
            [0x00, 0xFF, 0x00, 0xFF, 0x00, 0x02]
        );
        let mut input = vec![0u8; 32];
        input.push(0x80);
        assert_eq!(
            encode(&input, OverflowPolicy::Split),
            [0xFF, 0x00, 0x01, 0x01, 0x07]
        );
        let bits = [false; 510];
        assert_eq!(
            compress_bits(&bits, OverflowPolicy::Split).unwrap(),
            [0xFF, 0x00, 0xFF]
        );
    }

    #[test]
    fn test_rle_overflow_restart() {
        setup();
        assert_eq!(encode(&[0; 32], OverflowPolicy::Restart), [0xFF, 0x01]);
        assert_eq!(
            encode(&[0xFF; 64], OverflowPolicy::Restart),
            [0x00, 0xFF, 0xFF, 0x02]
        );
    }

    /// Yields its bits, then fails as a broken pipe would.
    struct Broken<'a>(&'a [bool]);

    impl BitInput for Broken<'_> {
        fn is_exhausted(&mut self) -> Result<bool> {
            Ok(false)
        }

        fn read_bit(&mut self) -> Result<bool> {
            match self.0.read_bit() {
                Err(Error::EndOfStream) => {
                    Err(io::Error::new(io::ErrorKind::BrokenPipe, "input went away").into())
                }
                other => other,
            }
        }
    }

    #[derive(Default)]
    struct Recorded {
        bits: Vec<bool>,
        closed: bool,
    }

    impl BitOutput for Recorded {
        fn write_bit(&mut self, bit: bool) -> Result<()> {
            self.bits.write_bit(bit)
        }

        fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn test_rle_closes_output_on_read_error() {
        setup();
        let mut out = Recorded::default();
        let result = compress(
            &mut Broken(&[true, true, false]),
            &mut out,
            OverflowPolicy::Split,
        );
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(out.closed);
        // runs 0 and 2 were emitted, the pending run of 0s is dropped
        let mut expected: Vec<bool> = vec![];
        expected.write_bits(8, 0).unwrap();
        expected.write_bits(8, 2).unwrap();
        assert_eq!(out.bits, expected);

        let mut out = BitOut::new(Vec::<u8>::new());
        let result = compress(
            &mut Broken(&[true, true, false]),
            &mut out,
            OverflowPolicy::Split,
        );
        assert!(result.is_err());
        assert_eq!(out.into_inner(), [0, 2]);
    }
}
