#[macro_use]
extern crate log;

use bitmap_rle::{bitmap, compress, expand, BitIn, BitOut, Mode, OverflowPolicy};
use clap::ArgAction::SetTrue;
use clap::Parser;
use std::io::BufWriter;
use std::path::PathBuf;
use std::{error, io};

/// Compress or expand a binary bit stream with run-length encoding
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// `-` compresses standard input to standard output, `+` expands it
    #[clap(allow_hyphen_values = true)]
    mode: Mode,

    /// Split runs over 255 bits without a zero-length separator, as older encoders did.
    ///
    /// By default a run of 256 or more bits is written as `255, 0, ...` so it
    /// expands back unchanged; the older tool wrote `255, ...` instead, so the
    /// two outputs differ for such runs. Pass this flag to produce byte-identical
    /// output to the older tool (which then expands such runs incorrectly).
    #[clap(long, default_value_t = false, action(SetTrue))]
    legacy_overflow: bool,

    /// Bitmap image to compress from, or to expand into, in place of raw standard input/output
    #[clap(short, long)]
    image: Option<PathBuf>,

    /// Width in pixels of the bitmap written when expanding
    #[clap(short, long)]
    width: Option<u32>,

    /// Pixels darker than this luma are 1 bits
    #[clap(short, long, default_value_t = 128)]
    threshold: u8,
}

fn main() -> Result<(), Box<dyn error::Error>> {
    pretty_env_logger::init();
    let args: Args = Args::parse();
    let policy = if args.legacy_overflow {
        OverflowPolicy::Restart
    } else {
        OverflowPolicy::Split
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stats = match (args.mode, args.image) {
        (Mode::Compress, None) => compress(
            &mut BitIn::new(stdin.lock()),
            BitOut::new(BufWriter::new(stdout.lock())),
            policy,
        )?,
        (Mode::Compress, Some(path)) => {
            let bits = bitmap::open_bitmap(&path, args.threshold)?;
            compress(
                &mut bits.as_slice(),
                BitOut::new(BufWriter::new(stdout.lock())),
                policy,
            )?
        }
        (Mode::Expand, None) => expand(
            &mut BitIn::new(stdin.lock()),
            BitOut::new(BufWriter::new(stdout.lock())),
        )?,
        (Mode::Expand, Some(path)) => {
            let width = args
                .width
                .ok_or("--width is required to expand into an image")?;
            let mut bits: Vec<bool> = Vec::new();
            let stats = expand(&mut BitIn::new(stdin.lock()), &mut bits)?;
            bitmap::save_bitmap(&bits, width, &path)?;
            stats
        }
    };
    info!("{} bits -> {} bits", stats.bits_read, stats.bits_written);
    Ok(())
}
