use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("illegal mode argument {0:?}, expected `-` or `+`")]
    InvalidMode(String),
    #[error("read past the end of the bit stream")]
    EndOfStream,
    #[error("fixed width must be within 1..=32 bits, got {0}")]
    InvalidWidth(u32),
    #[error("{bits} bits cannot be laid out {width} pixels wide")]
    InvalidDimensions { bits: usize, width: u32 },
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => err,
            Error::EndOfStream => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
