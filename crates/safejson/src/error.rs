use std::io;

use thiserror::Error;

use crate::mask::MaskError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The encoder met a value JSON cannot express (NaN, ±Inf).
    #[error("json: unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("error masking data: {0}")]
    Mask(#[source] MaskError),

    #[error("error printing data: {0}")]
    Print(#[source] Box<Error>),
}

pub type Result<T> = core::result::Result<T, Error>;
