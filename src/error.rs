//! Defines [`Error`], the error of all fallible operations in this crate.
use std::fmt::{Debug, Display, Formatter};

use std::error::Error as StdError;

/// The error of fallible operations in this crate.
#[derive(Debug)]
pub enum Error {
    /// Returned when an allocation request cannot be fulfilled, either by the
    /// global allocator or because it would exceed a pool's limit.
    OutOfMemory(String),
    /// Returned when an operation is called with invalid arguments.
    InvalidArgumentError(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OutOfMemory(desc) => write!(f, "Out of memory: {}", desc),
            Error::InvalidArgumentError(desc) => {
                write!(f, "Invalid argument error: {}", desc)
            }
        }
    }
}

impl StdError for Error {}

/// A specialized `Result` whose error is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
