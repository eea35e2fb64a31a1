//! [`Storage`]-related implementations.

pub mod fs;
#[cfg(any(test, feature = "memory"))]
pub mod memory;

use std::io;

use derive_more::{Debug, Display, Error as StdError, From};

#[cfg(doc)]
use crate::domain::property::Image;
use crate::domain::property::image;

#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;
pub use self::fs::Fs;

/// File storage operation.
pub use common::Handler as Storage;

/// Contents of an [`Image`] file to be stored.
#[derive(Clone, Debug)]
pub struct Blob {
    /// [`image::File`] to store the contents at.
    pub file: image::File,

    /// Raw contents of the file.
    #[debug("{} bytes", bytes.len())]
    pub bytes: Vec<u8>,
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Fs`] I/O error.
    #[display("I/O operation failed: {_0}")]
    Io(io::Error),

    /// [`Memory`] error.
    #[cfg(any(test, feature = "memory"))]
    Memory(memory::Error),
}
