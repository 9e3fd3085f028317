//! Byte-level file abstraction for reference archives.
//!
//! This module abstracts over the places archive bytes can come from and provides the
//! bounds-checked reader the class file parser is built on.
//!
//! # Key Components
//!
//! - [`crate::file::File`] - Owned bytes of an archive, handed to the zip reader
//! - [`crate::file::Backend`] - Where the bytes live: a read-only [`memmap2::Mmap`] of a
//!   file on disk, or a `Vec<u8>` for tests and embedded archives
//! - [`crate::file::parser::Parser`] - Cursor-based reader for class files
//! - [`crate::file::io`] - Endian-aware primitive reads
//!
//! # Examples
//!
//! ```rust,no_run
//! use sdkscope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("android-all-21.jar"))?;
//! let bytes: &[u8] = file.as_ref();
//! println!("Mapped {} bytes", bytes.len());
//! # Ok::<(), sdkscope::Error>(())
//! ```

pub mod io;
pub mod parser;

use std::{fs, path::Path};

use memmap2::Mmap;

use crate::{Error::Empty, Result};

/// Source of archive bytes.
///
/// Implementations must be thread-safe: a single archive is shared by every validation
/// thread targeting its platform version.
pub trait Backend: Send + Sync {
    /// Returns the full data buffer.
    fn data(&self) -> &[u8];
}

impl Backend for Vec<u8> {
    fn data(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Backend for Mmap {
    fn data(&self) -> &[u8] {
        &self[..]
    }
}

/// Raw bytes of a reference archive, either memory-mapped from disk or held in memory.
pub struct File {
    data: Box<dyn Backend>,
}

impl File {
    /// Maps a file from disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped and
    /// [`crate::Error::Empty`] for a zero-length file.
    pub fn from_file(file: &Path) -> Result<File> {
        let handle = fs::File::open(file)?;
        // Read-only; reference archives are not rewritten while a validation run holds them
        let mapping = unsafe { Mmap::map(&handle)? };

        Self::load(mapping)
    }

    /// Wraps an in-memory buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if `data` is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(data)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.data().is_empty() {
            return Err(Empty);
        }

        Ok(File {
            data: Box::new(data),
        })
    }
}

impl AsRef<[u8]> for File {
    fn as_ref(&self) -> &[u8] {
        self.data.data()
    }
}
