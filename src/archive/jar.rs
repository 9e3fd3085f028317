//! Read-only access to jar (zip) archives.
//!
//! The archive bytes stay memory-mapped; [`zip::ZipArchive`] indexes the central directory
//! once when the jar is opened and decompresses single entries on request. Entry sizes come
//! from the archive itself, so reads are bounded by the recorded size and a payload that
//! inflates past it is rejected instead of buffered.

use std::{
    io::{Cursor, Read},
    path::Path,
    sync::Mutex,
};

use zip::{result::ZipError, ZipArchive};

use crate::{archive::ArchiveReader, File, Result};

/// Upper bound for buffers sized from a recorded entry size before any data was read.
const PREALLOCATION_LIMIT: usize = 1 << 20;

/// An opened jar archive with its central directory indexed by entry name.
pub struct JarFile {
    archive: Mutex<ZipArchive<Cursor<File>>>,
}

impl JarFile {
    /// Memory-maps and indexes the archive at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, and
    /// [`crate::Error::ZipError`] if it is not a readable zip archive.
    pub fn open(path: &Path) -> Result<Self> {
        Self::load(File::from_file(path)?)
    }

    /// Indexes an archive held in memory.
    ///
    /// # Errors
    /// See [`JarFile::open`].
    pub fn from_mem(data: Vec<u8>) -> Result<Self> {
        Self::load(File::from_mem(data)?)
    }

    fn load(file: File) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(file))?;
        Ok(JarFile {
            archive: Mutex::new(archive),
        })
    }

    /// All entry names, directories included, in central directory order.
    ///
    /// # Errors
    /// Returns [`crate::Error::LockError`] if a reader panicked while holding the archive.
    pub fn names(&self) -> Result<Vec<String>> {
        let archive = lock!(self.archive);
        Ok(archive.file_names().map(str::to_string).collect())
    }

    /// Reads and decompresses the entry `name`.
    ///
    /// Returns `Ok(None)` if the archive has no such entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the data does not inflate, or its size or
    /// CRC-32 do not match the central directory, and [`crate::Error::ZipError`] for entries
    /// the zip reader cannot open (encrypted or unknown compression methods).
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut archive = lock!(self.archive);
        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let expected = entry.size();
        let capacity = usize::try_from(expected).map_or(PREALLOCATION_LIMIT, |size| {
            size.min(PREALLOCATION_LIMIT)
        });
        let mut data = Vec::with_capacity(capacity);
        // One byte past the recorded size is enough to tell that an entry overflows it
        (&mut entry)
            .take(expected.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|error| malformed_error!("Failed to read {} - {}", name, error))?;

        if data.len() as u64 != expected {
            return Err(malformed_error!(
                "Entry {} inflates past {} bytes",
                name,
                expected
            ));
        }

        Ok(Some(data))
    }
}

impl ArchiveReader for JarFile {
    fn read_entry(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.read(name)
    }
}
