use std::path::PathBuf;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Parsing Errors
/// - [`Error::Malformed`] - Corrupted class file or archive structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::Empty`] - Empty input provided
///
/// ## Configuration Errors
/// - [`Error::InvalidVersionNumber`] - A version key is not a non-negative integer
/// - [`Error::DuplicateVersion`] - The same version was configured twice
/// - [`Error::ArchiveOpen`] - A reference archive could not be opened
///
/// ## I/O
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::ZipError`] - The zip container of an archive could not be read
///
/// Configuration errors abort a validation run. Parsing errors raised while decoding a single
/// class are absorbed by [`crate::archive::ReferenceArchive`] and surface as a missing class.
///
/// # Examples
///
/// ```rust,no_run
/// use sdkscope::{Error, VersionRegistry};
/// use std::path::Path;
///
/// match VersionRegistry::from_properties_file(Path::new("sdks.properties")) {
///     Ok(registry) => println!("{} versions", registry.len()),
///     Err(Error::InvalidVersionNumber(key)) => eprintln!("bad version key: {key}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The data is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing.
    #[error("Out of Bound read would have occurred! - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The zip container is damaged or uses a feature the zip reader does not handle,
    /// such as encrypted entries.
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// A configured version key is not a non-negative integer.
    #[error("Invalid version number - '{0}'")]
    InvalidVersionNumber(String),

    /// The same version number appears more than once in the configuration.
    #[error("Version {0} is configured more than once")]
    DuplicateVersion(u32),

    /// The reference archive for a version could not be opened.
    ///
    /// This is fatal for the version: once an open attempt failed, every further lookup
    /// against the same archive returns this error again.
    #[error("Failed to open SDK {version} at {}: {message}", path.display())]
    ArchiveOpen {
        /// The platform version the archive belongs to
        version: u32,
        /// The configured archive path
        path: PathBuf,
        /// Description of the underlying failure
        message: String,
    },

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,
}
