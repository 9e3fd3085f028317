//! SDK versions, their reference archives, and version range resolution.
//!
//! The registry is built once from configuration, either from `(version, path)` pairs or
//! from a properties file of `version=path` lines, and lives for the rest of the run.
//!
//! ```text
//! # sdks.properties
//! 16=android-all-4.1.2_r1.jar
//! 21=android-all-5.0.2_r3.jar
//! 28: /opt/sdk/android-all-9.jar
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::warn;

use crate::{
    archive::{ArchiveLoader, JarLoader, ReferenceArchive},
    Error, Result,
};

/// One configured SDK version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// SDK version number
    pub version: u32,
    /// Location of the version's reference archive
    pub archive_path: PathBuf,
}

impl VersionEntry {
    /// Parses a version key as written in configuration.
    ///
    /// # Errors
    /// Returns [`Error::InvalidVersionNumber`] if `key` is not a non-negative integer.
    pub fn parse(key: &str, archive_path: impl Into<PathBuf>) -> Result<Self> {
        let trimmed = key.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(Error::InvalidVersionNumber(key.to_string()));
        }
        let version = trimmed
            .parse::<u32>()
            .map_err(|_| Error::InvalidVersionNumber(key.to_string()))?;

        Ok(VersionEntry {
            version,
            archive_path: archive_path.into(),
        })
    }
}

/// An inclusive range of SDK versions; `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SdkRange {
    /// Lowest included version
    pub min: Option<u32>,
    /// Highest included version
    pub max: Option<u32>,
}

impl SdkRange {
    /// The range covering every version.
    pub const UNBOUNDED: SdkRange = SdkRange {
        min: None,
        max: None,
    };

    /// Creates a range from optional bounds.
    #[must_use]
    pub const fn new(min: Option<u32>, max: Option<u32>) -> Self {
        SdkRange { min, max }
    }

    /// Creates a range bounded on both sides.
    #[must_use]
    pub const fn between(min: u32, max: u32) -> Self {
        SdkRange {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Converts annotation-style bounds, where a negative value means "not set".
    #[must_use]
    pub fn from_sentinels(min: i32, max: i32) -> Self {
        SdkRange {
            min: u32::try_from(min).ok(),
            max: u32::try_from(max).ok(),
        }
    }

    /// Intersects a method's declared range with the range of its declaring class.
    ///
    /// The effective minimum is the larger of both minimums, an unset one counting as 0.
    /// The class maximum replaces the declared one when it is set and smaller; otherwise the
    /// declared maximum stands, unset meaning unbounded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdkscope::SdkRange;
    ///
    /// let declared = SdkRange::from_sentinels(16, -1);
    /// let class = SdkRange::from_sentinels(-1, 23);
    /// assert_eq!(SdkRange::effective(declared, class), SdkRange::between(16, 23));
    /// ```
    #[must_use]
    pub fn effective(declared: SdkRange, class: SdkRange) -> SdkRange {
        let min = match (declared.min, class.min) {
            (Some(declared), Some(class)) => Some(declared.max(class)),
            (bound, None) | (None, bound) => bound,
        };
        let max = match (declared.max, class.max) {
            (Some(declared), Some(class)) if class < declared => Some(class),
            (None, Some(class)) => Some(class),
            (declared, _) => declared,
        };
        SdkRange { min, max }
    }

    /// Returns `true` if `version` lies within the range.
    #[must_use]
    pub fn contains(&self, version: u32) -> bool {
        self.min.map_or(true, |min| version >= min) && self.max.map_or(true, |max| version <= max)
    }
}

impl std::fmt::Display for SdkRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.min {
            Some(min) => write!(f, "[{min}, ")?,
            None => f.write_str("[0, ")?,
        }
        match self.max {
            Some(max) => write!(f, "{max}]"),
            None => f.write_str("∞]"),
        }
    }
}

/// All known SDK versions, each mapped to its reference archive.
///
/// # Examples
///
/// ```rust,no_run
/// use sdkscope::{SdkRange, VersionRegistry};
///
/// let registry = VersionRegistry::new([("21", "android-all-21.jar"), ("28", "android-all-28.jar")])?;
/// for archive in registry.matching_versions(SdkRange::new(Some(23), None)) {
///     println!("{} -> {}", archive.version(), archive.path().display());
/// }
/// # Ok::<(), sdkscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct VersionRegistry {
    archives: BTreeMap<u32, ReferenceArchive>,
}

impl VersionRegistry {
    /// Builds a registry of jar-backed archives from `(version key, path)` pairs.
    ///
    /// # Errors
    /// Returns [`Error::InvalidVersionNumber`] for a key that is not a non-negative integer
    /// and [`Error::DuplicateVersion`] if a version appears twice.
    pub fn new<K, P>(entries: impl IntoIterator<Item = (K, P)>) -> Result<Self>
    where
        K: AsRef<str>,
        P: Into<PathBuf>,
    {
        Self::with_loader(entries, Arc::new(JarLoader))
    }

    /// Like [`VersionRegistry::new`], with archives opened through `loader`.
    ///
    /// # Errors
    /// See [`VersionRegistry::new`].
    pub fn with_loader<K, P>(
        entries: impl IntoIterator<Item = (K, P)>,
        loader: Arc<dyn ArchiveLoader>,
    ) -> Result<Self>
    where
        K: AsRef<str>,
        P: Into<PathBuf>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, path)| VersionEntry::parse(key.as_ref(), path))
            .collect::<Result<Vec<_>>>()?;
        Self::from_entries(entries, &loader)
    }

    /// Builds a registry from already parsed entries.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateVersion`] if a version appears twice.
    pub fn from_entries(
        entries: impl IntoIterator<Item = VersionEntry>,
        loader: &Arc<dyn ArchiveLoader>,
    ) -> Result<Self> {
        Self::from_archives(entries.into_iter().map(|entry| {
            ReferenceArchive::with_loader(entry.version, entry.archive_path, loader.clone())
        }))
    }

    /// Builds a registry from archives constructed by the caller.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateVersion`] if two archives share a version.
    pub fn from_archives(archives: impl IntoIterator<Item = ReferenceArchive>) -> Result<Self> {
        let mut registry = BTreeMap::new();
        for archive in archives {
            let version = archive.version();
            if registry.insert(version, archive).is_some() {
                return Err(Error::DuplicateVersion(version));
            }
        }
        Ok(VersionRegistry { archives: registry })
    }

    /// Parses properties text of `version=path` or `version: path` lines.
    ///
    /// Blank lines and lines starting with `#` or `!` are skipped. Relative paths are joined
    /// onto `base_dir` when one is given. A later line for an already listed version, such as
    /// `016` after `16`, replaces the earlier one.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a line without a separator, plus the errors of
    /// [`VersionRegistry::new`].
    pub fn from_properties(text: &str, base_dir: Option<&Path>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let Some(split) = line.find(['=', ':']) else {
                return Err(malformed_error!(
                    "Line {} has no '=' or ':' separator - {}",
                    number + 1,
                    line
                ));
            };
            let key = line[..split].trim();
            let value = line[split + 1..].trim();

            let path = PathBuf::from(value);
            let path = match base_dir {
                Some(base) if path.is_relative() => base.join(path),
                _ => path,
            };
            let entry = VersionEntry::parse(key, path)?;
            if let Some(replaced) = entries.insert(entry.version, entry) {
                warn!(
                    "SDK {} is listed again on line {}, replacing {}",
                    replaced.version,
                    number + 1,
                    replaced.archive_path.display()
                );
            }
        }

        Self::from_entries(
            entries.into_values(),
            &(Arc::new(JarLoader) as Arc<dyn ArchiveLoader>),
        )
    }

    /// Reads a properties file; relative paths resolve against the file's directory.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file cannot be read, plus the errors of
    /// [`VersionRegistry::from_properties`].
    pub fn from_properties_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_properties(&text, path.parent())
    }

    /// Archives of every registered version within `range`, ascending.
    #[must_use]
    pub fn matching_versions(&self, range: SdkRange) -> Vec<&ReferenceArchive> {
        let min = range.min.unwrap_or(0);
        let max = range.max.unwrap_or(u32::MAX);
        if min > max {
            return Vec::new();
        }
        self.archives.range(min..=max).map(|(_, archive)| archive).collect()
    }

    /// The archive of one version.
    #[must_use]
    pub fn get(&self, version: u32) -> Option<&ReferenceArchive> {
        self.archives.get(&version)
    }

    /// All registered versions, ascending.
    pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.archives.keys().copied()
    }

    /// All archives, ascending by version.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceArchive> {
        self.archives.values()
    }

    /// Number of registered versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Returns `true` if no versions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}
