//! Lazily opened reference archives with a per-class signature cache.
//!
//! A [`ReferenceArchive`] stands for the platform jar of one SDK version. Nothing is read
//! until the first lookup: the archive is then opened once, and every class that is asked
//! for is decoded at most once. Classes that do not exist, or whose entry fails to decode,
//! are cached as absent so repeated lookups stay cheap.
//!
//! # Key Components
//!
//! - [`ReferenceArchive`] - One SDK version's archive and its class cache
//! - [`ArchiveLoader`] / [`ArchiveReader`] - Seam between the cache and the archive format
//! - [`JarLoader`] / [`jar::JarFile`] - The zip implementation used by default
//!
//! # Thread Safety
//!
//! Cached lookups go through a [`dashmap::DashMap`] and never block. A miss takes the
//! archive's mutex, checks the cache again, then reads, decodes and publishes the class
//! before releasing it. Concurrent requests for the same missing class therefore decode it
//! exactly once, and the underlying reader is never used from two threads at a time.

pub mod jar;

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use dashmap::DashMap;
use log::{debug, warn};

use crate::{
    archive::jar::JarFile,
    classfile::{parse_class, ClassFile},
    signature::ClassSignatureTable,
    Error, Result,
};

/// Random access to the entries of an opened archive.
pub trait ArchiveReader: Send + Sync {
    /// Returns the contents of entry `name`, or `Ok(None)` if the archive has no such entry.
    ///
    /// # Errors
    /// Returns an error if the entry exists but cannot be read.
    fn read_entry(&self, name: &str) -> Result<Option<Vec<u8>>>;
}

/// Opens archives for a [`ReferenceArchive`].
pub trait ArchiveLoader: Send + Sync {
    /// Opens the archive at `path`.
    ///
    /// # Errors
    /// Returns an error if the archive is missing or unreadable.
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>>;
}

/// Loads memory-mapped jar files.
#[derive(Debug, Default, Clone, Copy)]
pub struct JarLoader;

impl ArchiveLoader for JarLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>> {
        Ok(Box::new(JarFile::open(path)?))
    }
}

/// `None` until the first open attempt, then its outcome. A failure is kept as its message.
type OpenState = Option<std::result::Result<Box<dyn ArchiveReader>, String>>;

/// The reference archive of one SDK version.
///
/// # Examples
///
/// ```rust,no_run
/// use sdkscope::ReferenceArchive;
///
/// let archive = ReferenceArchive::new(28, "android-all-9.jar");
/// if let Some(table) = archive.lookup_class("android.view.View")? {
///     println!("{} has {} method keys", table.class_name(), table.len());
/// }
/// # Ok::<(), sdkscope::Error>(())
/// ```
pub struct ReferenceArchive {
    version: u32,
    path: PathBuf,
    loader: Arc<dyn ArchiveLoader>,
    state: Mutex<OpenState>,
    classes: DashMap<String, Option<Arc<ClassSignatureTable>>>,
}

impl ReferenceArchive {
    /// Creates an unopened archive for `version`, read from a jar at `path`.
    pub fn new(version: u32, path: impl Into<PathBuf>) -> Self {
        Self::with_loader(version, path, Arc::new(JarLoader))
    }

    /// Creates an unopened archive that is opened through `loader`.
    pub fn with_loader(version: u32, path: impl Into<PathBuf>, loader: Arc<dyn ArchiveLoader>) -> Self {
        ReferenceArchive {
            version,
            path: path.into(),
            loader,
            state: Mutex::new(None),
            classes: DashMap::new(),
        }
    }

    /// The SDK version this archive belongs to.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Location of the archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of class names cached so far, absent classes included.
    #[must_use]
    pub fn cached_classes(&self) -> usize {
        self.classes.len()
    }

    /// Opens the archive if that has not been attempted yet.
    ///
    /// Only the first call touches the filesystem. A failed open is remembered and reported
    /// again by every later call without retrying.
    ///
    /// # Errors
    /// Returns [`Error::ArchiveOpen`] if the archive cannot be opened.
    pub fn open(&self) -> Result<()> {
        let mut state = lock!(self.state);
        self.ensure_open(&mut state).map(|_| ())
    }

    /// Returns the signature table of the class with the dotted binary name `class_name`.
    ///
    /// Returns `Ok(None)` if the archive has no such class or its entry cannot be decoded;
    /// both outcomes are cached.
    ///
    /// # Errors
    /// Returns [`Error::ArchiveOpen`] if the archive cannot be opened.
    pub fn lookup_class(&self, class_name: &str) -> Result<Option<Arc<ClassSignatureTable>>> {
        if let Some(cached) = self.cached(class_name) {
            return Ok(cached);
        }

        let mut state = lock!(self.state);
        // Another thread may have decoded the class while this one waited
        if let Some(cached) = self.cached(class_name) {
            return Ok(cached);
        }

        let reader = self.ensure_open(&mut state)?;
        let table = self
            .decode(reader, class_name)
            .map(|class| Arc::new(ClassSignatureTable::from_class(&class)));
        self.classes.insert(class_name.to_string(), table.clone());
        Ok(table)
    }

    /// Decodes the class `class_name` without consulting or filling the cache.
    ///
    /// # Errors
    /// Returns [`Error::ArchiveOpen`] if the archive cannot be opened.
    pub fn class_file(&self, class_name: &str) -> Result<Option<ClassFile>> {
        let mut state = lock!(self.state);
        let reader = self.ensure_open(&mut state)?;
        Ok(self.decode(reader, class_name))
    }

    fn cached(&self, class_name: &str) -> Option<Option<Arc<ClassSignatureTable>>> {
        self.classes.get(class_name).map(|entry| entry.value().clone())
    }

    fn ensure_open<'s>(&self, state: &'s mut OpenState) -> Result<&'s dyn ArchiveReader> {
        let opened = state.get_or_insert_with(|| {
            match self.loader.open(&self.path) {
                Ok(reader) => {
                    debug!("Opened SDK {} archive {}", self.version, self.path.display());
                    Ok(reader)
                }
                Err(error) => {
                    warn!(
                        "Failed to open SDK {} archive {}: {}",
                        self.version,
                        self.path.display(),
                        error
                    );
                    Err(error.to_string())
                }
            }
        });

        match opened {
            Ok(reader) => Ok(&**reader),
            Err(message) => Err(Error::ArchiveOpen {
                version: self.version,
                path: self.path.clone(),
                message: message.clone(),
            }),
        }
    }

    fn decode(&self, reader: &dyn ArchiveReader, class_name: &str) -> Option<ClassFile> {
        let entry_name = format!("{}.class", class_name.replace('.', "/"));
        let data = match reader.read_entry(&entry_name) {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!("SDK {} has no entry {}", self.version, entry_name);
                return None;
            }
            Err(error) => {
                warn!(
                    "Failed to read {} from SDK {} archive {}: {}",
                    entry_name,
                    self.version,
                    self.path.display(),
                    error
                );
                return None;
            }
        };

        match parse_class(&data) {
            Ok(class) => Some(class),
            Err(error) => {
                warn!(
                    "Failed to decode {} from SDK {} archive {}: {}",
                    entry_name,
                    self.version,
                    self.path.display(),
                    error
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for ReferenceArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceArchive")
            .field("version", &self.version)
            .field("path", &self.path)
            .field("cached_classes", &self.classes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::Ordering, thread};

    use super::*;
    use crate::{
        classfile::MethodAccessFlags,
        signature::{MethodKey, MethodMatch},
        test::{ClassBuilder, CountingLoader, FailingLoader, JarBuilder},
    };

    fn view_jar() -> Vec<u8> {
        let view = ClassBuilder::new("android/view/View")
            .method(MethodAccessFlags::PUBLIC, "<init>", "(Landroid/content/Context;)V")
            .method(MethodAccessFlags::PUBLIC, "setAlpha", "(F)V")
            .method(MethodAccessFlags::PUBLIC, "getTag", "()Ljava/lang/Object;");
        let entry = ClassBuilder::new("java/util/Map$Entry")
            .method(MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT, "getKey", "()Ljava/lang/Object;");

        JarBuilder::new()
            .class("android/view/View", &view)
            .class("java/util/Map$Entry", &entry)
            .entry("android/broken/Broken.class", b"not a class")
            .build()
    }

    fn counting_archive() -> (ReferenceArchive, Arc<crate::test::LoaderCounters>) {
        let loader = CountingLoader::new(view_jar());
        let counters = loader.counters.clone();
        (
            ReferenceArchive::with_loader(28, "android-all-28.jar", Arc::new(loader)),
            counters,
        )
    }

    #[test]
    fn lookup_decodes_methods() {
        let (archive, _) = counting_archive();
        let table = archive.lookup_class("android.view.View").unwrap().unwrap();

        assert_eq!(table.class_name(), "android.view.View");
        let key = MethodKey::new("setAlpha", vec!["float".to_string()]);
        assert!(matches!(table.find(&key), MethodMatch::Exact(_)));

        let nested = archive.lookup_class("java.util.Map$Entry").unwrap().unwrap();
        assert_eq!(nested.class_name(), "java.util.Map$Entry");
    }

    #[test]
    fn open_is_lazy_and_idempotent() {
        let (archive, counters) = counting_archive();
        assert_eq!(counters.opens(), 0);

        archive.open().unwrap();
        archive.open().unwrap();
        archive.lookup_class("android.view.View").unwrap();
        assert_eq!(counters.opens(), 1);
    }

    #[test]
    fn lookups_are_cached() {
        let (archive, counters) = counting_archive();

        let first = archive.lookup_class("android.view.View").unwrap().unwrap();
        let second = archive.lookup_class("android.view.View").unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counters.reads(), 1);

        assert!(archive.lookup_class("android.view.Missing").unwrap().is_none());
        assert!(archive.lookup_class("android.view.Missing").unwrap().is_none());
        assert_eq!(counters.reads(), 2);
        assert_eq!(archive.cached_classes(), 2);
    }

    #[test]
    fn malformed_entry_is_absent() {
        let (archive, counters) = counting_archive();

        assert!(archive.lookup_class("android.broken.Broken").unwrap().is_none());
        assert!(archive.lookup_class("android.broken.Broken").unwrap().is_none());
        assert_eq!(counters.reads(), 1);
    }

    #[test]
    fn oversized_entry_is_absent() {
        let padding = vec![0_u8; 4 << 20];
        let data = JarBuilder::new()
            .misreported("android/view/Huge.class", &padding, 64)
            .class("android/view/View", &ClassBuilder::new("android/view/View"))
            .build();
        let loader = CountingLoader::new(data);
        let counters = loader.counters.clone();
        let archive = ReferenceArchive::with_loader(28, "android-all-28.jar", Arc::new(loader));

        assert!(archive.lookup_class("android.view.Huge").unwrap().is_none());
        assert!(archive.lookup_class("android.view.Huge").unwrap().is_none());
        assert!(archive.lookup_class("android.view.View").unwrap().is_some());
        assert_eq!(counters.reads(), 2);
    }

    #[test]
    fn open_failure_is_sticky() {
        let loader = Arc::new(FailingLoader::default());
        let archive = ReferenceArchive::with_loader(23, "/nonexistent/android-all-23.jar", loader.clone());

        for _ in 0..3 {
            match archive.lookup_class("android.view.View") {
                Err(Error::ArchiveOpen { version, path, .. }) => {
                    assert_eq!(version, 23);
                    assert_eq!(path, PathBuf::from("/nonexistent/android-all-23.jar"));
                }
                other => panic!("expected an open failure, got {other:?}"),
            }
        }
        assert!(archive.open().is_err());
        assert_eq!(loader.opens.load(Ordering::SeqCst), 1);
        assert_eq!(archive.cached_classes(), 0);
    }

    #[test]
    fn missing_jar_on_disk() {
        let archive = ReferenceArchive::new(19, "/nonexistent/android-all-19.jar");
        let error = archive.open().unwrap_err();
        assert!(error.to_string().contains("SDK 19"));
    }

    #[test]
    fn class_file_bypasses_cache() {
        let (archive, counters) = counting_archive();

        let class = archive.class_file("android.view.View").unwrap().unwrap();
        assert_eq!(class.methods.len(), 3);
        assert!(archive.class_file("android.view.Missing").unwrap().is_none());
        assert_eq!(archive.cached_classes(), 0);
        assert_eq!(counters.reads(), 2);
    }

    #[test]
    fn concurrent_lookups_decode_once() {
        let (archive, counters) = counting_archive();

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let table = archive.lookup_class("android.view.View").unwrap();
                        assert!(table.is_some());
                        assert!(archive.lookup_class("android.view.Gone").unwrap().is_none());
                    }
                });
            }
        });

        assert_eq!(counters.opens(), 1);
        assert_eq!(counters.reads(), 2);
    }

    #[test]
    fn reads_real_jar_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("android-all-28.jar");
        std::fs::write(&path, view_jar()).unwrap();

        let archive = ReferenceArchive::new(28, &path);
        assert_eq!(archive.path(), path.as_path());
        assert_eq!(archive.version(), 28);
        assert!(archive.lookup_class("android.view.View").unwrap().is_some());
    }
}
