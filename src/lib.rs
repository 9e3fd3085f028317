// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'file/mod.rs' uses mmap to map a file into memory

//! # sdkscope
//!
//! Checks methods declared against a platform class library, such as shadow
//! implementations of Android framework classes, against the compiled reference archives
//! of every platform version they claim to support.
//!
//! For each SDK version in a declaration's range, `sdkscope` looks up the declaring class in
//! that version's reference jar, finds the method with the same name and parameter types,
//! and reports when the class or method is missing, when the two disagree on being static,
//! or when their return types differ.
//!
//! ## Features
//!
//! - **📦 Lazy archive access** - Reference jars are memory-mapped on first use and every class
//!   is decoded at most once per version
//! - **🔍 Partial class file parsing** - Only the constant pool and method table are decoded;
//!   method bodies and attributes are skipped by length
//! - **🧩 Erasure-tolerant matching** - Exact parameter types first, then any method with the
//!   same name and arity
//! - **⚡ Parallel batch validation** - Many declarations checked at once over shared caches
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sdkscope::prelude::*;
//! use std::path::Path;
//!
//! let registry = VersionRegistry::from_properties_file(Path::new("sdks.properties"))?;
//!
//! let method = DeclaredMethod::new("android.view.View", "draw")
//!     .with_params(["int", "int"])
//!     .with_sdk_range(SdkRange::from_sentinels(21, -1));
//!
//! for diagnostic in Validator::new(&registry).validate(&method)? {
//!     println!("{diagnostic}");
//! }
//! # Ok::<(), sdkscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`registry`] - SDK versions, their archives and version range resolution
//! - [`archive`] - Lazily opened reference archives and their class caches
//! - [`classfile`] - Class file decoding down to the method table
//! - [`signature`] - Method keys and exact or erased lookup
//! - [`validation`] - The per-version checks and their diagnostics
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`] with [`Error`]. Damaged classes inside an
//! archive are not errors: they are logged through the `log` facade and treated as absent.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use sdkscope::prelude::*;
///
/// let registry = VersionRegistry::new([("28", "android-all-28.jar")])?;
/// let validator = Validator::new(&registry);
/// # Ok::<(), sdkscope::Error>(())
/// ```
pub mod prelude;

/// Reference archives of platform versions
///
/// A [`ReferenceArchive`] opens its jar once, on first use, and caches the signature table of
/// every class looked up in it. The [`archive::ArchiveLoader`] trait decides how archives are
/// opened; [`archive::JarLoader`] memory-maps zip files.
pub mod archive;

/// Class file decoding
///
/// Decodes the constant pool and method table of compiled classes and turns method
/// descriptors into canonical type names.
///
/// # Examples
///
/// ```rust
/// use sdkscope::classfile::parse_method_descriptor;
///
/// let descriptor = parse_method_descriptor("([Ljava/lang/String;I)Z")?;
/// assert_eq!(descriptor.params[0].to_string(), "java.lang.String[]");
/// assert_eq!(descriptor.return_type.to_string(), "boolean");
/// # Ok::<(), sdkscope::Error>(())
/// ```
pub mod classfile;

/// SDK version configuration and range resolution
pub mod registry;

/// Method keys and per-class signature tables
pub mod signature;

/// Validation of declared methods and the diagnostics it produces
pub mod validation;

/// `sdkscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `sdkscope` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use sdkscope::{Error, ReferenceArchive};
///
/// let archive = ReferenceArchive::new(28, "android-all-28.jar");
/// match archive.lookup_class("android.view.View") {
///     Ok(Some(table)) => println!("{} keys", table.len()),
///     Ok(None) => println!("No such class"),
///     Err(Error::ArchiveOpen { message, .. }) => println!("Unusable archive: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Low-level file and byte parsing utilities.
///
/// # Example
///
/// ```rust
/// use sdkscope::Parser;
/// let data = [0xCA, 0xFE, 0xBA, 0xBE];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
/// # Ok::<(), sdkscope::Error>(())
/// ```
pub use file::{parser::Parser, File};

pub use archive::ReferenceArchive;
pub use registry::{SdkRange, VersionEntry, VersionRegistry};
pub use signature::{ClassSignatureTable, MethodKey, MethodMatch};
pub use validation::{DeclaredMethod, Diagnostic, Validator};
