//! Checking declared methods against the reference archives of every applicable SDK version.
//!
//! For each version in a declaration's effective range, the [`Validator`] runs the same
//! sequence:
//!
//! 1. Resolve the declaring class. Missing → [`Diagnostic::ClassNotFound`], next version.
//! 2. Resolve the method, exact signature first, erased signature second. Missing →
//!    [`Diagnostic::MethodNotFound`], next version.
//! 3. Compare static-ness → [`Diagnostic::StaticMismatch`].
//! 4. Compare return types as canonical names → [`Diagnostic::ReturnTypeMismatch`].
//!
//! Steps 3 and 4 are independent; a method can fail both. Diagnostics of all versions are
//! accumulated, a problem in one version never hides another. Only configuration problems,
//! an archive that cannot be opened, abort a run with an error.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sdkscope::prelude::*;
//! use std::path::Path;
//!
//! let registry = VersionRegistry::from_properties_file(Path::new("sdks.properties"))?;
//! let validator = Validator::new(&registry);
//!
//! let method = DeclaredMethod::new("android.view.View", "setAlpha")
//!     .with_params(["float"])
//!     .with_sdk_range(SdkRange::from_sentinels(21, -1));
//!
//! for diagnostic in validator.validate(&method)? {
//!     eprintln!("{}: {diagnostic}", diagnostic.kind());
//! }
//! # Ok::<(), sdkscope::Error>(())
//! ```

mod declared;
mod diagnostic;

pub use declared::*;
pub use diagnostic::*;

use log::debug;
use rayon::prelude::*;

use crate::{
    archive::ReferenceArchive,
    registry::{SdkRange, VersionRegistry},
    signature::{MethodExtraInfo, MethodKey, MethodMatch},
    Result,
};

/// Validates declared methods against a [`VersionRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r VersionRegistry,
}

impl<'r> Validator<'r> {
    /// Creates a validator over `registry`.
    #[must_use]
    pub fn new(registry: &'r VersionRegistry) -> Self {
        Validator { registry }
    }

    /// Checks `method` against every version in its effective range.
    ///
    /// # Errors
    /// Returns [`crate::Error::ArchiveOpen`] if the archive of an applicable version cannot
    /// be opened.
    pub fn validate(&self, method: &DeclaredMethod) -> Result<Vec<Diagnostic>> {
        self.validate_range(method, method.effective_range())
    }

    /// Checks `method` against every version in `range`, ignoring the ranges it declares.
    ///
    /// # Errors
    /// See [`Validator::validate`].
    pub fn validate_range(&self, method: &DeclaredMethod, range: SdkRange) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        for archive in self.registry.matching_versions(range) {
            diagnostics.extend(self.validate_version(method, archive)?);
        }
        Ok(diagnostics)
    }

    /// Checks `method` against a single version's archive.
    ///
    /// # Errors
    /// See [`Validator::validate`].
    pub fn validate_version(
        &self,
        method: &DeclaredMethod,
        archive: &ReferenceArchive,
    ) -> Result<Vec<Diagnostic>> {
        let version = archive.version();
        let Some(table) = archive.lookup_class(&method.owning_class)? else {
            return Ok(vec![Diagnostic::ClassNotFound {
                class_name: method.owning_class.clone(),
                version,
            }]);
        };

        let key = MethodKey::from_declared(method);
        let reference = match table.find(&key) {
            MethodMatch::Exact(info) => info,
            MethodMatch::Erased(info) => {
                debug!(
                    "{}.{} matched by arity in SDK {}",
                    method.owning_class, key, version
                );
                info
            }
            MethodMatch::NoMatch => {
                return Ok(vec![Diagnostic::MethodNotFound {
                    class_name: method.owning_class.clone(),
                    method_name: method.name.clone(),
                    version,
                }]);
            }
        };

        Ok(compare(method, reference, version))
    }

    /// Validates a batch of methods in parallel. Results line up with `methods`.
    ///
    /// # Errors
    /// Returns the first archive failure encountered.
    pub fn validate_all(&self, methods: &[DeclaredMethod]) -> Result<Vec<Vec<Diagnostic>>> {
        methods
            .par_iter()
            .map(|method| self.validate(method))
            .collect()
    }
}

fn compare(method: &DeclaredMethod, reference: &MethodExtraInfo, version: u32) -> Vec<Diagnostic> {
    let declared = MethodExtraInfo::from_declared(method);
    let mut diagnostics = Vec::new();

    if declared.is_static != reference.is_static {
        diagnostics.push(Diagnostic::StaticMismatch {
            class_name: method.owning_class.clone(),
            method_name: method.name.clone(),
            version,
            declared_static: declared.is_static,
        });
    }

    if declared.return_type != reference.return_type {
        diagnostics.push(Diagnostic::ReturnTypeMismatch {
            class_name: method.owning_class.clone(),
            method_name: method.name.clone(),
            version,
            expected: reference.return_type.clone(),
            actual: declared.return_type,
        });
    }

    diagnostics
}
