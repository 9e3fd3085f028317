//! # sdkscope Prelude
//!
//! Re-exports the types needed to configure versions, validate declared methods and read
//! the resulting diagnostics.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all sdkscope operations
pub use crate::Error;

/// The result type used throughout sdkscope
pub use crate::Result;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Configuration
// ================================================================================================

/// Version configuration and range resolution
pub use crate::registry::{SdkRange, VersionEntry, VersionRegistry};

/// Reference archives and how they are opened
pub use crate::archive::{ArchiveLoader, ArchiveReader, JarLoader, ReferenceArchive};

// ================================================================================================
// Matching and Validation
// ================================================================================================

/// Signature tables and lookups
pub use crate::signature::{ClassSignatureTable, MethodExtraInfo, MethodKey, MethodMatch};

/// Declared methods, the validator and its diagnostics
pub use crate::validation::{DeclaredMethod, Diagnostic, DiagnosticSeverity, Validator};

// ================================================================================================
// Class Files
// ================================================================================================

/// Decoded class files and types
pub use crate::classfile::{parse_class, ClassFile, JavaType, MethodAccessFlags, MethodEntry};
