use std::fmt;

use strum::IntoStaticStr;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// The declaration does not line up with the platform and would fail at runtime
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// A mismatch between a declared method and one SDK version's reference archive.
///
/// The kind code returned by [`Diagnostic::kind`] is stable and meant for machine output;
/// the [`fmt::Display`] rendering is meant for people.
#[derive(Debug, Clone, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Diagnostic {
    /// The declaring class does not exist in this version
    ClassNotFound {
        /// Declaring class
        class_name: String,
        /// SDK version
        version: u32,
    },
    /// The class exists, but has no method with this name and parameters or arity
    MethodNotFound {
        /// Declaring class
        class_name: String,
        /// Declared method name, as written
        method_name: String,
        /// SDK version
        version: u32,
    },
    /// The declaration and the platform disagree on whether the method is static
    StaticMismatch {
        /// Declaring class
        class_name: String,
        /// Declared method name, as written
        method_name: String,
        /// SDK version
        version: u32,
        /// Whether the declaration is static
        declared_static: bool,
    },
    /// The declaration and the platform disagree on the return type
    ReturnTypeMismatch {
        /// Declaring class
        class_name: String,
        /// Declared method name, as written
        method_name: String,
        /// SDK version
        version: u32,
        /// Return type in the reference archive
        expected: String,
        /// Declared return type
        actual: String,
    },
}

impl Diagnostic {
    /// Stable snake_case code of the diagnostic kind, e.g. `class_not_found`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Every diagnostic currently reported is an error.
    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::Error
    }

    /// SDK version the diagnostic was found in.
    #[must_use]
    pub fn version(&self) -> u32 {
        match self {
            Diagnostic::ClassNotFound { version, .. }
            | Diagnostic::MethodNotFound { version, .. }
            | Diagnostic::StaticMismatch { version, .. }
            | Diagnostic::ReturnTypeMismatch { version, .. } => *version,
        }
    }

    /// Declaring class the diagnostic is about.
    #[must_use]
    pub fn class_name(&self) -> &str {
        match self {
            Diagnostic::ClassNotFound { class_name, .. }
            | Diagnostic::MethodNotFound { class_name, .. }
            | Diagnostic::StaticMismatch { class_name, .. }
            | Diagnostic::ReturnTypeMismatch { class_name, .. } => class_name,
        }
    }

    /// Declared method the diagnostic is about; `None` when the whole class is missing.
    #[must_use]
    pub fn method_name(&self) -> Option<&str> {
        match self {
            Diagnostic::ClassNotFound { .. } => None,
            Diagnostic::MethodNotFound { method_name, .. }
            | Diagnostic::StaticMismatch { method_name, .. }
            | Diagnostic::ReturnTypeMismatch { method_name, .. } => Some(method_name),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ClassNotFound {
                class_name,
                version,
            } => write!(f, "No such class {class_name} in SDK level {version}"),
            Diagnostic::MethodNotFound {
                class_name,
                method_name,
                version,
            } => write!(
                f,
                "No such method {class_name}.{method_name} in SDK level {version}"
            ),
            Diagnostic::StaticMismatch {
                class_name,
                method_name,
                version,
                declared_static,
            } => write!(
                f,
                "Implementation of {class_name}.{method_name} is {} unlike the method in SDK level {version}",
                if *declared_static { "static" } else { "not static" }
            ),
            Diagnostic::ReturnTypeMismatch {
                class_name,
                method_name,
                version,
                expected,
                actual,
            } => write!(
                f,
                "Implementation of {class_name}.{method_name} has a return type of {actual}, not {expected} as in SDK level {version}"
            ),
        }
    }
}
