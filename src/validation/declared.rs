use crate::registry::SdkRange;

/// Declaration-side name standing for a constructor.
pub const CONSTRUCTOR_METHOD_NAME: &str = "__constructor__";
/// Declaration-side name standing for a static initializer.
pub const STATIC_INITIALIZER_METHOD_NAME: &str = "__staticInitializer__";

/// A method declared against a platform class, as handed over by the declaration scanner.
///
/// Type names are canonical dotted names (`int`, `java.lang.String[]`, `java.util.Map$Entry`).
///
/// # Examples
///
/// ```rust
/// use sdkscope::{DeclaredMethod, SdkRange};
///
/// let method = DeclaredMethod::new("android.view.View", "draw")
///     .with_params(["int", "int"])
///     .with_static(true)
///     .with_sdk_range(SdkRange::from_sentinels(21, -1));
/// assert_eq!(method.binary_name(), "draw");
/// assert_eq!(method.effective_range(), SdkRange::new(Some(21), None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclaredMethod {
    /// Fully qualified dotted name of the platform class the method belongs to
    pub owning_class: String,
    /// Method name, possibly one of the constructor or initializer sentinels
    pub name: String,
    /// Canonical parameter type names
    pub param_types: Vec<String>,
    /// Whether the method is declared static
    pub is_static: bool,
    /// Canonical return type name
    pub return_type: String,
    /// Versions the method itself applies to
    pub sdk_range: SdkRange,
    /// Versions the declaring class applies to
    pub class_sdk_range: SdkRange,
}

impl DeclaredMethod {
    /// An instance method returning `void` without parameters, applying to every version.
    pub fn new(owning_class: impl Into<String>, name: impl Into<String>) -> Self {
        DeclaredMethod {
            owning_class: owning_class.into(),
            name: name.into(),
            param_types: Vec::new(),
            is_static: false,
            return_type: "void".to_string(),
            sdk_range: SdkRange::UNBOUNDED,
            class_sdk_range: SdkRange::UNBOUNDED,
        }
    }

    /// Replaces the parameter types.
    #[must_use]
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_types = params.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether the method is static.
    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Sets the return type.
    #[must_use]
    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// Sets the method's own version range.
    #[must_use]
    pub fn with_sdk_range(mut self, range: SdkRange) -> Self {
        self.sdk_range = range;
        self
    }

    /// Sets the declaring class's version range.
    #[must_use]
    pub fn with_class_sdk_range(mut self, range: SdkRange) -> Self {
        self.class_sdk_range = range;
        self
    }

    /// The name as it appears in class files, `<init>` and `<clinit>` for the sentinels.
    #[must_use]
    pub fn binary_name(&self) -> &str {
        match self.name.as_str() {
            CONSTRUCTOR_METHOD_NAME => "<init>",
            STATIC_INITIALIZER_METHOD_NAME => "<clinit>",
            name => name,
        }
    }

    /// Versions this method is checked against.
    #[must_use]
    pub fn effective_range(&self) -> SdkRange {
        SdkRange::effective(self.sdk_range, self.class_sdk_range)
    }
}
