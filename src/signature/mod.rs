//! Method keys and per-class signature tables.
//!
//! A [`ClassSignatureTable`] maps every method of a reference class to the facts a declared
//! method is checked against, whether it is static and what it returns. Each method is
//! indexed twice: under its exact parameter types, and under an erased key in which every
//! parameter type is replaced by [`ERASED_TYPE`]. The erased form lets a declaration that
//! spells a parameter type differently (a type variable's bound, a hidden class seen through
//! a public supertype) still find its counterpart with the same name and arity.
//!
//! Both forms share one map. When two methods collapse to the same erased key, or an erased
//! key equals the exact key of a method decoded later, the last one written wins.

use std::{collections::HashMap, fmt};

use crate::{
    classfile::{ClassFile, MethodEntry},
    validation::DeclaredMethod,
};

/// Type name every parameter is replaced with in an erased [`MethodKey`].
pub const ERASED_TYPE: &str = "java.lang.Object";

/// Identity of a method within its class, name plus parameter type names.
///
/// Type names use the canonical dotted form: `int`, `java.lang.String[]`, `java.util.Map$Entry`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    name: String,
    param_types: Vec<String>,
}

impl MethodKey {
    /// Creates a key from a binary method name and canonical parameter type names.
    pub fn new(name: impl Into<String>, param_types: Vec<String>) -> Self {
        MethodKey {
            name: name.into(),
            param_types,
        }
    }

    /// Key of a method decoded from a class file.
    #[must_use]
    pub fn from_binary(method: &MethodEntry) -> Self {
        MethodKey::new(method.name.clone(), method.param_type_names())
    }

    /// Key of a declared method, with its name normalized to the binary form.
    #[must_use]
    pub fn from_declared(method: &DeclaredMethod) -> Self {
        MethodKey::new(method.binary_name(), method.param_types.clone())
    }

    /// The same name and arity with every parameter type replaced by [`ERASED_TYPE`].
    #[must_use]
    pub fn erase(&self) -> Self {
        MethodKey {
            name: self.name.clone(),
            param_types: vec![ERASED_TYPE.to_string(); self.param_types.len()],
        }
    }

    /// Binary method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical parameter type names.
    #[must_use]
    pub fn param_types(&self) -> &[String] {
        &self.param_types
    }

    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.param_types.len()
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.param_types.join(", "))
    }
}

/// What a matching method is checked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodExtraInfo {
    /// Whether the method is static
    pub is_static: bool,
    /// Canonical return type name, `void` included
    pub return_type: String,
}

impl MethodExtraInfo {
    /// Facts of a method decoded from a class file.
    #[must_use]
    pub fn from_binary(method: &MethodEntry) -> Self {
        MethodExtraInfo {
            is_static: method.is_static(),
            return_type: method.return_type.class_name(),
        }
    }

    /// Facts of a declared method.
    #[must_use]
    pub fn from_declared(method: &DeclaredMethod) -> Self {
        MethodExtraInfo {
            is_static: method.is_static,
            return_type: method.return_type.clone(),
        }
    }
}

/// Outcome of [`ClassSignatureTable::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodMatch<'a> {
    /// A method with exactly these parameter types
    Exact(&'a MethodExtraInfo),
    /// No exact match, but a method with the same name and arity
    Erased(&'a MethodExtraInfo),
    /// Neither form is present
    NoMatch,
}

impl<'a> MethodMatch<'a> {
    /// The matched method's facts, if any.
    #[must_use]
    pub fn info(&self) -> Option<&'a MethodExtraInfo> {
        match self {
            MethodMatch::Exact(info) | MethodMatch::Erased(info) => Some(info),
            MethodMatch::NoMatch => None,
        }
    }

    /// Returns `true` unless this is [`MethodMatch::NoMatch`].
    #[must_use]
    pub fn is_found(&self) -> bool {
        !matches!(self, MethodMatch::NoMatch)
    }
}

/// Method signatures of one reference class.
///
/// # Examples
///
/// ```rust
/// use sdkscope::signature::{ClassSignatureTable, MethodExtraInfo, MethodKey, MethodMatch};
///
/// let mut table = ClassSignatureTable::new("android.view.View");
/// table.insert(
///     MethodKey::new("setTag", vec!["java.lang.Object".into()]),
///     MethodExtraInfo { is_static: false, return_type: "void".into() },
/// );
///
/// let key = MethodKey::new("setTag", vec!["java.lang.String".into()]);
/// assert!(matches!(table.find(&key), MethodMatch::Erased(_)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClassSignatureTable {
    class_name: String,
    methods: HashMap<MethodKey, MethodExtraInfo>,
}

impl ClassSignatureTable {
    /// Creates an empty table for `class_name`.
    pub fn new(class_name: impl Into<String>) -> Self {
        ClassSignatureTable {
            class_name: class_name.into(),
            methods: HashMap::new(),
        }
    }

    /// Builds the table of a decoded class, in method table order.
    #[must_use]
    pub fn from_class(class: &ClassFile) -> Self {
        let mut table = ClassSignatureTable::new(class.name.clone());
        for method in &class.methods {
            table.insert(MethodKey::from_binary(method), MethodExtraInfo::from_binary(method));
        }
        table
    }

    /// Records a method under its exact key, then under its erased key.
    pub fn insert(&mut self, key: MethodKey, info: MethodExtraInfo) {
        let erased = key.erase();
        self.methods.insert(key, info.clone());
        self.methods.insert(erased, info);
    }

    /// Looks up `key`, falling back to its erased form.
    #[must_use]
    pub fn find(&self, key: &MethodKey) -> MethodMatch<'_> {
        if let Some(info) = self.methods.get(key) {
            return MethodMatch::Exact(info);
        }
        match self.methods.get(&key.erase()) {
            Some(info) => MethodMatch::Erased(info),
            None => MethodMatch::NoMatch,
        }
    }

    /// Fully qualified dotted name of the class.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Number of distinct keys, exact and erased.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if the class has no methods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Iterates over all keys and their facts in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&MethodKey, &MethodExtraInfo)> {
        self.methods.iter()
    }
}
