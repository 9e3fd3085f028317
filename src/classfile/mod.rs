//! Compiled class file parsing, limited to what signature validation needs.
//!
//! A class file is decoded up to and including its method table. Everything that is not a
//! method's name, descriptor or access flags is skipped by length: interfaces, fields,
//! method attributes (`Code`, `LineNumberTable`, `LocalVariableTable`, `StackMapTable`,
//! `Signature`, annotations) and the class attributes that follow the method table are
//! never decoded. Classes in platform archives can be large, and method bodies make up
//! most of their bytes.
//!
//! # Key Components
//!
//! - [`parse_class`] - Decode one `.class` blob into a [`ClassFile`]
//! - [`ClassFile`] / [`MethodEntry`] - The decoded method table
//! - [`JavaType`] / [`DescriptorParser`] - Descriptor decoding and canonical type names
//! - [`ConstantPool`] - Constant pool decoding
//! - [`MethodAccessFlags`] / [`ClassAccessFlags`] - Access modifiers
//!
//! # Class File Layout
//!
//! ```text
//! u4 magic (0xCAFEBABE)     u2 minor_version       u2 major_version
//! u2 constant_pool_count    cp_info[count - 1]
//! u2 access_flags           u2 this_class          u2 super_class
//! u2 interfaces_count       u2[interfaces_count]
//! u2 fields_count           field_info[fields_count]
//! u2 methods_count          method_info[methods_count]
//! u2 attributes_count       attribute_info[attributes_count]   (not read)
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use sdkscope::classfile::parse_class;
//!
//! let data = std::fs::read("View.class")?;
//! let class = parse_class(&data)?;
//! for method in &class.methods {
//!     println!("{} {}{}", method.return_type, method.name, method.descriptor);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod constantpool;
mod descriptor;
mod flags;

pub use constantpool::*;
pub use descriptor::*;
pub use flags::*;

use crate::{file::parser::Parser, Result};

/// Magic number opening every class file
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// One entry of a class's method table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    /// Binary method name; constructors are `<init>`, static initializers `<clinit>`
    pub name: String,
    /// Raw method descriptor, e.g. `(II)V`
    pub descriptor: String,
    /// Access and property flags
    pub access_flags: MethodAccessFlags,
    /// Decoded parameter types
    pub params: Vec<JavaType>,
    /// Decoded return type
    pub return_type: JavaType,
}

impl MethodEntry {
    /// Returns `true` if the method is declared static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    /// Canonical dotted names of the parameter types.
    #[must_use]
    pub fn param_type_names(&self) -> Vec<String> {
        self.params.iter().map(JavaType::class_name).collect()
    }
}

/// A decoded class, reduced to its identity and method table.
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Minor format version
    pub minor_version: u16,
    /// Major format version (52 = Java 8)
    pub major_version: u16,
    /// Class access flags
    pub access_flags: ClassAccessFlags,
    /// Fully qualified dotted class name, e.g. `android.view.View`
    pub name: String,
    /// Fully qualified dotted superclass name; `None` only for `java.lang.Object` and modules
    pub super_name: Option<String>,
    /// Methods in class file order
    pub methods: Vec<MethodEntry>,
}

/// Decode a class file
///
/// ## Arguments
/// * 'data' - The complete class file
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the data is not a valid class file, and
/// [`crate::Error::OutOfBounds`] if it is truncated.
pub fn parse_class(data: &[u8]) -> Result<ClassFile> {
    let mut parser = Parser::new(data);

    let magic = parser.read_be::<u32>()?;
    if magic != CLASS_MAGIC {
        return Err(malformed_error!("Invalid class file magic - 0x{:08X}", magic));
    }

    let minor_version = parser.read_be::<u16>()?;
    let major_version = parser.read_be::<u16>()?;
    let pool = ConstantPool::parse(&mut parser)?;

    let access_flags = ClassAccessFlags::from_bits_retain(parser.read_be::<u16>()?);
    let name = dotted(pool.class_name(parser.read_be::<u16>()?)?);
    let super_index = parser.read_be::<u16>()?;
    let super_name = if super_index == 0 {
        None
    } else {
        Some(dotted(pool.class_name(super_index)?))
    };

    let interfaces_count = parser.read_be::<u16>()?;
    parser.advance_by(interfaces_count as usize * 2)?;

    let fields_count = parser.read_be::<u16>()?;
    for _ in 0..fields_count {
        // access_flags, name_index, descriptor_index
        parser.advance_by(6)?;
        skip_attributes(&mut parser)?;
    }

    let methods_count = parser.read_be::<u16>()?;
    let mut methods = Vec::with_capacity(methods_count as usize);
    for _ in 0..methods_count {
        let access_flags = MethodAccessFlags::from_bits_retain(parser.read_be::<u16>()?);
        let method_name = pool.utf8(parser.read_be::<u16>()?)?.to_string();
        let descriptor = pool.utf8(parser.read_be::<u16>()?)?.to_string();
        skip_attributes(&mut parser)?;

        let decoded = parse_method_descriptor(&descriptor).map_err(|error| {
            malformed_error!(
                "Invalid descriptor {} of {}.{} - {}",
                descriptor,
                name,
                method_name,
                error
            )
        })?;

        methods.push(MethodEntry {
            name: method_name,
            descriptor,
            access_flags,
            params: decoded.params,
            return_type: decoded.return_type,
        });
    }

    Ok(ClassFile {
        minor_version,
        major_version,
        access_flags,
        name,
        super_name,
        methods,
    })
}

fn skip_attributes(parser: &mut Parser) -> Result<()> {
    let count = parser.read_be::<u16>()?;
    for _ in 0..count {
        let _name_index = parser.read_be::<u16>()?;
        let length = parser.read_be::<u32>()?;
        parser.advance_by(length as usize)?;
    }
    Ok(())
}

fn dotted(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}
