//! Class file constant pool.
//!
//! The constant pool is the only variable-length section that has to be decoded in full
//! before the method table can be reached, because its entries have no common length
//! prefix. Every tag is therefore understood, but only `Utf8` and `Class` entries keep their
//! payload; the rest are recorded by kind so that a wrong index can be reported.
//!
//! `Long` and `Double` entries occupy two slots. The slot after them is not usable.

use crate::{file::parser::Parser, Result};

/// Constant pool tags as defined by the class file format.
#[allow(non_snake_case)]
pub mod CONSTANT_TAG {
    /// Modified UTF-8 string
    pub const UTF8: u8 = 1;
    /// 32-bit integer
    pub const INTEGER: u8 = 3;
    /// 32-bit float
    pub const FLOAT: u8 = 4;
    /// 64-bit integer, two slots
    pub const LONG: u8 = 5;
    /// 64-bit float, two slots
    pub const DOUBLE: u8 = 6;
    /// Class or interface reference
    pub const CLASS: u8 = 7;
    /// String literal
    pub const STRING: u8 = 8;
    /// Field reference
    pub const FIELDREF: u8 = 9;
    /// Method reference
    pub const METHODREF: u8 = 10;
    /// Interface method reference
    pub const INTERFACE_METHODREF: u8 = 11;
    /// Name and descriptor pair
    pub const NAME_AND_TYPE: u8 = 12;
    /// Method handle
    pub const METHOD_HANDLE: u8 = 15;
    /// Method type
    pub const METHOD_TYPE: u8 = 16;
    /// Dynamically computed constant
    pub const DYNAMIC: u8 = 17;
    /// Dynamically computed call site
    pub const INVOKE_DYNAMIC: u8 = 18;
    /// Module
    pub const MODULE: u8 = 19;
    /// Package
    pub const PACKAGE: u8 = 20;
}

/// A single constant pool slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Slot 0, and the second slot of a `Long` or `Double`
    Unusable,
    /// Decoded string
    Utf8(String),
    /// Class reference, pointing at the `Utf8` entry holding the internal name
    Class(u16),
    /// Any other entry, identified by its tag
    Other(u8),
}

/// Decoded constant pool of one class.
#[derive(Debug, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    /// Reads the pool count and all entries from the parser's current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for unknown tags or invalid strings and
    /// [`crate::Error::OutOfBounds`] on truncated data.
    pub fn parse(parser: &mut Parser) -> Result<Self> {
        let count = parser.read_be::<u16>()?;
        if count == 0 {
            return Err(malformed_error!("Constant pool count must be at least 1"));
        }

        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);

        while entries.len() < count as usize {
            let tag = parser.read_be::<u8>()?;
            match tag {
                CONSTANT_TAG::UTF8 => {
                    let length = parser.read_be::<u16>()?;
                    entries.push(Constant::Utf8(
                        parser.read_modified_utf8(length as usize)?,
                    ));
                }
                CONSTANT_TAG::CLASS => {
                    entries.push(Constant::Class(parser.read_be::<u16>()?));
                }
                CONSTANT_TAG::LONG | CONSTANT_TAG::DOUBLE => {
                    if entries.len() + 1 >= count as usize {
                        return Err(malformed_error!(
                            "Eight-byte constant at {} overflows the pool of {}",
                            entries.len(),
                            count
                        ));
                    }
                    parser.advance_by(8)?;
                    entries.push(Constant::Other(tag));
                    entries.push(Constant::Unusable);
                }
                CONSTANT_TAG::STRING
                | CONSTANT_TAG::METHOD_TYPE
                | CONSTANT_TAG::MODULE
                | CONSTANT_TAG::PACKAGE => {
                    parser.advance_by(2)?;
                    entries.push(Constant::Other(tag));
                }
                CONSTANT_TAG::METHOD_HANDLE => {
                    parser.advance_by(3)?;
                    entries.push(Constant::Other(tag));
                }
                CONSTANT_TAG::INTEGER
                | CONSTANT_TAG::FLOAT
                | CONSTANT_TAG::FIELDREF
                | CONSTANT_TAG::METHODREF
                | CONSTANT_TAG::INTERFACE_METHODREF
                | CONSTANT_TAG::NAME_AND_TYPE
                | CONSTANT_TAG::DYNAMIC
                | CONSTANT_TAG::INVOKE_DYNAMIC => {
                    parser.advance_by(4)?;
                    entries.push(Constant::Other(tag));
                }
                _ => {
                    return Err(malformed_error!(
                        "Invalid constant pool tag {} at entry {}",
                        tag,
                        entries.len()
                    ))
                }
            }
        }

        Ok(ConstantPool { entries })
    }

    /// Number of slots, including the unusable slot 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pool has no usable slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Returns the raw slot at `index`.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries.get(index as usize)
    }

    /// Resolves a `Utf8` entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is out of range or not a `Utf8` entry.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index) {
            Some(Constant::Utf8(value)) => Ok(value.as_str()),
            Some(other) => Err(malformed_error!(
                "Constant {} is not a Utf8 entry - {:?}",
                index,
                other
            )),
            None => Err(malformed_error!("Constant index {} out of range", index)),
        }
    }

    /// Resolves a `Class` entry to the internal (slash-separated) name it references.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the index is out of range, not a `Class` entry,
    /// or the referenced name is not a `Utf8` entry.
    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.get(index) {
            Some(Constant::Class(name_index)) => self.utf8(*name_index),
            Some(other) => Err(malformed_error!(
                "Constant {} is not a Class entry - {:?}",
                index,
                other
            )),
            None => Err(malformed_error!("Constant index {} out of range", index)),
        }
    }
}
