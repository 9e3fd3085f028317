//! Field and method descriptor parsing.
//!
//! Descriptors are the binary form of a member's type: `(I[Ljava/lang/String;)V` describes a
//! method taking an `int` and a `String[]` and returning `void`. The parser turns them into
//! [`JavaType`] values whose [`std::fmt::Display`] form is the canonical dotted type name used
//! everywhere signatures are compared (`int`, `java.lang.String[]`, `java.util.Map$Entry`).

use std::fmt;

use crate::{file::parser::Parser, Result};

/// The class file format limits arrays to 255 dimensions
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// A decoded field type or return type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `D`
    Double,
    /// `F`
    Float,
    /// `I`
    Int,
    /// `J`
    Long,
    /// `S`
    Short,
    /// `Z`
    Boolean,
    /// `V`, only valid as a return type
    Void,
    /// `L<internal name>;`, holding the internal (slash-separated) name
    Object(String),
    /// One or more `[` followed by the element type
    Array {
        /// The non-array element type
        element: Box<JavaType>,
        /// Number of dimensions, at least 1
        dimensions: u8,
    },
}

impl JavaType {
    /// Returns the canonical dotted name of the type, e.g. `int[]` or `java.lang.String`.
    #[must_use]
    pub fn class_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Byte => write!(f, "byte"),
            JavaType::Char => write!(f, "char"),
            JavaType::Double => write!(f, "double"),
            JavaType::Float => write!(f, "float"),
            JavaType::Int => write!(f, "int"),
            JavaType::Long => write!(f, "long"),
            JavaType::Short => write!(f, "short"),
            JavaType::Boolean => write!(f, "boolean"),
            JavaType::Void => write!(f, "void"),
            JavaType::Object(internal_name) => {
                for (index, segment) in internal_name.split('/').enumerate() {
                    if index > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(segment)?;
                }
                Ok(())
            }
            JavaType::Array {
                element,
                dimensions,
            } => {
                write!(f, "{element}")?;
                for _ in 0..*dimensions {
                    f.write_str("[]")?;
                }
                Ok(())
            }
        }
    }
}

/// A decoded method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Parameter types in declaration order
    pub params: Vec<JavaType>,
    /// Return type, [`JavaType::Void`] for `V`
    pub return_type: JavaType,
}

/// Descriptor parser
///
/// # Example
///
/// ```rust
/// use sdkscope::classfile::{DescriptorParser, JavaType};
/// let mut parser = DescriptorParser::new("(I[J)Ljava/lang/String;");
/// let descriptor = parser.parse_method_descriptor()?;
/// assert_eq!(descriptor.params.len(), 2);
/// assert_eq!(descriptor.params[1].to_string(), "long[]");
/// assert_eq!(descriptor.return_type.to_string(), "java.lang.String");
/// # Ok::<(), sdkscope::Error>(())
/// ```
pub struct DescriptorParser<'a> {
    parser: Parser<'a>,
}

impl<'a> DescriptorParser<'a> {
    /// Create a new `DescriptorParser` over a descriptor string
    #[must_use]
    pub fn new(descriptor: &'a str) -> Self {
        DescriptorParser {
            parser: Parser::new(descriptor.as_bytes()),
        }
    }

    /// Parse a complete method descriptor, `(` parameters `)` return type.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the descriptor is invalid or has trailing data.
    pub fn parse_method_descriptor(&mut self) -> Result<MethodDescriptor> {
        if self.parser.read_be::<u8>()? != b'(' {
            return Err(malformed_error!("Method descriptor must start with '('"));
        }

        let mut params = Vec::new();
        while self.peek()? != b')' {
            params.push(self.parse_field_type()?);
        }
        self.parser.advance_by(1)?;

        let return_type = if self.peek()? == b'V' {
            self.parser.advance_by(1)?;
            JavaType::Void
        } else {
            self.parse_field_type()?
        };

        self.expect_end()?;
        Ok(MethodDescriptor {
            params,
            return_type,
        })
    }

    /// Parse a complete field descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the descriptor is invalid or has trailing data.
    pub fn parse_field_descriptor(&mut self) -> Result<JavaType> {
        let field_type = self.parse_field_type()?;
        self.expect_end()?;
        Ok(field_type)
    }

    fn peek(&self) -> Result<u8> {
        self.parser
            .peek_byte()
            .map_err(|_| malformed_error!("Unexpected end of descriptor"))
    }

    fn expect_end(&self) -> Result<()> {
        if self.parser.has_more_data() {
            return Err(malformed_error!(
                "Trailing data in descriptor at {}",
                self.parser.pos()
            ));
        }
        Ok(())
    }

    fn parse_field_type(&mut self) -> Result<JavaType> {
        let mut dimensions = 0_usize;
        while self.peek()? == b'[' {
            dimensions += 1;
            if dimensions > MAX_ARRAY_DIMENSIONS {
                return Err(malformed_error!(
                    "Array type exceeds {} dimensions",
                    MAX_ARRAY_DIMENSIONS
                ));
            }
            self.parser.advance_by(1)?;
        }

        let element = self.parse_element_type()?;
        if dimensions == 0 {
            return Ok(element);
        }

        Ok(JavaType::Array {
            element: Box::new(element),
            dimensions: u8::try_from(dimensions)
                .map_err(|_| malformed_error!("Invalid array dimensions - {}", dimensions))?,
        })
    }

    fn parse_element_type(&mut self) -> Result<JavaType> {
        let current = self.peek()?;
        self.parser.advance_by(1)?;
        match current {
            b'B' => Ok(JavaType::Byte),
            b'C' => Ok(JavaType::Char),
            b'D' => Ok(JavaType::Double),
            b'F' => Ok(JavaType::Float),
            b'I' => Ok(JavaType::Int),
            b'J' => Ok(JavaType::Long),
            b'S' => Ok(JavaType::Short),
            b'Z' => Ok(JavaType::Boolean),
            b'L' => {
                let start = self.parser.pos();
                let rest = &self.parser.data()[start..];
                let Some(length) = rest.iter().position(|byte| *byte == b';') else {
                    return Err(malformed_error!("Unterminated object type at {}", start));
                };
                if length == 0 {
                    return Err(malformed_error!("Empty object type name at {}", start));
                }

                let name = self.parser.read_bytes(length)?;
                self.parser.advance_by(1)?;
                let name = std::str::from_utf8(name)
                    .map_err(|_| malformed_error!("Invalid object type name at {}", start))?;
                Ok(JavaType::Object(name.to_string()))
            }
            other => Err(malformed_error!(
                "Invalid descriptor character '{}' at {}",
                other as char,
                self.parser.pos() - 1
            )),
        }
    }
}

/// Parse a method descriptor string
///
/// # Errors
/// Returns an error if the descriptor is malformed
pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor> {
    let mut parser = DescriptorParser::new(descriptor);
    parser.parse_method_descriptor()
}

/// Parse a field descriptor string
///
/// # Errors
/// Returns an error if the descriptor is malformed
pub fn parse_field_descriptor(descriptor: &str) -> Result<JavaType> {
    let mut parser = DescriptorParser::new(descriptor);
    parser.parse_field_descriptor()
}
