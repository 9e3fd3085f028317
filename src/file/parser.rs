//! Low-level byte stream parser for class file and archive decoding.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser for the big-endian structures of class files and the characters of descriptors.
//! Every read is bounds-checked and reports [`crate::Error::OutOfBounds`] on truncated input.
//!
//! # Key Components
//!
//! - [`crate::file::parser::Parser::seek`] / [`crate::file::parser::Parser::advance_by`] - Navigation
//! - [`crate::file::parser::Parser::read_be`] - Primitive reads
//! - [`crate::file::parser::Parser::read_bytes`] - Borrowed byte ranges
//! - [`crate::file::parser::Parser::read_modified_utf8`] - Class file string constants
//!
//! # Examples
//!
//! ```rust
//! use sdkscope::Parser;
//!
//! let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 0x34];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_be::<u32>()?, 0xCAFE_BABE);
//! parser.advance_by(2)?;
//! assert_eq!(parser.read_be::<u16>()?, 52);
//! # Ok::<(), sdkscope::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, BinaryIO},
    Result,
};

/// A generic binary data parser.
///
/// `Parser` maintains a position cursor within a borrowed byte slice and provides bounds
/// checking to prevent buffer overruns when reading malformed or truncated data.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdkscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there are bytes left after the current position.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Move the cursor to an absolute position.
    ///
    /// Seeking to exactly the end of the data is allowed; reads from there fail.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` lies past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Move the cursor forward by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the new position would exceed the data length.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        self.position = self.calc_end_position(step)?;
        Ok(())
    }

    /// Current cursor position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the full underlying data, independent of the cursor.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Number of bytes between the cursor and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Peek at the byte under the cursor without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(out_of_bounds_error!());
        }
        Ok(self.data[self.position])
    }

    /// Read a type `T` from the current position in big-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdkscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    ///
    /// let value: u16 = parser.read_be()?;
    /// assert_eq!(value, 0x0102);
    /// assert_eq!(parser.pos(), 2);
    /// # Ok::<(), sdkscope::Error>(())
    /// ```
    pub fn read_be<T: BinaryIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    fn calc_end_position(&self, length: usize) -> Result<usize> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(end)
    }

    /// Borrow the next `length` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read `length` bytes of modified UTF-8 and decode them.
    ///
    /// Modified UTF-8 is the string encoding of the class file constant pool. It differs from
    /// standard UTF-8 in two ways: NUL is encoded as the two bytes `C0 80`, and supplementary
    /// characters are stored as two separately encoded UTF-16 surrogates of three bytes each.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated data and [`crate::Error::Malformed`]
    /// on invalid byte sequences or unpaired surrogates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sdkscope::Parser;
    /// let data = [0x61, 0xC0, 0x80, 0x62];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_modified_utf8(4)?, "a\0b");
    /// # Ok::<(), sdkscope::Error>(())
    /// ```
    pub fn read_modified_utf8(&mut self, length: usize) -> Result<String> {
        let bytes = self.read_bytes(length)?;
        if bytes.iter().all(|byte| *byte != 0 && *byte < 0x80) {
            // Pure ASCII, the common case for identifiers and descriptors
            return String::from_utf8(bytes.to_vec())
                .map_err(|error| malformed_error!("Invalid string constant - {}", error));
        }

        let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
        let mut index = 0;
        while index < bytes.len() {
            let first = u16::from(bytes[index]);
            match bytes[index] {
                0x01..=0x7F => {
                    units.push(first);
                    index += 1;
                }
                0xC0..=0xDF => {
                    let second = continuation(bytes, index + 1)?;
                    units.push(((first & 0x1F) << 6) | second);
                    index += 2;
                }
                0xE0..=0xEF => {
                    let second = continuation(bytes, index + 1)?;
                    let third = continuation(bytes, index + 2)?;
                    units.push(((first & 0x0F) << 12) | (second << 6) | third);
                    index += 3;
                }
                other => {
                    return Err(malformed_error!(
                        "Invalid modified UTF-8 lead byte 0x{:02X} at {}",
                        other,
                        index
                    ))
                }
            }
        }

        String::from_utf16(&units)
            .map_err(|_| malformed_error!("Invalid surrogate sequence in string constant"))
    }
}

fn continuation(bytes: &[u8], index: usize) -> Result<u16> {
    match bytes.get(index) {
        Some(byte) if byte & 0xC0 == 0x80 => Ok(u16::from(byte & 0x3F)),
        Some(byte) => Err(malformed_error!(
            "Invalid modified UTF-8 continuation byte 0x{:02X} at {}",
            byte,
            index
        )),
        None => Err(malformed_error!("Truncated modified UTF-8 sequence")),
    }
}
