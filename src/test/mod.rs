//! Builders for synthetic class files and jar archives, plus archive loader doubles.
//!
//! Platform archives are far too large to check into the repository, so tests assemble the
//! few classes they need byte by byte.

use std::{
    collections::HashMap,
    io::{Cursor, Write},
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    archive::{jar::JarFile, ArchiveLoader, ArchiveReader},
    classfile::{MethodAccessFlags, CLASS_MAGIC, CONSTANT_TAG},
    Result,
};

struct MemberSpec {
    access: u16,
    name: u16,
    descriptor: u16,
    attributes: Vec<(u16, Vec<u8>)>,
}

/// Assembles a class file in memory.
pub struct ClassBuilder {
    pool: Vec<Vec<u8>>,
    utf8_index: HashMap<String, u16>,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberSpec>,
    methods: Vec<MemberSpec>,
    attributes: Vec<(u16, Vec<u8>)>,
}

impl ClassBuilder {
    /// Starts a public class with the given internal name, extending `java/lang/Object`.
    pub fn new(internal_name: &str) -> Self {
        let mut builder = ClassBuilder {
            pool: Vec::new(),
            utf8_index: HashMap::new(),
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        builder.this_class = builder.class(internal_name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    fn push(&mut self, entry: Vec<u8>, slots: u16) -> u16 {
        let index = self.next_index();
        self.pool.push(entry);
        if slots == 2 {
            // Placeholder for the unusable second slot, never serialized
            self.pool.push(Vec::new());
        }
        index
    }

    fn next_index(&self) -> u16 {
        self.pool.len() as u16 + 1
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8_index.get(value) {
            return *index;
        }
        let mut entry = vec![CONSTANT_TAG::UTF8];
        entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
        entry.extend_from_slice(value.as_bytes());
        let index = self.push(entry, 1);
        self.utf8_index.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        let mut entry = vec![CONSTANT_TAG::CLASS];
        entry.extend_from_slice(&name.to_be_bytes());
        self.push(entry, 1)
    }

    /// Replaces the superclass.
    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_class = self.class(internal_name);
        self
    }

    /// Declares no superclass, as `java/lang/Object` itself does.
    pub fn no_super(mut self) -> Self {
        self.super_class = 0;
        self
    }

    /// Adds an implemented interface.
    pub fn interface(mut self, internal_name: &str) -> Self {
        let index = self.class(internal_name);
        self.interfaces.push(index);
        self
    }

    /// Adds `Long` and `Double` constants, which take two pool slots each.
    pub fn wide_constants(mut self) -> Self {
        let mut long = vec![CONSTANT_TAG::LONG];
        long.extend_from_slice(&42_i64.to_be_bytes());
        self.push(long, 2);
        let mut double = vec![CONSTANT_TAG::DOUBLE];
        double.extend_from_slice(&1.5_f64.to_be_bytes());
        self.push(double, 2);
        let mut integer = vec![CONSTANT_TAG::INTEGER];
        integer.extend_from_slice(&7_i32.to_be_bytes());
        self.push(integer, 1);
        self
    }

    /// Adds a field with a `ConstantValue`-style attribute.
    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let attribute = self.utf8("Synthetic");
        self.fields.push(MemberSpec {
            access: 0x0002,
            name,
            descriptor,
            attributes: vec![(attribute, Vec::new())],
        });
        self
    }

    /// Adds an abstract-style method without attributes.
    pub fn method(mut self, access: MethodAccessFlags, name: &str, descriptor: &str) -> Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.methods.push(MemberSpec {
            access: access.bits(),
            name,
            descriptor,
            attributes: Vec::new(),
        });
        self
    }

    /// Adds a method with a `Code` attribute wrapping `code`, plus nested debug tables.
    pub fn method_with_code(
        mut self,
        access: MethodAccessFlags,
        name: &str,
        descriptor: &str,
        code: &[u8],
    ) -> Self {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let code_name = self.utf8("Code");
        let lines_name = self.utf8("LineNumberTable");

        let mut body = Vec::new();
        body.extend_from_slice(&2_u16.to_be_bytes()); // max_stack
        body.extend_from_slice(&1_u16.to_be_bytes()); // max_locals
        body.extend_from_slice(&(code.len() as u32).to_be_bytes());
        body.extend_from_slice(code);
        body.extend_from_slice(&0_u16.to_be_bytes()); // exception_table_length
        body.extend_from_slice(&1_u16.to_be_bytes()); // attributes_count
        body.extend_from_slice(&lines_name.to_be_bytes());
        body.extend_from_slice(&6_u32.to_be_bytes());
        body.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x0A]);

        self.methods.push(MemberSpec {
            access: access.bits(),
            name,
            descriptor,
            attributes: vec![(code_name, body)],
        });
        self
    }

    /// Adds a class-level attribute after the method table.
    pub fn class_attribute(mut self, name: &str, payload: &[u8]) -> Self {
        let name = self.utf8(name);
        self.attributes.push((name, payload.to_vec()));
        self
    }

    /// Serializes the class file.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&CLASS_MAGIC.to_be_bytes());
        out.extend_from_slice(&0_u16.to_be_bytes());
        out.extend_from_slice(&52_u16.to_be_bytes());

        out.extend_from_slice(&self.next_index().to_be_bytes());
        for entry in &self.pool {
            out.extend_from_slice(entry);
        }

        out.extend_from_slice(&0x0021_u16.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());

        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }

        for members in [&self.fields, &self.methods] {
            out.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members {
                out.extend_from_slice(&member.access.to_be_bytes());
                out.extend_from_slice(&member.name.to_be_bytes());
                out.extend_from_slice(&member.descriptor.to_be_bytes());
                write_attributes(&mut out, &member.attributes);
            }
        }

        write_attributes(&mut out, &self.attributes);
        out
    }
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
    for (name, payload) in attributes {
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
    }
}

enum EntryPatch {
    FlipPayload,
    ClaimedSize(u32),
}

struct JarEntrySpec {
    name: String,
    data: Vec<u8>,
    method: CompressionMethod,
    directory: bool,
    patch: Option<EntryPatch>,
}

/// Assembles a zip archive in memory.
#[derive(Default)]
pub struct JarBuilder {
    entries: Vec<JarEntrySpec>,
}

impl JarBuilder {
    /// Starts an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        mut self,
        name: &str,
        data: &[u8],
        method: CompressionMethod,
        patch: Option<EntryPatch>,
    ) -> Self {
        self.entries.push(JarEntrySpec {
            name: name.to_string(),
            data: data.to_vec(),
            method,
            directory: false,
            patch,
        });
        self
    }

    /// Adds a deflated entry.
    pub fn entry(self, name: &str, data: &[u8]) -> Self {
        self.push(name, data, CompressionMethod::Deflated, None)
    }

    /// Adds an uncompressed entry.
    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.push(name, data, CompressionMethod::Stored, None)
    }

    /// Adds a directory entry.
    pub fn directory(mut self, name: &str) -> Self {
        self.entries.push(JarEntrySpec {
            name: name.to_string(),
            data: Vec::new(),
            method: CompressionMethod::Stored,
            directory: true,
            patch: None,
        });
        self
    }

    /// Adds a stored entry whose first payload byte is flipped after its CRC was recorded.
    pub fn corrupt(self, name: &str, data: &[u8]) -> Self {
        assert!(!data.is_empty());
        self.push(name, data, CompressionMethod::Stored, Some(EntryPatch::FlipPayload))
    }

    /// Adds a deflated entry whose recorded uncompressed size is `claimed`.
    pub fn misreported(self, name: &str, data: &[u8], claimed: u32) -> Self {
        self.push(
            name,
            data,
            CompressionMethod::Deflated,
            Some(EntryPatch::ClaimedSize(claimed)),
        )
    }

    /// Adds a class built by `class` under its conventional entry name.
    pub fn class(self, internal_name: &str, class: &ClassBuilder) -> Self {
        let name = format!("{internal_name}.class");
        self.entry(&name, &class.build())
    }

    /// Serializes the archive.
    pub fn build(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for spec in &self.entries {
            if spec.directory {
                writer
                    .add_directory(spec.name.as_str(), SimpleFileOptions::default())
                    .unwrap();
                continue;
            }
            let options = SimpleFileOptions::default().compression_method(spec.method);
            writer.start_file(spec.name.as_str(), options).unwrap();
            writer.write_all(&spec.data).unwrap();
        }
        let mut out = writer.finish().unwrap().into_inner();

        for spec in &self.entries {
            let Some(patch) = &spec.patch else {
                continue;
            };
            let (central, local) = locate_entry(&out, &spec.name);
            match patch {
                EntryPatch::FlipPayload => {
                    let name_length = read_u16(&out, local + 26);
                    let extra_length = read_u16(&out, local + 28);
                    out[local + 30 + name_length + extra_length] ^= 0xFF;
                }
                EntryPatch::ClaimedSize(claimed) => {
                    out[central + 24..central + 28].copy_from_slice(&claimed.to_le_bytes());
                    out[local + 22..local + 26].copy_from_slice(&claimed.to_le_bytes());
                }
            }
        }
        out
    }
}

fn read_u16(data: &[u8], offset: usize) -> usize {
    usize::from(u16::from_le_bytes([data[offset], data[offset + 1]]))
}

fn read_u32(data: &[u8], offset: usize) -> usize {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]) as usize
}

/// Offsets of the central directory record and the local header of entry `name`.
fn locate_entry(data: &[u8], name: &str) -> (usize, usize) {
    // The writer adds no archive comment, so the end record is the last 22 bytes
    let end = data.len() - 22;
    let count = read_u16(data, end + 10);
    let mut record = read_u32(data, end + 16);

    for _ in 0..count {
        let name_length = read_u16(data, record + 28);
        let extra_length = read_u16(data, record + 30);
        let comment_length = read_u16(data, record + 32);
        if &data[record + 46..record + 46 + name_length] == name.as_bytes() {
            return (record, read_u32(data, record + 42));
        }
        record += 46 + name_length + extra_length + comment_length;
    }
    panic!("no entry {name} in the archive");
}

/// Call counters shared between a [`CountingLoader`] and the test observing it.
#[derive(Debug, Default)]
pub struct LoaderCounters {
    /// Number of `open` calls
    pub opens: AtomicUsize,
    /// Number of `read_entry` calls across all opened readers
    pub reads: AtomicUsize,
}

impl LoaderCounters {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

/// Loader serving an in-memory jar and counting every open and entry read.
pub struct CountingLoader {
    data: Vec<u8>,
    pub counters: Arc<LoaderCounters>,
}

impl CountingLoader {
    pub fn new(data: Vec<u8>) -> Self {
        CountingLoader {
            data,
            counters: Arc::new(LoaderCounters::default()),
        }
    }
}

struct CountingReader {
    inner: JarFile,
    counters: Arc<LoaderCounters>,
}

impl ArchiveReader for CountingReader {
    fn read_entry(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_entry(name)
    }
}

impl ArchiveLoader for CountingLoader {
    fn open(&self, _path: &Path) -> Result<Box<dyn ArchiveReader>> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingReader {
            inner: JarFile::from_mem(self.data.clone())?,
            counters: self.counters.clone(),
        }))
    }
}

/// Loader whose every open attempt fails.
#[derive(Default)]
pub struct FailingLoader {
    pub opens: AtomicUsize,
}

impl ArchiveLoader for FailingLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Err(crate::Error::FileError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("cannot read {}", path.display()),
        )))
    }
}
