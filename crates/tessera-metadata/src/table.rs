//! String and class-id tables of a metadata unit
//!
//! Wire values never carry text inline. Strings, names and class ids are
//! indices into the tables of the unit they were read from.

use crate::encoder::{DecodeError, MetadataReader, MetadataWriter};
use crate::error::{MetadataError, MetadataResult};
use tessera_types::ClassId;

/// Interned-table lookups used while decoding annotations
pub trait NameResolver {
    /// String literal by index
    fn get_string(&self, id: u32) -> MetadataResult<&str>;

    /// Identifier (parameter or enum entry name) by index
    fn get_name(&self, id: u32) -> MetadataResult<&str>;

    /// Class id by index
    fn get_class_id(&self, id: u32) -> MetadataResult<&ClassId>;
}

/// String table containing the interned strings and class ids of one unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringTable {
    /// String constants and identifiers
    pub strings: Vec<String>,
    /// Class identifiers
    pub class_ids: Vec<ClassId>,
}

impl StringTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string (reusing an existing entry) and return its index
    pub fn add_string(&mut self, s: impl Into<String>) -> u32 {
        let s = s.into();
        if let Some(index) = self.strings.iter().position(|existing| *existing == s) {
            return index as u32;
        }
        self.strings.push(s);
        (self.strings.len() - 1) as u32
    }

    /// Add a class id (reusing an existing entry) and return its index
    pub fn add_class_id(&mut self, class_id: ClassId) -> u32 {
        if let Some(index) = self.class_ids.iter().position(|existing| *existing == class_id) {
            return index as u32;
        }
        self.class_ids.push(class_id);
        (self.class_ids.len() - 1) as u32
    }

    /// Encode the table
    ///
    /// Format:
    /// - String count (u32), then each string length-prefixed
    /// - Class id count (u32), then each fully-qualified name length-prefixed
    pub fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.strings.len() as u32);
        for s in &self.strings {
            writer.emit_string(s);
        }

        writer.emit_u32(self.class_ids.len() as u32);
        for class_id in &self.class_ids {
            writer.emit_string(&class_id.to_string());
        }
    }

    /// Decode the table
    pub fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let string_count = reader.read_u32()? as usize;
        let mut strings = Vec::with_capacity(string_count.min(reader.remaining()));
        for _ in 0..string_count {
            strings.push(reader.read_string()?);
        }

        let class_count = reader.read_u32()? as usize;
        let mut class_ids = Vec::with_capacity(class_count.min(reader.remaining()));
        for _ in 0..class_count {
            class_ids.push(ClassId::parse(&reader.read_string()?));
        }

        Ok(Self { strings, class_ids })
    }
}

impl NameResolver for StringTable {
    fn get_string(&self, id: u32) -> MetadataResult<&str> {
        self.strings
            .get(id as usize)
            .map(String::as_str)
            .ok_or(MetadataError::StringIndexOutOfRange(id))
    }

    fn get_name(&self, id: u32) -> MetadataResult<&str> {
        self.get_string(id)
    }

    fn get_class_id(&self, id: u32) -> MetadataResult<&ClassId> {
        self.class_ids
            .get(id as usize)
            .ok_or(MetadataError::ClassIdIndexOutOfRange(id))
    }
}
