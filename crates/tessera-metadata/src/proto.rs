//! Wire tree of serialized annotations
//!
//! The structural form of an annotation as stored in a metadata unit: a class
//! id index, and arguments whose values are tagged unions carrying every
//! payload field (only the one selected by `kind` is meaningful).
//!
//! Binary layout of a unit:
//! - Magic `TSMD`, version (u32)
//! - String table
//! - Annotation count (u32), then each annotation
//!
//! Each value is `kind (u8)`, `flags (u32)`, then a length-prefixed payload.
//! The length prefix lets a reader skip payloads of kinds it does not know
//! and ignore trailing fields added by newer writers.

use crate::encoder::{DecodeError, MetadataReader, MetadataWriter};
use crate::error::{MetadataError, MetadataResult};
use crate::table::StringTable;
use std::fmt;

/// Magic number for metadata units: "TSMD"
pub const MAGIC: [u8; 4] = *b"TSMD";

/// Current format version
pub const VERSION: u32 = 1;

/// Value flags
pub mod flags {
    /// Integer value is of the unsigned counterpart type
    pub const IS_UNSIGNED: u32 = 1 << 0;
}

/// Kind tag of a wire value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `int_value` as 8-bit integer
    Byte,
    /// `int_value` as UTF-16 code unit
    Char,
    /// `int_value` as 16-bit integer
    Short,
    /// `int_value` as 32-bit integer
    Int,
    /// `int_value` as 64-bit integer
    Long,
    /// `float_value`
    Float,
    /// `double_value`
    Double,
    /// `int_value != 0`
    Boolean,
    /// `string_value` string index
    String,
    /// `class_id` index and `array_dimension_count`
    Class,
    /// `class_id` index and `enum_value_id` name index
    Enum,
    /// Nested `annotation`
    Annotation,
    /// `array_elements`
    Array,
    /// Tag not known to this reader
    Unrecognized(u8),
}

impl ValueKind {
    /// Decode a raw tag
    pub fn from_u8(tag: u8) -> Self {
        match tag {
            0 => ValueKind::Byte,
            1 => ValueKind::Char,
            2 => ValueKind::Short,
            3 => ValueKind::Int,
            4 => ValueKind::Long,
            5 => ValueKind::Float,
            6 => ValueKind::Double,
            7 => ValueKind::Boolean,
            8 => ValueKind::String,
            9 => ValueKind::Class,
            10 => ValueKind::Enum,
            11 => ValueKind::Annotation,
            12 => ValueKind::Array,
            other => ValueKind::Unrecognized(other),
        }
    }

    /// Raw tag
    pub fn to_u8(self) -> u8 {
        match self {
            ValueKind::Byte => 0,
            ValueKind::Char => 1,
            ValueKind::Short => 2,
            ValueKind::Int => 3,
            ValueKind::Long => 4,
            ValueKind::Float => 5,
            ValueKind::Double => 6,
            ValueKind::Boolean => 7,
            ValueKind::String => 8,
            ValueKind::Class => 9,
            ValueKind::Enum => 10,
            ValueKind::Annotation => 11,
            ValueKind::Array => 12,
            ValueKind::Unrecognized(tag) => tag,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Byte => f.write_str("BYTE"),
            ValueKind::Char => f.write_str("CHAR"),
            ValueKind::Short => f.write_str("SHORT"),
            ValueKind::Int => f.write_str("INT"),
            ValueKind::Long => f.write_str("LONG"),
            ValueKind::Float => f.write_str("FLOAT"),
            ValueKind::Double => f.write_str("DOUBLE"),
            ValueKind::Boolean => f.write_str("BOOLEAN"),
            ValueKind::String => f.write_str("STRING"),
            ValueKind::Class => f.write_str("CLASS"),
            ValueKind::Enum => f.write_str("ENUM"),
            ValueKind::Annotation => f.write_str("ANNOTATION"),
            ValueKind::Array => f.write_str("ARRAY"),
            ValueKind::Unrecognized(tag) => write!(f, "UNRECOGNIZED({})", tag),
        }
    }
}

/// Serialized annotation: class id index plus named arguments
#[derive(Debug, Clone, PartialEq)]
pub struct WireAnnotation {
    /// Index into the class id table
    pub class_id: u32,
    /// Arguments in serialization order
    pub arguments: Vec<WireArgument>,
}

/// One `name = value` argument
#[derive(Debug, Clone, PartialEq)]
pub struct WireArgument {
    /// Index of the parameter name in the string table
    pub name_id: u32,
    /// Argument value
    pub value: WireValue,
}

/// Tagged argument value
#[derive(Debug, Clone, PartialEq)]
pub struct WireValue {
    /// Selects which payload field is meaningful
    pub kind: ValueKind,
    /// Bit set of [`flags`]
    pub flags: u32,
    /// Integer, char and boolean payload
    pub int_value: i64,
    /// Float payload
    pub float_value: f32,
    /// Double payload
    pub double_value: f64,
    /// String payload (string table index)
    pub string_value: u32,
    /// Class and enum payload (class id table index)
    pub class_id: u32,
    /// Enum entry name (string table index)
    pub enum_value_id: u32,
    /// Array dimensions of a class literal (`Array<Array<Foo>>::class` is 2)
    pub array_dimension_count: u32,
    /// Nested annotation payload
    pub annotation: Option<Box<WireAnnotation>>,
    /// Array payload
    pub array_elements: Vec<WireValue>,
}

impl WireValue {
    /// Empty value of the given kind
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            flags: 0,
            int_value: 0,
            float_value: 0.0,
            double_value: 0.0,
            string_value: 0,
            class_id: 0,
            enum_value_id: 0,
            array_dimension_count: 0,
            annotation: None,
            array_elements: Vec::new(),
        }
    }

    /// Integer-like value (`Byte`, `Char`, `Short`, `Int`, `Long`, `Boolean`)
    pub fn integer(kind: ValueKind, value: i64) -> Self {
        Self {
            int_value: value,
            ..Self::new(kind)
        }
    }

    /// Unsigned integer value
    pub fn unsigned(kind: ValueKind, value: i64) -> Self {
        Self {
            flags: flags::IS_UNSIGNED,
            ..Self::integer(kind, value)
        }
    }

    /// Float value
    pub fn float(value: f32) -> Self {
        Self {
            float_value: value,
            ..Self::new(ValueKind::Float)
        }
    }

    /// Double value
    pub fn double(value: f64) -> Self {
        Self {
            double_value: value,
            ..Self::new(ValueKind::Double)
        }
    }

    /// Boolean value
    pub fn boolean(value: bool) -> Self {
        Self::integer(ValueKind::Boolean, value as i64)
    }

    /// String value referencing the string table
    pub fn string(string_id: u32) -> Self {
        Self {
            string_value: string_id,
            ..Self::new(ValueKind::String)
        }
    }

    /// Class literal referencing the class id table
    pub fn class_literal(class_id: u32, array_dimension_count: u32) -> Self {
        Self {
            class_id,
            array_dimension_count,
            ..Self::new(ValueKind::Class)
        }
    }

    /// Enum entry
    pub fn enum_entry(class_id: u32, enum_value_id: u32) -> Self {
        Self {
            class_id,
            enum_value_id,
            ..Self::new(ValueKind::Enum)
        }
    }

    /// Nested annotation
    pub fn annotation(annotation: WireAnnotation) -> Self {
        Self {
            annotation: Some(Box::new(annotation)),
            ..Self::new(ValueKind::Annotation)
        }
    }

    /// Array of values
    pub fn array(elements: Vec<WireValue>) -> Self {
        Self {
            array_elements: elements,
            ..Self::new(ValueKind::Array)
        }
    }

    /// Check the `IS_UNSIGNED` flag
    pub fn is_unsigned(&self) -> bool {
        self.flags & flags::IS_UNSIGNED != 0
    }

    fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u8(self.kind.to_u8());
        writer.emit_u32(self.flags);

        let mut payload = MetadataWriter::new();
        match self.kind {
            ValueKind::Byte
            | ValueKind::Char
            | ValueKind::Short
            | ValueKind::Int
            | ValueKind::Long
            | ValueKind::Boolean => payload.emit_i64(self.int_value),
            ValueKind::Float => payload.emit_f32(self.float_value),
            ValueKind::Double => payload.emit_f64(self.double_value),
            ValueKind::String => payload.emit_u32(self.string_value),
            ValueKind::Class => {
                payload.emit_u32(self.class_id);
                payload.emit_u32(self.array_dimension_count);
            }
            ValueKind::Enum => {
                payload.emit_u32(self.class_id);
                payload.emit_u32(self.enum_value_id);
            }
            ValueKind::Annotation => {
                if let Some(annotation) = &self.annotation {
                    annotation.encode(&mut payload);
                }
            }
            ValueKind::Array => {
                payload.emit_u32(self.array_elements.len() as u32);
                for element in &self.array_elements {
                    element.encode(&mut payload);
                }
            }
            ValueKind::Unrecognized(_) => {}
        }
        writer.emit_bytes(payload.buffer());
    }

    fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let kind = ValueKind::from_u8(reader.read_u8()?);
        let flags = reader.read_u32()?;
        let mut value = WireValue {
            flags,
            ..WireValue::new(kind)
        };

        let mut payload = MetadataReader::new(reader.read_bytes()?);
        match kind {
            ValueKind::Byte
            | ValueKind::Char
            | ValueKind::Short
            | ValueKind::Int
            | ValueKind::Long
            | ValueKind::Boolean => value.int_value = payload.read_i64()?,
            ValueKind::Float => value.float_value = payload.read_f32()?,
            ValueKind::Double => value.double_value = payload.read_f64()?,
            ValueKind::String => value.string_value = payload.read_u32()?,
            ValueKind::Class => {
                value.class_id = payload.read_u32()?;
                value.array_dimension_count = payload.read_u32()?;
            }
            ValueKind::Enum => {
                value.class_id = payload.read_u32()?;
                value.enum_value_id = payload.read_u32()?;
            }
            ValueKind::Annotation => {
                if payload.has_more() {
                    value.annotation = Some(Box::new(WireAnnotation::decode(&mut payload)?));
                }
            }
            ValueKind::Array => {
                let count = payload.read_u32()? as usize;
                value.array_elements.reserve(count.min(payload.remaining()));
                for _ in 0..count {
                    value.array_elements.push(WireValue::decode(&mut payload)?);
                }
            }
            // Payload skipped; the decoder decides what an unknown kind means
            ValueKind::Unrecognized(_) => {}
        }

        Ok(value)
    }
}

impl WireAnnotation {
    /// Create an annotation with no arguments
    pub fn new(class_id: u32) -> Self {
        Self {
            class_id,
            arguments: Vec::new(),
        }
    }

    /// Append an argument
    pub fn with_argument(mut self, name_id: u32, value: WireValue) -> Self {
        self.arguments.push(WireArgument { name_id, value });
        self
    }

    fn encode(&self, writer: &mut MetadataWriter) {
        writer.emit_u32(self.class_id);
        writer.emit_u32(self.arguments.len() as u32);
        for argument in &self.arguments {
            writer.emit_u32(argument.name_id);
            argument.value.encode(writer);
        }
    }

    fn decode(reader: &mut MetadataReader<'_>) -> Result<Self, DecodeError> {
        let class_id = reader.read_u32()?;
        let count = reader.read_u32()? as usize;
        let mut arguments = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            let name_id = reader.read_u32()?;
            let value = WireValue::decode(reader)?;
            arguments.push(WireArgument { name_id, value });
        }
        Ok(Self {
            class_id,
            arguments,
        })
    }
}

/// A metadata unit: string table plus the annotations that index into it
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTable {
    /// Format version
    pub version: u32,
    /// Strings and class ids
    pub strings: StringTable,
    /// Serialized annotations
    pub annotations: Vec<WireAnnotation>,
}

impl Default for AnnotationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationTable {
    /// Create an empty unit at the current version
    pub fn new() -> Self {
        Self {
            version: VERSION,
            strings: StringTable::new(),
            annotations: Vec::new(),
        }
    }

    /// Encode the unit to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = MetadataWriter::new();
        writer.buffer.extend_from_slice(&MAGIC);
        writer.emit_u32(self.version);
        self.strings.encode(&mut writer);
        writer.emit_u32(self.annotations.len() as u32);
        for annotation in &self.annotations {
            annotation.encode(&mut writer);
        }
        writer.into_bytes()
    }

    /// Decode a unit from bytes
    pub fn decode(bytes: &[u8]) -> MetadataResult<Self> {
        let mut reader = MetadataReader::new(bytes);

        let mut magic = [0u8; 4];
        for byte in magic.iter_mut() {
            *byte = reader.read_u8()?;
        }
        if magic != MAGIC {
            return Err(MetadataError::InvalidMagic(magic));
        }

        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(MetadataError::UnsupportedVersion(version));
        }

        let strings = StringTable::decode(&mut reader)?;

        let count = reader.read_u32()? as usize;
        let mut annotations = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            annotations.push(WireAnnotation::decode(&mut reader)?);
        }

        Ok(Self {
            version,
            strings,
            annotations,
        })
    }
}
