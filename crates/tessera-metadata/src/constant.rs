//! Decoded annotation argument values

use crate::annotation::AnnotationInstance;
use serde::Serialize;
use tessera_types::{ClassId, ClassType, PrimitiveType, Type, TypeContext, TypeId};

/// Compile-time constant held by an annotation argument
///
/// Serialized adjacently tagged, e.g. `{"kind": "Int", "value": 42}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum ConstantValue {
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 8-bit unsigned integer
    UByte(u8),
    /// 16-bit unsigned integer
    UShort(u16),
    /// 32-bit unsigned integer
    UInt(u32),
    /// 64-bit unsigned integer
    ULong(u64),
    /// UTF-16 code unit
    Char(u16),
    /// Boolean
    Boolean(bool),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// String literal
    String(String),
    /// Class literal, `Foo::class` or `Array<Foo>::class`
    KClass {
        /// Referenced class (not resolved)
        class_id: ClassId,
        /// Number of array wrappers around the class
        array_dimensions: u32,
    },
    /// Enum entry
    Enum {
        /// Enum class
        class_id: ClassId,
        /// Entry name
        entry: String,
    },
    /// Nested annotation
    Annotation(AnnotationInstance),
    /// Array of constants
    Array {
        /// Elements in order
        elements: Vec<ConstantValue>,
        /// Array type the value was decoded against
        #[serde(skip)]
        ty: TypeId,
    },
    /// Value that could not be decoded against its expected type
    Error {
        /// Diagnostic message
        message: String,
    },
}

impl ConstantValue {
    /// Create an error value
    pub fn error(message: impl Into<String>) -> Self {
        ConstantValue::Error {
            message: message.into(),
        }
    }

    /// Check if this is an error value
    pub fn is_error(&self) -> bool {
        matches!(self, ConstantValue::Error { .. })
    }

    /// Primitive type of a primitive constant
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        let primitive = match self {
            ConstantValue::Byte(_) => PrimitiveType::Byte,
            ConstantValue::Short(_) => PrimitiveType::Short,
            ConstantValue::Int(_) => PrimitiveType::Int,
            ConstantValue::Long(_) => PrimitiveType::Long,
            ConstantValue::UByte(_) => PrimitiveType::UByte,
            ConstantValue::UShort(_) => PrimitiveType::UShort,
            ConstantValue::UInt(_) => PrimitiveType::UInt,
            ConstantValue::ULong(_) => PrimitiveType::ULong,
            ConstantValue::Char(_) => PrimitiveType::Char,
            ConstantValue::Boolean(_) => PrimitiveType::Boolean,
            ConstantValue::Float(_) => PrimitiveType::Float,
            ConstantValue::Double(_) => PrimitiveType::Double,
            ConstantValue::String(_) => PrimitiveType::String,
            _ => return None,
        };
        Some(primitive)
    }

    /// Type of this constant in the given context
    ///
    /// Only looks types up, never interns: a class type that is not in the
    /// context cannot equal any expected type drawn from it. Errors have no
    /// type.
    pub fn semantic_type(&self, types: &TypeContext) -> Option<TypeId> {
        if let Some(primitive) = self.primitive_type() {
            return Some(types.primitive(primitive));
        }

        match self {
            ConstantValue::KClass { .. } => types.lookup(&Type::Class(ClassType {
                class_id: ClassId::kclass(),
                args: vec![types.unknown_type()],
            })),
            ConstantValue::Enum { class_id, .. } => types.lookup(&Type::Class(ClassType {
                class_id: class_id.clone(),
                args: Vec::new(),
            })),
            ConstantValue::Annotation(instance) => instance.class_type,
            ConstantValue::Array { ty, .. } => Some(*ty),
            _ => None,
        }
    }
}
