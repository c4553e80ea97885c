//! Core type definitions for the tessera type system

use crate::class_id::ClassId;
use std::fmt;

/// Unique identifier for a type in the type context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Create a type id from its raw index
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Built-in value types
///
/// The declaration order is also the interning order in
/// [`TypeContext::new`](crate::TypeContext::new), so `TypeId(p as u32)` is the
/// id of primitive `p` in every context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 8-bit unsigned integer
    UByte,
    /// 16-bit unsigned integer
    UShort,
    /// 32-bit unsigned integer
    UInt,
    /// 64-bit unsigned integer
    ULong,
    /// UTF-16 code unit
    Char,
    /// `true` / `false`
    Boolean,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Immutable string
    String,
    /// The unit type (statements, `Set`, loops)
    Unit,
}

impl PrimitiveType {
    /// All primitives in interning order
    pub const ALL: [PrimitiveType; 14] = [
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::UByte,
        PrimitiveType::UShort,
        PrimitiveType::UInt,
        PrimitiveType::ULong,
        PrimitiveType::Char,
        PrimitiveType::Boolean,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::String,
        PrimitiveType::Unit,
    ];

    /// Check if this is a signed or unsigned integer type
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Int
                | PrimitiveType::Long
                | PrimitiveType::UByte
                | PrimitiveType::UShort
                | PrimitiveType::UInt
                | PrimitiveType::ULong
        )
    }

    /// Check if this is an unsigned integer type
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            PrimitiveType::UByte
                | PrimitiveType::UShort
                | PrimitiveType::UInt
                | PrimitiveType::ULong
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Byte => "Byte",
            PrimitiveType::Short => "Short",
            PrimitiveType::Int => "Int",
            PrimitiveType::Long => "Long",
            PrimitiveType::UByte => "UByte",
            PrimitiveType::UShort => "UShort",
            PrimitiveType::UInt => "UInt",
            PrimitiveType::ULong => "ULong",
            PrimitiveType::Char => "Char",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
            PrimitiveType::String => "String",
            PrimitiveType::Unit => "Unit",
        };
        f.write_str(name)
    }
}

/// Nominal class type with type arguments: `Iterator<Int>`, `KClass<*>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    /// Declaring class
    pub class_id: ClassId,
    /// Type arguments
    pub args: Vec<TypeId>,
}

/// Array type: `Array<T>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    /// Element type
    pub element: TypeId,
}

/// The core type representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Built-in value type
    Primitive(PrimitiveType),

    /// Class, interface, enum or annotation class
    Class(ClassType),

    /// Array of elements
    Array(ArrayType),

    /// `T?`
    Nullable(TypeId),

    /// Bottom type
    Nothing,

    /// A type without a known declaration (type parameters, unresolved types)
    Unknown,
}

impl Type {
    /// Check if this type is a primitive type
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Check if this type is nullable
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// Get the primitive type if this is a primitive
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Get the class type if this is a class
    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Get the declaring class, if this type has one
    pub fn declaration(&self) -> Option<&ClassId> {
        match self {
            Type::Class(c) => Some(&c.class_id),
            _ => None,
        }
    }
}
