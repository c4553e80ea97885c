//! Decoding of wire values into typed constants
//!
//! Every value is decoded against the type its parameter expects. A value
//! whose type does not match comes back as [`ConstantValue::Error`], so a
//! class recompiled with different parameter types never poisons the model.
//! Only malformed input (an unknown value kind, a dangling table index) is a
//! hard [`MetadataError`].

use crate::annotation::AnnotationDecoder;
use crate::class::ClassResolver;
use crate::constant::ConstantValue;
use crate::error::{MetadataError, MetadataResult};
use crate::proto::{ValueKind, WireValue};
use crate::table::NameResolver;
use log::{debug, trace};
use tessera_types::{Type, TypeContext, TypeId};

/// Collaborators shared by the value and annotation decoders
#[derive(Clone, Copy)]
pub struct DecodeContext<'a> {
    /// Module type system
    pub types: &'a TypeContext,
    /// String and class-id tables of the unit being decoded
    pub names: &'a dyn NameResolver,
    /// Class lookup
    pub classes: &'a dyn ClassResolver,
}

impl<'a> DecodeContext<'a> {
    /// Bundle the collaborators
    pub fn new(
        types: &'a TypeContext,
        names: &'a dyn NameResolver,
        classes: &'a dyn ClassResolver,
    ) -> Self {
        Self {
            types,
            names,
            classes,
        }
    }
}

/// Decodes one wire value against an expected type
#[derive(Clone, Copy)]
pub struct ValueDecoder<'a> {
    ctx: DecodeContext<'a>,
}

impl<'a> ValueDecoder<'a> {
    /// Create a decoder
    pub fn new(ctx: DecodeContext<'a>) -> Self {
        Self { ctx }
    }

    /// Decode `value` as a constant of type `expected`
    pub fn decode(&self, expected: TypeId, value: &WireValue) -> MetadataResult<ConstantValue> {
        let types = self.ctx.types;

        let result = match value.kind {
            ValueKind::Byte
            | ValueKind::Char
            | ValueKind::Short
            | ValueKind::Int
            | ValueKind::Long
            | ValueKind::Float
            | ValueKind::Double
            | ValueKind::Boolean
            | ValueKind::String => {
                let constant = self.decode_primitive(value)?;
                match constant.semantic_type(types) {
                    Some(actual) if actual == expected => constant,
                    Some(actual) => self.mismatch(expected, types.display(actual)),
                    None => self.mismatch(expected, value.kind),
                }
            }

            ValueKind::Class => {
                let class_id = self.ctx.names.get_class_id(value.class_id)?.clone();
                let accepts = matches!(types.get(expected), Some(Type::Unknown))
                    || types.is_kclass(expected);
                if accepts {
                    ConstantValue::KClass {
                        class_id,
                        array_dimensions: value.array_dimension_count,
                    }
                } else {
                    self.mismatch(expected, value.kind)
                }
            }

            ValueKind::Enum => {
                let class_id = self.ctx.names.get_class_id(value.class_id)?;
                let entry = self.ctx.names.get_name(value.enum_value_id)?;
                if types.declaration(expected) == Some(class_id) {
                    ConstantValue::Enum {
                        class_id: class_id.clone(),
                        entry: entry.to_string(),
                    }
                } else {
                    self.mismatch(expected, value.kind)
                }
            }

            ValueKind::Annotation => {
                let nested = value
                    .annotation
                    .as_deref()
                    .ok_or(MetadataError::MissingAnnotationPayload)?;
                let instance = AnnotationDecoder::new(self.ctx).decode_annotation(nested)?;
                if instance.class_type == Some(expected) {
                    ConstantValue::Annotation(instance)
                } else {
                    self.mismatch(expected, value.kind)
                }
            }

            ValueKind::Array => self.decode_array(expected, value)?,

            ValueKind::Unrecognized(tag) => {
                return Err(MetadataError::UnrecognizedValueKind {
                    tag,
                    expected: types.display(expected),
                })
            }
        };

        if let ConstantValue::Error { message } = &result {
            debug!("argument value degraded to error: {}", message);
        }
        Ok(result)
    }

    fn decode_primitive(&self, value: &WireValue) -> MetadataResult<ConstantValue> {
        let unsigned = value.is_unsigned();
        let int = value.int_value;

        let constant = match value.kind {
            ValueKind::Byte if unsigned => ConstantValue::UByte(int as u8),
            ValueKind::Byte => ConstantValue::Byte(int as i8),
            ValueKind::Short if unsigned => ConstantValue::UShort(int as u16),
            ValueKind::Short => ConstantValue::Short(int as i16),
            ValueKind::Int if unsigned => ConstantValue::UInt(int as u32),
            ValueKind::Int => ConstantValue::Int(int as i32),
            ValueKind::Long if unsigned => ConstantValue::ULong(int as u64),
            ValueKind::Long => ConstantValue::Long(int),
            ValueKind::Char => ConstantValue::Char(int as u16),
            ValueKind::Boolean => ConstantValue::Boolean(int != 0),
            ValueKind::Float => ConstantValue::Float(value.float_value),
            ValueKind::Double => ConstantValue::Double(value.double_value),
            ValueKind::String => {
                ConstantValue::String(self.ctx.names.get_string(value.string_value)?.to_string())
            }
            _ => ConstantValue::error(format!("{} is not a primitive value", value.kind)),
        };

        Ok(constant)
    }

    fn decode_array(&self, expected: TypeId, value: &WireValue) -> MetadataResult<ConstantValue> {
        let element_type = match self.ctx.types.element_type(expected) {
            Some(element_type) => element_type,
            None => return Ok(self.mismatch(expected, value.kind)),
        };

        let mut elements = Vec::with_capacity(value.array_elements.len());
        for (index, element) in value.array_elements.iter().enumerate() {
            let decoded = self.decode(element_type, element)?;
            if let ConstantValue::Error { message } = decoded {
                return Ok(ConstantValue::error(format!(
                    "Unexpected array element {}: {}",
                    index, message
                )));
            }
            trace!("array element {} decoded", index);
            elements.push(decoded);
        }

        Ok(ConstantValue::Array {
            elements,
            ty: expected,
        })
    }

    fn mismatch(&self, expected: TypeId, actual: impl std::fmt::Display) -> ConstantValue {
        ConstantValue::error(format!(
            "Unexpected argument value: actual type {} != expected type {}",
            actual,
            self.ctx.types.display(expected)
        ))
    }
}
