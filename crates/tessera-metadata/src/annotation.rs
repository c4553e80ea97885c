//! Annotation decoding
//!
//! Matches the arguments of a serialized annotation against the constructor
//! of its class. An annotation whose class is missing, is not an annotation
//! class, or has an ambiguous constructor keeps its class id but loses all
//! arguments.

use crate::class::{ClassResolver, ValueParameter};
use crate::constant::ConstantValue;
use crate::decoder::{DecodeContext, ValueDecoder};
use crate::error::MetadataResult;
use crate::proto::{AnnotationTable, WireAnnotation};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tessera_types::{ClassId, TypeContext, TypeId};

/// Decoded annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationInstance {
    /// Annotation class
    pub class_id: ClassId,
    /// Resolved class type, `None` when the class is not visible
    #[serde(skip)]
    pub class_type: Option<TypeId>,
    /// Arguments by parameter name
    pub arguments: FxHashMap<String, ConstantValue>,
}

impl AnnotationInstance {
    /// Get an argument by parameter name
    pub fn argument(&self, name: &str) -> Option<&ConstantValue> {
        self.arguments.get(name)
    }
}

/// Decodes serialized annotations
#[derive(Clone, Copy)]
pub struct AnnotationDecoder<'a> {
    ctx: DecodeContext<'a>,
}

impl<'a> AnnotationDecoder<'a> {
    /// Create a decoder
    pub fn new(ctx: DecodeContext<'a>) -> Self {
        Self { ctx }
    }

    /// Decode one annotation
    pub fn decode_annotation(
        &self,
        annotation: &WireAnnotation,
    ) -> MetadataResult<AnnotationInstance> {
        let class_id = self.ctx.names.get_class_id(annotation.class_id)?.clone();
        let descriptor = self.ctx.classes.resolve(&class_id);

        let mut instance = AnnotationInstance {
            class_type: descriptor.map(|descriptor| descriptor.ty),
            class_id,
            arguments: FxHashMap::default(),
        };

        if annotation.arguments.is_empty() {
            return Ok(instance);
        }

        let descriptor = match descriptor {
            Some(descriptor) if descriptor.is_annotation() => descriptor,
            Some(_) => {
                debug!("{} is not an annotation class, dropping arguments", instance.class_id);
                return Ok(instance);
            }
            None => {
                debug!("cannot resolve annotation class {}, dropping arguments", instance.class_id);
                return Ok(instance);
            }
        };

        let constructor = match descriptor.constructors.as_slice() {
            [constructor] => constructor,
            constructors => {
                debug!(
                    "annotation class {} has {} constructors, dropping arguments",
                    instance.class_id,
                    constructors.len()
                );
                return Ok(instance);
            }
        };

        let parameters: FxHashMap<&str, &ValueParameter> = constructor
            .value_parameters
            .iter()
            .map(|parameter| (parameter.name.as_str(), parameter))
            .collect();

        let values = ValueDecoder::new(self.ctx);
        for argument in &annotation.arguments {
            let name = self.ctx.names.get_name(argument.name_id)?;
            let Some(parameter) = parameters.get(name) else {
                debug!("{} has no parameter '{}', dropping argument", instance.class_id, name);
                continue;
            };

            let value = values.decode(parameter.ty, &argument.value)?;
            trace!("{}.{} = {:?}", instance.class_id, name, value);
            instance.arguments.insert(name.to_string(), value);
        }

        Ok(instance)
    }

    /// Decode every annotation of a metadata unit, in order
    ///
    /// Names and class ids are resolved through the unit's own string table.
    pub fn decode_all(
        types: &TypeContext,
        classes: &dyn ClassResolver,
        table: &AnnotationTable,
    ) -> MetadataResult<Vec<AnnotationInstance>> {
        let decoder = AnnotationDecoder::new(DecodeContext::new(types, &table.strings, classes));
        table
            .annotations
            .iter()
            .map(|annotation| decoder.decode_annotation(annotation))
            .collect()
    }
}
