//! Tessera Annotation Metadata
//!
//! This crate reads the annotation metadata stored alongside compiled
//! classes and turns it into typed constant values:
//! - [`AnnotationTable`]: binary metadata unit (string table + wire tree)
//! - [`ValueDecoder`]: one wire value against an expected type
//! - [`AnnotationDecoder`]: arguments matched to the annotation constructor

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod annotation;
pub mod class;
pub mod constant;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod proto;
pub mod table;

pub use annotation::{AnnotationDecoder, AnnotationInstance};
pub use class::{
    ClassDescriptor, ClassKind, ClassResolver, ClassTable, ConstructorDescriptor, ValueParameter,
};
pub use constant::ConstantValue;
pub use decoder::{DecodeContext, ValueDecoder};
pub use encoder::{DecodeError, MetadataReader, MetadataWriter};
pub use error::{MetadataError, MetadataResult};
pub use proto::{AnnotationTable, ValueKind, WireAnnotation, WireArgument, WireValue};
pub use table::{NameResolver, StringTable};
