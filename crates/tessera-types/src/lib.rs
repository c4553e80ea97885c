//! Tessera Type System
//!
//! Type representation and the built-in types shared by metadata decoding and
//! IR lowering.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class_id;
pub mod context;
pub mod ty;

pub use class_id::ClassId;
pub use context::TypeContext;
pub use ty::{ArrayType, ClassType, PrimitiveType, Type, TypeId};
