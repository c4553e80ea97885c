//! Tessera Compiler - Tree IR and For-Loop Lowering
//!
//! This crate holds the typed tree IR, the pass that turns `for` loops over
//! progressions and arrays into counted loops, and an interpreter used to
//! check lowered code against the original.

pub mod error;
pub mod interpret;
pub mod ir;
pub mod lower;

pub use error::{InterpretError, InterpretResult};
pub use interpret::{CallHost, Interpreter, Value};
pub use ir::{IrFunction, IrModule, PrettyPrint, Scope};
pub use lower::{ForLoopsConfig, ForLoopsLowering};
