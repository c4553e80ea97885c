//! Intermediate Representation (IR) for tessera
//!
//! A typed tree IR sitting between the front end and code generation. Loops
//! and conditionals stay structured so lowering passes can rewrite them in
//! place.
//!
//! # Structure
//!
//! - `IrModule` - Top-level container for a compiled module
//! - `IrFunction` - A function with parameters, a body and its variable counter
//! - `IrStmt` / `IrBlock` - Declarations, blocks, conditionals and loops
//! - `IrExpr` - Typed expression trees
//! - `Scope` - Typed node construction and temporary allocation

pub mod builder;
pub mod expr;
pub mod function;
pub mod module;
pub mod pretty;
pub mod progression;
pub mod stmt;
pub mod variable;

pub use builder::Scope;
pub use expr::{BinaryOp, Callee, FunctionId, Intrinsic, IrConstant, IrExpr, UnaryOp};
pub use function::IrFunction;
pub use module::IrModule;
pub use pretty::PrettyPrint;
pub use progression::ProgressionType;
pub use stmt::{BlockOrigin, IrBlock, IrLoop, IrStmt};
pub use variable::{IrVariable, VariableCounter, VariableId, VariableOrigin, VariableRef};
