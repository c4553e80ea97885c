//! IR Functions
//!
//! A function owns its parameters, its body and the counter that hands out
//! variable ids, so passes adding temporaries never collide with existing ids.

use super::stmt::{BlockOrigin, IrBlock};
use super::variable::{IrVariable, VariableCounter, VariableOrigin, VariableRef};
use tessera_types::TypeId;

/// An IR function
#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    /// Function name
    pub name: String,
    /// Parameters (declarations without initializers)
    pub params: Vec<IrVariable>,
    /// Return type
    pub return_ty: TypeId,
    /// Function body
    pub body: IrBlock,
    /// Id and temporary-name allocation
    pub variables: VariableCounter,
}

impl IrFunction {
    /// Create a new function with an empty body
    pub fn new(name: impl Into<String>, return_ty: TypeId) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_ty,
            body: IrBlock::new(BlockOrigin::Plain, Vec::new()),
            variables: VariableCounter::new(),
        }
    }

    /// Add a parameter and return a reference to it
    pub fn add_param(&mut self, name: impl Into<String>, ty: TypeId) -> VariableRef {
        let param = IrVariable {
            id: self.variables.next_id(),
            name: name.into(),
            ty,
            mutable: false,
            origin: VariableOrigin::User,
            initializer: None,
        };
        let reference = param.reference();
        self.params.push(param);
        reference
    }

    /// Get the number of parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Body and variable counter, borrowed separately
    pub fn body_and_variables(&mut self) -> (&mut IrBlock, &mut VariableCounter) {
        (&mut self.body, &mut self.variables)
    }
}
