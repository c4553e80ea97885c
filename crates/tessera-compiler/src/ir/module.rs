//! IR Module

use super::expr::FunctionId;
use super::function::IrFunction;

/// A compilation unit: functions addressed by their position
#[derive(Debug, Clone)]
pub struct IrModule {
    pub name: String,
    pub functions: Vec<IrFunction>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Append a function; its id is its index
    pub fn add_function(&mut self, function: IrFunction) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(function);
        id
    }
}
