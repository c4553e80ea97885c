//! IR Variables
//!
//! Local variables of a function. Every declaration carries a function-unique
//! id; reads and writes refer to the declaration through a [`VariableRef`].

use super::expr::IrExpr;
use tessera_types::TypeId;

/// Variable identifier, unique within a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

impl VariableId {
    /// Create a new variable ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Where a variable declaration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableOrigin {
    /// Declared in source
    User,
    /// Hidden iterator of a `for` loop
    ForLoopIterator,
    /// User-visible variable of a `for` loop
    ForLoopVariable,
    /// Compiler temporary
    Temporary,
}

/// Variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct IrVariable {
    /// Function-unique id
    pub id: VariableId,
    /// Source or generated name
    pub name: String,
    /// Declared type
    pub ty: TypeId,
    /// `var` (true) or `val` (false)
    pub mutable: bool,
    /// Declaration origin
    pub origin: VariableOrigin,
    /// Initial value
    pub initializer: Option<IrExpr>,
}

impl IrVariable {
    /// Reference to this variable
    pub fn reference(&self) -> VariableRef {
        VariableRef::new(self.id, self.ty)
    }

    /// Read of this variable
    pub fn get(&self) -> IrExpr {
        IrExpr::Get(self.reference())
    }
}

/// Typed reference to a declared variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableRef {
    /// Referenced declaration
    pub id: VariableId,
    /// Declared type
    pub ty: TypeId,
}

impl VariableRef {
    /// Create a reference
    pub fn new(id: VariableId, ty: TypeId) -> Self {
        Self { id, ty }
    }

    /// Read of the variable
    pub fn get(self) -> IrExpr {
        IrExpr::Get(self)
    }

    /// Assignment `self = value`
    pub fn set(self, value: IrExpr) -> IrExpr {
        IrExpr::Set {
            variable: self,
            value: Box::new(value),
        }
    }
}

impl std::fmt::Display for VariableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.id, self.ty.as_u32())
    }
}

/// Allocates variable ids and temporary names for one function
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableCounter {
    next_id: u32,
    next_temporary: u32,
}

impl VariableCounter {
    /// Create a counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next variable id
    pub fn next_id(&mut self) -> VariableId {
        let id = VariableId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Allocate the next temporary number
    pub fn next_temporary(&mut self) -> u32 {
        let n = self.next_temporary;
        self.next_temporary += 1;
        n
    }

    /// Number of ids allocated so far
    pub fn allocated(&self) -> u32 {
        self.next_id
    }
}
