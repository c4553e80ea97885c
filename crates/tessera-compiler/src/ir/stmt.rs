//! IR Statements
//!
//! Structured control flow: blocks, conditionals and loops nest directly
//! instead of being flattened into basic blocks.

use super::expr::IrExpr;
use super::variable::IrVariable;

/// What produced a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockOrigin {
    /// Plain `{ ... }` block
    Plain,
    /// Block wrapping an iterator-based `for` loop
    ForLoop,
    /// Body of a `for` loop (starts with the loop variable)
    ForLoopBody,
    /// Counted loop produced by for-loop lowering
    LoweredForLoop,
}

impl std::fmt::Display for BlockOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BlockOrigin::Plain => "block",
            BlockOrigin::ForLoop => "for_loop",
            BlockOrigin::ForLoopBody => "for_loop_body",
            BlockOrigin::LoweredForLoop => "lowered_for_loop",
        };
        write!(f, "{}", s)
    }
}

/// Sequence of statements
#[derive(Debug, Clone, PartialEq)]
pub struct IrBlock {
    /// What produced the block
    pub origin: BlockOrigin,
    /// Statements in execution order
    pub statements: Vec<IrStmt>,
}

impl IrBlock {
    /// Create a block
    pub fn new(origin: BlockOrigin, statements: Vec<IrStmt>) -> Self {
        Self { origin, statements }
    }

    /// Create a plain block
    pub fn plain(statements: Vec<IrStmt>) -> Self {
        Self::new(BlockOrigin::Plain, statements)
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Check if the block has no statements
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Loop condition and body
#[derive(Debug, Clone, PartialEq)]
pub struct IrLoop {
    /// Boolean condition
    pub condition: IrExpr,
    /// Loop body
    pub body: IrBlock,
}

impl IrLoop {
    /// Create a loop
    pub fn new(condition: IrExpr, body: IrBlock) -> Self {
        Self { condition, body }
    }
}

/// IR statement
#[derive(Debug, Clone, PartialEq)]
pub enum IrStmt {
    /// Variable declaration
    Var(IrVariable),

    /// Expression evaluated for its effects
    Expr(IrExpr),

    /// Nested block
    Block(IrBlock),

    /// Conditional
    If {
        condition: IrExpr,
        then_branch: IrBlock,
        else_branch: Option<IrBlock>,
    },

    /// `while (condition) body`
    While(IrLoop),

    /// `do body while (condition)`
    DoWhile(IrLoop),
}

impl IrStmt {
    /// Check if this statement is a loop
    pub fn is_loop(&self) -> bool {
        matches!(self, IrStmt::While(_) | IrStmt::DoWhile(_))
    }

    /// Declared variable, if this is a declaration
    pub fn as_var(&self) -> Option<&IrVariable> {
        match self {
            IrStmt::Var(variable) => Some(variable),
            _ => None,
        }
    }
}
