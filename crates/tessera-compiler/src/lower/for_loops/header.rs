//! Materialized `for` loop headers
//!
//! A header owns the temporaries computed once before the loop (induction
//! variable, bound, step and last value) and knows how to turn the loop body
//! into a counted loop over them. The user-visible loop variable is attached
//! in a second step with [`ForLoopHeader::bind_loop_variable`].

use crate::ir::{
    BinaryOp, IrBlock, IrExpr, IrLoop, IrStmt, IrVariable, ProgressionType, VariableRef,
};
use tessera_types::{TypeContext, TypeId};

/// Comparison matching a progression's direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparingFunction {
    /// `<=`, increasing progressions
    LessOrEqual,
    /// `>=`, decreasing progressions
    GreaterOrEqual,
}

impl ComparingFunction {
    /// Binary operator for this comparison
    pub fn op(self) -> BinaryOp {
        match self {
            ComparingFunction::LessOrEqual => BinaryOp::LessEqual,
            ComparingFunction::GreaterOrEqual => BinaryOp::GreaterEqual,
        }
    }
}

/// Header of a loop over a progression
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionLoopHeader {
    pub(super) induction: IrVariable,
    pub(super) bound: IrVariable,
    pub(super) step: IrVariable,
    pub(super) last: IrVariable,
    pub(super) element: ProgressionType,
    pub(super) increasing: bool,
    pub(super) closed: bool,
}

impl ProgressionLoopHeader {
    /// Value of the loop variable for the current iteration
    pub fn initialize_loop_variable(&self) -> IrExpr {
        self.induction.get()
    }

    /// Comparison that holds while the induction variable has not passed `last`
    pub fn comparing_function(&self) -> ComparingFunction {
        if self.increasing {
            ComparingFunction::LessOrEqual
        } else {
            ComparingFunction::GreaterOrEqual
        }
    }

    /// Element type
    pub fn element(&self) -> ProgressionType {
        self.element
    }

    /// Check if the progression counts upwards
    pub fn is_increasing(&self) -> bool {
        self.increasing
    }

    /// Check if the bound is part of the progression
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Condition under which the progression has at least one element
    ///
    /// `induction <= last` (or `>=`). For `until`, `last` is `bound - 1`,
    /// which wraps around when `bound` is the minimum value, so that case is
    /// excluded explicitly.
    pub fn build_entry_condition(&self, types: &TypeContext) -> IrExpr {
        let boolean = types.boolean_type();
        let in_range = IrExpr::binary(
            self.comparing_function().op(),
            self.induction.get(),
            self.last.get(),
            boolean,
        );
        if self.closed || !self.increasing {
            return in_range;
        }
        let not_min = IrExpr::binary(
            BinaryOp::NotEqual,
            self.bound.get(),
            IrExpr::Const(self.element.min_value()),
            boolean,
        );
        IrExpr::binary(BinaryOp::And, not_min, in_range, boolean)
    }

    /// `do { new_body } while (loop_variable != last)`
    ///
    /// Runs at least once; callers guard entry for empty progressions.
    pub fn build_body(
        &self,
        loop_variable: VariableRef,
        new_body: IrBlock,
        types: &TypeContext,
    ) -> IrStmt {
        let condition = IrExpr::binary(
            BinaryOp::NotEqual,
            loop_variable.get(),
            self.last.get(),
            types.boolean_type(),
        );
        IrStmt::DoWhile(IrLoop::new(condition, new_body))
    }
}

/// Header of a loop over an array
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLoopHeader {
    pub(super) array: IrVariable,
    pub(super) induction: IrVariable,
    pub(super) bound: IrVariable,
    pub(super) step: IrVariable,
    pub(super) last: IrVariable,
    pub(super) element: TypeId,
}

impl ArrayLoopHeader {
    /// `array[induction]`
    pub fn initialize_loop_variable(&self) -> IrExpr {
        IrExpr::ArrayGet {
            array: Box::new(self.array.get()),
            index: Box::new(self.induction.get()),
            ty: self.element,
        }
    }

    /// Temporary holding the array
    pub fn array(&self) -> &IrVariable {
        &self.array
    }

    /// `while (induction <= last) { new_body }`
    pub fn build_body(&self, new_body: IrBlock, types: &TypeContext) -> IrStmt {
        let condition = IrExpr::binary(
            BinaryOp::LessEqual,
            self.induction.get(),
            self.last.get(),
            types.boolean_type(),
        );
        IrStmt::While(IrLoop::new(condition, new_body))
    }
}

/// Materialized loop header
#[derive(Debug, Clone, PartialEq)]
pub enum ForLoopHeader {
    /// Loop over a progression
    Progression(ProgressionLoopHeader),
    /// Loop over an array
    Array(ArrayLoopHeader),
}

impl ForLoopHeader {
    /// Induction variable (mutable)
    pub fn induction(&self) -> &IrVariable {
        match self {
            ForLoopHeader::Progression(header) => &header.induction,
            ForLoopHeader::Array(header) => &header.induction,
        }
    }

    /// Bound temporary
    pub fn bound(&self) -> &IrVariable {
        match self {
            ForLoopHeader::Progression(header) => &header.bound,
            ForLoopHeader::Array(header) => &header.bound,
        }
    }

    /// Step temporary
    pub fn step(&self) -> &IrVariable {
        match self {
            ForLoopHeader::Progression(header) => &header.step,
            ForLoopHeader::Array(header) => &header.step,
        }
    }

    /// Last-value temporary
    pub fn last(&self) -> &IrVariable {
        match self {
            ForLoopHeader::Progression(header) => &header.last,
            ForLoopHeader::Array(header) => &header.last,
        }
    }

    /// Temporaries in creation order
    pub fn declarations(&self) -> Vec<&IrVariable> {
        match self {
            ForLoopHeader::Progression(h) => vec![&h.induction, &h.bound, &h.step, &h.last],
            ForLoopHeader::Array(h) => vec![&h.array, &h.induction, &h.bound, &h.step, &h.last],
        }
    }

    /// Value of the loop variable for the current iteration
    pub fn initialize_loop_variable(&self) -> IrExpr {
        match self {
            ForLoopHeader::Progression(header) => header.initialize_loop_variable(),
            ForLoopHeader::Array(header) => header.initialize_loop_variable(),
        }
    }

    /// `induction = induction + step`
    pub fn increment(&self) -> IrExpr {
        let induction = self.induction();
        induction.reference().set(IrExpr::binary(
            BinaryOp::Add,
            induction.get(),
            self.step().get(),
            induction.ty,
        ))
    }

    /// Attach the user-visible loop variable
    pub fn bind_loop_variable(self, loop_variable: VariableRef) -> BoundLoopHeader {
        BoundLoopHeader {
            header: self,
            loop_variable,
        }
    }
}

/// Header with its loop variable attached
#[derive(Debug, Clone, PartialEq)]
pub struct BoundLoopHeader {
    header: ForLoopHeader,
    loop_variable: VariableRef,
}

impl BoundLoopHeader {
    /// Underlying header
    pub fn header(&self) -> &ForLoopHeader {
        &self.header
    }

    /// User-visible loop variable
    pub fn loop_variable(&self) -> VariableRef {
        self.loop_variable
    }

    /// Counted loop running `new_body` once per element
    pub fn build_body(&self, new_body: IrBlock, types: &TypeContext) -> IrStmt {
        match &self.header {
            ForLoopHeader::Progression(header) => {
                header.build_body(self.loop_variable, new_body, types)
            }
            ForLoopHeader::Array(header) => header.build_body(new_body, types),
        }
    }

    /// Declarations of the temporaries, in creation order
    pub fn into_declarations(self) -> Vec<IrStmt> {
        let variables = match self.header {
            ForLoopHeader::Progression(h) => vec![h.induction, h.bound, h.step, h.last],
            ForLoopHeader::Array(h) => vec![h.array, h.induction, h.bound, h.step, h.last],
        };
        variables.into_iter().map(IrStmt::Var).collect()
    }
}
