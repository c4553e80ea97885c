//! IR Expressions
//!
//! Expressions form a tree; each node owns its operands. Evaluation order is
//! the order operands appear (left to right, arguments first to last).

use super::variable::VariableRef;
use tessera_types::{PrimitiveType, TypeContext, TypeId};

/// Function identifier in the IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

impl FunctionId {
    /// Create a new function ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for FunctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn{}", self.0)
    }
}

/// Built-in operations the compiler knows the semantics of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// `a..b`
    RangeTo,
    /// `a until b`
    Until,
    /// `a downTo b`
    DownTo,
    /// `progression step s`
    Step,
    /// `array.indices`
    Indices,
    /// `iterable.iterator()`
    Iterator,
    /// `iterator.hasNext()`
    HasNext,
    /// `iterator.next()`
    Next,
    /// Last element actually reached by `(start, end, step)`
    ProgressionLastElement,
    /// Returns the step, failing if it is not positive
    CheckStepPositive,
}

impl std::fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intrinsic::RangeTo => "rangeTo",
            Intrinsic::Until => "until",
            Intrinsic::DownTo => "downTo",
            Intrinsic::Step => "step",
            Intrinsic::Indices => "indices",
            Intrinsic::Iterator => "iterator",
            Intrinsic::HasNext => "hasNext",
            Intrinsic::Next => "next",
            Intrinsic::ProgressionLastElement => "getProgressionLastElement",
            Intrinsic::CheckStepPositive => "checkStepIsPositive",
        };
        write!(f, "{}", s)
    }
}

/// Call target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callee {
    /// User function
    Function(FunctionId),
    /// Built-in operation
    Intrinsic(Intrinsic),
}

impl std::fmt::Display for Callee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callee::Function(id) => write!(f, "{}", id),
            Callee::Intrinsic(intrinsic) => write!(f, "@{}", intrinsic),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,

    // Comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Check if this is an arithmetic operator
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul)
    }

    /// Check if this is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    /// Check if this is a logical operator
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Numeric negation (-)
    Neg,
    /// Logical not (!)
    Not,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        };
        write!(f, "{}", s)
    }
}

/// Constant values in IR
#[derive(Debug, Clone, PartialEq)]
pub enum IrConstant {
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// UTF-16 code unit
    Char(u16),
    /// Boolean value
    Boolean(bool),
    /// 64-bit float
    Double(f64),
    /// String literal
    String(String),
    /// Null value
    Null,
}

impl IrConstant {
    /// Type of the constant (`Nothing` for `null`)
    pub fn ty(&self, types: &TypeContext) -> TypeId {
        match self {
            IrConstant::Int(_) => types.int_type(),
            IrConstant::Long(_) => types.primitive(PrimitiveType::Long),
            IrConstant::Char(_) => types.primitive(PrimitiveType::Char),
            IrConstant::Boolean(_) => types.boolean_type(),
            IrConstant::Double(_) => types.primitive(PrimitiveType::Double),
            IrConstant::String(_) => types.primitive(PrimitiveType::String),
            IrConstant::Null => types.nothing_type(),
        }
    }

    /// Integer value of an integral constant
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IrConstant::Int(v) => Some(*v as i64),
            IrConstant::Long(v) => Some(*v),
            IrConstant::Char(v) => Some(*v as i64),
            _ => None,
        }
    }
}

impl std::fmt::Display for IrConstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrConstant::Int(v) => write!(f, "{}", v),
            IrConstant::Long(v) => write!(f, "{}L", v),
            IrConstant::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "'{}'", c.escape_default()),
                None => write!(f, "'\\u{:04x}'", v),
            },
            IrConstant::Boolean(v) => write!(f, "{}", v),
            IrConstant::Double(v) => write!(f, "{:?}", v),
            IrConstant::String(s) => write!(f, "\"{}\"", s.escape_default()),
            IrConstant::Null => write!(f, "null"),
        }
    }
}

/// IR expression
#[derive(Debug, Clone, PartialEq)]
pub enum IrExpr {
    /// Constant
    Const(IrConstant),

    /// Variable read
    Get(VariableRef),

    /// Variable write, evaluates to `Unit`
    Set {
        variable: VariableRef,
        value: Box<IrExpr>,
    },

    /// Call: callee(args)
    Call {
        callee: Callee,
        args: Vec<IrExpr>,
        ty: TypeId,
    },

    /// Binary operation: left op right
    Binary {
        op: BinaryOp,
        left: Box<IrExpr>,
        right: Box<IrExpr>,
        ty: TypeId,
    },

    /// Unary operation: op operand
    Unary {
        op: UnaryOp,
        operand: Box<IrExpr>,
        ty: TypeId,
    },

    /// Numeric conversion to a primitive type
    Convert { value: Box<IrExpr>, to: TypeId },

    /// Not-null assertion: value!!
    NotNull { value: Box<IrExpr>, ty: TypeId },

    /// Array element: array[index]
    ArrayGet {
        array: Box<IrExpr>,
        index: Box<IrExpr>,
        ty: TypeId,
    },

    /// Array length: array.size
    ArrayLength(Box<IrExpr>),

    /// Array literal: arrayOf(elements...)
    ArrayOf { elements: Vec<IrExpr>, ty: TypeId },
}

impl IrExpr {
    /// Int constant
    pub fn int(value: i32) -> Self {
        IrExpr::Const(IrConstant::Int(value))
    }

    /// Long constant
    pub fn long(value: i64) -> Self {
        IrExpr::Const(IrConstant::Long(value))
    }

    /// Char constant
    pub fn char(value: char) -> Self {
        let mut units = [0u16; 2];
        let unit = value.encode_utf16(&mut units)[0];
        IrExpr::Const(IrConstant::Char(unit))
    }

    /// Call of a user function
    pub fn call(function: FunctionId, args: Vec<IrExpr>, ty: TypeId) -> Self {
        IrExpr::Call {
            callee: Callee::Function(function),
            args,
            ty,
        }
    }

    /// Call of an intrinsic
    pub fn intrinsic(intrinsic: Intrinsic, args: Vec<IrExpr>, ty: TypeId) -> Self {
        IrExpr::Call {
            callee: Callee::Intrinsic(intrinsic),
            args,
            ty,
        }
    }

    /// Binary operation
    pub fn binary(op: BinaryOp, left: IrExpr, right: IrExpr, ty: TypeId) -> Self {
        IrExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            ty,
        }
    }

    /// Static type of the expression
    pub fn ty(&self, types: &TypeContext) -> TypeId {
        match self {
            IrExpr::Const(c) => c.ty(types),
            IrExpr::Get(variable) => variable.ty,
            IrExpr::Set { .. } => types.unit_type(),
            IrExpr::Call { ty, .. }
            | IrExpr::Binary { ty, .. }
            | IrExpr::Unary { ty, .. }
            | IrExpr::NotNull { ty, .. }
            | IrExpr::ArrayGet { ty, .. }
            | IrExpr::ArrayOf { ty, .. } => *ty,
            IrExpr::Convert { to, .. } => *to,
            IrExpr::ArrayLength(_) => types.int_type(),
        }
    }

    /// Intrinsic called by this expression, if it is an intrinsic call
    pub fn as_intrinsic(&self) -> Option<(Intrinsic, &[IrExpr])> {
        match self {
            IrExpr::Call {
                callee: Callee::Intrinsic(intrinsic),
                args,
                ..
            } => Some((*intrinsic, args.as_slice())),
            _ => None,
        }
    }

    /// Constant value, if this is a constant
    pub fn as_const(&self) -> Option<&IrConstant> {
        match self {
            IrExpr::Const(c) => Some(c),
            _ => None,
        }
    }
}
