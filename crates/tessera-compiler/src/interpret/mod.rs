//! IR interpreter
//!
//! Executes a function body directly on the tree IR. It runs code both
//! before and after lowering, so the two forms can be checked against each
//! other. Calls to user functions go to a [`CallHost`].

mod intrinsics;
mod value;

pub use intrinsics::{from_closed_range, progression_last_element};
pub use value::{IteratorState, Progression, Value};

use crate::error::{InterpretError, InterpretResult};
use crate::ir::{
    BinaryOp, Callee, FunctionId, Intrinsic, IrBlock, IrConstant, IrExpr, IrFunction, IrStmt,
    UnaryOp, VariableId,
};
use log::trace;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use tessera_types::{PrimitiveType, TypeContext};

/// Receiver of the calls an interpreted function makes
pub trait CallHost {
    /// Call a user function with evaluated arguments
    fn call(&mut self, function: FunctionId, args: Vec<Value>) -> InterpretResult<Value>;

    /// Notification that an intrinsic is about to run, after its arguments
    /// have been evaluated
    fn observe_intrinsic(&mut self, _intrinsic: Intrinsic) {}
}

/// Tree-walking interpreter
pub struct Interpreter<'a> {
    types: &'a TypeContext,
    host: &'a mut dyn CallHost,
    env: FxHashMap<VariableId, Value>,
    iteration_limit: Option<u64>,
    iterations: u64,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter
    pub fn new(types: &'a TypeContext, host: &'a mut dyn CallHost) -> Self {
        Self {
            types,
            host,
            env: FxHashMap::default(),
            iteration_limit: None,
            iterations: 0,
        }
    }

    /// Fail with [`InterpretError::IterationLimit`] after `limit` loop iterations
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Run `function` with the given arguments
    pub fn run(&mut self, function: &IrFunction, args: Vec<Value>) -> InterpretResult<()> {
        if args.len() != function.param_count() {
            return Err(InterpretError::TypeMismatch(format!(
                "{} expects {} argument(s), got {}",
                function.name,
                function.param_count(),
                args.len()
            )));
        }
        trace!("interpreting fn {}", function.name);

        self.env.clear();
        self.iterations = 0;
        for (param, arg) in function.params.iter().zip(args) {
            self.env.insert(param.id, arg);
        }
        self.exec_block(&function.body)
    }

    /// Current value of a variable
    pub fn value(&self, id: VariableId) -> Option<&Value> {
        self.env.get(&id)
    }

    /// Loop iterations executed by the last run
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    fn exec_block(&mut self, block: &IrBlock) -> InterpretResult<()> {
        for stmt in &block.statements {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &IrStmt) -> InterpretResult<()> {
        match stmt {
            IrStmt::Var(variable) => {
                let value = match &variable.initializer {
                    Some(init) => self.eval(init)?,
                    None => Value::Null,
                };
                self.env.insert(variable.id, value);
            }
            IrStmt::Expr(expr) => {
                self.eval(expr)?;
            }
            IrStmt::Block(block) => self.exec_block(block)?,
            IrStmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_bool(condition)? {
                    self.exec_block(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.exec_block(else_branch)?;
                }
            }
            IrStmt::While(ir_loop) => {
                while self.eval_bool(&ir_loop.condition)? {
                    self.tick()?;
                    self.exec_block(&ir_loop.body)?;
                }
            }
            IrStmt::DoWhile(ir_loop) => loop {
                self.tick()?;
                self.exec_block(&ir_loop.body)?;
                if !self.eval_bool(&ir_loop.condition)? {
                    break;
                }
            },
        }
        Ok(())
    }

    fn tick(&mut self) -> InterpretResult<()> {
        self.iterations += 1;
        match self.iteration_limit {
            Some(limit) if self.iterations > limit => Err(InterpretError::IterationLimit(limit)),
            _ => Ok(()),
        }
    }

    fn eval_bool(&mut self, expr: &IrExpr) -> InterpretResult<bool> {
        match self.eval(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(InterpretError::TypeMismatch(format!(
                "expected Boolean, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval(&mut self, expr: &IrExpr) -> InterpretResult<Value> {
        match expr {
            IrExpr::Const(c) => Ok(constant(c)),
            IrExpr::Get(variable) => self
                .env
                .get(&variable.id)
                .cloned()
                .ok_or(InterpretError::UnknownVariable(variable.id)),
            IrExpr::Set { variable, value } => {
                let value = self.eval(value)?;
                match self.env.get_mut(&variable.id) {
                    Some(slot) => *slot = value,
                    None => return Err(InterpretError::UnknownVariable(variable.id)),
                }
                Ok(Value::Unit)
            }
            IrExpr::Call { callee, args, .. } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                match callee {
                    Callee::Function(id) => self.host.call(*id, values),
                    Callee::Intrinsic(intrinsic) => {
                        self.host.observe_intrinsic(*intrinsic);
                        intrinsics::apply(*intrinsic, &values)
                    }
                }
            }
            IrExpr::Binary {
                op: BinaryOp::And,
                left,
                right,
                ..
            } => Ok(Value::Boolean(self.eval_bool(left)? && self.eval_bool(right)?)),
            IrExpr::Binary {
                op: BinaryOp::Or,
                left,
                right,
                ..
            } => Ok(Value::Boolean(self.eval_bool(left)? || self.eval_bool(right)?)),
            IrExpr::Binary {
                op, left, right, ..
            } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, left, right)
            }
            IrExpr::Unary { op, operand, .. } => {
                let operand = self.eval(operand)?;
                unary(*op, operand)
            }
            IrExpr::Convert { value, to } => {
                let value = self.eval(value)?;
                let target = self
                    .types
                    .as_primitive(self.types.make_not_null(*to))
                    .ok_or_else(|| {
                        InterpretError::TypeMismatch(format!(
                            "cannot convert to {}",
                            self.types.display(*to)
                        ))
                    })?;
                convert(value, target)
            }
            IrExpr::NotNull { value, .. } => match self.eval(value)? {
                Value::Null => Err(InterpretError::NullAssertion),
                value => Ok(value),
            },
            IrExpr::ArrayGet { array, index, .. } => {
                let array = self.eval(array)?;
                let index = self.eval(index)?;
                match (array, index) {
                    (Value::Array(elements), Value::Int(i)) => usize::try_from(i)
                        .ok()
                        .and_then(|i| elements.get(i).cloned())
                        .ok_or(InterpretError::IndexOutOfBounds {
                            index: i as i64,
                            length: elements.len(),
                        }),
                    (array, index) => Err(InterpretError::TypeMismatch(format!(
                        "cannot index {} with {}",
                        array.type_name(),
                        index.type_name()
                    ))),
                }
            }
            IrExpr::ArrayLength(array) => match self.eval(array)? {
                Value::Array(elements) => Ok(Value::Int(elements.len() as i32)),
                other => Err(InterpretError::TypeMismatch(format!(
                    "{} has no size",
                    other.type_name()
                ))),
            },
            IrExpr::ArrayOf { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval(element)?);
                }
                Ok(Value::array(values))
            }
        }
    }
}

fn constant(c: &IrConstant) -> Value {
    match c {
        IrConstant::Int(v) => Value::Int(*v),
        IrConstant::Long(v) => Value::Long(*v),
        IrConstant::Char(v) => Value::Char(*v),
        IrConstant::Boolean(v) => Value::Boolean(*v),
        IrConstant::Double(v) => Value::Double(*v),
        IrConstant::String(s) => Value::String(s.clone()),
        IrConstant::Null => Value::Null,
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> InterpretResult<Value> {
    if op.is_comparison() {
        let result = match op {
            BinaryOp::Equal => values_equal(&left, &right),
            BinaryOp::NotEqual => !values_equal(&left, &right),
            _ => {
                let ordering = compare(&left, &right)?;
                match op {
                    BinaryOp::Less => ordering == Ordering::Less,
                    BinaryOp::LessEqual => ordering != Ordering::Greater,
                    BinaryOp::Greater => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }
            }
        };
        return Ok(Value::Boolean(result));
    }

    match (op, left, right) {
        (BinaryOp::And, Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a && b)),
        (BinaryOp::Or, Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a || b)),
        (op, left, right) if op.is_logical() => Err(InterpretError::TypeMismatch(format!(
            "cannot apply {} to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
        (op, Value::Int(a), Value::Int(b)) => Ok(Value::Int(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            _ => a.wrapping_mul(b),
        })),
        (op, Value::Long(a), Value::Long(b)) => Ok(Value::Long(long_arithmetic(op, a, b))),
        (op, Value::Long(a), Value::Int(b)) => Ok(Value::Long(long_arithmetic(op, a, b as i64))),
        (op, Value::Int(a), Value::Long(b)) => Ok(Value::Long(long_arithmetic(op, a as i64, b))),
        (BinaryOp::Add, Value::Char(c), Value::Int(n)) => {
            Ok(Value::Char((c as i32).wrapping_add(n) as u16))
        }
        (BinaryOp::Sub, Value::Char(c), Value::Int(n)) => {
            Ok(Value::Char((c as i32).wrapping_sub(n) as u16))
        }
        (BinaryOp::Sub, Value::Char(a), Value::Char(b)) => Ok(Value::Int(a as i32 - b as i32)),
        (op, Value::Double(a), Value::Double(b)) => Ok(Value::Double(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            _ => a * b,
        })),
        (op, left, right) => Err(InterpretError::TypeMismatch(format!(
            "cannot apply {} to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn long_arithmetic(op: BinaryOp, a: i64, b: i64) -> i64 {
    match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        _ => a.wrapping_mul(b),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_i64(), right.as_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> InterpretResult<Ordering> {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return Ok(a.cmp(&b));
    }
    let ordering = match (left, right) {
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    };
    ordering.ok_or_else(|| {
        InterpretError::TypeMismatch(format!(
            "cannot compare {} and {}",
            left.type_name(),
            right.type_name()
        ))
    })
}

fn unary(op: UnaryOp, operand: Value) -> InterpretResult<Value> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Int(v)) => Ok(Value::Int(v.wrapping_neg())),
        (UnaryOp::Neg, Value::Long(v)) => Ok(Value::Long(v.wrapping_neg())),
        (UnaryOp::Neg, Value::Double(v)) => Ok(Value::Double(-v)),
        (UnaryOp::Not, Value::Boolean(v)) => Ok(Value::Boolean(!v)),
        (op, operand) => Err(InterpretError::TypeMismatch(format!(
            "cannot apply {} to {}",
            op,
            operand.type_name()
        ))),
    }
}

fn convert(value: Value, target: PrimitiveType) -> InterpretResult<Value> {
    if let Value::Double(d) = value {
        return match target {
            PrimitiveType::Double => Ok(Value::Double(d)),
            PrimitiveType::Long => Ok(Value::Long(d as i64)),
            PrimitiveType::Int => Ok(Value::Int(d as i32)),
            _ => convert(Value::Int(d as i32), target),
        };
    }
    let Some(v) = value.as_i64() else {
        return Err(InterpretError::TypeMismatch(format!(
            "cannot convert {} to {}",
            value.type_name(),
            target
        )));
    };
    match target {
        PrimitiveType::Byte => Ok(Value::Int(v as i8 as i32)),
        PrimitiveType::Short => Ok(Value::Int(v as i16 as i32)),
        PrimitiveType::Int => Ok(Value::Int(v as i32)),
        PrimitiveType::Long => Ok(Value::Long(v)),
        PrimitiveType::Char => Ok(Value::Char(v as u16)),
        PrimitiveType::Double => Ok(Value::Double(v as f64)),
        _ => Err(InterpretError::TypeMismatch(format!(
            "cannot convert {} to {}",
            value.type_name(),
            target
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrLoop, IrVariable, VariableOrigin};

    struct Recorder {
        calls: Vec<(FunctionId, Vec<Value>)>,
    }

    impl CallHost for Recorder {
        fn call(&mut self, function: FunctionId, args: Vec<Value>) -> InterpretResult<Value> {
            self.calls.push((function, args));
            Ok(Value::Unit)
        }
    }

    fn local(
        function: &mut IrFunction,
        name: &str,
        ty: tessera_types::TypeId,
        init: IrExpr,
    ) -> IrVariable {
        IrVariable {
            id: function.variables.next_id(),
            name: name.to_string(),
            ty,
            mutable: true,
            origin: VariableOrigin::User,
            initializer: Some(init),
        }
    }

    #[test]
    fn test_while_loop() {
        let types = TypeContext::new();
        let int = types.int_type();
        let boolean = types.boolean_type();
        let mut function = IrFunction::new("count", types.unit_type());
        let i = local(&mut function, "i", int, IrExpr::int(0));
        let i_ref = i.reference();
        function.body.statements.push(IrStmt::Var(i));
        function.body.statements.push(IrStmt::While(IrLoop::new(
            IrExpr::binary(BinaryOp::Less, i_ref.get(), IrExpr::int(3), boolean),
            IrBlock::plain(vec![
                IrStmt::Expr(IrExpr::call(FunctionId(0), vec![i_ref.get()], types.unit_type())),
                IrStmt::Expr(i_ref.set(IrExpr::binary(
                    BinaryOp::Add,
                    i_ref.get(),
                    IrExpr::int(1),
                    int,
                ))),
            ]),
        )));

        let mut host = Recorder { calls: Vec::new() };
        let mut interpreter = Interpreter::new(&types, &mut host);
        interpreter.run(&function, Vec::new()).unwrap();
        assert_eq!(interpreter.value(i_ref.id), Some(&Value::Int(3)));
        assert_eq!(interpreter.iterations(), 3);

        let args: Vec<Value> = host.calls.into_iter().map(|(_, mut a)| a.remove(0)).collect();
        assert_eq!(args, vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_iteration_limit() {
        let types = TypeContext::new();
        let mut function = IrFunction::new("spin", types.unit_type());
        function.body.statements.push(IrStmt::While(IrLoop::new(
            IrExpr::Const(IrConstant::Boolean(true)),
            IrBlock::plain(Vec::new()),
        )));

        let mut host = Recorder { calls: Vec::new() };
        let result = Interpreter::new(&types, &mut host)
            .with_iteration_limit(10)
            .run(&function, Vec::new());
        assert_eq!(result, Err(InterpretError::IterationLimit(10)));
    }

    #[test]
    fn test_runtime_errors() {
        let mut types = TypeContext::new();
        let int = types.int_type();
        let nullable = types.nullable_type(int);
        let array_ty = types.array_type(int);

        let mut function = IrFunction::new("f", types.unit_type());
        let p = function.add_param("p", nullable);
        function.body.statements.push(IrStmt::Expr(IrExpr::NotNull {
            value: Box::new(p.get()),
            ty: int,
        }));
        let mut host = Recorder { calls: Vec::new() };
        let mut interpreter = Interpreter::new(&types, &mut host);
        assert_eq!(
            interpreter.run(&function, vec![Value::Null]),
            Err(InterpretError::NullAssertion)
        );
        assert!(interpreter.run(&function, vec![Value::Int(1)]).is_ok());
        assert!(matches!(
            interpreter.run(&function, Vec::new()),
            Err(InterpretError::TypeMismatch(_))
        ));

        let mut function = IrFunction::new("g", types.unit_type());
        function.body.statements.push(IrStmt::Expr(IrExpr::ArrayGet {
            array: Box::new(IrExpr::ArrayOf {
                elements: vec![IrExpr::int(1)],
                ty: array_ty,
            }),
            index: Box::new(IrExpr::int(1)),
            ty: int,
        }));
        assert_eq!(
            interpreter.run(&function, Vec::new()),
            Err(InterpretError::IndexOutOfBounds { index: 1, length: 1 })
        );
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(
            binary(BinaryOp::Add, Value::Int(i32::MAX), Value::Int(1)),
            Ok(Value::Int(i32::MIN))
        );
        assert_eq!(
            binary(BinaryOp::Add, Value::Char(97), Value::Int(2)),
            Ok(Value::Char(99))
        );
        assert_eq!(
            binary(BinaryOp::NotEqual, Value::Long(3), Value::Long(3)),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            binary(BinaryOp::GreaterEqual, Value::Char(98), Value::Char(97)),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn test_convert() {
        assert_eq!(convert(Value::Int(-1), PrimitiveType::Long), Ok(Value::Long(-1)));
        assert_eq!(convert(Value::Long(1 << 32 | 5), PrimitiveType::Int), Ok(Value::Int(5)));
        assert_eq!(convert(Value::Int(300), PrimitiveType::Byte), Ok(Value::Int(44)));
        assert!(convert(Value::Boolean(true), PrimitiveType::Int).is_err());
    }
}
