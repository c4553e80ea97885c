//! For-loop lowering, checked by running the IR before and after the pass

use tessera_compiler::interpret::{CallHost, Interpreter, Value};
use tessera_compiler::ir::{
    BlockOrigin, FunctionId, Intrinsic, IrExpr, IrFunction, IrModule, IrStmt, PrettyPrint, Scope,
};
use tessera_compiler::{ForLoopsConfig, ForLoopsLowering, InterpretError, InterpretResult};
use tessera_types::{PrimitiveType, TypeContext};

/// `sink(value)` records its argument
const SINK: FunctionId = FunctionId(0);

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Call(u32),
    Intrinsic(Intrinsic),
}

/// Host returning canned values for functions 1, 2, ... and recording calls
#[derive(Default)]
struct Host {
    returns: Vec<Value>,
    sunk: Vec<Value>,
    events: Vec<Event>,
}

impl CallHost for Host {
    fn call(&mut self, function: FunctionId, mut args: Vec<Value>) -> InterpretResult<Value> {
        self.events.push(Event::Call(function.0));
        if function == SINK {
            self.sunk.push(args.remove(0));
            return Ok(Value::Unit);
        }
        Ok(self.returns[function.0 as usize - 1].clone())
    }

    fn observe_intrinsic(&mut self, intrinsic: Intrinsic) {
        self.events.push(Event::Intrinsic(intrinsic));
    }
}

impl Host {
    /// Events up to the first `sink` call
    fn header_events(&self) -> Vec<Event> {
        self.events
            .iter()
            .take_while(|event| **event != Event::Call(SINK.0))
            .cloned()
            .collect()
    }
}

fn sink(scope: &Scope<'_>, value: IrExpr) -> IrStmt {
    IrStmt::Expr(IrExpr::call(SINK, vec![value], scope.types().unit_type()))
}

fn build(types: &mut TypeContext, body: impl FnOnce(&mut Scope<'_>) -> Vec<IrStmt>) -> IrFunction {
    let unit = types.unit_type();
    let mut function = IrFunction::new("main", unit);
    let statements = {
        let mut scope = Scope::new(types, &mut function.variables);
        body(&mut scope)
    };
    function.body.statements.extend(statements);
    function
}

/// `for (i in iterable) sink(i)`
fn for_each(
    types: &mut TypeContext,
    iterable: impl FnOnce(&mut Scope<'_>) -> IrExpr,
) -> IrFunction {
    build(types, |scope| {
        let iterable = iterable(scope);
        let stmt = scope
            .for_loop(iterable, "i", |scope, i| vec![sink(scope, i.get())])
            .unwrap();
        vec![stmt]
    })
}

fn run(
    types: &TypeContext,
    function: &IrFunction,
    returns: Vec<Value>,
) -> Result<Host, InterpretError> {
    let mut host = Host {
        returns,
        ..Default::default()
    };
    Interpreter::new(types, &mut host)
        .with_iteration_limit(10_000)
        .run(function, Vec::new())?;
    Ok(host)
}

fn lower(types: &mut TypeContext, function: &IrFunction) -> (IrFunction, usize) {
    let mut lowered = function.clone();
    let count = ForLoopsLowering::new().lower_function(&mut lowered, types);
    (lowered, count)
}

/// Run before and after lowering, check both produce the same elements
fn check(types: &mut TypeContext, function: &IrFunction, returns: Vec<Value>) -> Vec<Value> {
    let (lowered, count) = lower(types, function);
    assert_eq!(count, 1, "loop was not lowered:\n{}", lowered.pretty_print());

    let before = run(types, function, returns.clone()).unwrap();
    let after = run(types, &lowered, returns).unwrap();
    assert_eq!(before.sunk, after.sunk, "\n{}", lowered.pretty_print());
    after.sunk
}

fn ints(values: &[i32]) -> Vec<Value> {
    values.iter().map(|v| Value::Int(*v)).collect()
}

fn call(id: u32, ty: tessera_types::TypeId) -> IrExpr {
    IrExpr::call(FunctionId(id), Vec::new(), ty)
}

#[test]
fn test_range_with_step() {
    let mut types = TypeContext::new();
    let function = for_each(&mut types, |scope| {
        let range = scope.range_to(IrExpr::int(1), IrExpr::int(10)).unwrap();
        scope.step(range, IrExpr::int(2)).unwrap()
    });

    assert_eq!(check(&mut types, &function, Vec::new()), ints(&[1, 3, 5, 7, 9]));

    let (lowered, _) = lower(&mut types, &function);
    let output = lowered.pretty_print();
    assert!(output.contains("lowered_for_loop {"));
    assert!(output.contains(concat!(
        "val tmp3_last: type2 = call @getProgressionLastElement(",
        "tmp0_induction, tmp1_bound, tmp2_step)"
    )));
    let host = run(&types, &lowered, Vec::new()).unwrap();
    assert_eq!(
        host.header_events(),
        vec![Event::Intrinsic(Intrinsic::ProgressionLastElement)]
    );
}

#[test]
fn test_until_without_helper() {
    let mut types = TypeContext::new();
    let function = for_each(&mut types, |scope| {
        scope.until(IrExpr::int(1), IrExpr::int(10)).unwrap()
    });

    assert_eq!(
        check(&mut types, &function, Vec::new()),
        ints(&[1, 2, 3, 4, 5, 6, 7, 8, 9])
    );
    let (lowered, _) = lower(&mut types, &function);
    assert!(lowered.pretty_print().contains("val tmp3_last: type2 = (tmp1_bound - 1)"));
    assert!(run(&types, &lowered, Vec::new()).unwrap().header_events().is_empty());
}

#[test]
fn test_header_evaluation_order() {
    let mut types = TypeContext::new();
    let int = types.int_type();
    let function = for_each(&mut types, |scope| {
        let range = scope.range_to(call(1, int), call(2, int)).unwrap();
        scope.step(range, call(3, int)).unwrap()
    });
    let returns = ints(&[1, 10, 3]);

    assert_eq!(check(&mut types, &function, returns.clone()), ints(&[1, 4, 7, 10]));

    let (lowered, _) = lower(&mut types, &function);
    let host = run(&types, &lowered, returns).unwrap();
    assert_eq!(
        host.header_events(),
        vec![
            Event::Call(1),
            Event::Call(2),
            Event::Call(3),
            Event::Intrinsic(Intrinsic::CheckStepPositive),
            Event::Intrinsic(Intrinsic::ProgressionLastElement),
        ]
    );
}

#[test]
fn test_down_to_with_step() {
    let mut types = TypeContext::new();
    let function = for_each(&mut types, |scope| {
        let range = scope.down_to(IrExpr::int(10), IrExpr::int(1)).unwrap();
        scope.step(range, IrExpr::int(3)).unwrap()
    });
    assert_eq!(check(&mut types, &function, Vec::new()), ints(&[10, 7, 4, 1]));
}

#[test]
fn test_long_and_char_progressions() {
    let mut types = TypeContext::new();
    let function = for_each(&mut types, |scope| {
        scope.range_to(IrExpr::int(1), IrExpr::long(3)).unwrap()
    });
    assert_eq!(
        check(&mut types, &function, Vec::new()),
        vec![Value::Long(1), Value::Long(2), Value::Long(3)]
    );

    let function = for_each(&mut types, |scope| {
        let range = scope.range_to(IrExpr::char('a'), IrExpr::char('e')).unwrap();
        scope.step(range, IrExpr::int(2)).unwrap()
    });
    let chars: Vec<Value> = "ace".chars().map(|c| Value::Char(c as u16)).collect();
    assert_eq!(check(&mut types, &function, Vec::new()), chars);
}

fn assert_empty(types: &mut TypeContext, iterable: impl FnOnce(&mut Scope<'_>) -> IrExpr) {
    let function = for_each(types, iterable);
    assert!(check(types, &function, Vec::new()).is_empty());
}

#[test]
fn test_empty_progressions() {
    let mut types = TypeContext::new();
    assert_empty(&mut types, |scope| {
        scope.range_to(IrExpr::int(5), IrExpr::int(1)).unwrap()
    });
    assert_empty(&mut types, |scope| {
        scope.down_to(IrExpr::int(1), IrExpr::int(5)).unwrap()
    });
    assert_empty(&mut types, |scope| {
        scope.until(IrExpr::int(3), IrExpr::int(3)).unwrap()
    });
    assert_empty(&mut types, |scope| {
        let range = scope.range_to(IrExpr::long(5), IrExpr::long(1)).unwrap();
        scope.step(range, IrExpr::long(2)).unwrap()
    });
}

#[test]
fn test_until_min_value_is_empty() {
    let mut types = TypeContext::new();
    assert_empty(&mut types, |scope| {
        scope.until(IrExpr::int(0), IrExpr::int(i32::MIN)).unwrap()
    });
    assert_empty(&mut types, |scope| {
        scope.until(IrExpr::long(i64::MIN), IrExpr::long(i64::MIN)).unwrap()
    });
}

#[test]
fn test_range_ending_at_max_value_terminates() {
    let mut types = TypeContext::new();
    let function = for_each(&mut types, |scope| {
        scope.range_to(IrExpr::int(i32::MAX - 2), IrExpr::int(i32::MAX)).unwrap()
    });
    assert_eq!(
        check(&mut types, &function, Vec::new()),
        ints(&[i32::MAX - 2, i32::MAX - 1, i32::MAX])
    );
}

#[test]
fn test_arrays() {
    let mut types = TypeContext::new();
    let int = types.int_type();
    let array_ty = types.array_type(int);

    let function = for_each(&mut types, |_| IrExpr::ArrayOf {
        elements: (10..15).map(IrExpr::int).collect(),
        ty: array_ty,
    });
    assert_eq!(check(&mut types, &function, Vec::new()), ints(&[10, 11, 12, 13, 14]));

    let function = for_each(&mut types, |_| IrExpr::ArrayOf {
        elements: Vec::new(),
        ty: array_ty,
    });
    assert!(check(&mut types, &function, Vec::new()).is_empty());
}

#[test]
fn test_indices() {
    let mut types = TypeContext::new();
    let string = types.primitive(PrimitiveType::String);
    let array_ty = types.array_type(string);
    let function = for_each(&mut types, |scope| {
        let array = IrExpr::ArrayOf {
            elements: vec![
                IrExpr::Const(tessera_compiler::ir::IrConstant::String("x".to_string())),
                IrExpr::Const(tessera_compiler::ir::IrConstant::String("y".to_string())),
            ],
            ty: array_ty,
        };
        scope.indices(array).unwrap()
    });
    assert_eq!(check(&mut types, &function, Vec::new()), ints(&[0, 1]));
}

#[test]
fn test_nested_loops() {
    let mut types = TypeContext::new();
    let function = build(&mut types, |scope| {
        let outer = scope.range_to(IrExpr::int(1), IrExpr::int(3)).unwrap();
        let stmt = scope
            .for_loop(outer, "i", |scope, i| {
                let inner = scope.until(IrExpr::int(0), i.get()).unwrap();
                let inner_loop = scope
                    .for_loop(inner, "j", |scope, j| vec![sink(scope, j.get())])
                    .unwrap();
                vec![inner_loop]
            })
            .unwrap();
        vec![stmt]
    });

    let mut lowered = function.clone();
    assert_eq!(ForLoopsLowering::new().lower_function(&mut lowered, &mut types), 2);
    let before = run(&types, &function, Vec::new()).unwrap();
    let after = run(&types, &lowered, Vec::new()).unwrap();
    assert_eq!(after.sunk, ints(&[0, 0, 1, 0, 1, 2]));
    assert_eq!(before.sunk, after.sunk);
}

#[test]
fn test_config_keeps_array_loops() {
    let mut types = TypeContext::new();
    let int = types.int_type();
    let array_ty = types.array_type(int);
    let mut function = build(&mut types, |scope| {
        let array = IrExpr::ArrayOf {
            elements: vec![IrExpr::int(1)],
            ty: array_ty,
        };
        let range = scope.range_to(IrExpr::int(1), IrExpr::int(2)).unwrap();
        vec![
            scope.for_loop(array, "a", |scope, a| vec![sink(scope, a.get())]).unwrap(),
            scope.for_loop(range, "r", |scope, r| vec![sink(scope, r.get())]).unwrap(),
        ]
    });

    let mut config = ForLoopsConfig::new();
    config.set_lower_arrays(false);
    assert_eq!(
        ForLoopsLowering::with_config(config).lower_function(&mut function, &mut types),
        1
    );

    let origins: Vec<BlockOrigin> = function
        .body
        .statements
        .iter()
        .map(|stmt| match stmt {
            IrStmt::Block(block) => block.origin,
            other => panic!("unexpected statement {:?}", other),
        })
        .collect();
    assert_eq!(origins, [BlockOrigin::ForLoop, BlockOrigin::LoweredForLoop]);
    assert_eq!(run(&types, &function, Vec::new()).unwrap().sunk, ints(&[1, 1, 2]));
}

#[test]
fn test_null_bound_fails_after_lowering() {
    let mut types = TypeContext::new();
    let int = types.int_type();
    let nullable = types.nullable_type(int);
    let function = for_each(&mut types, |scope| {
        scope.range_to(IrExpr::int(1), call(1, nullable)).unwrap()
    });

    let (lowered, _) = lower(&mut types, &function);
    assert_eq!(
        run(&types, &lowered, vec![Value::Null]).err(),
        Some(InterpretError::NullAssertion)
    );
    assert_eq!(run(&types, &lowered, vec![Value::Int(2)]).unwrap().sunk, ints(&[1, 2]));
}

#[test]
fn test_zero_step() {
    let mut types = TypeContext::new();
    let function = for_each(&mut types, |scope| {
        let range = scope.range_to(IrExpr::int(1), IrExpr::int(10)).unwrap();
        scope.step(range, IrExpr::int(0)).unwrap()
    });

    let (lowered, _) = lower(&mut types, &function);
    for function in [&function, &lowered] {
        assert_eq!(
            run(&types, function, Vec::new()).err(),
            Some(InterpretError::NonPositiveStep(0))
        );
    }
}

#[test]
fn test_negative_step_fails_like_unlowered() {
    let mut types = TypeContext::new();
    let int = types.int_type();
    let up = for_each(&mut types, |scope| {
        let range = scope.range_to(IrExpr::int(1), IrExpr::int(10)).unwrap();
        scope.step(range, call(1, int)).unwrap()
    });
    let down = for_each(&mut types, |scope| {
        let range = scope.down_to(IrExpr::int(10), IrExpr::int(1)).unwrap();
        scope.step(range, call(1, int)).unwrap()
    });

    for (function, step) in [(up, -1), (down, -3)] {
        let (lowered, count) = lower(&mut types, &function);
        assert_eq!(count, 1);
        for function in [&function, &lowered] {
            assert_eq!(
                run(&types, function, ints(&[step])).err(),
                Some(InterpretError::NonPositiveStep(step as i64)),
                "\n{}",
                function.pretty_print()
            );
        }
    }
}

#[test]
fn test_lower_module() {
    let mut types = TypeContext::new();
    let mut module = IrModule::new("loops");
    let first = for_each(&mut types, |scope| {
        scope.range_to(IrExpr::int(1), IrExpr::int(2)).unwrap()
    });
    let mut second = for_each(&mut types, |scope| {
        scope.down_to(IrExpr::int(2), IrExpr::int(1)).unwrap()
    });
    second.name = "other".to_string();
    module.add_function(first);
    module.add_function(second);

    assert_eq!(ForLoopsLowering::new().lower_module(&mut module, &mut types), 2);
    assert!(module.pretty_print().contains("; module loops"));
    // Nothing left to lower
    assert_eq!(ForLoopsLowering::new().lower_module(&mut module, &mut types), 0);
}
