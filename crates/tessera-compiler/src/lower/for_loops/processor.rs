//! Header processing
//!
//! Turns the hidden iterator variable of a `for` loop into a
//! [`ForLoopHeader`]. The bound, step and last temporaries are initialized in
//! source order, so side effects in `f()..g() step h()` run as `f`, `g`, `h`,
//! then the last-element computation.

use super::header::{ArrayLoopHeader, ForLoopHeader, ProgressionLoopHeader};
use super::header_info::{ArrayHeaderInfo, HeaderInfo, HeaderInfoBuilder, ProgressionHeaderInfo};
use crate::ir::{
    BinaryOp, Intrinsic, IrConstant, IrExpr, IrVariable, Scope, UnaryOp, VariableOrigin,
};
use log::trace;
use tessera_types::{TypeContext, TypeId};

/// Builds loop headers from iterator variables
pub struct HeaderProcessor<'a> {
    builder: &'a dyn HeaderInfoBuilder,
}

impl<'a> HeaderProcessor<'a> {
    /// Create a processor classifying iterables with `builder`
    pub fn new(builder: &'a dyn HeaderInfoBuilder) -> Self {
        Self { builder }
    }

    /// Build the header for a loop whose iterator variable is `variable`
    ///
    /// Returns `None`, without creating any temporary, if the variable is not
    /// a `for` loop iterator over a recognized progression or array.
    pub fn process_header(
        &self,
        variable: &IrVariable,
        scope: &mut Scope<'_>,
    ) -> Option<ForLoopHeader> {
        if variable.origin != VariableOrigin::ForLoopIterator {
            return None;
        }
        if !scope.types().is_iterator(variable.ty) {
            return None;
        }

        let Some((Intrinsic::Iterator, [iterable])) =
            variable.initializer.as_ref().and_then(IrExpr::as_intrinsic)
        else {
            return None;
        };

        let info = self.builder.build(iterable, scope.types())?;
        let header = match info {
            HeaderInfo::Progression(info) => {
                ForLoopHeader::Progression(self.progression_header(info, scope))
            }
            HeaderInfo::Array(info) => ForLoopHeader::Array(self.array_header(info, scope)),
        };

        trace!(
            "for loop over {} header: {}",
            variable.name,
            header
                .declarations()
                .iter()
                .map(|v| v.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Some(header)
    }

    fn progression_header(
        &self,
        info: ProgressionHeaderInfo,
        scope: &mut Scope<'_>,
    ) -> ProgressionLoopHeader {
        let ProgressionHeaderInfo {
            element,
            lower,
            upper,
            step,
            increasing,
            closed,
        } = info;
        let element_ty = scope.types().primitive(element.element());
        let step_ty = scope.types().primitive(element.step());
        let trivial_step = step.is_none();

        // 1. induction = lower
        let init = cast(lower, element_ty, scope.types());
        let induction = scope.create_temporary(init, "induction", true);

        // 2. bound = upper!!
        let init = cast(not_null(upper, scope.types()), element_ty, scope.types());
        let bound = scope.create_temporary(init, "bound", false);

        // 3. step = (+/-) checkStepIsPositive(step!!)
        let init = match step {
            Some(step) => {
                let step = check_positive(
                    cast(not_null(step, scope.types()), step_ty, scope.types()),
                    step_ty,
                );
                if increasing {
                    step
                } else {
                    IrExpr::Unary {
                        op: UnaryOp::Neg,
                        operand: Box::new(step),
                        ty: step_ty,
                    }
                }
            }
            None => IrExpr::Const(element.step_constant(if increasing { 1 } else { -1 })),
        };
        let step = scope.create_temporary(init, "step", false);

        // 4. last
        let adjusted = if closed {
            bound.get()
        } else {
            let op = if increasing { BinaryOp::Sub } else { BinaryOp::Add };
            IrExpr::binary(
                op,
                bound.get(),
                IrExpr::Const(element.step_constant(1)),
                element_ty,
            )
        };
        let init = if trivial_step {
            adjusted
        } else {
            IrExpr::intrinsic(
                Intrinsic::ProgressionLastElement,
                vec![induction.get(), adjusted, step.get()],
                element_ty,
            )
        };
        let last = scope.create_temporary(init, "last", false);

        ProgressionLoopHeader {
            induction,
            bound,
            step,
            last,
            element,
            increasing,
            closed,
        }
    }

    fn array_header(&self, info: ArrayHeaderInfo, scope: &mut Scope<'_>) -> ArrayLoopHeader {
        let int = scope.types().int_type();

        let array = scope.create_temporary(info.array, "array", false);
        let induction = scope.create_temporary(IrExpr::int(0), "induction", true);
        let bound = scope.create_temporary(
            IrExpr::ArrayLength(Box::new(array.get())),
            "bound",
            false,
        );
        let step = scope.create_temporary(IrExpr::int(1), "step", false);
        let last = scope.create_temporary(
            IrExpr::binary(BinaryOp::Sub, bound.get(), IrExpr::int(1), int),
            "last",
            false,
        );

        ArrayLoopHeader {
            array,
            induction,
            bound,
            step,
            last,
            element: info.element,
        }
    }
}

/// `value!!` if the static type is nullable
fn not_null(value: IrExpr, types: &TypeContext) -> IrExpr {
    let ty = value.ty(types);
    if types.is_nullable(ty) {
        IrExpr::NotNull {
            value: Box::new(value),
            ty: types.make_not_null(ty),
        }
    } else {
        value
    }
}

/// `checkStepIsPositive(step)` unless `step` is a positive constant
fn check_positive(step: IrExpr, step_ty: TypeId) -> IrExpr {
    match step {
        IrExpr::Const(IrConstant::Int(value)) if value > 0 => step,
        IrExpr::Const(IrConstant::Long(value)) if value > 0 => step,
        step => IrExpr::intrinsic(Intrinsic::CheckStepPositive, vec![step], step_ty),
    }
}

/// Conversion to `to` unless `value` already has that type
fn cast(value: IrExpr, to: TypeId, types: &TypeContext) -> IrExpr {
    if value.ty(types) == to {
        value
    } else {
        IrExpr::Convert {
            value: Box::new(value),
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FunctionId, IrStmt, VariableCounter};
    use crate::lower::for_loops::ProgressionHeaderInfoBuilder;
    use tessera_types::PrimitiveType;

    fn iterator_variable(scope: &mut Scope<'_>, iterable: IrExpr) -> IrVariable {
        let stmt = scope.for_loop(iterable, "i", |_, _| Vec::new()).unwrap();
        let IrStmt::Block(block) = stmt else {
            panic!("expected block");
        };
        block.statements[0].as_var().unwrap().clone()
    }

    fn initializers(header: &ForLoopHeader) -> Vec<IrExpr> {
        header
            .declarations()
            .iter()
            .map(|v| v.initializer.clone().unwrap())
            .collect()
    }

    #[test]
    fn test_closed_range_trivial_step() {
        let mut types = TypeContext::new();
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(&mut types, &mut variables);
        let builder = ProgressionHeaderInfoBuilder::new();

        let range = scope.range_to(IrExpr::int(1), IrExpr::int(10)).unwrap();
        let iterator = iterator_variable(&mut scope, range);
        let header = HeaderProcessor::new(&builder)
            .process_header(&iterator, &mut scope)
            .unwrap();

        let names: Vec<&str> = header.declarations().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["tmp0_induction", "tmp1_bound", "tmp2_step", "tmp3_last"]);
        let inits = initializers(&header);
        assert_eq!(inits[0], IrExpr::int(1));
        assert_eq!(inits[1], IrExpr::int(10));
        assert_eq!(inits[2], IrExpr::int(1));
        assert_eq!(inits[3], header.bound().get());
        assert!(header.induction().mutable);
        assert!(!header.last().mutable);
    }

    #[test]
    fn test_until_decrements_bound() {
        let mut types = TypeContext::new();
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(&mut types, &mut variables);
        let builder = ProgressionHeaderInfoBuilder::new();

        let range = scope.until(IrExpr::int(1), IrExpr::int(10)).unwrap();
        let iterator = iterator_variable(&mut scope, range);
        let header = HeaderProcessor::new(&builder)
            .process_header(&iterator, &mut scope)
            .unwrap();

        let int = scope.types().int_type();
        assert_eq!(
            initializers(&header)[3],
            IrExpr::binary(BinaryOp::Sub, header.bound().get(), IrExpr::int(1), int)
        );
    }

    #[test]
    fn test_step_uses_last_element_helper() {
        let mut types = TypeContext::new();
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(&mut types, &mut variables);
        let builder = ProgressionHeaderInfoBuilder::new();

        let range = scope.range_to(IrExpr::int(1), IrExpr::int(10)).unwrap();
        let stepped = scope.step(range, IrExpr::int(2)).unwrap();
        let iterator = iterator_variable(&mut scope, stepped);
        let header = HeaderProcessor::new(&builder)
            .process_header(&iterator, &mut scope)
            .unwrap();

        let inits = initializers(&header);
        assert_eq!(inits[2], IrExpr::int(2));
        let (intrinsic, args) = inits[3].as_intrinsic().unwrap();
        assert_eq!(intrinsic, Intrinsic::ProgressionLastElement);
        assert_eq!(args[0], header.induction().get());
        assert_eq!(args[1], header.bound().get());
        assert_eq!(args[2], header.step().get());
    }

    #[test]
    fn test_down_to_negates_step() {
        let mut types = TypeContext::new();
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(&mut types, &mut variables);
        let builder = ProgressionHeaderInfoBuilder::new();

        let range = scope.down_to(IrExpr::int(10), IrExpr::int(1)).unwrap();
        let stepped = scope.step(range, IrExpr::int(3)).unwrap();
        let iterator = iterator_variable(&mut scope, stepped);
        let header = HeaderProcessor::new(&builder)
            .process_header(&iterator, &mut scope)
            .unwrap();

        let int = scope.types().int_type();
        assert_eq!(
            initializers(&header)[2],
            IrExpr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(IrExpr::int(3)),
                ty: int,
            }
        );
        let ForLoopHeader::Progression(progression) = &header else {
            panic!("expected progression header");
        };
        assert_eq!(
            progression.comparing_function(),
            crate::lower::for_loops::ComparingFunction::GreaterOrEqual
        );
    }

    #[test]
    fn test_dynamic_step_checked_before_negation() {
        let mut types = TypeContext::new();
        let int = types.int_type();
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(&mut types, &mut variables);
        let builder = ProgressionHeaderInfoBuilder::new();

        let step = IrExpr::call(FunctionId(0), Vec::new(), int);
        let range = scope.down_to(IrExpr::int(10), IrExpr::int(1)).unwrap();
        let stepped = scope.step(range, step.clone()).unwrap();
        let iterator = iterator_variable(&mut scope, stepped);
        let header = HeaderProcessor::new(&builder)
            .process_header(&iterator, &mut scope)
            .unwrap();

        assert_eq!(
            initializers(&header)[2],
            IrExpr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(IrExpr::intrinsic(
                    Intrinsic::CheckStepPositive,
                    vec![step],
                    int,
                )),
                ty: int,
            }
        );
    }

    #[test]
    fn test_constant_steps() {
        let types = TypeContext::new();
        let int = types.int_type();
        let checked = |step: IrExpr| {
            check_positive(step, int)
                .as_intrinsic()
                .map(|(intrinsic, _)| intrinsic)
        };

        assert_eq!(check_positive(IrExpr::int(2), int), IrExpr::int(2));
        assert_eq!(check_positive(IrExpr::long(2), int), IrExpr::long(2));
        assert_eq!(checked(IrExpr::int(0)), Some(Intrinsic::CheckStepPositive));
        assert_eq!(checked(IrExpr::long(-1)), Some(Intrinsic::CheckStepPositive));
    }

    #[test]
    fn test_casts_and_not_null() {
        let mut types = TypeContext::new();
        let long = types.primitive(PrimitiveType::Long);
        let int = types.int_type();
        let nullable_int = types.nullable_type(int);
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(&mut types, &mut variables);
        let builder = ProgressionHeaderInfoBuilder::new();

        let upper = IrExpr::call(FunctionId(0), Vec::new(), nullable_int);
        let range = scope.range_to(IrExpr::long(1), upper.clone()).unwrap();
        let iterator = iterator_variable(&mut scope, range);
        let header = HeaderProcessor::new(&builder)
            .process_header(&iterator, &mut scope)
            .unwrap();

        let inits = initializers(&header);
        assert_eq!(inits[0], IrExpr::long(1));
        assert_eq!(
            inits[1],
            IrExpr::Convert {
                value: Box::new(IrExpr::NotNull {
                    value: Box::new(upper),
                    ty: int,
                }),
                to: long,
            }
        );
        assert_eq!(inits[2], IrExpr::Const(IrConstant::Long(1)));
    }

    #[test]
    fn test_array_header() {
        let mut types = TypeContext::new();
        let int = types.int_type();
        let array_ty = types.array_type(int);
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(&mut types, &mut variables);
        let builder = ProgressionHeaderInfoBuilder::new();

        let array = IrExpr::ArrayOf {
            elements: vec![IrExpr::int(4), IrExpr::int(5)],
            ty: array_ty,
        };
        let iterator = iterator_variable(&mut scope, array.clone());
        let header = HeaderProcessor::new(&builder)
            .process_header(&iterator, &mut scope)
            .unwrap();

        let names: Vec<&str> = header.declarations().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            ["tmp0_array", "tmp1_induction", "tmp2_bound", "tmp3_step", "tmp4_last"]
        );
        let ForLoopHeader::Array(array_header) = &header else {
            panic!("expected array header");
        };
        assert_eq!(array_header.array().initializer, Some(array));
        assert_eq!(
            header.initialize_loop_variable(),
            IrExpr::ArrayGet {
                array: Box::new(array_header.array().get()),
                index: Box::new(header.induction().get()),
                ty: int,
            }
        );
    }

    #[test]
    fn test_rejects_without_allocating() {
        let mut types = TypeContext::new();
        let int = types.int_type();
        let iterator_ty = types.iterator_type(int);
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(&mut types, &mut variables);
        let builder = ProgressionHeaderInfoBuilder::new();
        let processor = HeaderProcessor::new(&builder);

        // Iterator over something the builder does not recognize
        let opaque = IrExpr::call(FunctionId(0), Vec::new(), iterator_ty);
        let iterator = scope.declare(
            "<iterator>",
            iterator_ty,
            false,
            VariableOrigin::ForLoopIterator,
            Some(IrExpr::intrinsic(Intrinsic::Iterator, vec![opaque], iterator_ty)),
        );
        assert!(processor.process_header(&iterator, &mut scope).is_none());

        // Not a loop iterator at all
        let user = scope.declare("x", int, false, VariableOrigin::User, Some(IrExpr::int(1)));
        assert!(processor.process_header(&user, &mut scope).is_none());

        let probe = scope.create_temporary(IrExpr::int(0), "probe", false);
        assert_eq!(probe.name, "tmp0_probe");
    }
}
