//! Classification of `for` loop iterables
//!
//! A [`HeaderInfoBuilder`] looks at the expression a `for` loop iterates over
//! and decides whether it is a progression with known bounds or an array.
//! Anything else stays an ordinary iterator loop.

use crate::ir::{Intrinsic, IrExpr, ProgressionType};
use tessera_types::{PrimitiveType, TypeContext, TypeId};

/// Progression iterable: `lower..upper`, `lower until upper`,
/// `lower downTo upper`, each optionally with `step`
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionHeaderInfo {
    /// Element type
    pub element: ProgressionType,
    /// First element
    pub lower: IrExpr,
    /// End bound (inclusive if `closed`)
    pub upper: IrExpr,
    /// Explicit step, `None` for a unit step
    pub step: Option<IrExpr>,
    /// `..` / `until` (true) or `downTo` (false)
    pub increasing: bool,
    /// Whether `upper` is part of the progression
    pub closed: bool,
}

/// Array iterable
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayHeaderInfo {
    /// Element type
    pub element: TypeId,
    /// Array-producing expression
    pub array: IrExpr,
}

/// Classified `for` loop iterable
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderInfo {
    /// Numeric progression
    Progression(ProgressionHeaderInfo),
    /// Array iteration
    Array(ArrayHeaderInfo),
}

/// Classifies iterables of `for` loops
pub trait HeaderInfoBuilder {
    /// Classify `iterable`, `None` when it is not a recognized pattern
    fn build(&self, iterable: &IrExpr, types: &TypeContext) -> Option<HeaderInfo>;
}

/// Recognizes range intrinsics, `indices` and arrays
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressionHeaderInfoBuilder;

impl ProgressionHeaderInfoBuilder {
    /// Create a builder
    pub fn new() -> Self {
        Self
    }

    fn build_range(&self, iterable: &IrExpr, types: &TypeContext) -> Option<ProgressionHeaderInfo> {
        let (intrinsic, args) = iterable.as_intrinsic()?;
        let (increasing, closed) = match intrinsic {
            Intrinsic::RangeTo => (true, true),
            Intrinsic::Until => (true, false),
            Intrinsic::DownTo => (false, true),
            _ => return None,
        };
        let [lower, upper] = args else {
            return None;
        };

        let element = ProgressionType::widen(
            endpoint_primitive(lower, types)?,
            endpoint_primitive(upper, types)?,
        )?;

        Some(ProgressionHeaderInfo {
            element,
            lower: lower.clone(),
            upper: upper.clone(),
            step: None,
            increasing,
            closed,
        })
    }
}

impl HeaderInfoBuilder for ProgressionHeaderInfoBuilder {
    fn build(&self, iterable: &IrExpr, types: &TypeContext) -> Option<HeaderInfo> {
        if let Some((intrinsic, args)) = iterable.as_intrinsic() {
            return match (intrinsic, args) {
                (Intrinsic::Step, [progression, step]) => {
                    let step_primitive = endpoint_primitive(step, types)?;
                    if !step_primitive.is_integral() {
                        return None;
                    }
                    let mut info = self.build_range(progression, types)?;
                    info.step = Some(step.clone());
                    Some(HeaderInfo::Progression(info))
                }
                (Intrinsic::Indices, [array]) => {
                    types.element_type(array.ty(types))?;
                    Some(HeaderInfo::Progression(ProgressionHeaderInfo {
                        element: ProgressionType::Int,
                        lower: IrExpr::int(0),
                        upper: IrExpr::ArrayLength(Box::new(array.clone())),
                        step: None,
                        increasing: true,
                        closed: false,
                    }))
                }
                _ => self.build_range(iterable, types).map(HeaderInfo::Progression),
            };
        }

        let element = types.element_type(iterable.ty(types))?;
        Some(HeaderInfo::Array(ArrayHeaderInfo {
            element,
            array: iterable.clone(),
        }))
    }
}

fn endpoint_primitive(expr: &IrExpr, types: &TypeContext) -> Option<PrimitiveType> {
    types.as_primitive(types.make_not_null(expr.ty(types)))
}
