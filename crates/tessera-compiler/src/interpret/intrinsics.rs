//! Intrinsic semantics
//!
//! Ranges, progressions and the iterator protocol, with the same element
//! sequences as the standard library's `IntProgression`, `LongProgression`
//! and `CharProgression`.

use super::value::{IteratorState, Progression, Value};
use crate::error::{InterpretError, InterpretResult};
use crate::ir::{Intrinsic, ProgressionType};
use std::cell::RefCell;
use std::rc::Rc;

/// Last element of the progression `start, start + step, ...` not beyond `end`
///
/// Returns `end` when the progression is empty.
pub fn progression_last_element(start: i64, end: i64, step: i64) -> InterpretResult<i64> {
    let (start, end, step) = (start as i128, end as i128, step as i128);
    let last = if step > 0 {
        if start >= end {
            end
        } else {
            end - difference_modulo(end, start, step)
        }
    } else if step < 0 {
        if start <= end {
            end
        } else {
            end + difference_modulo(start, end, -step)
        }
    } else {
        return Err(InterpretError::ZeroStep);
    };
    Ok(last as i64)
}

/// `a mod b` for positive `b`, always in `0 until b`
fn modulo(a: i128, b: i128) -> i128 {
    let m = a % b;
    if m >= 0 {
        m
    } else {
        m + b
    }
}

/// `(a - b) mod c`
fn difference_modulo(a: i128, b: i128, c: i128) -> i128 {
    modulo(modulo(a, c) - modulo(b, c), c)
}

fn min_value(element: ProgressionType) -> i64 {
    match element {
        ProgressionType::Int => i32::MIN as i64,
        ProgressionType::Long => i64::MIN,
        ProgressionType::Char => u16::MIN as i64,
    }
}

/// Progression over `start..end` with the given step
pub fn from_closed_range(
    element: ProgressionType,
    start: i64,
    end: i64,
    step: i64,
) -> InterpretResult<Progression> {
    Ok(Progression {
        element,
        first: start,
        last: progression_last_element(start, end, step)?,
        step,
    })
}

fn empty(element: ProgressionType) -> Progression {
    Progression {
        element,
        first: 1,
        last: 0,
        step: 1,
    }
}

/// Element type and endpoints of `a..b`
fn endpoints(a: &Value, b: &Value) -> InterpretResult<(ProgressionType, i64, i64)> {
    let element = match (a.progression_type(), b.progression_type()) {
        (Some(ProgressionType::Char), Some(ProgressionType::Char)) => ProgressionType::Char,
        (Some(ProgressionType::Long), Some(ProgressionType::Int | ProgressionType::Long))
        | (Some(ProgressionType::Int), Some(ProgressionType::Long)) => ProgressionType::Long,
        (Some(ProgressionType::Int), Some(ProgressionType::Int)) => ProgressionType::Int,
        _ => {
            return Err(InterpretError::TypeMismatch(format!(
                "no range between {} and {}",
                a.type_name(),
                b.type_name()
            )))
        }
    };
    match (a.as_i64(), b.as_i64()) {
        (Some(a), Some(b)) => Ok((element, a, b)),
        _ => Err(InterpretError::TypeMismatch(
            "range endpoints must be integral".to_string(),
        )),
    }
}

/// `a until b`
pub fn until(element: ProgressionType, a: i64, b: i64) -> InterpretResult<Progression> {
    if b <= min_value(element) {
        return Ok(empty(element));
    }
    from_closed_range(element, a, b - 1, 1)
}

/// `progression step s`
pub fn step(progression: &Progression, step: i64) -> InterpretResult<Progression> {
    if step <= 0 {
        return Err(InterpretError::NonPositiveStep(step));
    }
    let step = if progression.step > 0 { step } else { -step };
    from_closed_range(progression.element, progression.first, progression.last, step)
}

/// Apply an intrinsic to evaluated arguments
pub fn apply(intrinsic: Intrinsic, args: &[Value]) -> InterpretResult<Value> {
    match (intrinsic, args) {
        (Intrinsic::RangeTo, [a, b]) => {
            let (element, a, b) = endpoints(a, b)?;
            Ok(Value::Progression(from_closed_range(element, a, b, 1)?))
        }
        (Intrinsic::Until, [a, b]) => {
            let (element, a, b) = endpoints(a, b)?;
            Ok(Value::Progression(until(element, a, b)?))
        }
        (Intrinsic::DownTo, [a, b]) => {
            let (element, a, b) = endpoints(a, b)?;
            Ok(Value::Progression(from_closed_range(element, a, b, -1)?))
        }
        (Intrinsic::Step, [Value::Progression(p), s]) => {
            let s = s.as_i64().ok_or_else(|| mismatch(intrinsic, args))?;
            Ok(Value::Progression(step(p, s)?))
        }
        (Intrinsic::Indices, [Value::Array(elements)]) => Ok(Value::Progression(until(
            ProgressionType::Int,
            0,
            elements.len() as i64,
        )?)),
        (Intrinsic::Iterator, [Value::Progression(p)]) => {
            Ok(Value::Iterator(Rc::new(RefCell::new(p.iterator()))))
        }
        (Intrinsic::Iterator, [Value::Array(elements)]) => {
            Ok(Value::Iterator(Rc::new(RefCell::new(IteratorState::Array {
                elements: Rc::clone(elements),
                index: 0,
            }))))
        }
        (Intrinsic::HasNext, [Value::Iterator(iterator)]) => {
            Ok(Value::Boolean(iterator.borrow().has_next()))
        }
        (Intrinsic::Next, [Value::Iterator(iterator)]) => iterator
            .borrow_mut()
            .next()
            .ok_or(InterpretError::NoSuchElement),
        (Intrinsic::ProgressionLastElement, [start, end, step]) => {
            let element = start
                .progression_type()
                .ok_or_else(|| mismatch(intrinsic, args))?;
            match (start.as_i64(), end.as_i64(), step.as_i64()) {
                (Some(start), Some(end), Some(step)) => Ok(Value::integral(
                    element,
                    progression_last_element(start, end, step)?,
                )),
                _ => Err(mismatch(intrinsic, args)),
            }
        }
        (Intrinsic::CheckStepPositive, [step]) => match step.as_i64() {
            Some(s) if s <= 0 => Err(InterpretError::NonPositiveStep(s)),
            Some(_) => Ok(step.clone()),
            None => Err(mismatch(intrinsic, args)),
        },
        _ => Err(mismatch(intrinsic, args)),
    }
}

fn mismatch(intrinsic: Intrinsic, args: &[Value]) -> InterpretError {
    let kinds: Vec<&str> = args.iter().map(Value::type_name).collect();
    InterpretError::TypeMismatch(format!(
        "@{} does not accept ({})",
        intrinsic,
        kinds.join(", ")
    ))
}
