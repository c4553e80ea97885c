//! Runtime values

use crate::ir::ProgressionType;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Arithmetic progression `first, first + step, ..., last`
///
/// Elements are stored widened to `i64`; `element` says how to narrow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    /// Element type
    pub element: ProgressionType,
    /// First element
    pub first: i64,
    /// Last element (already aligned to the step)
    pub last: i64,
    /// Non-zero step
    pub step: i64,
}

impl Progression {
    /// Check if the progression has no elements
    pub fn is_empty(&self) -> bool {
        if self.step > 0 {
            self.first > self.last
        } else {
            self.first < self.last
        }
    }

    /// Iterator over the elements
    pub fn iterator(&self) -> IteratorState {
        let has_next = !self.is_empty();
        IteratorState::Progression {
            element: self.element,
            next: if has_next { self.first } else { self.last },
            last: self.last,
            step: self.step,
            has_next,
        }
    }
}

/// State of an iterator created by `iterator()`
#[derive(Debug, Clone, PartialEq)]
pub enum IteratorState {
    /// Iterator over a progression
    Progression {
        element: ProgressionType,
        next: i64,
        last: i64,
        step: i64,
        has_next: bool,
    },
    /// Iterator over an array
    Array { elements: Rc<Vec<Value>>, index: usize },
}

impl IteratorState {
    /// Check if another element is available
    pub fn has_next(&self) -> bool {
        match self {
            IteratorState::Progression { has_next, .. } => *has_next,
            IteratorState::Array { elements, index } => *index < elements.len(),
        }
    }

    /// Advance, `None` when exhausted
    pub fn next(&mut self) -> Option<Value> {
        match self {
            IteratorState::Progression {
                element,
                next,
                last,
                step,
                has_next,
            } => {
                if !*has_next {
                    return None;
                }
                let value = *next;
                if value == *last {
                    *has_next = false;
                } else {
                    *next += *step;
                }
                Some(Value::integral(*element, value))
            }
            IteratorState::Array { elements, index } => {
                let value = elements.get(*index).cloned()?;
                *index += 1;
                Some(value)
            }
        }
    }
}

/// Interpreter value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Char(u16),
    Boolean(bool),
    Double(f64),
    String(String),
    Array(Rc<Vec<Value>>),
    Progression(Progression),
    Iterator(Rc<RefCell<IteratorState>>),
    Unit,
    Null,
}

impl Value {
    /// Value of an integral element type
    pub fn integral(element: ProgressionType, value: i64) -> Value {
        match element {
            ProgressionType::Int => Value::Int(value as i32),
            ProgressionType::Long => Value::Long(value),
            ProgressionType::Char => Value::Char(value as u16),
        }
    }

    /// Create an array value
    pub fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(elements))
    }

    /// Integer value of an `Int`, `Long` or `Char`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            Value::Char(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Progression element type matching an integral value
    pub fn progression_type(&self) -> Option<ProgressionType> {
        match self {
            Value::Int(_) => Some(ProgressionType::Int),
            Value::Long(_) => Some(ProgressionType::Long),
            Value::Char(_) => Some(ProgressionType::Char),
            _ => None,
        }
    }

    /// Name of the value's kind, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Char(_) => "Char",
            Value::Boolean(_) => "Boolean",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Progression(_) => "Progression",
            Value::Iterator(_) => "Iterator",
            Value::Unit => "Unit",
            Value::Null => "Nothing?",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "{}", c),
                None => write!(f, "\\u{:04x}", v),
            },
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Progression(p) => {
                let first = Value::integral(p.element, p.first);
                let last = Value::integral(p.element, p.last);
                if p.step > 0 {
                    write!(f, "{}..{} step {}", first, last, p.step)
                } else {
                    write!(f, "{} downTo {} step {}", first, last, -(p.step as i128))
                }
            }
            Value::Iterator(_) => write!(f, "<iterator>"),
            Value::Unit => write!(f, "kotlin.Unit"),
            Value::Null => write!(f, "null"),
        }
    }
}
