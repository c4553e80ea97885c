//! Progression element types
//!
//! Ranges and progressions exist for three element types. Each has a range
//! class (`IntRange`, produced by `..` and `until`) and a progression class
//! (`IntProgression`, produced by `downTo` and `step`).

use super::expr::IrConstant;
use tessera_types::{ClassId, PrimitiveType};

const RANGES_PACKAGE: &str = "kotlin/ranges";

/// Element type of a progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressionType {
    /// `IntProgression` (also used for `Byte` and `Short` endpoints)
    Int,
    /// `LongProgression`
    Long,
    /// `CharProgression`
    Char,
}

impl ProgressionType {
    /// Progression type for one endpoint type
    pub fn from_primitive(primitive: PrimitiveType) -> Option<Self> {
        match primitive {
            PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int => {
                Some(ProgressionType::Int)
            }
            PrimitiveType::Long => Some(ProgressionType::Long),
            PrimitiveType::Char => Some(ProgressionType::Char),
            _ => None,
        }
    }

    /// Progression type of `a..b` (the wider endpoint wins, `Char` only pairs
    /// with `Char`)
    pub fn widen(a: PrimitiveType, b: PrimitiveType) -> Option<Self> {
        match (Self::from_primitive(a)?, Self::from_primitive(b)?) {
            (ProgressionType::Char, ProgressionType::Char) => Some(ProgressionType::Char),
            (ProgressionType::Char, _) | (_, ProgressionType::Char) => None,
            (ProgressionType::Long, _) | (_, ProgressionType::Long) => Some(ProgressionType::Long),
            _ => Some(ProgressionType::Int),
        }
    }

    /// Progression type of a range or progression class
    pub fn from_class(class_id: &ClassId) -> Option<Self> {
        if class_id.package != RANGES_PACKAGE {
            return None;
        }
        match class_id.name.as_str() {
            "IntRange" | "IntProgression" => Some(ProgressionType::Int),
            "LongRange" | "LongProgression" => Some(ProgressionType::Long),
            "CharRange" | "CharProgression" => Some(ProgressionType::Char),
            _ => None,
        }
    }

    /// Element type
    pub fn element(self) -> PrimitiveType {
        match self {
            ProgressionType::Int => PrimitiveType::Int,
            ProgressionType::Long => PrimitiveType::Long,
            ProgressionType::Char => PrimitiveType::Char,
        }
    }

    /// Step type (`Int` for `Char` progressions)
    pub fn step(self) -> PrimitiveType {
        match self {
            ProgressionType::Int | ProgressionType::Char => PrimitiveType::Int,
            ProgressionType::Long => PrimitiveType::Long,
        }
    }

    /// Step-typed constant
    pub fn step_constant(self, value: i32) -> IrConstant {
        match self.step() {
            PrimitiveType::Long => IrConstant::Long(value as i64),
            _ => IrConstant::Int(value),
        }
    }

    /// Smallest element value
    pub fn min_value(self) -> IrConstant {
        match self {
            ProgressionType::Int => IrConstant::Int(i32::MIN),
            ProgressionType::Long => IrConstant::Long(i64::MIN),
            ProgressionType::Char => IrConstant::Char(u16::MIN),
        }
    }

    /// `IntRange`, `LongRange` or `CharRange`
    pub fn range_class(self) -> ClassId {
        ClassId::new(RANGES_PACKAGE, format!("{}Range", self.element()))
    }

    /// `IntProgression`, `LongProgression` or `CharProgression`
    pub fn progression_class(self) -> ClassId {
        ClassId::new(RANGES_PACKAGE, format!("{}Progression", self.element()))
    }
}
