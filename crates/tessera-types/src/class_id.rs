//! Fully-qualified class identifiers
//!
//! A `ClassId` is the package path plus the (possibly nested) class name,
//! rendered as `kotlin/collections/Iterator` or `test/Outer.Inner`.

use serde::Serialize;
use std::fmt;

/// Identifier of a class across module boundaries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassId {
    /// Package path, `/`-separated (empty for the root package)
    pub package: String,
    /// Class name relative to the package, `.`-separated for nested classes
    pub name: String,
}

impl ClassId {
    /// Create a class id from a package and a relative class name
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Parse `package/path/Outer.Inner` into a class id
    pub fn parse(fq_name: &str) -> Self {
        match fq_name.rsplit_once('/') {
            Some((package, name)) => Self::new(package, name),
            None => Self::new("", fq_name),
        }
    }

    /// `kotlin/reflect/KClass`
    pub fn kclass() -> Self {
        Self::new("kotlin/reflect", "KClass")
    }

    /// `kotlin/collections/Iterator`
    pub fn iterator() -> Self {
        Self::new("kotlin/collections", "Iterator")
    }

    /// Short (innermost) class name
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Check if this class is nested in another class
    pub fn is_nested(&self) -> bool {
        self.name.contains('.')
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.package, self.name)
        }
    }
}
