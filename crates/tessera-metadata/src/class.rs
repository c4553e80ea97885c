//! Class descriptors and class resolution
//!
//! The decoder only needs a narrow view of a class: its kind, its type and
//! the value parameters of its constructors.

use rustc_hash::FxHashMap;
use tessera_types::{ClassId, TypeContext, TypeId};

/// Kind of a class declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Ordinary class
    Class,
    /// Interface
    Interface,
    /// Enum class
    EnumClass,
    /// Annotation class
    AnnotationClass,
    /// Object declaration
    Object,
}

/// Constructor value parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ValueParameter {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: TypeId,
}

impl ValueParameter {
    /// Create a parameter
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Constructor of a class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstructorDescriptor {
    /// Parameters in declaration order
    pub value_parameters: Vec<ValueParameter>,
}

impl ConstructorDescriptor {
    /// Create a constructor with the given parameters
    pub fn new(value_parameters: Vec<ValueParameter>) -> Self {
        Self { value_parameters }
    }
}

/// Resolved class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    /// Class identifier
    pub class_id: ClassId,
    /// Declaration kind
    pub kind: ClassKind,
    /// Class type (`class_id` with no type arguments)
    pub ty: TypeId,
    /// Constructors
    pub constructors: Vec<ConstructorDescriptor>,
}

impl ClassDescriptor {
    /// Create a descriptor, interning the class type
    pub fn new(types: &mut TypeContext, class_id: ClassId, kind: ClassKind) -> Self {
        let ty = types.class_type(class_id.clone(), Vec::new());
        Self {
            class_id,
            kind,
            ty,
            constructors: Vec::new(),
        }
    }

    /// Add a constructor
    pub fn with_constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Check if this is an annotation class
    pub fn is_annotation(&self) -> bool {
        self.kind == ClassKind::AnnotationClass
    }
}

/// Class lookup by id
pub trait ClassResolver {
    /// Resolve a class, `None` when it is not visible
    fn resolve(&self, class_id: &ClassId) -> Option<&ClassDescriptor>;
}

/// In-memory class table
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: FxHashMap<ClassId, ClassDescriptor>,
}

impl ClassTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, replacing any previous declaration with the same id
    pub fn insert(&mut self, descriptor: ClassDescriptor) {
        self.classes.insert(descriptor.class_id.clone(), descriptor);
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if no classes are registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassResolver for ClassTable {
    fn resolve(&self, class_id: &ClassId) -> Option<&ClassDescriptor> {
        self.classes.get(class_id)
    }
}
