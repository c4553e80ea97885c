//! Type context for managing types and type interning

use crate::class_id::ClassId;
use crate::ty::{ArrayType, ClassType, PrimitiveType, Type, TypeId};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Type context that manages all types of a module
///
/// Types are interned, so identical types share a `TypeId` and type equality
/// is id equality. Every context starts with the primitives (at
/// `TypeId(p as u32)`), `Nothing` and `Unknown` already interned.
#[derive(Debug, Clone)]
pub struct TypeContext {
    /// Storage for all types, indexed by TypeId
    types: Vec<Arc<Type>>,

    /// Reverse mapping from Type to TypeId for interning
    type_to_id: FxHashMap<Type, TypeId>,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeContext {
    /// Create a new context with the built-in types interned
    pub fn new() -> Self {
        let mut ctx = TypeContext {
            types: Vec::new(),
            type_to_id: FxHashMap::default(),
        };

        for primitive in PrimitiveType::ALL {
            ctx.intern(Type::Primitive(primitive));
        }
        ctx.intern(Type::Nothing);
        ctx.intern(Type::Unknown);

        ctx
    }

    /// Intern a type, returning its TypeId
    ///
    /// If the type already exists, returns the existing TypeId.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.type_to_id.get(&ty) {
            return id;
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(Arc::new(ty.clone()));
        self.type_to_id.insert(ty, id);
        id
    }

    /// Get a type by its TypeId
    pub fn get(&self, id: TypeId) -> Option<&Type> {
        self.types.get(id.0 as usize).map(|arc| arc.as_ref())
    }

    /// Look up a type's ID without interning (returns None if type doesn't exist)
    pub fn lookup(&self, ty: &Type) -> Option<TypeId> {
        self.type_to_id.get(ty).copied()
    }

    /// Number of interned types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the context holds no types (never true after `new`)
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // Built-in types

    /// Id of a primitive type
    pub fn primitive(&self, primitive: PrimitiveType) -> TypeId {
        TypeId(primitive as u32)
    }

    /// Id of `Int`
    pub fn int_type(&self) -> TypeId {
        self.primitive(PrimitiveType::Int)
    }

    /// Id of `Boolean`
    pub fn boolean_type(&self) -> TypeId {
        self.primitive(PrimitiveType::Boolean)
    }

    /// Id of `Unit`
    pub fn unit_type(&self) -> TypeId {
        self.primitive(PrimitiveType::Unit)
    }

    /// Id of `Nothing`
    pub fn nothing_type(&self) -> TypeId {
        TypeId(PrimitiveType::ALL.len() as u32)
    }

    /// Id of the declaration-less `Unknown` type
    pub fn unknown_type(&self) -> TypeId {
        TypeId(PrimitiveType::ALL.len() as u32 + 1)
    }

    // Constructed types

    /// Intern `Array<element>`
    pub fn array_type(&mut self, element: TypeId) -> TypeId {
        self.intern(Type::Array(ArrayType { element }))
    }

    /// Intern `ty?` (nullable of a nullable is the same type)
    pub fn nullable_type(&mut self, ty: TypeId) -> TypeId {
        if matches!(self.get(ty), Some(Type::Nullable(_))) {
            return ty;
        }
        self.intern(Type::Nullable(ty))
    }

    /// Intern a class type
    pub fn class_type(&mut self, class_id: ClassId, args: Vec<TypeId>) -> TypeId {
        self.intern(Type::Class(ClassType { class_id, args }))
    }

    /// Intern `KClass<arg>`
    pub fn kclass_type(&mut self, arg: TypeId) -> TypeId {
        self.class_type(ClassId::kclass(), vec![arg])
    }

    /// Intern `Iterator<element>`
    pub fn iterator_type(&mut self, element: TypeId) -> TypeId {
        self.class_type(ClassId::iterator(), vec![element])
    }

    // Queries

    /// Get the primitive behind `id`, if any
    pub fn as_primitive(&self, id: TypeId) -> Option<PrimitiveType> {
        self.get(id).and_then(Type::as_primitive)
    }

    /// Element type of an array type
    pub fn element_type(&self, array: TypeId) -> Option<TypeId> {
        match self.get(array) {
            Some(Type::Array(a)) => Some(a.element),
            _ => None,
        }
    }

    /// Check if `id` is a nullable type
    pub fn is_nullable(&self, id: TypeId) -> bool {
        matches!(self.get(id), Some(Type::Nullable(_)))
    }

    /// Strip one level of nullability
    pub fn make_not_null(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            Some(Type::Nullable(inner)) => *inner,
            _ => id,
        }
    }

    /// Declaring class of a type (`None` for primitives, arrays, `Unknown`, ...)
    pub fn declaration(&self, id: TypeId) -> Option<&ClassId> {
        self.get(id).and_then(Type::declaration)
    }

    /// Check if `id` is some `KClass<...>`
    pub fn is_kclass(&self, id: TypeId) -> bool {
        self.declaration(id)
            .map(|class_id| *class_id == ClassId::kclass())
            .unwrap_or(false)
    }

    /// Check if `id` is some `Iterator<...>`
    pub fn is_iterator(&self, id: TypeId) -> bool {
        self.iterator_element(id).is_some()
    }

    /// Element type of an `Iterator<T>` type
    pub fn iterator_element(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Some(Type::Class(c)) if c.class_id == ClassId::iterator() => c.args.first().copied(),
            _ => None,
        }
    }

    /// Render a type for diagnostics: `Array<Int>`, `KClass<*>`, `String?`
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            Some(Type::Primitive(p)) => p.to_string(),
            Some(Type::Class(c)) => {
                if c.args.is_empty() {
                    c.class_id.short_name().to_string()
                } else {
                    let args: Vec<String> = c.args.iter().map(|&arg| self.display(arg)).collect();
                    format!("{}<{}>", c.class_id.short_name(), args.join(", "))
                }
            }
            Some(Type::Array(a)) => format!("Array<{}>", self.display(a.element)),
            Some(Type::Nullable(inner)) => format!("{}?", self.display(*inner)),
            Some(Type::Nothing) => "Nothing".to_string(),
            Some(Type::Unknown) => "*".to_string(),
            None => format!("<invalid {}>", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_preinterned() {
        let ctx = TypeContext::new();
        for primitive in PrimitiveType::ALL {
            let id = ctx.primitive(primitive);
            assert_eq!(ctx.get(id), Some(&Type::Primitive(primitive)));
        }
        assert_eq!(ctx.get(ctx.nothing_type()), Some(&Type::Nothing));
        assert_eq!(ctx.get(ctx.unknown_type()), Some(&Type::Unknown));
    }

    #[test]
    fn test_interning_is_idempotent() {
        let mut ctx = TypeContext::new();
        let int = ctx.int_type();
        let a1 = ctx.array_type(int);
        let a2 = ctx.array_type(int);
        assert_eq!(a1, a2);
        assert_eq!(ctx.element_type(a1), Some(int));
        assert_eq!(ctx.element_type(int), None);
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let ctx = TypeContext::new();
        let before = ctx.len();
        let missing = Type::Array(ArrayType {
            element: ctx.int_type(),
        });
        assert_eq!(ctx.lookup(&missing), None);
        assert_eq!(ctx.len(), before);
    }

    #[test]
    fn test_nullable_roundtrip() {
        let mut ctx = TypeContext::new();
        let long = ctx.primitive(PrimitiveType::Long);
        let nullable = ctx.nullable_type(long);
        assert!(ctx.is_nullable(nullable));
        assert_eq!(ctx.nullable_type(nullable), nullable);
        assert_eq!(ctx.make_not_null(nullable), long);
        assert_eq!(ctx.make_not_null(long), long);
    }

    #[test]
    fn test_kclass_and_iterator() {
        let mut ctx = TypeContext::new();
        let unknown = ctx.unknown_type();
        let kclass = ctx.kclass_type(unknown);
        assert!(ctx.is_kclass(kclass));
        assert!(!ctx.is_kclass(unknown));

        let int = ctx.int_type();
        let iterator = ctx.iterator_type(int);
        assert_eq!(ctx.iterator_element(iterator), Some(int));
        assert!(ctx.is_iterator(iterator));
        assert_eq!(ctx.iterator_element(kclass), None);
    }

    #[test]
    fn test_display() {
        let mut ctx = TypeContext::new();
        let string = ctx.primitive(PrimitiveType::String);
        let array = ctx.array_type(string);
        let nullable = ctx.nullable_type(array);
        assert_eq!(ctx.display(nullable), "Array<String>?");

        let unknown = ctx.unknown_type();
        let kclass = ctx.kclass_type(unknown);
        assert_eq!(ctx.display(kclass), "KClass<*>");
    }
}
