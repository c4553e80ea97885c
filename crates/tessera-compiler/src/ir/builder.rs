//! IR construction
//!
//! [`Scope`] declares variables and builds typed nodes inside one function.
//! It pairs the module's [`TypeContext`] with the function's
//! [`VariableCounter`], so every node it builds is typed and every variable
//! gets a fresh id.

use super::expr::{Intrinsic, IrExpr};
use super::progression::ProgressionType;
use super::stmt::{BlockOrigin, IrBlock, IrLoop, IrStmt};
use super::variable::{IrVariable, VariableCounter, VariableOrigin, VariableRef};
use tessera_types::{Type, TypeContext, TypeId};

/// Builder scope for one function
pub struct Scope<'a> {
    types: &'a mut TypeContext,
    variables: &'a mut VariableCounter,
}

impl<'a> Scope<'a> {
    /// Create a scope over a function's variable counter
    pub fn new(types: &'a mut TypeContext, variables: &'a mut VariableCounter) -> Self {
        Self { types, variables }
    }

    /// Type context
    pub fn types(&self) -> &TypeContext {
        self.types
    }

    /// Type context, mutably
    pub fn types_mut(&mut self) -> &mut TypeContext {
        self.types
    }

    /// Declare a variable
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        ty: TypeId,
        mutable: bool,
        origin: VariableOrigin,
        initializer: Option<IrExpr>,
    ) -> IrVariable {
        IrVariable {
            id: self.variables.next_id(),
            name: name.into(),
            ty,
            mutable,
            origin,
            initializer,
        }
    }

    /// Declare a temporary named `tmp<N>_<hint>`, typed by its initializer
    pub fn create_temporary(
        &mut self,
        initializer: IrExpr,
        name_hint: &str,
        mutable: bool,
    ) -> IrVariable {
        let ty = initializer.ty(self.types);
        let name = format!("tmp{}_{}", self.variables.next_temporary(), name_hint);
        self.declare(name, ty, mutable, VariableOrigin::Temporary, Some(initializer))
    }

    // Ranges

    /// `a..b`
    pub fn range_to(&mut self, a: IrExpr, b: IrExpr) -> Option<IrExpr> {
        self.range(Intrinsic::RangeTo, a, b, true)
    }

    /// `a until b`
    pub fn until(&mut self, a: IrExpr, b: IrExpr) -> Option<IrExpr> {
        self.range(Intrinsic::Until, a, b, true)
    }

    /// `a downTo b`
    pub fn down_to(&mut self, a: IrExpr, b: IrExpr) -> Option<IrExpr> {
        self.range(Intrinsic::DownTo, a, b, false)
    }

    /// `progression step s`
    pub fn step(&mut self, progression: IrExpr, step: IrExpr) -> Option<IrExpr> {
        let class_id = self.types.declaration(progression.ty(self.types))?;
        let element = ProgressionType::from_class(class_id)?;
        let ty = self.types.class_type(element.progression_class(), Vec::new());
        Some(IrExpr::intrinsic(Intrinsic::Step, vec![progression, step], ty))
    }

    /// `array.indices`
    pub fn indices(&mut self, array: IrExpr) -> Option<IrExpr> {
        self.types.element_type(array.ty(self.types))?;
        let ty = self
            .types
            .class_type(ProgressionType::Int.range_class(), Vec::new());
        Some(IrExpr::intrinsic(Intrinsic::Indices, vec![array], ty))
    }

    fn range(
        &mut self,
        intrinsic: Intrinsic,
        a: IrExpr,
        b: IrExpr,
        is_range: bool,
    ) -> Option<IrExpr> {
        let first = self.endpoint_primitive(&a)?;
        let last = self.endpoint_primitive(&b)?;
        let element = ProgressionType::widen(first, last)?;
        let class_id = if is_range {
            element.range_class()
        } else {
            element.progression_class()
        };
        let ty = self.types.class_type(class_id, Vec::new());
        Some(IrExpr::intrinsic(intrinsic, vec![a, b], ty))
    }

    fn endpoint_primitive(&self, expr: &IrExpr) -> Option<tessera_types::PrimitiveType> {
        let ty = self.types.make_not_null(expr.ty(self.types));
        self.types.as_primitive(ty)
    }

    /// Element type produced by iterating a value of type `ty`
    pub fn iterable_element(&self, ty: TypeId) -> Option<TypeId> {
        let ty = self.types.make_not_null(ty);
        match self.types.get(ty)? {
            Type::Array(array) => Some(array.element),
            Type::Class(class) => {
                let element = ProgressionType::from_class(&class.class_id)?;
                Some(self.types.primitive(element.element()))
            }
            _ => None,
        }
    }

    // Loops

    /// Iterator-based `for (name in iterable) { body }`
    ///
    /// Produces the block the front end emits for a `for` loop:
    ///
    /// ```text
    /// for_loop {
    ///   val <iterator> = iterable.iterator()
    ///   while (<iterator>.hasNext()) {
    ///     val name = <iterator>.next()
    ///     body...
    ///   }
    /// }
    /// ```
    ///
    /// Returns `None` if `iterable` is not an array, range or progression.
    pub fn for_loop(
        &mut self,
        iterable: IrExpr,
        name: &str,
        body: impl FnOnce(&mut Scope<'a>, VariableRef) -> Vec<IrStmt>,
    ) -> Option<IrStmt> {
        let element = self.iterable_element(iterable.ty(self.types))?;
        let iterator_ty = self.types.iterator_type(element);
        let boolean = self.types.boolean_type();

        let iterator = self.declare(
            "<iterator>",
            iterator_ty,
            false,
            VariableOrigin::ForLoopIterator,
            Some(IrExpr::intrinsic(Intrinsic::Iterator, vec![iterable], iterator_ty)),
        );
        let loop_variable = self.declare(
            name,
            element,
            false,
            VariableOrigin::ForLoopVariable,
            Some(IrExpr::intrinsic(Intrinsic::Next, vec![iterator.get()], element)),
        );

        let mut statements = body(self, loop_variable.reference());
        statements.insert(0, IrStmt::Var(loop_variable));

        let condition = IrExpr::intrinsic(Intrinsic::HasNext, vec![iterator.get()], boolean);
        let body = IrBlock::new(BlockOrigin::ForLoopBody, statements);
        Some(IrStmt::Block(IrBlock::new(
            BlockOrigin::ForLoop,
            vec![
                IrStmt::Var(iterator),
                IrStmt::While(IrLoop::new(condition, body)),
            ],
        )))
    }
}
