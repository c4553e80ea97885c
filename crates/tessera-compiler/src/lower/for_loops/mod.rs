//! For-loop lowering
//!
//! Rewrites iterator-based `for` loops over progressions and arrays into
//! counted loops. The front end emits
//!
//! ```text
//! for_loop {
//!   val <iterator> = iterable.iterator()
//!   while (<iterator>.hasNext()) {
//!     val i = <iterator>.next()
//!     body...
//!   }
//! }
//! ```
//!
//! and for `a..b step s` this pass produces
//!
//! ```text
//! lowered_for_loop {
//!   var tmp0_induction = a
//!   val tmp1_bound = b
//!   val tmp2_step = s
//!   val tmp3_last = getProgressionLastElement(tmp0_induction, tmp1_bound, tmp2_step)
//!   if (tmp0_induction <= tmp3_last) {
//!     do {
//!       val i = tmp0_induction
//!       tmp0_induction = tmp0_induction + tmp2_step
//!       body...
//!     } while (i != tmp3_last)
//!   }
//! }
//! ```
//!
//! Arrays become `while (tmp1_induction <= tmp4_last)` loops reading
//! `tmp0_array[tmp1_induction]`. Loops over anything else are left alone.

mod header;
mod header_info;
mod processor;

pub use header::{
    ArrayLoopHeader, BoundLoopHeader, ComparingFunction, ForLoopHeader, ProgressionLoopHeader,
};
pub use header_info::{
    ArrayHeaderInfo, HeaderInfo, HeaderInfoBuilder, ProgressionHeaderInfo,
    ProgressionHeaderInfoBuilder,
};
pub use processor::HeaderProcessor;

use crate::ir::{
    BlockOrigin, IrBlock, IrExpr, IrFunction, IrLoop, IrModule, IrStmt, IrVariable, Scope,
    VariableOrigin,
};
use log::{debug, trace};
use tessera_types::TypeContext;

/// Which iterables get lowered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForLoopsConfig {
    lower_progressions: bool,
    lower_arrays: bool,
}

impl Default for ForLoopsConfig {
    fn default() -> Self {
        Self {
            lower_progressions: true,
            lower_arrays: true,
        }
    }
}

impl ForLoopsConfig {
    /// Create a config lowering every recognized loop
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable lowering of progression loops (including `indices`)
    pub fn set_lower_progressions(&mut self, enabled: bool) {
        self.lower_progressions = enabled;
    }

    /// Enable or disable lowering of array loops
    pub fn set_lower_arrays(&mut self, enabled: bool) {
        self.lower_arrays = enabled;
    }

    /// Check if progression loops are lowered
    pub fn lowers_progressions(&self) -> bool {
        self.lower_progressions
    }

    /// Check if array loops are lowered
    pub fn lowers_arrays(&self) -> bool {
        self.lower_arrays
    }
}

/// Drops header infos the config excludes
struct ConfiguredBuilder<'a> {
    inner: &'a dyn HeaderInfoBuilder,
    config: ForLoopsConfig,
}

impl HeaderInfoBuilder for ConfiguredBuilder<'_> {
    fn build(&self, iterable: &IrExpr, types: &TypeContext) -> Option<HeaderInfo> {
        match self.inner.build(iterable, types)? {
            HeaderInfo::Progression(_) if !self.config.lower_progressions => None,
            HeaderInfo::Array(_) if !self.config.lower_arrays => None,
            info => Some(info),
        }
    }
}

/// For-loop lowering pass
pub struct ForLoopsLowering {
    builder: Box<dyn HeaderInfoBuilder>,
    config: ForLoopsConfig,
}

impl Default for ForLoopsLowering {
    fn default() -> Self {
        Self::new()
    }
}

impl ForLoopsLowering {
    /// Create the pass with the default classifier and config
    pub fn new() -> Self {
        Self::with_config(ForLoopsConfig::default())
    }

    /// Create the pass with a custom config
    pub fn with_config(config: ForLoopsConfig) -> Self {
        Self {
            builder: Box::new(ProgressionHeaderInfoBuilder::new()),
            config,
        }
    }

    /// Replace the iterable classifier
    pub fn with_builder(mut self, builder: Box<dyn HeaderInfoBuilder>) -> Self {
        self.builder = builder;
        self
    }

    /// Config in use
    pub fn config(&self) -> ForLoopsConfig {
        self.config
    }

    /// Lower every function of a module, returning the number of loops lowered
    pub fn lower_module(&self, module: &mut IrModule, types: &mut TypeContext) -> usize {
        let mut lowered = 0;
        for function in &mut module.functions {
            lowered += self.lower_function(function, types);
        }
        debug!("module {}: lowered {} for loop(s)", module.name, lowered);
        lowered
    }

    /// Lower one function, returning the number of loops lowered
    pub fn lower_function(&self, function: &mut IrFunction, types: &mut TypeContext) -> usize {
        let builder = ConfiguredBuilder {
            inner: self.builder.as_ref(),
            config: self.config,
        };
        let name = function.name.clone();
        let (body, variables) = function.body_and_variables();

        let mut transformer = Transformer {
            processor: HeaderProcessor::new(&builder),
            scope: Scope::new(types, variables),
            lowered: 0,
        };
        let statements = std::mem::take(&mut body.statements);
        body.statements = transformer.lower_statements(statements);

        trace!("fn {}: lowered {} for loop(s)", name, transformer.lowered);
        transformer.lowered
    }
}

struct Transformer<'p, 's> {
    processor: HeaderProcessor<'p>,
    scope: Scope<'s>,
    lowered: usize,
}

impl Transformer<'_, '_> {
    fn lower_statements(&mut self, statements: Vec<IrStmt>) -> Vec<IrStmt> {
        statements
            .into_iter()
            .map(|stmt| self.lower_stmt(stmt))
            .collect()
    }

    fn lower_block(&mut self, block: IrBlock) -> IrBlock {
        IrBlock::new(block.origin, self.lower_statements(block.statements))
    }

    fn lower_stmt(&mut self, stmt: IrStmt) -> IrStmt {
        match stmt {
            IrStmt::Block(block) if block.origin == BlockOrigin::ForLoop => {
                match self.lower_for_loop(block) {
                    Ok(lowered) => IrStmt::Block(lowered),
                    Err(block) => IrStmt::Block(self.lower_block(block)),
                }
            }
            IrStmt::Block(block) => IrStmt::Block(self.lower_block(block)),
            IrStmt::If {
                condition,
                then_branch,
                else_branch,
            } => IrStmt::If {
                condition,
                then_branch: self.lower_block(then_branch),
                else_branch: else_branch.map(|block| self.lower_block(block)),
            },
            IrStmt::While(ir_loop) => {
                IrStmt::While(IrLoop::new(ir_loop.condition, self.lower_block(ir_loop.body)))
            }
            IrStmt::DoWhile(ir_loop) => {
                IrStmt::DoWhile(IrLoop::new(ir_loop.condition, self.lower_block(ir_loop.body)))
            }
            stmt @ (IrStmt::Var(_) | IrStmt::Expr(_)) => stmt,
        }
    }

    /// Lower a `for_loop` block, handing it back unchanged if it does not
    /// have a recognized header
    fn lower_for_loop(&mut self, mut block: IrBlock) -> Result<IrBlock, IrBlock> {
        let processed = match block.statements.as_slice() {
            [IrStmt::Var(iterator), IrStmt::While(ir_loop)] => match loop_variable(ir_loop) {
                Some(variable) => self
                    .processor
                    .process_header(iterator, &mut self.scope)
                    .map(|header| (header, variable.reference())),
                None => None,
            },
            _ => None,
        };
        let Some((header, loop_variable)) = processed else {
            debug!("for loop left as iterator loop");
            return Err(block);
        };

        let ir_loop = match block.statements.pop() {
            Some(IrStmt::While(ir_loop)) => ir_loop,
            other => {
                block.statements.extend(other);
                return Err(block);
            }
        };

        let mut statements = ir_loop.body.statements;
        if let Some(IrStmt::Var(variable)) = statements.first_mut() {
            variable.initializer = Some(header.initialize_loop_variable());
        }
        statements.insert(1, IrStmt::Expr(header.increment()));
        let statements = self.lower_statements(statements);
        let new_body = IrBlock::new(BlockOrigin::ForLoopBody, statements);

        let bound = header.bind_loop_variable(loop_variable);
        let types = self.scope.types();
        let counted = bound.build_body(new_body, types);
        let loop_stmt = match bound.header() {
            ForLoopHeader::Progression(progression) => IrStmt::If {
                condition: progression.build_entry_condition(types),
                then_branch: IrBlock::plain(vec![counted]),
                else_branch: None,
            },
            ForLoopHeader::Array(_) => counted,
        };

        self.lowered += 1;
        trace!("lowered for loop over {}", describe(bound.header()));

        let mut statements = bound.into_declarations();
        statements.push(loop_stmt);
        Ok(IrBlock::new(BlockOrigin::LoweredForLoop, statements))
    }
}

/// Loop variable declared at the top of a `for` loop body
fn loop_variable(ir_loop: &IrLoop) -> Option<&IrVariable> {
    ir_loop
        .body
        .statements
        .first()
        .and_then(IrStmt::as_var)
        .filter(|variable| variable.origin == VariableOrigin::ForLoopVariable)
}

fn describe(header: &ForLoopHeader) -> &'static str {
    match header {
        ForLoopHeader::Progression(_) => "progression",
        ForLoopHeader::Array(_) => "array",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{PrettyPrint, VariableCounter};

    fn counting_function(
        types: &mut TypeContext,
        iterable: impl FnOnce(&mut Scope<'_>) -> IrExpr,
    ) -> IrFunction {
        let unit = types.unit_type();
        let mut function = IrFunction::new("count", unit);
        let mut variables = VariableCounter::new();
        let mut scope = Scope::new(types, &mut variables);
        let iterable = iterable(&mut scope);
        let stmt = scope.for_loop(iterable, "i", |_, _| Vec::new()).unwrap();
        function.body.statements.push(stmt);
        function.variables = variables;
        function
    }

    #[test]
    fn test_default_config() {
        let config = ForLoopsConfig::new();
        assert!(config.lowers_progressions());
        assert!(config.lowers_arrays());
    }

    #[test]
    fn test_config_setters() {
        let mut config = ForLoopsConfig::new();
        config.set_lower_arrays(false);
        assert!(config.lowers_progressions());
        assert!(!config.lowers_arrays());
        config.set_lower_progressions(false);
        assert!(!config.lowers_progressions());
    }

    #[test]
    fn test_lowers_range() {
        let mut types = TypeContext::new();
        let mut function = counting_function(&mut types, |scope| {
            scope.range_to(IrExpr::int(1), IrExpr::int(10)).unwrap()
        });

        let lowered = ForLoopsLowering::new().lower_function(&mut function, &mut types);
        assert_eq!(lowered, 1);

        let IrStmt::Block(block) = &function.body.statements[0] else {
            panic!("expected block");
        };
        assert_eq!(block.origin, BlockOrigin::LoweredForLoop);
        assert_eq!(block.len(), 5);
        let IrStmt::If { then_branch, .. } = &block.statements[4] else {
            panic!("expected entry guard");
        };
        let IrStmt::DoWhile(ir_loop) = &then_branch.statements[0] else {
            panic!("expected do-while");
        };
        assert_eq!(ir_loop.body.origin, BlockOrigin::ForLoopBody);

        let output = function.pretty_print();
        assert!(output.contains("var tmp0_induction: type2 = 1"));
        assert!(output.contains("val i: type2 = tmp0_induction"));
        assert!(output.contains("tmp0_induction = (tmp0_induction + tmp2_step)"));
        assert!(output.contains("} while ((i != tmp3_last))"));
    }

    #[test]
    fn test_array_loop_has_no_guard() {
        let mut types = TypeContext::new();
        let int = types.int_type();
        let array_ty = types.array_type(int);
        let mut function = counting_function(&mut types, |_| IrExpr::ArrayOf {
            elements: vec![IrExpr::int(1)],
            ty: array_ty,
        });

        assert_eq!(ForLoopsLowering::new().lower_function(&mut function, &mut types), 1);
        let IrStmt::Block(block) = &function.body.statements[0] else {
            panic!("expected block");
        };
        assert!(matches!(block.statements[5], IrStmt::While(_)));
    }

    #[test]
    fn test_disabled_kind_is_kept() {
        let mut types = TypeContext::new();
        let mut function = counting_function(&mut types, |scope| {
            scope.until(IrExpr::int(0), IrExpr::int(3)).unwrap()
        });
        let before = function.clone();

        let mut config = ForLoopsConfig::new();
        config.set_lower_progressions(false);
        let lowered =
            ForLoopsLowering::with_config(config).lower_function(&mut function, &mut types);

        assert_eq!(lowered, 0);
        assert_eq!(function, before);
    }

    #[test]
    fn test_custom_builder() {
        struct Nothing;
        impl HeaderInfoBuilder for Nothing {
            fn build(&self, _: &IrExpr, _: &TypeContext) -> Option<HeaderInfo> {
                None
            }
        }

        let mut types = TypeContext::new();
        let mut function = counting_function(&mut types, |scope| {
            scope.range_to(IrExpr::int(1), IrExpr::int(2)).unwrap()
        });
        let lowering = ForLoopsLowering::new().with_builder(Box::new(Nothing));
        assert_eq!(lowering.lower_function(&mut function, &mut types), 0);
    }
}
