//! Pretty-printing for IR
//!
//! Provides human-readable output for debugging IR structures. Variables
//! print by their declared name when the declaration is in view and as
//! `v<N>` otherwise.

use super::expr::IrExpr;
use super::function::IrFunction;
use super::module::IrModule;
use super::stmt::{IrBlock, IrStmt};
use super::variable::{IrVariable, VariableId};
use rustc_hash::FxHashMap;
use std::fmt::Write;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for IrModule {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        writeln!(output, "; module {}", self.name).unwrap();
        writeln!(output).unwrap();

        for func in &self.functions {
            output.push_str(&func.pretty_print());
            writeln!(output).unwrap();
        }

        output
    }
}

impl PrettyPrint for IrFunction {
    fn pretty_print(&self) -> String {
        let mut names = Names::default();
        for param in &self.params {
            names.declare(param);
        }
        names.collect_block(&self.body);

        let mut output = String::new();
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: type{}", p.name, p.ty.as_u32()))
            .collect();
        writeln!(
            output,
            "fn {}({}) -> type{} {{",
            self.name,
            params.join(", "),
            self.return_ty.as_u32()
        )
        .unwrap();

        for stmt in &self.body.statements {
            write_stmt(&mut output, stmt, &names, 1);
        }

        writeln!(output, "}}").unwrap();
        output
    }
}

impl PrettyPrint for IrStmt {
    fn pretty_print(&self) -> String {
        let mut names = Names::default();
        names.collect_stmt(self);
        let mut output = String::new();
        write_stmt(&mut output, self, &names, 0);
        output
    }
}

impl PrettyPrint for IrExpr {
    fn pretty_print(&self) -> String {
        format_expr(self, &Names::default())
    }
}

#[derive(Default)]
struct Names {
    names: FxHashMap<VariableId, String>,
}

impl Names {
    fn declare(&mut self, variable: &IrVariable) {
        self.names.insert(variable.id, variable.name.clone());
    }

    fn get(&self, id: VariableId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn collect_block(&mut self, block: &IrBlock) {
        for stmt in &block.statements {
            self.collect_stmt(stmt);
        }
    }

    fn collect_stmt(&mut self, stmt: &IrStmt) {
        match stmt {
            IrStmt::Var(variable) => self.declare(variable),
            IrStmt::Expr(_) => {}
            IrStmt::Block(block) => self.collect_block(block),
            IrStmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.collect_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.collect_block(else_branch);
                }
            }
            IrStmt::While(ir_loop) | IrStmt::DoWhile(ir_loop) => self.collect_block(&ir_loop.body),
        }
    }
}

fn write_block(output: &mut String, block: &IrBlock, names: &Names, indent: usize) {
    for stmt in &block.statements {
        write_stmt(output, stmt, names, indent);
    }
}

fn write_stmt(output: &mut String, stmt: &IrStmt, names: &Names, indent: usize) {
    let prefix = "  ".repeat(indent);
    match stmt {
        IrStmt::Var(variable) => {
            let keyword = if variable.mutable { "var" } else { "val" };
            match &variable.initializer {
                Some(init) => writeln!(
                    output,
                    "{}{} {}: type{} = {}",
                    prefix,
                    keyword,
                    variable.name,
                    variable.ty.as_u32(),
                    format_expr(init, names)
                )
                .unwrap(),
                None => writeln!(
                    output,
                    "{}{} {}: type{}",
                    prefix,
                    keyword,
                    variable.name,
                    variable.ty.as_u32()
                )
                .unwrap(),
            }
        }
        IrStmt::Expr(expr) => {
            writeln!(output, "{}{}", prefix, format_expr(expr, names)).unwrap();
        }
        IrStmt::Block(block) => {
            writeln!(output, "{}{} {{", prefix, block.origin).unwrap();
            write_block(output, block, names, indent + 1);
            writeln!(output, "{}}}", prefix).unwrap();
        }
        IrStmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            writeln!(output, "{}if ({}) {{", prefix, format_expr(condition, names)).unwrap();
            write_block(output, then_branch, names, indent + 1);
            if let Some(else_branch) = else_branch {
                writeln!(output, "{}}} else {{", prefix).unwrap();
                write_block(output, else_branch, names, indent + 1);
            }
            writeln!(output, "{}}}", prefix).unwrap();
        }
        IrStmt::While(ir_loop) => {
            writeln!(
                output,
                "{}while ({}) {{",
                prefix,
                format_expr(&ir_loop.condition, names)
            )
            .unwrap();
            write_block(output, &ir_loop.body, names, indent + 1);
            writeln!(output, "{}}}", prefix).unwrap();
        }
        IrStmt::DoWhile(ir_loop) => {
            writeln!(output, "{}do {{", prefix).unwrap();
            write_block(output, &ir_loop.body, names, indent + 1);
            writeln!(
                output,
                "{}}} while ({})",
                prefix,
                format_expr(&ir_loop.condition, names)
            )
            .unwrap();
        }
    }
}

fn format_expr(expr: &IrExpr, names: &Names) -> String {
    match expr {
        IrExpr::Const(c) => format!("{}", c),
        IrExpr::Get(variable) => names.get(variable.id),
        IrExpr::Set { variable, value } => {
            format!("{} = {}", names.get(variable.id), format_expr(value, names))
        }
        IrExpr::Call { callee, args, .. } => {
            let args_str: Vec<String> = args.iter().map(|a| format_expr(a, names)).collect();
            format!("call {}({})", callee, args_str.join(", "))
        }
        IrExpr::Binary {
            op, left, right, ..
        } => {
            format!(
                "({} {} {})",
                format_expr(left, names),
                op,
                format_expr(right, names)
            )
        }
        IrExpr::Unary { op, operand, .. } => {
            format!("{}{}", op, format_expr(operand, names))
        }
        IrExpr::Convert { value, to } => {
            format!("convert<type{}>({})", to.as_u32(), format_expr(value, names))
        }
        IrExpr::NotNull { value, .. } => format!("{}!!", format_expr(value, names)),
        IrExpr::ArrayGet { array, index, .. } => {
            format!("{}[{}]", format_expr(array, names), format_expr(index, names))
        }
        IrExpr::ArrayLength(array) => format!("{}.size", format_expr(array, names)),
        IrExpr::ArrayOf { elements, .. } => {
            let elems: Vec<String> = elements.iter().map(|e| format_expr(e, names)).collect();
            format!("arrayOf({})", elems.join(", "))
        }
    }
}
