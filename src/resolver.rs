use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use crate::error::{ResolveError, Throw};
use crate::expr::{
    AssignData, BinaryData, CallData, Expr, ExprVisitor, GetData, GroupingData, LogicalData,
    SetData, SuperData, ThisData, UnaryData, VariableData,
};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::stmt::{
    BlockData, ClassData, ExpressionData, FunctionData, IfData, PrintData, ReturnData, Stmt,
    StmtVisitor, VarData, WhileData,
};
use crate::token::Token;

enum FunctionKind {
    None,
    Function,
    Initializer,
    Method,
}

enum ClassKind {
    None,
    Class,
    Subclass,
}

/// Walks the AST between parsing and interpreting to measure how many
/// scopes sit between each variable use and its binding, and to reject
/// programs that are syntactically fine but semantically broken.
///
/// Only local scopes are stacked; a name absent from every stacked scope
/// lives in the globals. A scope entry is `false` while the name's
/// initializer is being resolved and `true` once the name is usable.
pub struct Resolver<'a, 'out> {
    interpreter: &'a mut Interpreter<'out>,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionKind,
    current_class: ClassKind,
}

impl<'a, 'out> Resolver<'a, 'out> {
    pub fn new(interpreter: &'a mut Interpreter<'out>) -> Self {
        Resolver {
            interpreter,
            scopes: vec![],
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn resolve_function(&mut self, function: &FunctionData, kind: FunctionKind) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn begin_scope(&mut self) {
        log::trace!("begin scope at depth {}", self.scopes.len());
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
        log::trace!("end scope at depth {}", self.scopes.len());
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        if scope.contains_key(&name.lexeme) {
            ResolveError {
                line: name.line,
                message: format!("Already a variable with the name '{}' in this scope.", name.lexeme),
            }.throw();
        }

        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        scope.insert(name.lexeme.clone(), true);
    }

    /// Publishes the hop distance of the innermost scope holding the name.
    /// Without a hit the expression is left to the globals at runtime.
    fn resolve_local(&mut self, id: usize, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                log::trace!("resolved '{}' at depth {depth}", name.lexeme);
                self.interpreter.resolve(id, depth);
                return;
            }
        }

        log::trace!("'{}' is assumed global", name.lexeme);
    }
}

impl ExprVisitor<()> for Resolver<'_, '_> {
    fn visit_literal_expr(&mut self, _literal: &Literal) {}

    fn visit_logical_expr(&mut self, logical: &LogicalData) {
        self.resolve_expr(&logical.left);
        self.resolve_expr(&logical.right);
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) {
        self.resolve_expr(&unary.expr);
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) {
        self.resolve_expr(&binary.left);
        self.resolve_expr(&binary.right);
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) {
        self.resolve_expr(&grouping.expr);
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&variable.name.lexeme) == Some(&false) {
                ResolveError {
                    line: variable.name.line,
                    message: String::from("Can't read local variable in its own initializer."),
                }.throw();
            }
        }

        self.resolve_local(variable.id, &variable.name);
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) {
        self.resolve_expr(&assign.value);
        self.resolve_local(assign.id, &assign.name);
    }

    fn visit_call_expr(&mut self, call: &CallData) {
        self.resolve_expr(&call.callee);

        for argument in &call.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, get: &GetData) {
        self.resolve_expr(&get.object);
    }

    fn visit_set_expr(&mut self, set: &SetData) {
        self.resolve_expr(&set.value);
        self.resolve_expr(&set.object);
    }

    fn visit_this_expr(&mut self, this: &ThisData) {
        if let ClassKind::None = self.current_class {
            ResolveError {
                line: this.keyword.line,
                message: String::from("Can't use 'this' outside of a class."),
            }.throw();

            return;
        }

        self.resolve_local(this.id, &this.keyword);
    }

    fn visit_super_expr(&mut self, superr: &SuperData) {
        match self.current_class {
            ClassKind::Subclass => {}
            ClassKind::None => ResolveError {
                line: superr.keyword.line,
                message: String::from("Can't use 'super' outside of a class."),
            }.throw(),
            ClassKind::Class => ResolveError {
                line: superr.keyword.line,
                message: String::from("Can't use 'super' in a class with no subclass."),
            }.throw(),
        }

        self.resolve_local(superr.id, &superr.keyword);
    }

    fn visit_noop_expr(&mut self) {}
}

impl StmtVisitor<()> for Resolver<'_, '_> {
    fn visit_expression_stmt(&mut self, expression: &ExpressionData) {
        self.resolve_expr(&expression.expr);
    }

    fn visit_print_stmt(&mut self, print: &PrintData) {
        self.resolve_expr(&print.expr);
    }

    fn visit_var_stmt(&mut self, var: &VarData) {
        // Declared before and defined after its initializer resolves, which
        // is what makes a self-referential initializer detectable.
        self.declare(&var.name);
        self.resolve_expr(&var.initializer);
        self.define(&var.name);
    }

    fn visit_block_stmt(&mut self, block: &BlockData) {
        self.begin_scope();
        self.resolve(&block.statements);
        self.end_scope();
    }

    fn visit_if_stmt(&mut self, if_stmt: &IfData) {
        self.resolve_expr(&if_stmt.condition);
        self.resolve_stmt(&if_stmt.then_branch);
        self.resolve_stmt(&if_stmt.else_branch);
    }

    fn visit_while_stmt(&mut self, while_stmt: &WhileData) {
        self.resolve_expr(&while_stmt.condition);
        self.resolve_stmt(&while_stmt.body);
    }

    fn visit_function_stmt(&mut self, function: &Rc<FunctionData>) {
        self.declare(&function.name);
        self.define(&function.name);

        self.resolve_function(function, FunctionKind::Function);
    }

    fn visit_return_stmt(&mut self, return_stmt: &ReturnData) {
        if let FunctionKind::None = self.current_function {
            ResolveError {
                line: return_stmt.keyword.line,
                message: String::from("Can't return from top-level code."),
            }.throw();
        }

        if let Some(value) = &return_stmt.value {
            if let FunctionKind::Initializer = self.current_function {
                ResolveError {
                    line: return_stmt.keyword.line,
                    message: String::from("Can't return a value from an initializer."),
                }.throw();
            }

            self.resolve_expr(value);
        }
    }

    fn visit_class_stmt(&mut self, class: &ClassData) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassKind::Class);

        self.declare(&class.name);
        self.define(&class.name);

        if let Some(superclass) = &class.superclass {
            if class.name.lexeme == superclass.name.lexeme {
                ResolveError {
                    line: class.name.line,
                    message: String::from("A class can't inherit from itself."),
                }.throw();
            }

            self.current_class = ClassKind::Subclass;
            self.resolve_local(superclass.id, &superclass.name);

            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("scope stack to be non-empty")
                .insert(String::from("super"), true);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("scope stack to be non-empty")
            .insert(String::from("this"), true);

        for method in &class.methods {
            let kind = if method.name.lexeme == "init" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if class.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn visit_null_stmt(&mut self) {}
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> Vec<Stmt> {
        let tokens = Scanner::new(source).scan_tokens();
        Parser::new(tokens).parse()
    }

    /// The id of the variable expression inside the innermost print of the
    /// program, found by digging through blocks.
    fn printed_variable_id(statements: &[Stmt]) -> usize {
        let mut current = statements;
        loop {
            match current.iter().find_map(|stmt| match stmt {
                Stmt::Print(print) => Some(&print.expr),
                _ => None,
            }) {
                Some(Expr::Variable(variable)) => return variable.id,
                Some(_) => panic!("expected a variable expression"),
                None => {
                    current = match current.iter().find_map(|stmt| match stmt {
                        Stmt::Block(block) => Some(&block.statements),
                        _ => None,
                    }) {
                        Some(statements) => statements,
                        None => panic!("no print statement found"),
                    };
                }
            }
        }
    }

    #[test]
    fn resolves_innermost_binding() {
        let statements = parse("{ var a = 1; { var a = 2; { print a; } } }");
        let id = printed_variable_id(&statements);

        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        Resolver::new(&mut interpreter).resolve(&statements);

        // Two scopes between the print and the inner `a`.
        assert_eq!(interpreter.resolved_depth(id), Some(1));
    }

    #[test]
    fn resolves_shadowed_binding_at_distance() {
        let statements = parse("{ var a = 1; { print a; } }");
        let id = printed_variable_id(&statements);

        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        Resolver::new(&mut interpreter).resolve(&statements);

        assert_eq!(interpreter.resolved_depth(id), Some(1));
    }

    #[test]
    fn globals_are_not_resolved() {
        let statements = parse("var a = 1; print a;");
        let id = printed_variable_id(&statements);

        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        Resolver::new(&mut interpreter).resolve(&statements);

        assert_eq!(interpreter.resolved_depth(id), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let statements = parse("{ var a = 1; { print a; } }");
        let id = printed_variable_id(&statements);

        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        Resolver::new(&mut interpreter).resolve(&statements);
        let first = interpreter.resolved_depth(id);

        Resolver::new(&mut interpreter).resolve(&statements);
        assert_eq!(interpreter.resolved_depth(id), first);
    }
}
