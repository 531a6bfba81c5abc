use std::rc::Rc;

use crate::expr::{
    AssignData, BinaryData, CallData, Expr, ExprVisitor, GetData, GroupingData, LogicalData,
    SetData, SuperData, ThisData, UnaryData, VariableData,
};
use crate::literal::Literal;
use crate::stmt::{
    BlockData, ClassData, ExpressionData, FunctionData, IfData, PrintData, ReturnData, Stmt,
    StmtVisitor, VarData, WhileData,
};

/// Returns a string representation of the expression in parenthesize.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";

            string
        }
    };
}

/// Prints the AST in a lisp-like parenthesized form, mostly for debugging
/// the parser.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }
}

impl ExprVisitor<String> for AstPrinter {
    fn visit_literal_expr(&mut self, literal: &Literal) -> String {
        literal.to_string()
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> String {
        parenthesize!(self, &logical.operator.lexeme, &logical.left, &logical.right)
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> String {
        parenthesize!(self, &unary.operator.lexeme, &unary.expr)
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> String {
        parenthesize!(self, &binary.operator.lexeme, &binary.left, &binary.right)
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> String {
        parenthesize!(self, "group", grouping.expr)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> String {
        variable.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> String {
        parenthesize!(self, format!("= {}", &assign.name.lexeme).as_str(), assign.value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> String {
        let mut string = String::new();
        string += &call.callee.accept(self);
        string += "(";
        for argument in &call.arguments {
            string += &argument.accept(self);
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ")";
        string
    }

    fn visit_get_expr(&mut self, get: &GetData) -> String {
        parenthesize!(self, format!(". {}", &get.name.lexeme).as_str(), get.object)
    }

    fn visit_set_expr(&mut self, set: &SetData) -> String {
        let target = parenthesize!(self, format!(". {}", &set.name.lexeme).as_str(), set.object);
        parenthesize!(self, format!("= {target}").as_str(), set.value)
    }

    fn visit_this_expr(&mut self, _this: &ThisData) -> String {
        String::from("this")
    }

    fn visit_super_expr(&mut self, superr: &SuperData) -> String {
        format!("(super {})", superr.method.lexeme)
    }

    fn visit_noop_expr(&mut self) -> String {
        String::from("noop")
    }
}

impl StmtVisitor<String> for AstPrinter {
    fn visit_expression_stmt(&mut self, expression: &ExpressionData) -> String {
        parenthesize!(self, "expr", expression.expr)
    }

    fn visit_print_stmt(&mut self, print: &PrintData) -> String {
        parenthesize!(self, "print", print.expr)
    }

    fn visit_var_stmt(&mut self, var: &VarData) -> String {
        let mut string = String::new();
        string += "(var ";
        string += &var.name.lexeme;
        string += " = ";
        string += &var.initializer.accept(self);
        string += ")";

        string
    }

    fn visit_block_stmt(&mut self, block: &BlockData) -> String {
        let mut string = String::new();
        string += "{";
        for stmt in &block.statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";

        string
    }

    fn visit_if_stmt(&mut self, if_stmt: &IfData) -> String {
        let mut string = String::new();
        string += "(if ";
        string += &if_stmt.condition.accept(self);
        string += " ";
        string += &if_stmt.then_branch.accept(self);
        if !matches!(*if_stmt.else_branch, Stmt::Null) {
            string += " else ";
            string += &if_stmt.else_branch.accept(self);
        }
        string += ")";

        string
    }

    fn visit_while_stmt(&mut self, while_stmt: &WhileData) -> String {
        parenthesize!(self, "while", while_stmt.condition, while_stmt.body)
    }

    fn visit_function_stmt(&mut self, function: &Rc<FunctionData>) -> String {
        let mut string = String::new();
        string += "(fun ";
        string += &function.name.lexeme;
        string += "(";
        for param in &function.params {
            string += &param.lexeme;
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ") ";
        string += &Stmt::Block(BlockData { statements: function.body.clone() }).accept(self);
        string += ")";

        string
    }

    fn visit_return_stmt(&mut self, return_stmt: &ReturnData) -> String {
        match &return_stmt.value {
            Some(value) => parenthesize!(self, "return", value),
            None => String::from("(return)"),
        }
    }

    fn visit_class_stmt(&mut self, class: &ClassData) -> String {
        let mut string = String::new();
        string += "(class ";
        string += &class.name.lexeme;
        if let Some(superclass) = &class.superclass {
            string += " < ";
            string += &superclass.name.lexeme;
        }
        for method in &class.methods {
            string += " ";
            string += &self.visit_function_stmt(method);
        }
        string += ")";

        string
    }

    fn visit_null_stmt(&mut self) -> String {
        String::new()
    }
}
