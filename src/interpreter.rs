use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{RuntimeError, Throw, Unwind};
use crate::expr::{
    AssignData, BinaryData, CallData, Expr, ExprVisitor, GetData, GroupingData, LogicalData,
    SetData, SuperData, ThisData, UnaryData, VariableData,
};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::Object;
use crate::stmt::{
    BlockData, ClassData, ExpressionData, FunctionData, IfData, PrintData, ReturnData, Stmt,
    StmtVisitor, VarData, WhileData,
};
use crate::token::{Kind, Token};

type EvalResult = Result<Object, Unwind>;
type ExecResult = Result<(), Unwind>;

/// Requires the operand to be a number; every arithmetic and comparison
/// operator except `+` and the equalities goes through here.
fn number_operand(operator: &Token, value: &Object) -> Result<f64, RuntimeError> {
    match value {
        Object::Literal(Literal::Number(n)) => Ok(*n),
        _ => Err(RuntimeError::new(operator, "Operator must be a number.")),
    }
}

fn number_operands(operator: &Token, left: &Object, right: &Object) -> Result<(f64, f64), RuntimeError> {
    Ok((number_operand(operator, left)?, number_operand(operator, right)?))
}

/// Walks the resolved and statically checked AST and evaluates it.
///
/// `print` writes to the injected writer so callers (and tests) decide
/// where program output goes; diagnostics always go to stderr.
pub struct Interpreter<'out> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<usize, usize>,
    out: &'out mut dyn Write,
}

impl<'out> Interpreter<'out> {
    pub fn new(out: &'out mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::globals() {
            let name = native.name;
            globals.borrow_mut().define(name, Object::Native(Rc::new(native)));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Records the hop distance of a resolvable expression node.
    /// Called by the resolver; nodes without an entry live in the globals.
    pub fn resolve(&mut self, id: usize, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Executes the statements in order. A runtime error is reported and
    /// aborts the rest of the program.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}
                Err(Unwind::Error(error)) => {
                    error.throw();
                    return;
                }
                // The resolver rejects top-level returns.
                Err(Unwind::Return(_)) => unreachable!("return outside of a function"),
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Executes the statements under the given environment, restoring the
    /// previous one on every exit path including unwinds.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    /// The hop distance recorded for a node, if any. Tests poke at this to
    /// check the resolver's output.
    #[cfg(test)]
    pub(crate) fn resolved_depth(&self, id: usize) -> Option<usize> {
        self.locals.get(&id).copied()
    }

    fn look_up_variable(&self, id: usize, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }
}

impl ExprVisitor<EvalResult> for Interpreter<'_> {
    fn visit_literal_expr(&mut self, literal: &Literal) -> EvalResult {
        Ok(Object::Literal(literal.clone()))
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> EvalResult {
        let left = self.evaluate(&logical.left)?;

        // Short-circuit: the deciding operand is returned as-is and the
        // other side is never evaluated.
        match logical.operator.kind {
            Kind::Or if left.is_truthy() => Ok(left),
            Kind::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(&logical.right),
        }
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> EvalResult {
        let right = self.evaluate(&unary.expr)?;

        match unary.operator.kind {
            Kind::Minus => Ok(Object::from(-number_operand(&unary.operator, &right)?)),
            Kind::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!("unary operator {:?}", unary.operator.kind),
        }
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> EvalResult {
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;
        let operator = &binary.operator;

        match operator.kind {
            Kind::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => {
                    Ok(Object::from(l + r))
                }
                (Object::Literal(Literal::String(l)), Object::Literal(Literal::String(r))) => {
                    Ok(Object::from(format!("{l}{r}")))
                }
                _ => Err(RuntimeError::new(operator, "Args must be either Number or String.").into()),
            },
            Kind::Minus => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Object::from(l - r))
            }
            // IEEE-754: dividing by zero yields an infinity or NaN.
            Kind::Slash => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Object::from(l / r))
            }
            Kind::Star => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Object::from(l * r))
            }
            Kind::Greater => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Object::from(l > r))
            }
            Kind::GreaterEqual => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Object::from(l >= r))
            }
            Kind::Less => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Object::from(l < r))
            }
            Kind::LessEqual => {
                let (l, r) = number_operands(operator, &left, &right)?;
                Ok(Object::from(l <= r))
            }
            Kind::EqualEqual => Ok(Object::from(left == right)),
            Kind::BangEqual => Ok(Object::from(left != right)),
            _ => unreachable!("binary operator {:?}", operator.kind),
        }
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> EvalResult {
        self.evaluate(&grouping.expr)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> EvalResult {
        Ok(self.look_up_variable(variable.id, &variable.name)?)
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> EvalResult {
        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.id) {
            Some(distance) => {
                self.environment.borrow_mut().assign_at(*distance, &assign.name, value.clone());
            }
            None => {
                self.globals.borrow_mut().assign(&assign.name, value.clone())?;
            }
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> EvalResult {
        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let Some(function) = callee.callable() else {
            return Err(RuntimeError::new(&call.paren, "Can only call functions and classes.").into());
        };

        if arguments.len() != function.arity() {
            return Err(RuntimeError::new(
                &call.paren,
                format!("Expected {} args but got {}.", function.arity(), arguments.len()),
            ).into());
        }

        function.call(self, arguments)
    }

    fn visit_get_expr(&mut self, get: &GetData) -> EvalResult {
        let object = self.evaluate(&get.object)?;

        match &object {
            Object::Instance(instance) => Ok(instance.borrow().get(&get.name, instance)?),
            _ => Err(RuntimeError::new(&get.name, "Only instances have properties.").into()),
        }
    }

    fn visit_set_expr(&mut self, set: &SetData) -> EvalResult {
        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = object else {
            return Err(RuntimeError::new(&set.name, "Only instances have fields.").into());
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());

        Ok(value)
    }

    fn visit_this_expr(&mut self, this: &ThisData) -> EvalResult {
        Ok(self.look_up_variable(this.id, &this.keyword)?)
    }

    fn visit_super_expr(&mut self, superr: &SuperData) -> EvalResult {
        let distance = *self.locals.get(&superr.id)
            .expect("'super' expression to have been resolved");

        let superclass = self.environment.borrow().get_at(distance, &superr.keyword)?;
        let Object::Class(superclass) = superclass else {
            unreachable!("'super' must resolve to a class");
        };

        // The instance sits one scope inside the one holding 'super'.
        let object = self.environment.borrow().get_at(distance - 1, &Token::from("this"))?;
        let Object::Instance(instance) = object else {
            unreachable!("'this' must resolve to an instance");
        };

        let Some(method) = superclass.find_method(&superr.method.lexeme) else {
            return Err(RuntimeError::new(
                &superr.method,
                format!("Undefined property '{}'.", superr.method.lexeme),
            ).into());
        };

        Ok(Object::from(method.bind(instance)))
    }

    fn visit_noop_expr(&mut self) -> EvalResult {
        Ok(Object::nil())
    }
}

impl StmtVisitor<ExecResult> for Interpreter<'_> {
    fn visit_expression_stmt(&mut self, expression: &ExpressionData) -> ExecResult {
        self.evaluate(&expression.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, print: &PrintData) -> ExecResult {
        let value = self.evaluate(&print.expr)?;
        let _ = writeln!(self.out, "{value}");
        Ok(())
    }

    fn visit_var_stmt(&mut self, var: &VarData) -> ExecResult {
        let value = self.evaluate(&var.initializer)?;
        self.environment.borrow_mut().define(&var.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, block: &BlockData) -> ExecResult {
        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&block.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_if_stmt(&mut self, if_stmt: &IfData) -> ExecResult {
        if self.evaluate(&if_stmt.condition)?.is_truthy() {
            self.execute(&if_stmt.then_branch)
        } else {
            self.execute(&if_stmt.else_branch)
        }
    }

    fn visit_while_stmt(&mut self, while_stmt: &WhileData) -> ExecResult {
        while self.evaluate(&while_stmt.condition)?.is_truthy() {
            self.execute(&while_stmt.body)?;
        }
        Ok(())
    }

    fn visit_function_stmt(&mut self, function: &Rc<FunctionData>) -> ExecResult {
        let value = Function::new(Rc::clone(function), Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&function.name.lexeme, Object::from(value));
        Ok(())
    }

    fn visit_return_stmt(&mut self, return_stmt: &ReturnData) -> ExecResult {
        let value = match &return_stmt.value {
            Some(value) => self.evaluate(value)?,
            None => Object::nil(),
        };

        Err(Unwind::Return(value))
    }

    fn visit_class_stmt(&mut self, class: &ClassData) -> ExecResult {
        let superclass = match &class.superclass {
            Some(variable) => {
                let value = self.look_up_variable(variable.id, &variable.name)?;
                match value {
                    Object::Class(superclass) => Some(superclass),
                    _ => return Err(RuntimeError::new(&variable.name, "Superclass must be a class.").into()),
                }
            }
            None => None,
        };
        let has_superclass = superclass.is_some();

        // The name is defined up front as nil so methods can close over it,
        // then assigned once the class value exists.
        self.environment.borrow_mut().define(&class.name.lexeme, Object::nil());

        if let Some(superclass) = &superclass {
            let mut environment = Environment::new(Some(Rc::clone(&self.environment)));
            environment.define("super", Object::Class(Rc::clone(superclass)));
            self.environment = Rc::new(RefCell::new(environment));
        }

        let mut methods = HashMap::new();
        for method in &class.methods {
            let is_initializer = method.name.lexeme == "init";
            methods.insert(
                method.name.lexeme.clone(),
                Function::new(Rc::clone(method), Rc::clone(&self.environment), is_initializer),
            );
        }

        let class_value = Rc::new(Class::new(class.name.lexeme.clone(), superclass, methods));

        if has_superclass {
            let enclosing = self.environment.borrow().enclosing.clone()
                .expect("class environment to have an enclosing scope");
            self.environment = enclosing;
        }

        self.environment.borrow_mut().assign(&class.name, Object::Class(class_value))?;

        Ok(())
    }

    fn visit_null_stmt(&mut self) -> ExecResult {
        Ok(())
    }
}
