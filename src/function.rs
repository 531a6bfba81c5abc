use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::io;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::class::Instance;
use crate::environment::Environment;
use crate::error::Unwind;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::stmt::FunctionData;
use crate::token::Token;

/// A user-defined function: a shared declaration, the environment captured
/// at the point of definition, and whether it is a class initializer.
#[derive(Debug, Clone)]
pub struct Function {
    declaration: Rc<FunctionData>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionData>, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    /// Returns a copy of this function whose closure has `this` bound to
    /// the given instance.
    pub fn bind(&self, instance: Rc<RefCell<Instance>>) -> Function {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", Object::Instance(instance));

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, Unwind> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let result = interpreter.execute_block(
            &self.declaration.body,
            Rc::new(RefCell::new(environment)),
        );

        let value = match result {
            Ok(()) => Object::nil(),
            Err(Unwind::Return(value)) => value,
            Err(error) => return Err(error),
        };

        // An initializer always hands back its instance, even through an
        // early `return;`.
        if self.is_initializer {
            return Ok(self.closure.borrow().get_at(0, &Token::from("this"))?);
        }

        Ok(value)
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// A function provided by the interpreter itself.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: fn(&mut Interpreter<'_>, Vec<Object>) -> Result<Object, Unwind>,
}

impl NativeFunction {
    /// The native functions preloaded into the globals.
    pub fn globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: "clock",
                arity: 0,
                function: |_, _| {
                    let seconds = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map(|elapsed| elapsed.as_secs_f64())
                        .unwrap_or(0.0);
                    Ok(Object::from(seconds))
                },
            },
            NativeFunction {
                name: "input",
                arity: 0,
                function: |_, _| {
                    let mut input = String::new();
                    let _ = io::stdin().read_line(&mut input);
                    if input.ends_with('\n') {
                        input.pop();
                    }
                    Ok(Object::from(input))
                },
            },
        ]
    }
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, Unwind> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn>")
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
