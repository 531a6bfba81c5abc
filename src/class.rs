use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::rc::Rc;

use crate::error::{RuntimeError, Unwind};
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

/// A class value: a name, an optional superclass and the method table.
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    superclass: Option<Rc<Class>>,
    methods: HashMap<String, Function>,
}

impl Class {
    pub fn new(name: String, superclass: Option<Rc<Class>>, methods: HashMap<String, Function>) -> Self {
        Class { name, superclass, methods }
    }

    /// Looks a method up on this class, then up the superclass chain.
    /// First match wins, which is what lets subclasses override.
    pub fn find_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass.as_ref().and_then(|superclass| superclass.find_method(name))
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Class {}", self.name)
    }
}

// Calling a class constructs an instance. Implemented on the `Rc` so the
// new instance can share the class value instead of copying it.
impl Callable for Rc<Class> {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, Unwind> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(self))));

        if let Some(initializer) = self.find_method("init") {
            initializer.bind(Rc::clone(&instance)).call(interpreter, arguments)?;
        }

        Ok(Object::Instance(instance))
    }

    fn arity(&self) -> usize {
        self.find_method("init").map(|initializer| initializer.arity()).unwrap_or(0)
    }
}

/// An instance of a class with its own mutable field map.
#[derive(Debug, Clone)]
pub struct Instance {
    class: Rc<Class>,
    fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    /// Looks a property up: fields first, so a field shadows a method of
    /// the same name. A found method is returned bound to `this`; a
    /// shadowing field is returned as-is.
    pub fn get(&self, name: &Token, this: &Rc<RefCell<Instance>>) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            return Ok(field.clone());
        }

        if let Some(method) = self.class.find_method(&name.lexeme) {
            return Ok(Object::from(method.bind(Rc::clone(this))));
        }

        Err(RuntimeError::new(name, format!("Undefined property '{}'.", name.lexeme)))
    }

    /// Sets a field, creating it if it does not exist yet.
    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn class(name: &str, superclass: Option<Rc<Class>>) -> Rc<Class> {
        Rc::new(Class::new(name.to_string(), superclass, HashMap::new()))
    }

    #[test]
    fn display_class_and_instance() {
        let class = class("Foo", None);
        assert_eq!(class.to_string(), "Class Foo");

        let instance = Instance::new(Rc::clone(&class));
        assert_eq!(instance.to_string(), "Foo instance");
    }

    #[test]
    fn arity_without_initializer() {
        assert_eq!(class("Foo", None).arity(), 0);
    }

    #[test]
    fn fields_and_undefined_property() {
        let instance = Rc::new(RefCell::new(Instance::new(class("Foo", None))));

        instance.borrow_mut().set(&Token::from("x"), Object::from(1.0));
        assert_eq!(instance.borrow().get(&Token::from("x"), &instance).unwrap(), Object::from(1.0));

        let error = instance.borrow().get(&Token::from("y"), &instance).unwrap_err();
        assert_eq!(error.message, "Undefined property 'y'.");
    }
}
