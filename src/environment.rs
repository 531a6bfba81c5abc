use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A scope's bindings plus a shared reference to the enclosing scope.
/// Environments always form a chain rooted at the globals.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            values: HashMap::new(),
        }
    }

    /// Binds a name in this scope. Always succeeds; an existing binding
    /// (a shadowed parent or a redefined global) is replaced.
    pub fn define(&mut self, name: &str, value: Object) {
        self.values.insert(name.to_string(), value);
    }

    /// Returns the scope `distance` hops up the chain. Only called with
    /// distances published by the resolver, so the parents must exist.
    fn ancestor(&self, distance: usize) -> Rc<RefCell<Environment>> {
        let mut environment = self.enclosing.clone()
            .expect("enclosing environment to exist at depth 1");

        for depth in 1..distance {
            let enclosing = environment.borrow().enclosing.clone()
                .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", depth + 1));
            environment = enclosing;
        }

        environment
    }

    /// Looks a name up, walking the chain outwards.
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme)))
    }

    /// Looks a name up at an exact distance published by the resolver.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        if distance > 0 {
            match self.ancestor(distance).borrow().values.get(&name.lexeme) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))),
            }
        } else {
            match self.values.get(&name.lexeme) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))),
            }
        }
    }

    /// Reassigns an existing name, walking the chain outwards.
    /// Unlike `define`, assigning a name that exists nowhere is an error.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme)))
    }

    /// Reassigns a name at an exact distance published by the resolver.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Object) {
        if distance > 0 {
            self.ancestor(distance).borrow_mut().values.insert(name.lexeme.clone(), value);
        } else {
            self.values.insert(name.lexeme.clone(), value);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::literal::Literal;

    fn name(name: &str) -> Token {
        Token::from(name)
    }

    fn number(n: f64) -> Object {
        Object::Literal(Literal::Number(n))
    }

    #[test]
    fn define_and_get() {
        let mut environment = Environment::default();
        environment.define("a", number(1.0));

        assert_eq!(environment.get(&name("a")).unwrap(), number(1.0));
    }

    #[test]
    fn get_undefined() {
        let environment = Environment::default();
        let error = environment.get(&name("a")).unwrap_err();

        assert_eq!(error.message, "Undefined variable 'a'.");
    }

    #[test]
    fn redefine_in_same_scope() {
        let mut environment = Environment::default();
        environment.define("a", number(1.0));
        environment.define("a", number(2.0));

        assert_eq!(environment.get(&name("a")).unwrap(), number(2.0));
    }

    #[test]
    fn get_from_enclosing() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", number(1.0));

        let local = Environment::new(Some(Rc::clone(&globals)));
        assert_eq!(local.get(&name("a")).unwrap(), number(1.0));
    }

    #[test]
    fn shadowing() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", number(1.0));

        let mut local = Environment::new(Some(Rc::clone(&globals)));
        local.define("a", number(2.0));

        assert_eq!(local.get(&name("a")).unwrap(), number(2.0));
        assert_eq!(globals.borrow().get(&name("a")).unwrap(), number(1.0));
    }

    #[test]
    fn assign_walks_the_chain() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", number(1.0));

        let mut local = Environment::new(Some(Rc::clone(&globals)));
        local.assign(&name("a"), number(2.0)).unwrap();

        assert_eq!(globals.borrow().get(&name("a")).unwrap(), number(2.0));
    }

    #[test]
    fn assign_undefined() {
        let mut environment = Environment::default();
        let error = environment.assign(&name("a"), number(1.0)).unwrap_err();

        assert_eq!(error.message, "Undefined variable 'a'.");
    }

    #[test]
    fn get_at_distance() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", number(1.0));

        let middle = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&globals)))));
        middle.borrow_mut().define("a", number(2.0));

        let inner = Environment::new(Some(Rc::clone(&middle)));

        assert_eq!(inner.get_at(1, &name("a")).unwrap(), number(2.0));
        assert_eq!(inner.get_at(2, &name("a")).unwrap(), number(1.0));
    }

    #[test]
    fn assign_at_distance() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", number(1.0));

        let mut inner = Environment::new(Some(Rc::clone(&globals)));
        inner.assign_at(1, &name("a"), number(3.0));

        assert_eq!(globals.borrow().get(&name("a")).unwrap(), number(3.0));
    }
}
