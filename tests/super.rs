#[macro_use]
mod common;

#[cfg(test)]
mod super_expr {
    tests! {
        call_super_method in super is OK
        "A"
        "B"
    }

    tests! {
        indirectly_inherited in super is OK
        "A.foo"
        "C.foo"
    }

    tests! {
        no_superclass in super is ERR(65)
        "[Line 3] Error: Can't use 'super' in a class with no subclass."
    }

    tests! {
        outside_class in super is ERR(65)
        "[Line 1] Error: Can't use 'super' outside of a class."
    }

    tests! {
        undefined_method in super is ERR(70)
        "[Line 4] Undefined property 'missing'."
    }
}
