#[macro_use]
mod common;

#[cfg(test)]
mod this {
    tests! {
        bound_method in this is OK
        "Jane"
    }

    tests! {
        in_method in this is OK
        "Egotist instance"
    }

    tests! {
        outside_class in this is ERR(65)
        "[Line 1] Error: Can't use 'this' outside of a class."
    }

    tests! {
        in_function_outside_class in this is ERR(65)
        "[Line 2] Error: Can't use 'this' outside of a class."
    }
}
