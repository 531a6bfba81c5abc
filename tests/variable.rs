#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        define in variable is OK
        "1"
    }

    tests! {
        uninitialized in variable is OK
        "nil"
    }

    tests! {
        redefine_global in variable is OK
        "2"
    }

    tests! {
        shadow in variable is OK
        "local"
        "global"
    }

    tests! {
        undefined in variable is ERR(70)
        "[Line 1] Undefined variable 'notDefined'."
    }

    tests! {
        assign_undefined in variable is ERR(70)
        "[Line 1] Undefined variable 'unknown'."
    }

    tests! {
        use_in_own_initializer in variable is ERR(65)
        "[Line 3] Error: Can't read local variable in its own initializer."
    }

    tests! {
        duplicate_local in variable is ERR(65)
        "[Line 3] Error: Already a variable with the name 'a' in this scope."
    }
}
