#[macro_use]
mod common;

#[cfg(test)]
mod call {
    tests! {
        native_clock in call is OK
        "true"
    }

    tests! {
        not_callable in call is ERR(70)
        "[Line 1] Can only call functions and classes."
    }

    tests! {
        nil_not_callable in call is ERR(70)
        "[Line 1] Can only call functions and classes."
    }

    tests! {
        arity_mismatch in call is ERR(70)
        "[Line 2] Expected 2 args but got 1."
    }

    tests! {
        too_many_args in call is ERR(70)
        "[Line 2] Expected 1 args but got 2."
    }
}
