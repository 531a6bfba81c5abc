#[macro_use]
mod common;

#[cfg(test)]
mod field {
    tests! {
        set_and_get in field is OK
        "42"
    }

    tests! {
        shadow_method in field is OK
        "field"
    }

    tests! {
        state_in_methods in field is OK
        "The chocolate cake is delicious!"
    }

    tests! {
        get_on_non_instance in field is ERR(70)
        "[Line 1] Only instances have properties."
    }

    tests! {
        set_on_non_instance in field is ERR(70)
        "[Line 1] Only instances have fields."
    }

    tests! {
        undefined in field is ERR(70)
        "[Line 2] Undefined property 'nothing'."
    }
}
