#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        add in operator is OK
        "3"
        "ab"
    }

    tests! {
        arithmetic in operator is OK
        "1"
        "7"
        "-1"
    }

    tests! {
        comparison in operator is OK
        "true"
        "true"
        "false"
        "false"
    }

    tests! {
        equality in operator is OK
        "true"
        "true"
        "false"
        "true"
        "false"
        "true"
        "false"
    }

    tests! {
        divide_by_zero in operator is OK
        "inf"
        "-inf"
        "nan"
    }

    tests! {
        negate in operator is OK
        "-3"
        "3"
    }

    tests! {
        not in operator is OK
        "false"
        "true"
        "false"
        "false"
    }

    tests! {
        add_mixed_types in operator is ERR(70)
        "[Line 1] Args must be either Number or String."
    }

    tests! {
        add_nil in operator is ERR(70)
        "[Line 1] Args must be either Number or String."
    }

    tests! {
        subtract_string in operator is ERR(70)
        "[Line 1] Operator must be a number."
    }

    tests! {
        negate_string in operator is ERR(70)
        "[Line 1] Operator must be a number."
    }

    tests! {
        compare_string in operator is ERR(70)
        "[Line 1] Operator must be a number."
    }
}
