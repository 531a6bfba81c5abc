#[macro_use]
mod common;

#[cfg(test)]
mod string {
    tests! {
        literals in string is OK
        "hello"
        ""
    }

    tests! {
        concat_empty in string is OK
        ""
    }

    tests! {
        multiline in string is OK
        "one"
        "two"
    }

    tests! {
        unterminated in string is ERR(65)
        "[Line 1] Error: Unterminated string."
    }
}
