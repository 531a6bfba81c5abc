#[macro_use]
mod common;

#[cfg(test)]
mod inheritance {
    tests! {
        inherit_method in inheritance is OK
        "hi"
    }

    tests! {
        override_method in inheritance is OK
        "B"
    }

    tests! {
        inherited_fields in inheritance is OK
        "1"
        "2"
    }
}
