#[macro_export]
macro_rules! tests {
    ($file:ident in $scope:ident is OK $($expected:expr)*) => {
        #[test]
        fn $file() {
            use slate_lang::slate;

            let mut expected = vec![$($expected),*];

            // if exists, concat expected lines with new lines
            let expected = match expected.len() {
                0 => "".to_string(),
                _ => {
                    // add empty string to end to add new line to end of output
                    expected.push("");
                    expected.join("\n")
                }
            };

            let mut output = Vec::new();
            let mut slate = slate::new(&mut output);

            slate.run_file(&format!("tests/target/{}/{}.slate", stringify!($scope), stringify!($file)));

            // drop slate here to release the borrow before reading the output
            drop(slate);
            assert_eq!(expected, std::str::from_utf8(&output).unwrap());
        }
    };

    ($file:ident in $scope:ident is ERR($code:literal) $($expected:expr)+) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;
            // stderr concats expected with new line
            let output = vec![$($expected),+].join("\n");
            let file = format!("tests/target/{}/{}.slate", stringify!($scope), stringify!($file));

            Command::cargo_bin("slate").unwrap()
                .arg(file)
                .assert()
                .stderr(format!("{output}\n"))
                .code($code);
        }
    };
}
