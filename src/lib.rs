#![allow(clippy::needless_return)]

//! Slate is a small dynamically typed scripting language in the Lox family,
//! interpreted by walking its syntax tree. It has lexical scoping,
//! first-class functions with closures, and single-inheritance classes.
//! Slate is a hobby project inspired by the
//! [Crafting Interpreters](https://craftinginterpreters.com/) book.
//!
//! Running a program is a pipeline of four stages. Each stage reports its
//! own errors through the shared sink in the [`error`] module, and a stage
//! only runs if the previous one finished clean.
//!
//! ## Scanning
//! The [`scanner`] turns the source text into a flat list of
//! [`Token`](token::Token)s in a single pass with one character of
//! lookahead. It never gives up: an unterminated string or a stray
//! character is reported as a [`ScanError`](error::ScanError) and scanning
//! carries on, so a single run surfaces every lexical problem at once.
//!
//! ## Parsing
//! The [`parser`] is a hand-written recursive descent parser that turns the
//! tokens into [`Expr`](expr::Expr) and [`Stmt`](stmt::Stmt) trees,
//! climbing the usual precedence ladder for expressions. Syntax errors
//! become [`ParseError`](error::ParseError)s; after one, the parser
//! discards tokens until a likely statement boundary and keeps parsing so
//! later errors are still found. `for` loops are rewritten here into
//! `while` loops, so the later stages never see one.
//!
//! ## Resolving
//! The [`resolver`] is a static pass over the finished tree. It measures,
//! for every variable use, how many scopes sit between the use and the
//! binding, and hands those distances to the interpreter. It also rejects
//! programs that are syntactically fine but semantically broken, like
//! `return` at the top level or a class inheriting from itself, as
//! [`ResolveError`](error::ResolveError)s.
//!
//! ## Interpreting
//! The [`interpreter`] walks the tree and evaluates it. Scopes are a chain
//! of [`Environment`](environment::Environment)s; resolved locals are read
//! at their recorded distance, everything else falls back to the globals.
//! Type mistakes that the static passes cannot see, like adding a string
//! to a number, surface here as [`RuntimeError`](error::RuntimeError)s and
//! stop the program.

use std::io::Write;
use std::{fs, process};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod error;
pub mod token;
pub mod literal;
pub mod scanner;
pub mod expr;
pub mod stmt;
pub mod ast;
pub mod parser;
pub mod resolver;
pub mod interpreter;
pub mod environment;
pub mod object;
pub mod function;
pub mod class;

use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The runner: owns the interpreter that lives across runs (so globals
/// persist between prompt lines) and drives the pipeline stage by stage.
/// Program output goes to the injected writer; diagnostics go to stderr.
#[allow(non_camel_case_types)]
pub struct slate<'out> {
    interpreter: interpreter::Interpreter<'out>,
}

impl<'out> slate<'out> {
    pub fn new(out: &'out mut dyn Write) -> Self {
        slate {
            interpreter: interpreter::Interpreter::new(out),
        }
    }

    /// Runs a script from a file and exits the process on failure:
    /// 65 for static errors, 70 for runtime errors.
    pub fn run_file(&mut self, path: &str) {
        let contents = fs::read_to_string(path)
            .expect("should have been able to read the script file");

        self.run(&contents);

        if error::had_error() {
            process::exit(65);
        }
        if error::had_runtime_error() {
            process::exit(70);
        }
    }

    /// Runs an interactive prompt until end-of-file. Errors are reported
    /// and forgotten so the session survives them.
    pub fn run_prompt(&mut self) {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(error) => {
                eprintln!("Could not start the prompt: {error}");
                return;
            }
        };

        let history = home::home_dir().map(|path| path.join(".slate_history"));
        if let Some(path) = &history {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    error::reset();
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("{error}");
                    break;
                }
            }
        }

        if let Some(path) = &history {
            let _ = editor.save_history(path);
        }
    }

    fn run(&mut self, source: &str) {
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens();

        if error::had_error() {
            return;
        }

        // Nothing but the end-of-file marker.
        if tokens.len() == 1 {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::had_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::had_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
