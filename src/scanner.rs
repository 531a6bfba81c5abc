use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use substring::Substring;

use crate::error::{ScanError, Throw};
use crate::literal::Literal;
use crate::token::{Kind, Token};

pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,   // char offset of the current lexeme
    current: usize, // char offset of the next unconsumed char
    line: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source,
            chars: source.chars().peekmore(),
            tokens: vec![],
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scans the source code and returns the tokens, ending with `Eof`.
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(Kind::Eof, String::new(), None, self.line));

        self.tokens.clone()
    }

    /// Consumes and returns the next character.
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.current += 1;
        }
        c
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Returns the character after the next one without consuming either.
    fn peek_next(&mut self) -> Option<char> {
        self.chars.advance_cursor();
        let c = self.chars.peek().copied();
        self.chars.reset_cursor();
        c
    }

    /// Consumes the next character only if it matches the expected one.
    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            return true;
        }
        false
    }

    /// Returns if the scanner has reached the end of the file.
    fn is_at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// The exact source slice of the current lexeme.
    fn lexeme(&self) -> String {
        self.source.substring(self.start, self.current).to_string()
    }

    /// Adds a new token to the list of tokens.
    fn add_token(&mut self, kind: Kind, literal: Option<Literal>) {
        self.tokens.push(Token::new(kind, self.lexeme(), literal, self.line));
    }

    /// Handles a string literal.
    fn string(&mut self) {
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            ScanError {
                line: self.line,
                message: String::from("Unterminated string."),
            }.throw();
            return;
        }

        self.advance(); // The closing double quote.

        // The literal does not include the double quotes unlike the lexeme.
        let value = self.source.substring(self.start + 1, self.current - 1).to_string();
        self.add_token(Kind::String, Some(Literal::String(value)));
    }

    /// Handles a number literal.
    fn number(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        // A fractional part requires a digit after the dot; otherwise the
        // dot is left for the next token.
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            self.advance(); // The dot.

            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let value: f64 = self.lexeme().parse().expect("scanned number to parse as f64");
        self.add_token(Kind::Number, Some(Literal::Number(value)));
    }

    /// Handles an identifier or a keyword.
    ///
    /// Continuation characters are alphabetic or underscore only; a digit
    /// terminates the identifier and starts the next token.
    fn identifier(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_alphabetic() || c == '_') {
            self.advance();
        }

        let value = self.lexeme();
        let kind = match value.as_str() {
            "and"    => Kind::And,
            "class"  => Kind::Class,
            "else"   => Kind::Else,
            "false"  => Kind::False,
            "for"    => Kind::For,
            "fun"    => Kind::Fun,
            "if"     => Kind::If,
            "nil"    => Kind::Nil,
            "or"     => Kind::Or,
            "print"  => Kind::Print,
            "return" => Kind::Return,
            "super"  => Kind::Super,
            "this"   => Kind::This,
            "true"   => Kind::True,
            "var"    => Kind::Var,
            "while"  => Kind::While,
            _        => Kind::Identifier,
        };

        self.add_token(kind, None);
    }

    /// Scans the next token.
    fn scan_token(&mut self) {
        let Some(c) = self.advance() else { return };

        match c {
            // One character tokens
            '(' => self.add_token(Kind::LeftParen, None),
            ')' => self.add_token(Kind::RightParen, None),
            '{' => self.add_token(Kind::LeftBrace, None),
            '}' => self.add_token(Kind::RightBrace, None),
            ',' => self.add_token(Kind::Comma, None),
            '.' => self.add_token(Kind::Dot, None),
            '-' => self.add_token(Kind::Minus, None),
            '+' => self.add_token(Kind::Plus, None),
            ';' => self.add_token(Kind::Semicolon, None),
            '*' => self.add_token(Kind::Star, None),

            // Two character tokens
            '!' => {
                let kind = if self.match_next('=') { Kind::BangEqual } else { Kind::Bang };
                self.add_token(kind, None);
            },
            '=' => {
                let kind = if self.match_next('=') { Kind::EqualEqual } else { Kind::Equal };
                self.add_token(kind, None);
            },
            '<' => {
                let kind = if self.match_next('=') { Kind::LessEqual } else { Kind::Less };
                self.add_token(kind, None);
            },
            '>' => {
                let kind = if self.match_next('=') { Kind::GreaterEqual } else { Kind::Greater };
                self.add_token(kind, None);
            },
            '/' => {
                if self.match_next('/') {
                    // A comment runs until the end of the line.
                    while matches!(self.peek(), Some(c) if c != '\n') {
                        self.advance();
                    }
                } else {
                    self.add_token(Kind::Slash, None);
                }
            },

            // Ignore whitespace
            ' ' | '\r' | '\t' => {},

            '\n' => self.line += 1,

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),

            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => {
                ScanError {
                    line: self.line,
                    message: String::from("Unexpected character."),
                }.throw();
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<Kind> {
        Scanner::new(source).scan_tokens().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scan_punctuation() {
        assert_eq!(
            kinds("(){},.-+;*/"),
            vec![
                Kind::LeftParen, Kind::RightParen, Kind::LeftBrace, Kind::RightBrace,
                Kind::Comma, Kind::Dot, Kind::Minus, Kind::Plus, Kind::Semicolon,
                Kind::Star, Kind::Slash, Kind::Eof,
            ],
        );
    }

    #[test]
    fn scan_operators() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![
                Kind::Bang, Kind::BangEqual, Kind::Equal, Kind::EqualEqual,
                Kind::Less, Kind::LessEqual, Kind::Greater, Kind::GreaterEqual,
                Kind::Eof,
            ],
        );
    }

    #[test]
    fn scan_comment() {
        assert_eq!(kinds("// nothing to see here\n1;"), vec![Kind::Number, Kind::Semicolon, Kind::Eof]);
    }

    #[test]
    fn scan_string() {
        let tokens = Scanner::new("\"hello\"").scan_tokens();
        assert_eq!(tokens[0].kind, Kind::String);
        assert_eq!(tokens[0].lexeme, "\"hello\"");
        assert_eq!(tokens[0].literal, Some(Literal::String(String::from("hello"))));
    }

    #[test]
    fn scan_multiline_string() {
        let tokens = Scanner::new("\"line\nbreak\";").scan_tokens();
        assert_eq!(tokens[0].literal, Some(Literal::String(String::from("line\nbreak"))));
        // The token is reported on the line the string ends on.
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn scan_number() {
        let tokens = Scanner::new("42 3.25").scan_tokens();
        assert_eq!(tokens[0].literal, Some(Literal::Number(42.0)));
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.25)));
    }

    #[test]
    fn scan_number_with_trailing_dot() {
        // `123.` is a number followed by a dot token.
        assert_eq!(kinds("123."), vec![Kind::Number, Kind::Dot, Kind::Eof]);
    }

    #[test]
    fn scan_keywords() {
        assert_eq!(
            kinds("and class else false fun for if nil or print return super this true var while"),
            vec![
                Kind::And, Kind::Class, Kind::Else, Kind::False, Kind::Fun, Kind::For,
                Kind::If, Kind::Nil, Kind::Or, Kind::Print, Kind::Return, Kind::Super,
                Kind::This, Kind::True, Kind::Var, Kind::While, Kind::Eof,
            ],
        );
    }

    #[test]
    fn scan_identifier() {
        let tokens = Scanner::new("foo _bar baz_qux").scan_tokens();
        assert!(tokens[..3].iter().all(|t| t.kind == Kind::Identifier));
        assert_eq!(tokens[2].lexeme, "baz_qux");
    }

    #[test]
    fn identifier_stops_at_digit() {
        // Digits are not identifier continuation characters.
        let tokens = Scanner::new("abc1").scan_tokens();
        assert_eq!(tokens[0].kind, Kind::Identifier);
        assert_eq!(tokens[0].lexeme, "abc");
        assert_eq!(tokens[1].kind, Kind::Number);
        assert_eq!(tokens[1].literal, Some(Literal::Number(1.0)));
    }

    #[test]
    fn lexemes_are_source_slices() {
        let tokens = Scanner::new("var answer = 42;").scan_tokens();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["var", "answer", "=", "42", ";", ""]);
    }

    #[test]
    fn line_counting() {
        let tokens = Scanner::new("1;\n2;\n\n3;").scan_tokens();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[4].line, 4);
    }
}
