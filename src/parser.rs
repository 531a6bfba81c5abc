use std::rc::Rc;

use crate::error::{ParseError, Throw};
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Kind, Token};

type ParseResult<T> = Result<T, ParseError>;

/// Returns if the next token is any of the given kinds and consumes it.
macro_rules! matches {
    ( $self:ident, $( $kind:expr ),+ ) => {
        {
            if $( $self.check($kind) ) ||* {
                $self.advance();
                true
            } else {
                false
            }
        }
    }
}

/// Parses the tokens and returns the resulting statements.
///
/// - Program     -> Declaration* EOF ;
/// - Block       -> "{" Declaration* "}" ;
/// - Declaration -> ClassDecl | FunDecl | VarDecl | Statement ;
/// - ClassDecl   -> "class" IDENTIFIER ( "<" IDENTIFIER )? "{" Function* "}" ;
/// - FunDecl     -> "fun" Function ;
/// - VarDecl     -> "var" IDENTIFIER ( "=" Expression )? ";" ;
/// - Function    -> IDENTIFIER "(" Parameters? ")" Block ;
/// - Parameters  -> IDENTIFIER ( "," IDENTIFIER )* ;
/// - Statement   -> ExprStmt | ForStmt | IfStmt | PrintStmt | ReturnStmt | WhileStmt | Block ;
/// - ExprStmt    -> Expression ";" ;
/// - ForStmt     -> "for" "(" ( VarDecl | ExprStmt | ";" ) Expression? ";" Expression? ")" Statement ;
/// - IfStmt      -> "if" "(" Expression ")" Statement ( "else" Statement )? ;
/// - PrintStmt   -> "print" Expression ";" ;
/// - ReturnStmt  -> "return" Expression? ";" ;
/// - WhileStmt   -> "while" "(" Expression ")" Statement ;
/// - Expression  -> Assignment ;
/// - Assignment  -> ( Call "." )? IDENTIFIER "=" Assignment | LogicOr ;
/// - LogicOr     -> LogicAnd ( "or" LogicAnd )* ;
/// - LogicAnd    -> Equality ( "and" Equality )* ;
/// - Equality    -> Comparison ( ( "!=" | "==" ) Comparison )* ;
/// - Comparison  -> Term ( ( ">" | ">=" | "<" | "<=" ) Term )* ;
/// - Term        -> Factor ( ( "+" | "-" ) Factor )* ;
/// - Factor      -> Unary ( ( "*" | "/" ) Unary )* ;
/// - Unary       -> ( "!" | "-" ) Unary | Call ;
/// - Arguments   -> Expression ( "," Expression )* ;
/// - Call        -> Primary ( "(" Arguments? ")" | "." IDENTIFIER )* ;
/// - Primary     -> NUMBER | STRING | "false" | "true" | "nil" | "this" | "(" Expression ")" | IDENTIFIER | "super" "." IDENTIFIER ;
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    next_id: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            next_id: 0,
        }
    }

    /// Parses the tokens and returns the resulting statements.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        statements
    }

    /// Hands out the identity of the next resolvable expression node.
    fn new_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Returns the next token without consuming it.
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Returns the previous token without consuming it.
    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Returns if the parser has reached the end of the file.
    fn is_at_end(&self) -> bool {
        self.peek().kind == Kind::Eof
    }

    /// Returns if the next token is of the given kind.
    fn check(&self, kind: Kind) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().kind == kind
    }

    /// Consumes the next token and returns it.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    /// Reports a parse error at the given token and returns it.
    fn error(&self, token: &Token, message: &str) -> ParseError {
        let error = ParseError {
            token: token.clone(),
            message: message.to_string(),
        };
        error.throw();
        error
    }

    /// Consumes the next token if it is of the given kind.
    fn consume(&mut self, kind: Kind, message: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }

        Err(self.error(self.peek(), message))
    }

    /// Parses a declaration.
    fn declaration(&mut self) -> Option<Stmt> {
        let statement = if matches!(self, Kind::Class) {
            self.class_declaration()
        } else if matches!(self, Kind::Fun) {
            self.function("function").map(Stmt::Function)
        } else if matches!(self, Kind::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match statement {
            Ok(stmt) => Some(stmt),
            // The error was already reported; skip to the next statement
            // boundary and keep going.
            Err(_) => {
                self.synchronize();
                None
            }
        }
    }

    /// Parses a class declaration.
    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Kind::Identifier, "Expect class name.")?.clone();

        let superclass = if matches!(self, Kind::Less) {
            self.consume(Kind::Identifier, "Expect superclass name.")?;
            let name = self.previous().clone();
            Some(VariableData { id: self.new_id(), name })
        } else {
            None
        };

        self.consume(Kind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = vec![];
        while !self.check(Kind::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(Kind::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    /// Parses a variable declaration.
    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Kind::Identifier, "Expect variable name.")?.clone();

        let initializer = if matches!(self, Kind::Equal) {
            self.expression()?
        } else {
            Expr::Literal(Literal::Nil)
        };

        self.consume(Kind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    /// Parses a statement.
    fn statement(&mut self) -> ParseResult<Stmt> {
        if matches!(self, Kind::For) {
            return self.for_statement();
        }

        if matches!(self, Kind::If) {
            return self.if_statement();
        }

        if matches!(self, Kind::Print) {
            return self.print_statement();
        }

        if matches!(self, Kind::Return) {
            return self.return_statement();
        }

        if matches!(self, Kind::While) {
            return self.while_statement();
        }

        if matches!(self, Kind::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    /// Parses a for statement.
    ///
    /// There is no for statement at runtime; the clauses are lowered here
    /// into an initializer block around a while loop whose body runs the
    /// increment after the original body.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Kind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if matches!(self, Kind::Semicolon) {
            None
        } else if matches!(self, Kind::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = match !self.check(Kind::Semicolon) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Kind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = match !self.check(Kind::RightParen) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Kind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(BlockData {
                statements: vec![
                    body,
                    Stmt::Expression(ExpressionData { expr: increment }),
                ],
            });
        }

        // A missing condition loops forever.
        body = Stmt::While(WhileData {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockData {
                statements: vec![initializer, body],
            });
        }

        Ok(body)
    }

    /// Parses an if statement.
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Kind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Kind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if matches!(self, Kind::Else) {
            Box::new(self.statement()?)
        } else {
            Box::new(Stmt::Null)
        };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    /// Parses a print statement.
    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Kind::Semicolon, "Expect ';' after value.")?;

        Ok(Stmt::Print(PrintData { expr }))
    }

    /// Parses a return statement.
    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = match self.check(Kind::Semicolon) {
            true => None,
            false => Some(self.expression()?),
        };

        self.consume(Kind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    /// Parses a while statement.
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Kind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Kind::RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;

        Ok(Stmt::While(WhileData {
            condition,
            body: Box::new(body),
        }))
    }

    /// Parses an expression statement.
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Kind::Semicolon, "Expect ';' after expression.")?;

        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    /// Parses a function declaration.
    fn function(&mut self, kind: &str) -> ParseResult<Rc<FunctionData>> {
        let name = self.consume(Kind::Identifier, &format!("Expect {kind} name."))?.clone();

        self.consume(Kind::LeftParen, &format!("Expect '(' after {kind} name."))?;

        let mut params = vec![];

        if !self.check(Kind::RightParen) {
            loop {
                if params.len() >= 255 {
                    // Reported but not fatal; parsing carries on.
                    self.error(self.peek(), "Can't have more than 255 parameters.");
                }

                params.push(self.consume(Kind::Identifier, "Expect parameter name.")?.clone());

                if !matches!(self, Kind::Comma) {
                    break;
                }
            }
        }

        self.consume(Kind::RightParen, "Expect ')' after parameters.")?;

        self.consume(Kind::LeftBrace, &format!("Expect '{{' before {kind} body."))?;

        let body = self.block()?;

        Ok(Rc::new(FunctionData { name, params, body }))
    }

    /// Parses a block statement.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Kind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(Kind::RightBrace, "Expect '}' after block.")?;

        Ok(statements)
    }

    /// Parses an expression.
    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Parses an assignment expression.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if matches!(self, Kind::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(variable) => Ok(Expr::Assign(AssignData {
                    id: variable.id,
                    name: variable.name,
                    value: Box::new(value),
                })),
                Expr::Get(get) => Ok(Expr::Set(SetData {
                    object: get.object,
                    name: get.name,
                    value: Box::new(value),
                })),
                expr => {
                    // Reported but not fatal; the left-hand side stands.
                    self.error(&equals, "Invalid assignment target.");
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    /// Parses an or expression.
    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while matches!(self, Kind::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an and expression.
    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while matches!(self, Kind::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an equality expression.
    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while matches!(self, Kind::BangEqual, Kind::EqualEqual) {
            let operator = self.previous().clone();
            let right = self.comparison()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a comparison expression.
    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while matches!(self, Kind::Greater, Kind::GreaterEqual, Kind::Less, Kind::LessEqual) {
            let operator = self.previous().clone();
            let right = self.term()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a term expression.
    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while matches!(self, Kind::Minus, Kind::Plus) {
            let operator = self.previous().clone();
            let right = self.factor()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a factor expression.
    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while matches!(self, Kind::Slash, Kind::Star) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a unary expression.
    fn unary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Kind::Bang, Kind::Minus) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            return Ok(Expr::Unary(UnaryData {
                operator,
                expr: Box::new(right),
            }));
        }

        self.call()
    }

    /// Parses the arguments of a call.
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = vec![];

        if !self.check(Kind::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    // Reported but not fatal; parsing carries on.
                    self.error(self.peek(), "Can't have more than 255 arguments.");
                }

                arguments.push(self.expression()?);

                if !matches!(self, Kind::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(Kind::RightParen, "Expect ')' after arguments.")?.clone();

        Ok(Expr::Call(CallData {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    /// Parses a call expression.
    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if matches!(self, Kind::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if matches!(self, Kind::Dot) {
                let name = self.consume(Kind::Identifier, "Expect property name after '.'.")?.clone();
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses a primary expression.
    fn primary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Kind::False) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }

        if matches!(self, Kind::True) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }

        if matches!(self, Kind::Nil) {
            return Ok(Expr::Literal(Literal::Nil));
        }

        if matches!(self, Kind::Number, Kind::String) {
            return Ok(Expr::Literal(self.previous().literal.clone()
                .expect("number or string token to carry a literal")));
        }

        if matches!(self, Kind::Super) {
            let keyword = self.previous().clone();
            self.consume(Kind::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Kind::Identifier, "Expect superclass method name.")?.clone();

            return Ok(Expr::Super(SuperData { id: self.new_id(), keyword, method }));
        }

        if matches!(self, Kind::This) {
            let keyword = self.previous().clone();
            return Ok(Expr::This(ThisData { id: self.new_id(), keyword }));
        }

        if matches!(self, Kind::Identifier) {
            let name = self.previous().clone();
            return Ok(Expr::Variable(VariableData { id: self.new_id(), name }));
        }

        if matches!(self, Kind::LeftParen) {
            let expr = self.expression()?;
            self.consume(Kind::RightParen, "Expect ')' after expression.")?;

            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(self.error(self.peek(), "Could not match token."))
    }

    /// Tries to recover from a parse error by discarding tokens until a
    /// likely statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == Kind::Semicolon {
                return;
            }

            match self.peek().kind {
                Kind::Class
                | Kind::Fun
                | Kind::Var
                | Kind::For
                | Kind::If
                | Kind::While
                | Kind::Print
                | Kind::Return => return,
                _ => self.advance(),
            };
        }
    }
}
