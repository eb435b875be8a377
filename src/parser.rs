use crate::ast::{ActionBody, Expr, Program, Stmt};
use crate::error::{FleetError, Span};
use crate::lexer::{Token, TokenType};
use crate::value::Value;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<FleetError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parse a whole compilation unit. Never raises: syntax errors are
    /// collected and the parser resynchronizes at the next statement or
    /// declaration boundary, so one malformed storyboard does not abort
    /// parsing of the rest.
    pub fn parse(&mut self) -> (Program, Vec<FleetError>) {
        let mut declarations = Vec::new();

        while !self.is_at_end() {
            match self.storyboard_declaration() {
                Ok(declaration) => declarations.push(declaration),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }

        (
            Program { declarations },
            std::mem::take(&mut self.errors),
        )
    }

    fn storyboard_declaration(&mut self) -> Result<Stmt, FleetError> {
        let start_span = self.peek().span.start;

        self.consume_with_help(
            TokenType::Storyboard,
            "Expect 'storyboard' declaration.",
            "Only storyboard declarations may appear at the top level. Example: storyboard Main { ... } cut".to_string(),
        )?;

        let name = self
            .consume(TokenType::Identifier, "Expect storyboard name.")?
            .clone();
        if !name.lexeme.chars().next().is_some_and(char::is_uppercase) {
            return Err(self.error(
                &name,
                "Storyboard names must begin with an uppercase letter.",
            ));
        }

        let mut params = Vec::new();
        if self.match_types(&[TokenType::LeftParen]) {
            if !self.check(&TokenType::RightParen) {
                loop {
                    params.push(
                        self.consume(TokenType::Identifier, "Expect parameter name.")?
                            .clone(),
                    );
                    if !self.match_types(&[TokenType::Comma]) {
                        break;
                    }
                }
            }
            self.consume(TokenType::RightParen, "Expect ')' after parameters.")?;
        }

        self.consume(TokenType::LeftBrace, "Expect '{' before storyboard body.")?;
        let body = self.block()?;
        self.consume_with_help(
            TokenType::Cut,
            "Expect 'cut' after storyboard body.",
            "Every storyboard ends with the 'cut' keyword: storyboard Main { ... } cut".to_string(),
        )?;

        Ok(Stmt::Storyboard {
            name,
            params,
            body,
            span: Span::new(start_span, self.previous().span.end),
        })
    }

    /// Parse statements until the closing brace, recovering locally so one
    /// malformed statement does not take the rest of the block with it.
    fn block(&mut self) -> Result<Vec<Stmt>, FleetError> {
        let mut statements = Vec::new();

        while !self.check(&TokenType::RightBrace)
            && !self.check(&TokenType::Cut)
            && !self.check(&TokenType::Storyboard)
            && !self.is_at_end()
        {
            match self.statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }

        self.consume_with_help(
            TokenType::RightBrace,
            "Expect '}' after block.",
            "Blocks must be closed with '}' after the opening '{'.".to_string(),
        )?;
        Ok(statements)
    }

    fn statement(&mut self) -> Result<Stmt, FleetError> {
        if self.match_types(&[TokenType::Actor]) {
            self.actor_declaration()
        } else if self.match_types(&[TokenType::Assign]) {
            self.assign_statement()
        } else if self.match_types(&[TokenType::Action]) {
            self.action_statement()
        } else if self.match_types(&[TokenType::Present]) {
            self.present_statement()
        } else if self.match_types(&[TokenType::Scene]) {
            self.scene_statement()
        } else if self.match_types(&[TokenType::If]) {
            self.if_statement()
        } else if self.match_types(&[TokenType::Roll]) {
            self.roll_statement()
        } else if self.match_types(&[TokenType::LeftBrace]) {
            let start_span = self.previous().span.start;
            let statements = self.block()?;
            Ok(Stmt::Block {
                statements,
                span: Span::new(start_span, self.previous().span.end),
            })
        } else {
            Err(self.error(&self.peek().clone(), "Expect statement."))
        }
    }

    fn actor_declaration(&mut self) -> Result<Stmt, FleetError> {
        let start_span = self.previous().span.start;

        self.consume(TokenType::ColonColon, "Expect '::' after 'Actor'.")?;
        let name = self
            .consume(TokenType::Identifier, "Expect actor name after '::'.")?
            .clone();
        self.consume_with_help(
            TokenType::Role,
            "Expect 'Role' after actor name.",
            "Actor declarations name a datatype tag: Actor :: x Role :: int".to_string(),
        )?;
        self.consume(TokenType::ColonColon, "Expect '::' after 'Role'.")?;
        let datatype = self
            .consume(TokenType::Identifier, "Expect datatype after 'Role ::'.")?
            .clone();
        self.consume_optional_semicolon();

        Ok(Stmt::Actor {
            name,
            datatype,
            span: Span::new(start_span, self.previous().span.end),
        })
    }

    fn assign_statement(&mut self) -> Result<Stmt, FleetError> {
        let start_span = self.previous().span.start;

        self.consume(TokenType::ColonColon, "Expect '::' after 'Assign'.")?;
        let value = self.expression()?;
        self.consume_with_help(
            TokenType::To,
            "Expect 'to' after assigned value.",
            "Assignments name their target last: Assign :: x add 1 to x".to_string(),
        )?;
        let target = self
            .consume(TokenType::Identifier, "Expect variable name after 'to'.")?
            .clone();
        self.consume_optional_semicolon();

        Ok(Stmt::Assign {
            target,
            value,
            span: Span::new(start_span, self.previous().span.end),
        })
    }

    fn action_statement(&mut self) -> Result<Stmt, FleetError> {
        let start_span = self.previous().span.start;

        self.consume(TokenType::ColonColon, "Expect '::' after 'Action'.")?;
        let body = if self.match_types(&[TokenType::LeftBrace]) {
            ActionBody::Block(self.block()?)
        } else {
            let expr = self.expression()?;
            self.consume_optional_semicolon();
            ActionBody::Expr(expr)
        };

        Ok(Stmt::Action {
            body,
            span: Span::new(start_span, self.previous().span.end),
        })
    }

    fn present_statement(&mut self) -> Result<Stmt, FleetError> {
        let start_span = self.previous().span.start;

        self.consume(TokenType::ColonColon, "Expect '::' after 'Present'.")?;
        let value = self.expression()?;
        self.consume_optional_semicolon();

        Ok(Stmt::Present {
            value,
            span: Span::new(start_span, self.previous().span.end),
        })
    }

    fn scene_statement(&mut self) -> Result<Stmt, FleetError> {
        let keyword = self.previous().clone();
        let start_span = keyword.span.start;

        self.consume(TokenType::ColonColon, "Expect '::' after 'Scene'.")?;
        let count = self.expression()?;
        self.consume_with_help(
            TokenType::Takes,
            "Expect 'takes' after scene count.",
            "Scenes run their body a counted number of times: Scene :: 3 takes { ... }".to_string(),
        )?;
        self.consume(TokenType::LeftBrace, "Expect '{' after 'takes'.")?;
        let body = self.block()?;

        Ok(Stmt::Scene {
            keyword,
            count,
            body,
            span: Span::new(start_span, self.previous().span.end),
        })
    }

    fn if_statement(&mut self) -> Result<Stmt, FleetError> {
        let keyword = self.previous().clone();
        let start_span = keyword.span.start;

        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_types(&[TokenType::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        let end_span = if let Some(ref else_stmt) = else_branch {
            else_stmt.span().end
        } else {
            then_branch.span().end
        };

        Ok(Stmt::If {
            keyword,
            condition,
            then_branch,
            else_branch,
            span: Span::new(start_span, end_span),
        })
    }

    fn roll_statement(&mut self) -> Result<Stmt, FleetError> {
        let start_span = self.previous().span.start;

        self.consume(TokenType::ColonColon, "Expect '::' after 'Roll'.")?;
        let name = self
            .consume(TokenType::Identifier, "Expect storyboard name after '::'.")?
            .clone();

        let mut argument = None;
        if self.match_types(&[TokenType::LeftParen]) {
            if !self.check(&TokenType::RightParen) {
                argument = Some(self.expression()?);
                if self.check(&TokenType::Comma) {
                    return Err(self
                        .error(&self.peek().clone(), "Roll supports at most one argument.")
                        .with_help(
                            "A storyboard call binds a single argument: Roll :: Foo(5)"
                                .to_string(),
                        ));
                }
            }
            self.consume(TokenType::RightParen, "Expect ')' after argument.")?;
        }
        self.consume_optional_semicolon();

        Ok(Stmt::Roll {
            name,
            argument,
            span: Span::new(start_span, self.previous().span.end),
        })
    }

    // Expressions: or -> and -> equality -> comparison -> term -> factor
    // -> unary -> primary
    fn expression(&mut self) -> Result<Expr, FleetError> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr, FleetError> {
        let mut expr = self.and()?;

        while self.match_types(&[TokenType::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, FleetError> {
        let mut expr = self.equality()?;

        while self.match_types(&[TokenType::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, FleetError> {
        let mut expr = self.comparison()?;

        while self.match_types(&[TokenType::EqualEqual, TokenType::BangEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, FleetError> {
        let mut expr = self.term()?;

        while self.match_types(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, FleetError> {
        let mut expr = self.factor()?;

        while self.match_types(&[TokenType::Add, TokenType::Sub]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, FleetError> {
        let mut expr = self.unary()?;

        while self.match_types(&[TokenType::Mul, TokenType::Div]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, FleetError> {
        if self.match_types(&[
            TokenType::Not,
            TokenType::Bang,
            TokenType::Sub,
            TokenType::Minus,
        ]) {
            let operator = self.previous().clone();
            let operand = self.unary()?;
            let span = Span::new(operator.span.start, operand.span().end);
            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
                span,
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FleetError> {
        if self.is_at_end() {
            return Err(self.error(&self.peek().clone(), "Expect expression."));
        }

        let token = self.advance().clone();

        match token.token_type {
            TokenType::True
            | TokenType::False
            | TokenType::Null
            | TokenType::Number
            | TokenType::String
            | TokenType::Char => Ok(Expr::Literal {
                value: token.literal.clone().unwrap_or(Value::Nil),
                span: token.span,
            }),
            TokenType::Identifier => Ok(Expr::Variable {
                span: token.span.clone(),
                name: token,
            }),
            TokenType::LeftParen => {
                let start_span = token.span.clone();
                let expr = self.expression()?;
                let end_token = self.consume_with_help(
                    TokenType::RightParen,
                    "Expect ')' after expression.",
                    "Every opening parenthesis '(' must have a matching ')'.".to_string(),
                )?;
                let span = Span::new(start_span.start, end_token.span.end);
                Ok(Expr::Grouping {
                    expr: Box::new(expr),
                    span,
                })
            }
            _ => Err(self.error(&token, "Expect expression.")),
        }
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: &TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            &self.peek().token_type == token_type
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<&Token, FleetError> {
        if self.check(&token_type) {
            Ok(self.advance())
        } else {
            Err(self.error(&self.peek().clone(), message))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        message: &str,
        help: String,
    ) -> Result<&Token, FleetError> {
        self.consume(token_type, message)
            .map_err(|error| error.with_help(help))
    }

    fn error(&self, token: &Token, message: &str) -> FleetError {
        if token.token_type == TokenType::Eof {
            // Point just past the last real token rather than at Eof itself
            let span = if self.current > 0 {
                Span::single(self.tokens[self.current - 1].span.end)
            } else {
                token.span.clone()
            };
            FleetError::syntax_error_at_end(span, token.line, message.to_string())
        } else {
            FleetError::syntax_error(
                token.span.clone(),
                token.line,
                &token.lexeme,
                message.to_string(),
            )
        }
    }

    fn consume_optional_semicolon(&mut self) {
        if self.check(&TokenType::Semicolon) {
            self.advance();
        }
    }

    /// Discard tokens until the next statement or declaration boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::Semicolon {
                return;
            }

            match self.peek().token_type {
                TokenType::Storyboard
                | TokenType::Actor
                | TokenType::Assign
                | TokenType::Action
                | TokenType::Present
                | TokenType::Scene
                | TokenType::Roll
                | TokenType::If
                | TokenType::Cut => return,
                _ => {}
            }

            self.advance();
        }
    }
}

fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
    let span = Span::new(left.span().start, right.span().end);
    Expr::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span,
    }
}
