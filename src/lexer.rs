use crate::error::{FleetError, Span};
use crate::value::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Semicolon,
    Minus,
    Colon,

    // One or two character tokens
    ColonColon,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Keyword operators
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Not,

    // Literals
    Identifier,
    String,
    Char,
    Number,
    True,
    False,
    Null,

    // Keywords
    Storyboard,
    Actor,
    Role,
    Assign,
    Action,
    Present,
    Scene,
    Roll,
    To,
    Takes,
    Cut,
    If,
    Else,

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub literal: Option<Value>,
    pub line: usize,
    pub span: Span,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        lexeme: String,
        literal: Option<Value>,
        line: usize,
        span: Span,
    ) -> Self {
        Self {
            token_type,
            lexeme,
            literal,
            line,
            span,
        }
    }
}

pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    errors: Vec<FleetError>,
    start: usize,
    current: usize,
    line: usize,
    keywords: HashMap<&'static str, TokenType>,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("storyboard", TokenType::Storyboard);
        keywords.insert("Actor", TokenType::Actor);
        keywords.insert("Role", TokenType::Role);
        keywords.insert("Assign", TokenType::Assign);
        keywords.insert("Action", TokenType::Action);
        keywords.insert("Present", TokenType::Present);
        keywords.insert("Scene", TokenType::Scene);
        keywords.insert("Roll", TokenType::Roll);
        keywords.insert("to", TokenType::To);
        keywords.insert("takes", TokenType::Takes);
        keywords.insert("cut", TokenType::Cut);
        keywords.insert("if", TokenType::If);
        keywords.insert("else", TokenType::Else);
        keywords.insert("add", TokenType::Add);
        keywords.insert("sub", TokenType::Sub);
        keywords.insert("mul", TokenType::Mul);
        keywords.insert("div", TokenType::Div);
        keywords.insert("and", TokenType::And);
        keywords.insert("or", TokenType::Or);
        keywords.insert("not", TokenType::Not);
        keywords.insert("true", TokenType::True);
        keywords.insert("false", TokenType::False);
        keywords.insert("null", TokenType::Null);

        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            keywords,
        }
    }

    /// Scan the whole source. Never fails: unrecognized input is recorded as
    /// a syntax error and skipped, and the token sequence always ends with a
    /// single Eof token.
    pub fn scan_tokens(&mut self) -> (Vec<Token>, Vec<FleetError>) {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            "".to_string(),
            None,
            self.line,
            Span::single(self.current),
        ));

        (
            std::mem::take(&mut self.tokens),
            std::mem::take(&mut self.errors),
        )
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            ';' => self.add_token(TokenType::Semicolon),
            '-' => self.add_token(TokenType::Minus),
            ':' => {
                let token_type = if self.match_char(':') {
                    TokenType::ColonColon
                } else {
                    TokenType::Colon
                };
                self.add_token(token_type);
            }
            '!' => {
                let token_type = if self.match_char('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(token_type);
            }
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(token_type);
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }
            ' ' | '\r' | '\t' => {
                // Ignore whitespace
            }
            '\n' => {
                self.line += 1;
            }
            '\'' => self.char_literal(),
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' || is_legacy_sigil(c) => self.identifier(),
            _ => self.error(format!("Unexpected character '{}'.", c)),
        }
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current..].chars().next().unwrap_or('\0');
        self.current += c.len_utf8();
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    fn char_literal(&mut self) {
        if self.is_at_end() {
            self.error("Unterminated character literal.".to_string());
            return;
        }

        let value = self.advance();

        // Exactly one character must sit between the quotes
        if self.peek() != '\'' {
            self.error("Invalid character literal.".to_string());
            return;
        }
        self.advance();

        self.add_token_with_literal(TokenType::Char, Value::Char(value));
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.error("Unterminated string.".to_string());
            return;
        }

        // Consume the closing "
        self.advance();

        let contents = self.source[self.start + 1..self.current - 1].to_string();
        self.add_token_with_literal(TokenType::String, Value::Str(contents));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // One optional decimal point followed by digits
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let number_slice = &self.source[self.start..self.current];
        match number_slice.parse::<f64>() {
            Ok(value) => self.add_token_with_literal(TokenType::Number, Value::Number(value)),
            Err(_) => self.error(format!("Invalid number: {}", number_slice)),
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' || is_legacy_sigil(self.peek()) {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        let token_type = self
            .keywords
            .get(text)
            .cloned()
            .unwrap_or(TokenType::Identifier);

        match token_type {
            TokenType::True => self.add_token_with_literal(token_type, Value::Bool(true)),
            TokenType::False => self.add_token_with_literal(token_type, Value::Bool(false)),
            TokenType::Null => self.add_token_with_literal(token_type, Value::Nil),
            _ => self.add_token(token_type),
        }
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text = self.source[self.start..self.current].to_string();
        self.tokens.push(Token::new(
            token_type,
            text,
            None,
            self.line,
            Span::new(self.start, self.current),
        ));
    }

    fn add_token_with_literal(&mut self, token_type: TokenType, literal: Value) {
        let text = self.source[self.start..self.current].to_string();
        self.tokens.push(Token::new(
            token_type,
            text,
            Some(literal),
            self.line,
            Span::new(self.start, self.current),
        ));
    }

    fn error(&mut self, message: String) {
        let lexeme = self.source[self.start..self.current].to_string();
        self.errors.push(FleetError::syntax_error(
            Span::new(self.start, self.current),
            self.line,
            &lexeme,
            message,
        ));
    }
}

/// The earlier dialect spelled its keywords with sigils (`#i`, `^w`, ...);
/// these characters are still accepted in identifiers for backward
/// compatibility.
fn is_legacy_sigil(c: char) -> bool {
    matches!(c, '#' | '@' | '%' | '^' | '?')
}
