use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

use crate::lexer::Token;

#[derive(Debug, Clone)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    Syntax,
    Runtime(RuntimeErrorKind),
}

/// The closed set of failures the evaluator can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndeclaredVariable,
    UnknownStoryboard,
    InvalidOperand,
    DivisionByZero,
    MisplacedIf,
    InvalidSceneCount,
}

/// A diagnostic carrying a source span (for annotated reports) and a 1-based
/// line number (for the line-oriented diagnostic text).
///
/// A syntax error with `lexeme == None` occurred at end of input.
#[derive(Debug, Clone)]
pub struct FleetError {
    pub kind: ErrorKind,
    pub span: Span,
    pub line: usize,
    pub message: String,
    pub lexeme: Option<String>,
    pub help: Option<String>,
}

impl FleetError {
    pub fn syntax_error(span: Span, line: usize, lexeme: &str, message: String) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            span,
            line,
            message,
            lexeme: Some(lexeme.to_string()),
            help: None,
        }
    }

    pub fn syntax_error_at_end(span: Span, line: usize, message: String) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            span,
            line,
            message,
            lexeme: None,
            help: None,
        }
    }

    pub fn runtime_error(kind: RuntimeErrorKind, token: &Token, message: String) -> Self {
        Self {
            kind: ErrorKind::Runtime(kind),
            span: token.span.clone(),
            line: token.line,
            message,
            lexeme: Some(token.lexeme.clone()),
            help: None,
        }
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn runtime_kind(&self) -> Option<RuntimeErrorKind> {
        match self.kind {
            ErrorKind::Runtime(kind) => Some(kind),
            ErrorKind::Syntax => None,
        }
    }

    /// Render an annotated source report to the terminal.
    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let color = match self.kind {
            ErrorKind::Syntax => Color::Yellow,
            ErrorKind::Runtime(_) => Color::Magenta,
        };

        let kind_str = match self.kind {
            ErrorKind::Syntax => "Syntax Error",
            ErrorKind::Runtime(_) => "Runtime Error",
        };

        let mut report_builder = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .eprint((filename, Source::from(source)))
            .ok();
    }
}

impl fmt::Display for FleetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::Runtime(_) => {
                write!(f, "[line {}] Runtime error: {}", self.line, self.message)
            }
            ErrorKind::Syntax => match &self.lexeme {
                Some(lexeme) => write!(
                    f,
                    "[line {}] Error at '{}': {}",
                    self.line, lexeme, self.message
                ),
                None => write!(f, "[line {}] Error at end: {}", self.line, self.message),
            },
        }
    }
}

impl std::error::Error for FleetError {}
