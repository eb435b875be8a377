use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use std::io::{self, Write};

/// Accumulates raw input lines into one runnable unit. A unit is complete
/// once a line's last whitespace-separated word is the `cut` keyword itself;
/// an identifier that merely ends in "cut" does not count.
#[derive(Default)]
pub struct UnitBuffer {
    buffer: String,
}

impl UnitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Add one line, returning the whole unit when this line completes it.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        self.buffer.push_str(line);
        if !line.ends_with('\n') {
            self.buffer.push('\n');
        }

        if ends_unit(line) {
            Some(std::mem::take(&mut self.buffer))
        } else {
            None
        }
    }
}

/// True when the line's final word is exactly the `cut` keyword.
pub fn ends_unit(line: &str) -> bool {
    line.split_whitespace().next_back() == Some("cut")
}

/// Interactive prompt. Lines are buffered until one is terminated by the
/// `cut` keyword, then the whole buffer is run as one unit against a
/// persistent evaluator, so storyboards declared earlier stay callable.
pub fn start() {
    println!("Fleet interpreter v0.1.0");
    println!("Finish a storyboard with 'cut' to run it; 'exit' or Ctrl+D to quit");
    println!();

    let mut evaluator = Evaluator::new();
    let mut unit = UnitBuffer::new();

    loop {
        if unit.is_empty() {
            print!("> ");
        } else {
            print!(". ");
        }
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                if unit.is_empty() {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if trimmed == "exit" || trimmed == "quit" {
                        println!("Goodbye!");
                        break;
                    }
                }

                if let Some(source) = unit.push_line(&line) {
                    run_unit(&source, &mut evaluator);
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_unit(source: &str, evaluator: &mut Evaluator) {
    let mut lexer = Lexer::new(source.to_string());
    let (tokens, lex_errors) = lexer.scan_tokens();
    for error in &lex_errors {
        error.report(source, None);
    }

    let mut parser = Parser::new(tokens);
    let (program, parse_errors) = parser.parse();
    for error in &parse_errors {
        error.report(source, None);
    }

    // A malformed unit is reported but never executed
    if !lex_errors.is_empty() || !parse_errors.is_empty() {
        return;
    }

    evaluator.run(&program);
}
