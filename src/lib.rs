// Fleet Language Interpreter Library
//
// This is the core library for the Fleet storyboard language: a lexical
// scanner, a recursive-descent parser, and a tree-walking evaluator for a
// small DSL built around storyboards (procedures), actors (variables),
// actions (executable blocks), scenes (counted loops) and rolls (calls).

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{ActionBody, Expr, Program, Stmt};
pub use error::{ErrorKind, FleetError, RuntimeErrorKind, Span};
pub use evaluator::{Environment, Evaluator, StoryboardDef};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use printer::AstPrinter;
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
