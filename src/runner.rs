use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::printer::AstPrinter;

/// Run a whole script: lex, parse, report every collected diagnostic, then
/// evaluate only if the unit was syntactically clean. Errors never cross
/// this boundary as Rust errors.
pub fn run(source: &str, filename: Option<&str>) {
    let mut lexer = Lexer::new(source.to_string());
    let (tokens, lex_errors) = lexer.scan_tokens();
    for error in &lex_errors {
        error.report(source, filename);
    }

    let mut parser = Parser::new(tokens);
    let (program, parse_errors) = parser.parse();
    for error in &parse_errors {
        error.report(source, filename);
    }

    if !lex_errors.is_empty() || !parse_errors.is_empty() {
        return;
    }

    let mut evaluator = Evaluator::new();
    evaluator.run(&program);
}

/// Print the parenthesized syntax tree of a script instead of executing it.
pub fn print_ast(source: &str, filename: Option<&str>) {
    let mut lexer = Lexer::new(source.to_string());
    let (tokens, lex_errors) = lexer.scan_tokens();
    for error in &lex_errors {
        error.report(source, filename);
    }

    let mut parser = Parser::new(tokens);
    let (program, parse_errors) = parser.parse();
    for error in &parse_errors {
        error.report(source, filename);
    }

    let rendered = AstPrinter::new().print_program(&program);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}
