mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod printer;
mod repl;
mod runner;
mod value;

use clap::{Arg, Command};
use std::fs;
use std::path::Path;

fn main() {
    let matches = Command::new("fleet")
        .about("A tree-walking interpreter for the Fleet storyboard language")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Print the parsed syntax tree instead of executing")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let print_ast = matches.get_flag("ast");
    let interactive = matches.get_flag("interactive");
    let file = matches.get_one::<String>("file");

    if wants_repl(file.map(String::as_str), interactive) {
        repl::start();
    } else if let Some(file_path) = file {
        run_file(file_path, print_ast);
    }
}

/// `-i` forces the REPL even when a file argument is present; with no file,
/// the REPL is the default.
fn wants_repl(file: Option<&str>, interactive: bool) -> bool {
    interactive || file.is_none()
}

fn run_file(path: &str, print_ast: bool) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        std::process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.to_str();
            if print_ast {
                runner::print_ast(&source, filename);
            } else {
                runner::run(&source, filename);
            }
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
