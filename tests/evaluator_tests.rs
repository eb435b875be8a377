// End-to-end behavioral tests: each test runs a complete source text through
// the lexer, parser and evaluator, capturing everything the program writes
// (values and runtime diagnostics share the output sink).

use fleet::evaluator::Evaluator;
use fleet::lexer::Lexer;
use fleet::parser::Parser;

fn run_program(source: &str) -> String {
    let mut lexer = Lexer::new(source.to_string());
    let (tokens, lex_errors) = lexer.scan_tokens();
    assert!(lex_errors.is_empty(), "unexpected lex errors: {:?}", lex_errors);

    let mut parser = Parser::new(tokens);
    let (program, parse_errors) = parser.parse();
    assert!(
        parse_errors.is_empty(),
        "unexpected parse errors: {:?}",
        parse_errors
    );

    let mut evaluator = Evaluator::with_output(Vec::new());
    evaluator.run(&program);
    String::from_utf8(evaluator.into_output()).expect("output should be valid UTF-8")
}

fn run_lines(source: &str) -> Vec<String> {
    run_program(source).lines().map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Present and value formatting
// ---------------------------------------------------------------------------

#[test]
fn present_prints_in_statement_order() {
    let lines = run_lines(
        "storyboard Main {
            Present :: 1
            Present :: \"two\"
            Present :: true
        } cut",
    );
    assert_eq!(lines, vec!["1", "two", "true"]);
}

#[test]
fn whole_numbers_print_without_decimal_point() {
    assert_eq!(run_lines("storyboard Main { Present :: 4 div 2 } cut"), vec!["2"]);
    assert_eq!(run_lines("storyboard Main { Present :: 7 div 2 } cut"), vec!["3.5"]);
    assert_eq!(run_lines("storyboard Main { Present :: -5 } cut"), vec!["-5"]);
}

#[test]
fn huge_whole_numbers_keep_the_float_rendering() {
    // Beyond the i64 range an integer cast would saturate
    assert_eq!(
        run_lines("storyboard Main { Present :: 99999999999999999999 } cut"),
        vec!["100000000000000000000"]
    );
    assert_eq!(
        run_lines("storyboard Main { Present :: -99999999999999999999 } cut"),
        vec!["-100000000000000000000"]
    );
}

#[test]
fn null_prints_as_nil() {
    assert_eq!(run_lines("storyboard Main { Present :: null } cut"), vec!["nil"]);
}

#[test]
fn storyboards_are_first_class_values() {
    assert_eq!(
        run_lines("storyboard Main { Present :: Main } cut"),
        vec!["<storyboard Main>"]
    );
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[test]
fn keyword_operators_follow_arithmetic_precedence() {
    assert_eq!(
        run_lines("storyboard Main { Present :: 1 add 2 mul 3 } cut"),
        vec!["7"]
    );
    assert_eq!(
        run_lines("storyboard Main { Present :: (1 add 2) mul 3 } cut"),
        vec!["9"]
    );
}

#[test]
fn add_concatenates_strings_and_chars() {
    assert_eq!(
        run_lines("storyboard Main { Present :: \"a\" add 1 } cut"),
        vec!["a1"]
    );
    assert_eq!(
        run_lines("storyboard Main { Present :: 'a' add 'b' } cut"),
        vec!["ab"]
    );
    assert_eq!(
        run_lines("storyboard Main { Present :: 2 add \"nd\" } cut"),
        vec!["2nd"]
    );
}

#[test]
fn equality_never_coerces_across_types() {
    assert_eq!(
        run_lines("storyboard Main { Present :: null == null } cut"),
        vec!["true"]
    );
    assert_eq!(
        run_lines("storyboard Main { Present :: 0 == false } cut"),
        vec!["false"]
    );
    assert_eq!(
        run_lines("storyboard Main { Present :: \"1\" != 1 } cut"),
        vec!["true"]
    );
}

#[test]
fn logical_operators_short_circuit() {
    // The right operand names an undeclared variable; it must never be read
    assert_eq!(
        run_lines("storyboard Main { Present :: false and missing } cut"),
        vec!["false"]
    );
    assert_eq!(
        run_lines("storyboard Main { Present :: true or missing } cut"),
        vec!["true"]
    );
}

#[test]
fn zero_is_truthy() {
    assert_eq!(
        run_lines("storyboard Main { Action :: { if (0) Present :: \"yes\" else Present :: \"no\" } } cut"),
        vec!["yes"]
    );
    assert_eq!(
        run_lines("storyboard Main { Action :: { if (null) Present :: \"yes\" else Present :: \"no\" } } cut"),
        vec!["no"]
    );
}

#[test]
fn unary_operators() {
    assert_eq!(
        run_lines("storyboard Main { Present :: not (1 < 2) } cut"),
        vec!["false"]
    );
    assert_eq!(
        run_lines("storyboard Main { Present :: sub 3 add 10 } cut"),
        vec!["7"]
    );
}

// ---------------------------------------------------------------------------
// Actors, assignment and scoping
// ---------------------------------------------------------------------------

#[test]
fn actors_start_at_zero() {
    assert_eq!(
        run_lines("storyboard Main { Actor :: x Role :: int Present :: x } cut"),
        vec!["0"]
    );
}

#[test]
fn assignment_updates_nearest_declaration() {
    let lines = run_lines(
        "storyboard Main {
            Actor :: x Role :: int
            Assign :: x add 1 to x
            Assign :: x mul 10 to x
            Present :: x
        } cut",
    );
    assert_eq!(lines, vec!["10"]);
}

#[test]
fn inner_block_shadows_without_mutating_outer() {
    let lines = run_lines(
        "storyboard Main {
            Actor :: x Role :: int
            Assign :: 1 to x
            {
                Actor :: x Role :: int
                Assign :: 2 to x
                Present :: x
            }
            Present :: x
        } cut",
    );
    assert_eq!(lines, vec!["2", "1"]);
}

#[test]
fn inner_block_reads_and_writes_enclosing_actor() {
    let lines = run_lines(
        "storyboard Main {
            Actor :: x Role :: int
            { Assign :: 5 to x }
            Present :: x
        } cut",
    );
    assert_eq!(lines, vec!["5"]);
}

#[test]
fn assignment_to_undeclared_variable_reports_and_continues() {
    let lines = run_lines(
        "storyboard Main {
            Assign :: 1 to ghost
            Present :: \"after\"
        } cut",
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Runtime error: Undeclared variable 'ghost'."));
    assert_eq!(lines[1], "after");
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

#[test]
fn scene_iterations_share_one_scope() {
    let lines = run_lines(
        "storyboard Main {
            Actor :: x Role :: int
            Scene :: 3 takes { Assign :: x add 1 to x }
            Present :: x
        } cut",
    );
    assert_eq!(lines, vec!["3"]);
}

#[test]
fn scene_count_is_truncated() {
    let lines = run_lines(
        "storyboard Main {
            Scene :: 2.9 takes { Present :: \"tick\" }
        } cut",
    );
    assert_eq!(lines, vec!["tick", "tick"]);
}

#[test]
fn scene_with_zero_count_runs_nothing() {
    assert_eq!(
        run_lines("storyboard Main { Scene :: 0 takes { Present :: \"never\" } } cut"),
        Vec::<String>::new()
    );
}

#[test]
fn scene_count_must_be_a_number() {
    let lines = run_lines(
        "storyboard Main {
            Scene :: \"three\" takes { Present :: \"never\" }
            Present :: \"after\"
        } cut",
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Runtime error: Scene count must be a number"));
    assert_eq!(lines[1], "after");
}

// ---------------------------------------------------------------------------
// Actions and if-placement
// ---------------------------------------------------------------------------

#[test]
fn if_outside_action_is_a_runtime_error() {
    let lines = run_lines("storyboard Main { if (true) Present :: 1 } cut");
    assert_eq!(
        lines,
        vec!["[line 1] Runtime error: If-statements may only appear inside Action blocks."]
    );
}

#[test]
fn if_inside_action_selects_a_branch() {
    assert_eq!(
        run_lines(
            "storyboard Main { Action :: { if (1 < 2) Present :: \"yes\" else Present :: \"no\" } } cut"
        ),
        vec!["yes"]
    );
}

#[test]
fn if_placement_does_not_leak_into_scene_body() {
    // A scene inside an action opens a new statement context; the action
    // flag survives it
    let lines = run_lines(
        "storyboard Main {
            Action :: { Scene :: 2 takes { if (true) Present :: \"ok\" } }
        } cut",
    );
    assert_eq!(lines, vec!["ok", "ok"]);
}

#[test]
fn if_placement_does_not_cross_a_call_boundary() {
    // Rolling a storyboard from inside an action does not license an
    // unwrapped if in the callee
    let lines = run_lines(
        "storyboard Main {
            Action :: { Roll :: Helper }
        } cut
        storyboard Helper {
            if (true) Present :: 1
        } cut",
    );
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Runtime error: If-statements may only appear inside Action blocks."));
}

#[test]
fn action_expression_form_evaluates_for_effect() {
    // The expression result is discarded; only its errors surface
    let lines = run_lines(
        "storyboard Main {
            Action :: 1 add 1
            Action :: 1 div 0
            Present :: \"after\"
        } cut",
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Runtime error: Division by zero."));
    assert_eq!(lines[1], "after");
}

// ---------------------------------------------------------------------------
// Runtime error recovery
// ---------------------------------------------------------------------------

#[test]
fn division_by_zero_aborts_only_the_failing_statement() {
    let lines = run_lines(
        "storyboard Main {
            Present :: 10 div 0
            Present :: \"after\"
        } cut",
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Runtime error: Division by zero."));
    assert_eq!(lines[1], "after");
}

#[test]
fn runtime_error_reports_the_offending_line() {
    let lines = run_lines("storyboard Main {\n    Present :: 1\n    Present :: 1 div 0\n} cut");
    assert_eq!(lines[0], "1");
    assert!(lines[1].starts_with("[line 3] Runtime error:"));
}

#[test]
fn invalid_operands_are_reported() {
    let lines = run_lines("storyboard Main { Present :: true add false } cut");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Operands must be two numbers or two strings."));

    let lines = run_lines("storyboard Main { Present :: \"a\" < 1 } cut");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Operands must be numbers."));

    let lines = run_lines("storyboard Main { Present :: -\"a\" } cut");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Operand must be a number"));
}

// ---------------------------------------------------------------------------
// Storyboards and rolls
// ---------------------------------------------------------------------------

#[test]
fn roll_binds_the_argument_to_the_parameter() {
    let lines = run_lines(
        "storyboard Main { Roll :: Echo(5) } cut
         storyboard Echo(n) { Present :: n } cut",
    );
    assert_eq!(lines, vec!["5"]);
}

#[test]
fn forward_references_between_storyboards_work() {
    // Echo is declared after Main; registration happens before Main runs
    let lines = run_lines(
        "storyboard Main { Roll :: Echo(\"hi\") } cut
         storyboard Echo(msg) { Present :: msg } cut",
    );
    assert_eq!(lines, vec!["hi"]);
}

#[test]
fn missing_argument_binds_nil() {
    let lines = run_lines(
        "storyboard Main { Roll :: Echo() Roll :: Echo } cut
         storyboard Echo(n) { Present :: n } cut",
    );
    assert_eq!(lines, vec!["nil", "nil"]);
}

#[test]
fn callee_scope_is_invisible_to_the_caller() {
    let lines = run_lines(
        "storyboard Main {
            Roll :: Set(5)
            Present :: n
        } cut
        storyboard Set(n) { Present :: n } cut",
    );
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "5");
    assert!(lines[1].contains("Runtime error: Undeclared variable 'n'."));
}

#[test]
fn callee_does_not_see_caller_locals() {
    // Roll scopes chain to the globals, not to the calling scope
    let lines = run_lines(
        "storyboard Main {
            Actor :: x Role :: int
            Assign :: 9 to x
            Roll :: Peek
        } cut
        storyboard Peek { Present :: x } cut",
    );
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Runtime error: Undeclared variable 'x'."));
}

#[test]
fn unknown_storyboard_aborts_only_that_roll() {
    let lines = run_lines(
        "storyboard Main {
            Roll :: DoesNotExist
            Present :: \"still here\"
        } cut",
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Runtime error: Unknown storyboard 'DoesNotExist'."));
    assert_eq!(lines[1], "still here");
}

#[test]
fn rolling_a_non_storyboard_value_is_an_error() {
    let lines = run_lines(
        "storyboard Main {
            Actor :: x Role :: int
            Roll :: x
        } cut",
    );
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("'x' is a"));
    assert!(lines[0].contains("not a storyboard"));
}

#[test]
fn storyboards_can_recurse() {
    let lines = run_lines(
        "storyboard Main { Roll :: Countdown(3) } cut
         storyboard Countdown(n) {
            Action :: {
                if (n > 0) Roll :: Countdown(n sub 1)
                else Present :: \"done\"
            }
         } cut",
    );
    assert_eq!(lines, vec!["done"]);
}

#[test]
fn program_without_main_produces_no_output() {
    assert_eq!(
        run_lines("storyboard Helper { Present :: 1 } cut"),
        Vec::<String>::new()
    );
}
