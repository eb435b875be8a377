use crate::ast::{ActionBody, Expr, Program, Stmt};
use crate::error::{FleetError, RuntimeErrorKind};
use crate::lexer::{Token, TokenType};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

/// A chain of mutable name-to-value scopes. The enclosing link is shared
/// (several children may point at the same parent) and used only for lookup,
/// never for ownership transfer.
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Unconditionally create or overwrite a binding in this scope. An inner
    /// define shadows an outer binding of the same name without mutating it.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Read the nearest enclosing binding, walking outward level by level.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(ref enclosing) = self.enclosing {
            enclosing.borrow().get(name)
        } else {
            None
        }
    }

    /// Mutate the nearest enclosing scope that already declares `name`.
    /// Returns false when no scope declares it.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            true
        } else if let Some(ref enclosing) = self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered storyboard: its declared parameter names and body, detached
/// from the parse tree it came from.
#[derive(Debug)]
pub struct StoryboardDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// Ambient evaluation flags, passed by value down the recursive walk and
/// restored for free when a call returns.
#[derive(Debug, Clone, Copy, Default)]
struct EvalContext {
    inside_action: bool,
    // Set while a chosen if-branch runs; no evaluation rule consults it yet
    #[allow(dead_code)]
    inside_if_branch: bool,
    inside_scene: bool,
}

pub struct Evaluator<W: Write = io::Stdout> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    out: W,
}

impl Evaluator<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Evaluator<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Evaluator<W> {
    /// Build an evaluator writing program output (and runtime diagnostics)
    /// to the given sink.
    pub fn with_output(out: W) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        Self {
            environment: Rc::clone(&globals),
            globals,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Register every storyboard in the global environment, then invoke
    /// `Main` if one is bound. Registration is order-independent, so forward
    /// references and mutual calls work.
    pub fn run(&mut self, program: &Program) {
        for declaration in &program.declarations {
            if let Stmt::Storyboard {
                name, params, body, ..
            } = declaration
            {
                let storyboard = Rc::new(StoryboardDef {
                    name: name.lexeme.clone(),
                    params: params.iter().map(|param| param.lexeme.clone()).collect(),
                    body: body.clone(),
                });
                self.globals
                    .borrow_mut()
                    .define(&name.lexeme, Value::Storyboard(storyboard));
            }
        }

        let main = self.globals.borrow().get("Main");
        if let Some(Value::Storyboard(storyboard)) = main {
            self.call_storyboard(&storyboard, None);
        }
    }

    fn execute(&mut self, stmt: &Stmt, ctx: EvalContext) -> Result<(), FleetError> {
        match stmt {
            // Storyboards are registered up front by run(); executing the
            // declaration itself is a no-op
            Stmt::Storyboard { .. } => Ok(()),
            Stmt::Block { statements, .. } => {
                self.execute_block(statements, ctx);
                Ok(())
            }
            Stmt::Actor { name, .. } => {
                // Actors start from zero; the datatype tag is not enforced
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Number(0.0));
                Ok(())
            }
            Stmt::Assign { target, value, .. } => {
                let value = self.evaluate(value)?;
                if !self.environment.borrow_mut().assign(&target.lexeme, value) {
                    return Err(FleetError::runtime_error(
                        RuntimeErrorKind::UndeclaredVariable,
                        target,
                        format!("Undeclared variable '{}'.", target.lexeme),
                    ));
                }
                Ok(())
            }
            Stmt::Action { body, .. } => {
                let ctx = EvalContext {
                    inside_action: true,
                    ..ctx
                };
                match body {
                    ActionBody::Expr(expr) => {
                        self.evaluate(expr)?;
                        Ok(())
                    }
                    ActionBody::Block(statements) => {
                        self.execute_block(statements, ctx);
                        Ok(())
                    }
                }
            }
            Stmt::Present { value, .. } => {
                let value = self.evaluate(value)?;
                let _ = writeln!(self.out, "{}", value);
                Ok(())
            }
            Stmt::Scene {
                keyword,
                count,
                body,
                ..
            } => {
                let count = self.evaluate(count)?;
                let times = match count {
                    Value::Number(n) => n.trunc() as i64,
                    other => {
                        return Err(FleetError::runtime_error(
                            RuntimeErrorKind::InvalidSceneCount,
                            keyword,
                            format!("Scene count must be a number, got {}.", other.type_name()),
                        ));
                    }
                };

                let ctx = EvalContext {
                    inside_scene: true,
                    ..ctx
                };
                for _ in 0..times {
                    self.execute_block(body, ctx);
                }
                Ok(())
            }
            Stmt::If {
                keyword,
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                // Runtime-checked placement rule, deliberately not enforced
                // by the grammar
                if !ctx.inside_action {
                    return Err(FleetError::runtime_error(
                        RuntimeErrorKind::MisplacedIf,
                        keyword,
                        "If-statements may only appear inside Action blocks.".to_string(),
                    ));
                }

                let condition = self.evaluate(condition)?;
                let ctx = EvalContext {
                    inside_if_branch: true,
                    ..ctx
                };
                if condition.is_truthy() {
                    self.execute(then_branch, ctx)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, ctx)
                } else {
                    Ok(())
                }
            }
            Stmt::Roll { name, argument, .. } => {
                let callee = self.environment.borrow().get(&name.lexeme);
                let storyboard = match callee {
                    Some(Value::Storyboard(storyboard)) => storyboard,
                    Some(other) => {
                        return Err(FleetError::runtime_error(
                            RuntimeErrorKind::UnknownStoryboard,
                            name,
                            format!(
                                "'{}' is a {}, not a storyboard.",
                                name.lexeme,
                                other.type_name()
                            ),
                        ));
                    }
                    None => {
                        return Err(FleetError::runtime_error(
                            RuntimeErrorKind::UnknownStoryboard,
                            name,
                            format!("Unknown storyboard '{}'.", name.lexeme),
                        ));
                    }
                };

                let argument = match argument {
                    Some(expr) => Some(self.evaluate(expr)?),
                    None => None,
                };
                self.call_storyboard(&storyboard, argument);
                Ok(())
            }
        }
    }

    /// Run the statements of a block. This is the statement boundary where
    /// runtime errors are caught: the failing statement is reported and
    /// abandoned, and the rest of the block still runs.
    fn execute_block(&mut self, statements: &[Stmt], ctx: EvalContext) {
        if ctx.inside_scene {
            // Scene bodies reuse the enclosing scope, so assignments keep
            // accumulating across iterations instead of resetting
            for statement in statements {
                if let Err(error) = self.execute(statement, ctx) {
                    self.report(&error);
                }
            }
            return;
        }

        let previous = Rc::clone(&self.environment);
        self.environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &previous,
        ))));

        for statement in statements {
            if let Err(error) = self.execute(statement, ctx) {
                self.report(&error);
            }
        }

        self.environment = previous;
    }

    /// Invoke a storyboard in a fresh child scope of the globals, binding
    /// parameters in declaration order. Missing arguments bind nil. The
    /// caller's environment is restored no matter how the body exits.
    fn call_storyboard(&mut self, storyboard: &Rc<StoryboardDef>, argument: Option<Value>) {
        let previous = Rc::clone(&self.environment);

        let mut scope = Environment::with_enclosing(Rc::clone(&self.globals));
        let mut arguments = argument.into_iter();
        for param in &storyboard.params {
            scope.define(param, arguments.next().unwrap_or(Value::Nil));
        }

        self.environment = Rc::new(RefCell::new(scope));
        // Ambient flags do not leak across a call boundary
        self.execute_block(&storyboard.body, EvalContext::default());
        self.environment = previous;
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, FleetError> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Variable { name, .. } => {
                self.environment.borrow().get(&name.lexeme).ok_or_else(|| {
                    FleetError::runtime_error(
                        RuntimeErrorKind::UndeclaredVariable,
                        name,
                        format!("Undeclared variable '{}'.", name.lexeme),
                    )
                })
            }
            Expr::Grouping { expr, .. } => self.evaluate(expr),
            Expr::Unary {
                operator, operand, ..
            } => {
                let operand = self.evaluate(operand)?;
                match operator.token_type {
                    TokenType::Bang | TokenType::Not => Ok(Value::Bool(!operand.is_truthy())),
                    TokenType::Minus | TokenType::Sub => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(FleetError::runtime_error(
                            RuntimeErrorKind::InvalidOperand,
                            operator,
                            format!("Operand must be a number, got {}.", other.type_name()),
                        )),
                    },
                    _ => Err(FleetError::runtime_error(
                        RuntimeErrorKind::InvalidOperand,
                        operator,
                        format!("Unknown operator '{}'.", operator.lexeme),
                    )),
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => {
                // and/or decide on the left operand before the right one is
                // ever evaluated
                match operator.token_type {
                    TokenType::And => {
                        let left = self.evaluate(left)?;
                        if !left.is_truthy() {
                            return Ok(left);
                        }
                        return self.evaluate(right);
                    }
                    TokenType::Or => {
                        let left = self.evaluate(left)?;
                        if left.is_truthy() {
                            return Ok(left);
                        }
                        return self.evaluate(right);
                    }
                    _ => {}
                }

                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary_op(operator, left, right)
            }
        }
    }

    fn report(&mut self, error: &FleetError) {
        let _ = writeln!(self.out, "{}", error);
    }
}

fn binary_op(operator: &Token, left: Value, right: Value) -> Result<Value, FleetError> {
    match operator.token_type {
        TokenType::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (l, r)
                if matches!(l, Value::Str(_) | Value::Char(_))
                    || matches!(r, Value::Str(_) | Value::Char(_)) =>
            {
                // Concatenation coerces the other operand to its display text
                Ok(Value::Str(format!("{}{}", l, r)))
            }
            _ => Err(FleetError::runtime_error(
                RuntimeErrorKind::InvalidOperand,
                operator,
                "Operands must be two numbers or two strings.".to_string(),
            )),
        },
        TokenType::Sub => {
            let (l, r) = check_number_operands(operator, left, right)?;
            Ok(Value::Number(l - r))
        }
        TokenType::Mul => {
            let (l, r) = check_number_operands(operator, left, right)?;
            Ok(Value::Number(l * r))
        }
        TokenType::Div => {
            let (l, r) = check_number_operands(operator, left, right)?;
            if r == 0.0 {
                return Err(FleetError::runtime_error(
                    RuntimeErrorKind::DivisionByZero,
                    operator,
                    "Division by zero.".to_string(),
                ));
            }
            Ok(Value::Number(l / r))
        }
        TokenType::Greater => {
            let (l, r) = check_number_operands(operator, left, right)?;
            Ok(Value::Bool(l > r))
        }
        TokenType::GreaterEqual => {
            let (l, r) = check_number_operands(operator, left, right)?;
            Ok(Value::Bool(l >= r))
        }
        TokenType::Less => {
            let (l, r) = check_number_operands(operator, left, right)?;
            Ok(Value::Bool(l < r))
        }
        TokenType::LessEqual => {
            let (l, r) = check_number_operands(operator, left, right)?;
            Ok(Value::Bool(l <= r))
        }
        TokenType::EqualEqual => Ok(Value::Bool(left == right)),
        TokenType::BangEqual => Ok(Value::Bool(left != right)),
        _ => Err(FleetError::runtime_error(
            RuntimeErrorKind::InvalidOperand,
            operator,
            format!("Unknown operator '{}'.", operator.lexeme),
        )),
    }
}

fn check_number_operands(
    operator: &Token,
    left: Value,
    right: Value,
) -> Result<(f64, f64), FleetError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((l, r)),
        _ => Err(FleetError::runtime_error(
            RuntimeErrorKind::InvalidOperand,
            operator,
            "Operands must be numbers.".to_string(),
        )),
    }
}
