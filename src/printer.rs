use crate::ast::{ActionBody, Expr, Program, Stmt};
use crate::value::Value;

/// Read-only diagnostic serializer: renders the AST as parenthesized
/// S-expression-like text. Purely a debugging aid; it has no effect on
/// evaluation and only ever sees already-validated parser output, so it
/// cannot fail.
pub struct AstPrinter;

impl AstPrinter {
    pub fn new() -> Self {
        Self
    }

    /// Render every declaration in a program, one per line.
    pub fn print_program(&self, program: &Program) -> String {
        program
            .declarations
            .iter()
            .map(|declaration| self.print_stmt(declaration))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Storyboard {
                name, params, body, ..
            } => {
                let params = params
                    .iter()
                    .map(|param| param.lexeme.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let body = self.print_statements(body);
                format!("(storyboard {} ({}) {})", name.lexeme, params, body)
            }
            Stmt::Block { statements, .. } => {
                format!("(block {})", self.print_statements(statements))
            }
            Stmt::Actor { name, datatype, .. } => {
                format!("(actor {} {})", name.lexeme, datatype.lexeme)
            }
            Stmt::Assign { target, value, .. } => {
                format!("(assign {} {})", target.lexeme, self.print_expr(value))
            }
            Stmt::Action { body, .. } => match body {
                ActionBody::Expr(expr) => format!("(action {})", self.print_expr(expr)),
                ActionBody::Block(statements) => {
                    format!("(action (block {}))", self.print_statements(statements))
                }
            },
            Stmt::Present { value, .. } => format!("(present {})", self.print_expr(value)),
            Stmt::Scene { count, body, .. } => format!(
                "(scene {} (block {}))",
                self.print_expr(count),
                self.print_statements(body)
            ),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let cond = self.print_expr(condition);
                let then = self.print_stmt(then_branch);
                match else_branch {
                    Some(else_stmt) => {
                        format!("(if {} then {} else {})", cond, then, self.print_stmt(else_stmt))
                    }
                    None => format!("(if {} then {})", cond, then),
                }
            }
            Stmt::Roll { name, argument, .. } => match argument {
                Some(argument) => format!("(roll {} {})", name.lexeme, self.print_expr(argument)),
                None => format!("(roll {})", name.lexeme),
            },
        }
    }

    pub fn print_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => match value {
                Value::Str(s) => format!("\"{}\"", s),
                other => other.to_string(),
            },
            Expr::Variable { name, .. } => name.lexeme.clone(),
            Expr::Unary {
                operator, operand, ..
            } => self.parenthesize(&operator.lexeme, &[operand]),
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => self.parenthesize(&operator.lexeme, &[left, right]),
            Expr::Grouping { expr, .. } => self.parenthesize("group", &[expr]),
        }
    }

    fn print_statements(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|statement| self.print_stmt(statement))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn parenthesize(&self, name: &str, exprs: &[&Expr]) -> String {
        let mut builder = String::new();
        builder.push('(');
        builder.push_str(name);
        for expr in exprs {
            builder.push(' ');
            builder.push_str(&self.print_expr(expr));
        }
        builder.push(')');
        builder
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}
