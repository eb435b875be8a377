use crate::error::Span;
use crate::lexer::Token;
use crate::value::Value;

/// A compilation unit: a list of storyboard declarations.
#[derive(Debug, Clone)]
pub struct Program {
    pub declarations: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// A named procedure. Parameters are declared in order; at call time at
    /// most one of them receives an argument.
    Storyboard {
        name: Token,
        params: Vec<Token>,
        body: Vec<Stmt>,
        span: Span,
    },
    Block {
        statements: Vec<Stmt>,
        span: Span,
    },
    /// Declares a variable with an informational datatype tag.
    Actor {
        name: Token,
        datatype: Token,
        span: Span,
    },
    Assign {
        target: Token,
        value: Expr,
        span: Span,
    },
    Action {
        body: ActionBody,
        span: Span,
    },
    Present {
        value: Expr,
        span: Span,
    },
    /// A counted loop; the body shares the enclosing scope across iterations.
    Scene {
        keyword: Token,
        count: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    If {
        keyword: Token,
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    /// A call to a declared storyboard, binding at most one argument.
    Roll {
        name: Token,
        argument: Option<Expr>,
        span: Span,
    },
}

/// An Action holds either a single expression or a braced block, never both.
#[derive(Debug, Clone)]
pub enum ActionBody {
    Expr(Expr),
    Block(Vec<Stmt>),
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Storyboard { span, .. } => span,
            Stmt::Block { span, .. } => span,
            Stmt::Actor { span, .. } => span,
            Stmt::Assign { span, .. } => span,
            Stmt::Action { span, .. } => span,
            Stmt::Present { span, .. } => span,
            Stmt::Scene { span, .. } => span,
            Stmt::If { span, .. } => span,
            Stmt::Roll { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: Value,
        span: Span,
    },
    Variable {
        name: Token,
        span: Span,
    },
    Unary {
        operator: Token,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
        span: Span,
    },
    Grouping {
        expr: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal { span, .. } => span,
            Expr::Variable { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Grouping { span, .. } => span,
        }
    }
}
