use barescript_core::Span;
use serde::{Deserialize, Serialize};

/// A parsed script: a flat, ordered list of statements (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Le,
    Lt,
    Ge,
    Gt,
    Eq,
    NotEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Expression AST (§3). Frozen once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    Number(f64, Span),
    String(String, Span),
    /// `Variable` names are non-empty identifiers, or arbitrary text when
    /// written in the `[ ... ]` extended form.
    Variable(String, Span),
    Group(Box<Expr>, Span),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Function {
        name: String,
        args: Option<Vec<Expr>>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, s)
            | Expr::String(_, s)
            | Expr::Variable(_, s)
            | Expr::Group(_, s)
            | Expr::Unary { span: s, .. }
            | Expr::Binary { span: s, .. }
            | Expr::Function { span: s, .. } => *s,
        }
    }
}

/// Statement AST (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// `name = expr` or a bare expression statement (`name` absent).
    Expr {
        name: Option<String>,
        expr: Expr,
        span: Span,
    },
    /// `jump label` / `jumpif (expr) label`.
    Jump {
        label: String,
        expr: Option<Expr>,
        span: Span,
    },
    Return {
        expr: Option<Expr>,
        span: Span,
    },
    Label {
        name: String,
        span: Span,
    },
    Function {
        is_async: bool,
        name: String,
        args: Vec<String>,
        statements: Vec<Stmt>,
        span: Span,
    },
    /// Reserved, unimplemented outside the async evaluator (§3, §4.3).
    Include {
        path: String,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr { span, .. }
            | Stmt::Jump { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Label { span, .. }
            | Stmt::Function { span, .. }
            | Stmt::Include { span, .. } => *span,
        }
    }
}
