//! Structural validator (C2): checked after every parse, and usable
//! standalone against externally-supplied AST JSON (§4.2).

use crate::ast::{Expr, Script, Stmt};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("{path}: {reason}")]
pub struct StructuralError {
    pub path: String,
    pub reason: String,
}

impl StructuralError {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub fn validate_script(script: &Script) -> Result<(), StructuralError> {
    validate_statements(&script.statements, "statements", false)
}

fn validate_statements(
    statements: &[Stmt],
    path: &str,
    inside_function: bool,
) -> Result<(), StructuralError> {
    let mut labels = HashSet::new();
    for (i, stmt) in statements.iter().enumerate() {
        let stmt_path = format!("{path}[{i}]");
        match stmt {
            Stmt::Label { name, .. } => {
                if name.is_empty() {
                    return Err(StructuralError::new(stmt_path, "label name must be non-empty"));
                }
                if !labels.insert(name.clone()) {
                    return Err(StructuralError::new(
                        stmt_path,
                        format!("duplicate label \"{name}\""),
                    ));
                }
            }
            Stmt::Expr { name, expr, .. } => {
                if let Some(n) = name {
                    if n.is_empty() {
                        return Err(StructuralError::new(stmt_path, "assignment target must be non-empty"));
                    }
                }
                validate_expr(expr, &format!("{stmt_path}.expr"))?;
            }
            Stmt::Jump { label, expr, .. } => {
                if label.is_empty() {
                    return Err(StructuralError::new(stmt_path, "jump label must be non-empty"));
                }
                if let Some(e) = expr {
                    validate_expr(e, &format!("{stmt_path}.expr"))?;
                }
            }
            Stmt::Return { expr, .. } => {
                if let Some(e) = expr {
                    validate_expr(e, &format!("{stmt_path}.expr"))?;
                }
            }
            Stmt::Include { path: p, .. } => {
                if p.is_empty() {
                    return Err(StructuralError::new(stmt_path, "include path must be non-empty"));
                }
            }
            Stmt::Function {
                name,
                args,
                statements: body,
                ..
            } => {
                if name.is_empty() {
                    return Err(StructuralError::new(stmt_path, "function name must be non-empty"));
                }
                for (j, a) in args.iter().enumerate() {
                    if a.is_empty() {
                        return Err(StructuralError::new(
                            format!("{stmt_path}.args[{j}]"),
                            "parameter name must be non-empty",
                        ));
                    }
                }
                if inside_function {
                    return Err(StructuralError::new(
                        stmt_path,
                        "nested function definitions are not allowed",
                    ));
                }
                validate_statements(body, &format!("{stmt_path}.statements"), true)?;
            }
        }
    }
    Ok(())
}

fn validate_expr(expr: &Expr, path: &str) -> Result<(), StructuralError> {
    match expr {
        Expr::Number(n, _) => {
            if !n.is_finite() {
                return Err(StructuralError::new(path, "number literal must be finite"));
            }
        }
        Expr::String(_, _) => {}
        Expr::Variable(name, _) => {
            if name.is_empty() {
                return Err(StructuralError::new(path, "variable name must be non-empty"));
            }
        }
        Expr::Group(inner, _) => validate_expr(inner, &format!("{path}.expr"))?,
        Expr::Unary { expr, .. } => validate_expr(expr, &format!("{path}.expr"))?,
        Expr::Binary { left, right, .. } => {
            validate_expr(left, &format!("{path}.left"))?;
            validate_expr(right, &format!("{path}.right"))?;
        }
        Expr::Function { name, args, .. } => {
            if name.is_empty() {
                return Err(StructuralError::new(path, "function name must be non-empty"));
            }
            match args {
                Some(a) if a.is_empty() => {
                    return Err(StructuralError::new(
                        path,
                        "args, when present, must be non-empty",
                    ));
                }
                Some(a) => {
                    for (j, arg) in a.iter().enumerate() {
                        validate_expr(arg, &format!("{path}.args[{j}]"))?;
                    }
                }
                None => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use barescript_core::Span;

    #[test]
    fn parser_rejects_duplicate_labels() {
        // parse_script runs the validator after tree construction (§4.2),
        // so a script with duplicate labels is rejected at parse time.
        assert!(parse_script("a:\nb = 1\na:\n").is_err());
    }

    #[test]
    fn accepts_well_formed_script() {
        let script = parse_script("a = 1\nreturn a\n").unwrap();
        assert!(validate_script(&script).is_ok());
    }

    #[test]
    fn rejects_duplicate_labels_standalone() {
        let dummy = Span::dummy();
        let script = Script {
            statements: vec![
                Stmt::Label {
                    name: "a".into(),
                    span: dummy,
                },
                Stmt::Label {
                    name: "a".into(),
                    span: dummy,
                },
            ],
        };
        assert!(validate_script(&script).is_err());
    }

    #[test]
    fn rejects_non_finite_number_literal() {
        let dummy = Span::dummy();
        let script = Script {
            statements: vec![Stmt::Expr {
                name: None,
                expr: Expr::Number(f64::NAN, dummy),
                span: dummy,
            }],
        };
        assert!(validate_script(&script).is_err());
    }
}
