//! Synchronous evaluator (C5, spec §4.5).
//!
//! One statement dispatcher shared conceptually with the async evaluator
//! (§9 design note: "the difference lives only in the function-call
//! expression rule and in the `fetch` built-in") — `eval_async` re-uses
//! every piece of this module except the function-call expression rule,
//! which it reimplements to add concurrent argument gather and awaited
//! calls.

use crate::error::RuntimeError;
use crate::host::HostRef;
use crate::stdlib;
use crate::value::{numeric_or_concat_add, RecursionGuard, UserFunction, Value};
use barescript_compiler::{BinOp, Expr, Script, Stmt, UnaryOp};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

pub type Locals = IndexMap<String, Value>;

/// `executeScript` (§6).
pub fn execute_script(script: &Script, host: &HostRef) -> Result<Value, RuntimeError> {
    exec_statements(&script.statements, None, &host.globals, host, true)
}

/// `evaluateExpression` (§6).
pub fn evaluate_expression(
    expr: &Expr,
    host: &HostRef,
    locals: Option<&mut Locals>,
    include_builtins: bool,
) -> Result<Value, RuntimeError> {
    eval_expr(expr, locals, &host.globals, host, include_builtins)
}

/// Invoke a user-defined function value (shared by `sort`'s `cmp` and
/// `replace`'s function-replacement argument, §4.4).
pub fn call_user_function(
    f: &Rc<UserFunction>,
    args: &[Value],
    host: &HostRef,
) -> Result<Value, RuntimeError> {
    if f.is_async {
        return Err(RuntimeError::AsyncFunctionInNonAsyncScope(f.name.clone()));
    }
    let _guard = RecursionGuard::enter().ok_or(RuntimeError::RecursionLimitExceeded)?;
    let mut locals = Locals::new();
    for (i, param) in f.params.iter().enumerate() {
        locals.insert(param.clone(), args.get(i).cloned().unwrap_or(Value::Null));
    }
    exec_statements(&f.body, Some(&mut locals), &f.globals, host, true)
}

/// Runs a flat statement list to completion or to an explicit `Return`,
/// yielding its value or `Null` (§4.5). `locals` is `None` outside any user
/// function body (§3).
pub fn exec_statements(
    statements: &[Stmt],
    mut locals: Option<&mut Locals>,
    globals: &crate::value::Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    let mut label_cache: HashMap<String, usize> = HashMap::new();
    let mut ip = 0usize;
    while ip < statements.len() {
        bump_statement_count(host)?;
        match &statements[ip] {
            Stmt::Expr { name, expr, .. } => {
                let value = eval_expr(expr, locals.as_deref_mut(), globals, host, builtins_allowed)?;
                if let Some(name) = name {
                    assign(name, value, locals.as_deref_mut(), globals);
                }
            }
            Stmt::Jump { label, expr, .. } => {
                let take = match expr {
                    Some(e) => eval_expr(e, locals.as_deref_mut(), globals, host, builtins_allowed)?.truthy(),
                    None => true,
                };
                if take {
                    ip = resolve_label(statements, &mut label_cache, label)?;
                    continue;
                }
            }
            Stmt::Return { expr, .. } => {
                return match expr {
                    Some(e) => eval_expr(e, locals.as_deref_mut(), globals, host, builtins_allowed),
                    None => Ok(Value::Null),
                };
            }
            Stmt::Label { .. } => {}
            Stmt::Function {
                is_async,
                name,
                args,
                statements: body,
                ..
            } => {
                let f = Value::Function(Rc::new(UserFunction {
                    name: name.clone(),
                    is_async: *is_async,
                    params: args.clone(),
                    body: Rc::from(body.as_slice()),
                    globals: globals.clone(),
                }));
                globals.borrow_mut().insert(name.clone(), f);
            }
            Stmt::Include { .. } => return Err(RuntimeError::IncludeInNonAsyncScope),
        }
        ip += 1;
    }
    Ok(Value::Null)
}

fn bump_statement_count(host: &HostRef) -> Result<(), RuntimeError> {
    let count = host.statement_count.get() + 1;
    host.statement_count.set(count);
    if host.max_statements > 0 && count > host.max_statements {
        return Err(RuntimeError::StatementBudgetExceeded(host.max_statements));
    }
    Ok(())
}

fn resolve_label(
    statements: &[Stmt],
    cache: &mut HashMap<String, usize>,
    label: &str,
) -> Result<usize, RuntimeError> {
    if let Some(&idx) = cache.get(label) {
        return Ok(idx);
    }
    for (i, s) in statements.iter().enumerate() {
        if let Stmt::Label { name, .. } = s {
            if name == label {
                cache.insert(name.clone(), i);
                return Ok(i);
            }
        }
    }
    Err(RuntimeError::UnknownJumpLabel)
}

/// Assignment target: Locals if we're inside a function call, else
/// Globals (§3).
fn assign(name: &str, value: Value, locals: Option<&mut Locals>, globals: &crate::value::Globals) {
    match locals {
        Some(locals) => {
            locals.insert(name.to_string(), value);
        }
        None => {
            globals.borrow_mut().insert(name.to_string(), value);
        }
    }
}

pub fn eval_expr(
    expr: &Expr,
    mut locals: Option<&mut Locals>,
    globals: &crate::value::Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Number(n, _) => Ok(Value::Number(*n)),
        Expr::String(s, _) => Ok(Value::str(s.as_str())),
        Expr::Variable(name, _) => Ok(lookup_variable(name, locals.as_deref(), globals)),
        Expr::Group(inner, _) => eval_expr(inner, locals, globals, host, builtins_allowed),
        Expr::Unary { op, expr, .. } => {
            let v = eval_expr(expr, locals, globals, host, builtins_allowed)?;
            Ok(match op {
                UnaryOp::Not => Value::Boolean(!v.truthy()),
                UnaryOp::Neg => Value::Number(-coerce_number(&v)),
            })
        }
        Expr::Binary { op, left, right, .. } => {
            eval_binary(*op, left, right, locals.as_deref_mut(), globals, host, builtins_allowed)
        }
        Expr::Function { name, args, .. } if name == "if" => {
            eval_if(args, locals, globals, host, builtins_allowed)
        }
        Expr::Function { name, args, .. } => {
            let mut values = Vec::with_capacity(args.as_ref().map(Vec::len).unwrap_or(0));
            if let Some(args) = args {
                for a in args {
                    values.push(eval_expr(a, locals.as_deref_mut(), globals, host, builtins_allowed)?);
                }
            }
            call_named(name, &values, locals.as_deref(), globals, host, builtins_allowed)
        }
    }
}

fn lookup_variable(name: &str, locals: Option<&Locals>, globals: &crate::value::Globals) -> Value {
    match name {
        "null" => return Value::Null,
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Some(locals) = locals {
        if let Some(v) = locals.get(name) {
            return v.clone();
        }
    }
    globals.borrow().get(name).cloned().unwrap_or(Value::Null)
}

fn eval_if(
    args: &Option<Vec<Expr>>,
    mut locals: Option<&mut Locals>,
    globals: &crate::value::Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    let Some(args) = args else { return Ok(Value::Null) };
    if args.len() != 3 {
        return Ok(Value::Null);
    }
    let cond = eval_expr(&args[0], locals.as_deref_mut(), globals, host, builtins_allowed)?;
    if cond.truthy() {
        eval_expr(&args[1], locals, globals, host, builtins_allowed)
    } else {
        eval_expr(&args[2], locals, globals, host, builtins_allowed)
    }
}

fn call_named(
    name: &str,
    args: &[Value],
    locals: Option<&Locals>,
    globals: &crate::value::Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    let resolved = locals
        .and_then(|l| l.get(name).cloned())
        .or_else(|| globals.borrow().get(name).cloned());
    if let Some(Value::Function(f)) = resolved {
        if f.is_async {
            return Err(RuntimeError::AsyncFunctionInNonAsyncScope(name.to_string()));
        }
        return call_user_function(&f, args, host);
    }
    if !builtins_allowed {
        return Err(RuntimeError::UndefinedFunction(name.to_string()));
    }
    if stdlib::ASYNC_ONLY_BUILTINS.contains(&name) {
        // "fetch ... must be a no-op (returns null) when called from the
        // synchronous evaluator" (§4.4).
        return Ok(Value::Null);
    }
    stdlib::call(name, args, host)
}

/// Numeric coercion used by arithmetic operators other than `+` (§4.5):
/// `Number` passes through, `Boolean` is `0`/`1`, numeric strings parse,
/// everything else is `NaN`.
fn coerce_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => *n,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn eval_binary(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    mut locals: Option<&mut Locals>,
    globals: &crate::value::Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    // Short-circuit operators evaluate the right side only when needed
    // (§4.5, §8 property 3), which also holds for the async evaluator
    // (§4.6: "even if the right side is async").
    match op {
        BinOp::And => {
            let l = eval_expr(left, locals.as_deref_mut(), globals, host, builtins_allowed)?;
            if !l.truthy() {
                return Ok(l);
            }
            return eval_expr(right, locals, globals, host, builtins_allowed);
        }
        BinOp::Or => {
            let l = eval_expr(left, locals.as_deref_mut(), globals, host, builtins_allowed)?;
            if l.truthy() {
                return Ok(l);
            }
            return eval_expr(right, locals, globals, host, builtins_allowed);
        }
        _ => {}
    }

    let l = eval_expr(left, locals.as_deref_mut(), globals, host, builtins_allowed)?;
    let r = eval_expr(right, locals, globals, host, builtins_allowed)?;
    Ok(match op {
        BinOp::Add => numeric_or_concat_add(&l, &r),
        BinOp::Sub => Value::Number(coerce_number(&l) - coerce_number(&r)),
        BinOp::Mul => Value::Number(coerce_number(&l) * coerce_number(&r)),
        BinOp::Div => Value::Number(coerce_number(&l) / coerce_number(&r)),
        BinOp::Mod => Value::Number(coerce_number(&l) % coerce_number(&r)),
        BinOp::Pow => Value::Number(coerce_number(&l).powf(coerce_number(&r))),
        BinOp::Eq => Value::Boolean(l.value_eq(&r)),
        BinOp::NotEq => Value::Boolean(!l.value_eq(&r)),
        BinOp::Le => Value::Boolean(!matches!(l.compare(&r), Ordering::Greater)),
        BinOp::Lt => Value::Boolean(matches!(l.compare(&r), Ordering::Less)),
        BinOp::Ge => Value::Boolean(!matches!(l.compare(&r), Ordering::Less)),
        BinOp::Gt => Value::Boolean(matches!(l.compare(&r), Ordering::Greater)),
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    })
}
