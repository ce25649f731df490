//! Asynchronous evaluator (C6, spec §4.6).
//!
//! Shares the statement dispatcher with [`crate::eval_sync`] conceptually
//! (§9 design note: "the difference lives only in the function-call
//! expression rule and in the `fetch` built-in"); concretely it is its own
//! copy of the statement loop because the borrow shape differs (locals are
//! read-only during concurrent argument gather, see below), but every rule
//! — statement budget, label cache, short-circuit, lazy `if` — mirrors
//! `eval_sync` exactly.
//!
//! Argument lists are evaluated concurrently with `futures::future::join_all`
//! (§4.6 "gather semantics"), which is safe without a shared mutable `Locals`
//! because no `Expr` ever assigns into `Locals` directly — only
//! `Stmt::Expr { name: Some(_), .. }` does, and that happens strictly between
//! statements, never inside a single expression's evaluation.

use crate::error::RuntimeError;
use crate::eval_sync::Locals;
use crate::host::{FetchOutcome, FetchRequest, HostRef};
use crate::value::{numeric_or_concat_add, Globals, RecursionGuard, UserFunction, Value};
use barescript_compiler::{BinOp, Expr, Script, Stmt, UnaryOp};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

/// `executeScriptAsync` (§6).
pub async fn execute_script_async(script: &Script, host: &HostRef) -> Result<Value, RuntimeError> {
    exec_statements_async(&script.statements, None, &host.globals, host, true).await
}

/// `evaluateExpressionAsync` (§6).
pub async fn evaluate_expression_async(
    expr: &Expr,
    host: &HostRef,
    locals: Option<&Locals>,
) -> Result<Value, RuntimeError> {
    eval_expr_async(expr, locals, &host.globals, host, true).await
}

pub async fn call_user_function_async(
    f: &Rc<UserFunction>,
    args: &[Value],
    host: &HostRef,
) -> Result<Value, RuntimeError> {
    let _guard = RecursionGuard::enter().ok_or(RuntimeError::RecursionLimitExceeded)?;
    let mut locals = Locals::new();
    for (i, param) in f.params.iter().enumerate() {
        locals.insert(param.clone(), args.get(i).cloned().unwrap_or(Value::Null));
    }
    exec_statements_async(&f.body, Some(&mut locals), &f.globals, host, true).await
}

/// Mirrors [`crate::eval_sync::exec_statements`]; see module docs for why
/// this is a separate (structurally identical) copy rather than a shared
/// generic.
pub async fn exec_statements_async(
    statements: &[Stmt],
    mut locals: Option<&mut Locals>,
    globals: &Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    let mut label_cache: HashMap<String, usize> = HashMap::new();
    let mut ip = 0usize;
    while ip < statements.len() {
        bump_statement_count(host)?;
        match &statements[ip] {
            Stmt::Expr { name, expr, .. } => {
                let value = eval_expr_async(expr, locals.as_deref(), globals, host, builtins_allowed).await?;
                if let Some(name) = name {
                    assign(name, value, locals.as_deref_mut(), globals);
                }
            }
            Stmt::Jump { label, expr, .. } => {
                let take = match expr {
                    Some(e) => {
                        eval_expr_async(e, locals.as_deref(), globals, host, builtins_allowed)
                            .await?
                            .truthy()
                    }
                    None => true,
                };
                if take {
                    ip = resolve_label(statements, &mut label_cache, label)?;
                    continue;
                }
            }
            Stmt::Return { expr, .. } => {
                return match expr {
                    Some(e) => eval_expr_async(e, locals.as_deref(), globals, host, builtins_allowed).await,
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
            Stmt::Include { path, .. } => {
                // Reserved (§4.3); the async evaluator is the only scope
                // that is permitted to see `include` without immediately
                // erroring, but module loading itself is unimplemented
                // (§1 Non-goals), so it still surfaces as a terminal error.
                return Err(RuntimeError::IncludeUnimplemented(path.clone()));
            }
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

fn assign(name: &str, value: Value, locals: Option<&mut Locals>, globals: &Globals) {
    match locals {
        Some(locals) => {
            locals.insert(name.to_string(), value);
        }
        None => {
            globals.borrow_mut().insert(name.to_string(), value);
        }
    }
}

pub fn eval_expr_async<'a>(
    expr: &'a Expr,
    locals: Option<&'a Locals>,
    globals: &'a Globals,
    host: &'a HostRef,
    builtins_allowed: bool,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Value, RuntimeError>> + 'a>> {
    Box::pin(async move {
        match expr {
            Expr::Number(n, _) => Ok(Value::Number(*n)),
            Expr::String(s, _) => Ok(Value::str(s.as_str())),
            Expr::Variable(name, _) => Ok(lookup_variable(name, locals, globals)),
            Expr::Group(inner, _) => eval_expr_async(inner, locals, globals, host, builtins_allowed).await,
            Expr::Unary { op, expr, .. } => {
                let v = eval_expr_async(expr, locals, globals, host, builtins_allowed).await?;
                Ok(match op {
                    UnaryOp::Not => Value::Boolean(!v.truthy()),
                    UnaryOp::Neg => Value::Number(-coerce_number(&v)),
                })
            }
            Expr::Binary { op, left, right, .. } => {
                eval_binary_async(*op, left, right, locals, globals, host, builtins_allowed).await
            }
            Expr::Function { name, args, .. } if name == "if" => {
                eval_if_async(args, locals, globals, host, builtins_allowed).await
            }
            Expr::Function { name, args, .. } => {
                let values = match args {
                    Some(args) => {
                        let futs = args
                            .iter()
                            .map(|a| eval_expr_async(a, locals, globals, host, builtins_allowed));
                        futures::future::try_join_all(futs).await?
                    }
                    None => Vec::new(),
                };
                call_named_async(name, &values, locals, globals, host, builtins_allowed).await
            }
        }
    })
}

fn lookup_variable(name: &str, locals: Option<&Locals>, globals: &Globals) -> Value {
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

async fn eval_if_async(
    args: &Option<Vec<Expr>>,
    locals: Option<&Locals>,
    globals: &Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    let Some(args) = args else { return Ok(Value::Null) };
    if args.len() != 3 {
        return Ok(Value::Null);
    }
    let cond = eval_expr_async(&args[0], locals, globals, host, builtins_allowed).await?;
    if cond.truthy() {
        eval_expr_async(&args[1], locals, globals, host, builtins_allowed).await
    } else {
        eval_expr_async(&args[2], locals, globals, host, builtins_allowed).await
    }
}

async fn call_named_async(
    name: &str,
    args: &[Value],
    locals: Option<&Locals>,
    globals: &Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    let resolved = locals
        .and_then(|l| l.get(name).cloned())
        .or_else(|| globals.borrow().get(name).cloned());
    if let Some(Value::Function(f)) = resolved {
        // Suspension point (§4.6): awaiting a user function call, whether
        // or not its definition was marked `async`.
        return call_user_function_async(&f, args, host).await;
    }
    if !builtins_allowed {
        return Err(RuntimeError::UndefinedFunction(name.to_string()));
    }
    if name == "fetch" {
        return call_fetch(args, host).await;
    }
    crate::stdlib::call(name, args, host)
}

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

async fn eval_binary_async(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    locals: Option<&Locals>,
    globals: &Globals,
    host: &HostRef,
    builtins_allowed: bool,
) -> Result<Value, RuntimeError> {
    // Short-circuit still evaluates the right side only when needed, "even
    // if the right side is async" (§4.6).
    match op {
        BinOp::And => {
            let l = eval_expr_async(left, locals, globals, host, builtins_allowed).await?;
            if !l.truthy() {
                return Ok(l);
            }
            return eval_expr_async(right, locals, globals, host, builtins_allowed).await;
        }
        BinOp::Or => {
            let l = eval_expr_async(left, locals, globals, host, builtins_allowed).await?;
            if l.truthy() {
                return Ok(l);
            }
            return eval_expr_async(right, locals, globals, host, builtins_allowed).await;
        }
        _ => {}
    }

    let l = eval_expr_async(left, locals, globals, host, builtins_allowed).await?;
    let r = eval_expr_async(right, locals, globals, host, builtins_allowed).await?;
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

// ---------------------------------------------------------------------------
// fetch (the only async built-in, §4.4/§4.6)
// ---------------------------------------------------------------------------

/// `fetch(urls, options?)` (§4.4). `urls` is a single URL string or an
/// `Array` of URL strings; an `Array` input issues every request
/// concurrently and returns an `Array` of results in index order, `null`
/// per-entry on failure (§8 property 8).
async fn call_fetch(args: &[Value], host: &HostRef) -> Result<Value, RuntimeError> {
    let urls_value = crate::stdlib::arg(args, 0);
    let options = args.get(1).cloned();
    let was_array = matches!(urls_value, Value::Array(_));
    let urls: Vec<Value> = match &urls_value {
        Value::Array(a) => a.borrow().clone(),
        other => vec![other.clone()],
    };

    let futs = urls.into_iter().map(|u| fetch_one(u, options.clone(), host));
    let mut results = futures::future::join_all(futs).await;

    if was_array {
        Ok(Value::array(results))
    } else {
        Ok(results.pop().unwrap_or(Value::Null))
    }
}

async fn fetch_one(url_value: Value, options: Option<Value>, host: &HostRef) -> Value {
    let Some(url) = url_value.as_str() else {
        return Value::Null;
    };
    let url = host.rewrite_url(url);

    let opts = options.as_ref().and_then(Value::as_object);
    let get_str = |key: &str| -> Option<String> {
        opts.and_then(|o| o.borrow().get(key).and_then(Value::as_str).map(str::to_string))
    };
    let method = get_str("method").unwrap_or_else(|| "GET".to_string());
    let body = get_str("body");
    let is_text = opts
        .and_then(|o| o.borrow().get("isText").map(Value::truthy))
        .unwrap_or(false);
    let headers = opts
        .and_then(|o| o.borrow().get("headers").and_then(Value::as_object).cloned())
        .map(|h| {
            h.borrow()
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let request = FetchRequest {
        url,
        method,
        headers,
        body,
    };

    let outcome = match &host.fetch_fn {
        Some(f) => f(request).await,
        None => default_fetch(request).await,
    };

    match outcome {
        Ok(out) if (200..300).contains(&out.status) => {
            if is_text {
                Value::str(out.body)
            } else {
                match serde_json::from_str::<serde_json::Value>(&out.body) {
                    Ok(json) => Value::from_json(&json),
                    Err(e) => {
                        host.log(&format!("fetch: could not decode JSON body: {e}"));
                        Value::Null
                    }
                }
            }
        }
        Ok(out) => {
            host.log(&format!("fetch: non-ok status {}", out.status));
            Value::Null
        }
        Err(e) => {
            host.log(&format!("fetch: {e}"));
            Value::Null
        }
    }
}

/// Default `fetchFn` when the host does not supply one: a real HTTP call
/// over `reqwest` on the current-thread runtime (§9 design note: "a port
/// may choose to preserve concurrent gather semantics").
async fn default_fetch(req: FetchRequest) -> Result<FetchOutcome, String> {
    let client = reqwest::Client::new();
    let mut builder = match req.method.to_ascii_uppercase().as_str() {
        "POST" => client.post(&req.url),
        "PUT" => client.put(&req.url),
        "DELETE" => client.delete(&req.url),
        "PATCH" => client.patch(&req.url),
        "HEAD" => client.head(&req.url),
        _ => client.get(&req.url),
    };
    for (k, v) in &req.headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    if let Some(body) = req.body {
        builder = builder.body(body);
    }
    let response = builder.send().await.map_err(|e| e.to_string())?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| e.to_string())?;
    Ok(FetchOutcome { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use barescript_compiler::parse_script;
    use std::cell::RefCell;

    async fn run(src: &str, host: &HostRef) -> Value {
        let script = parse_script(src).unwrap();
        execute_script_async(&script, host).await.unwrap()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sync_script_matches_sync_evaluator() {
        let script = parse_script(
            "n = 10\ni = 0\na = 0\nb = 1\nfib:\njumpif (i >= n) fibend\ntmp = b\nb = a + b\na = tmp\ni = i + 1\njump fib\nfibend:\nreturn a\n",
        )
        .unwrap();
        let host: HostRef = Rc::new(crate::host::HostOptions::default());
        let sync_result = crate::eval_sync::execute_script(&script, &host).unwrap();
        let host2: HostRef = Rc::new(crate::host::HostOptions::default());
        let async_result = execute_script_async(&script, &host2).await.unwrap();
        assert!(matches!((sync_result, async_result), (Value::Number(a), Value::Number(b)) if a == b));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn short_circuit_or_logs_both_sides_when_left_is_falsy() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let log2 = log.clone();
        let mut host = crate::host::HostOptions::default();
        host.log_fn = Some(Rc::new(move |s: &str| log2.borrow_mut().push(s.to_string())));
        let host: HostRef = Rc::new(host);
        let _ = run("debugLog('x') || debugLog('y')", &host).await;
        assert_eq!(log.borrow().as_slice(), ["x", "y"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetch_degrades_to_null_on_unreachable_url() {
        let host: HostRef = Rc::new(crate::host::HostOptions::default());
        // No network access in tests: an unparseable URL fails at request
        // build time, which must degrade to Null rather than panic/error.
        let result = run("fetch('not-a-real-url')", &host).await;
        assert!(matches!(result, Value::Null));
    }
}
