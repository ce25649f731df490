//! Line-oriented statement parser and precedence-climbing expression parser
//! (§4.3).
//!
//! Statements are recognized line by line against a small set of shapes;
//! everything to the right of a recognized keyword (or the whole line, for a
//! bare expression statement) is handed to [`parse_tokens`], which climbs
//! operator precedence with a binding-power table — behaviorally identical
//! to the splice/re-order description in the spec, and the same technique
//! the teacher's own expression parser uses (binding-power pairs per
//! operator rather than a hand-rolled tree splice).

use crate::ast::{BinOp, Expr, Script, Stmt, UnaryOp};
use crate::lexer::{LexError, Lexer};
use crate::lines::split_logical_lines;
use crate::tokens::{Token, TokenKind};
use crate::validate::{validate_script, StructuralError};
use barescript_core::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Syntax error \"{0}\"")]
    Syntax(String),
    #[error("Unmatched parenthesis")]
    UnmatchedParenthesis,
    #[error("Nested function definitions are not allowed")]
    NestedFunction,
    #[error("Unterminated function definition \"{0}\"")]
    UnterminatedFunction(String),
    #[error("Unexpected \"endfunction\"")]
    UnexpectedEndFunction,
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// `parseScript` (§6): text → [`Script`], validated.
pub fn parse_script(source: &str) -> Result<Script, ParseError> {
    let lines = split_logical_lines(source);
    let mut parser = StmtParser { lines: &lines, pos: 0 };
    let statements = parser.parse_block(false)?;
    if parser.pos != lines.len() {
        // Only reachable via a stray `endfunction` with no matching `function`.
        return Err(ParseError::UnexpectedEndFunction);
    }
    let script = Script { statements };
    validate_script(&script)?;
    Ok(script)
}

/// `parseExpression` (§6): text → [`Expr`].
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let lexer = Lexer::new(source, 0, 1);
    let tokens = lexer.tokenize()?;
    let mut cursor = ExprCursor {
        tokens: &tokens,
        pos: 0,
        line_text: source,
        line_start: 0,
    };
    let expr = parse_expr_bp(&mut cursor, 0)?;
    cursor.expect_eof()?;
    Ok(expr)
}

// ---------------------------------------------------------------------------
// Statement parser
// ---------------------------------------------------------------------------

struct StmtParser<'a> {
    lines: &'a [crate::lines::LogicalLine],
    pos: usize,
}

impl<'a> StmtParser<'a> {
    fn parse_block(&mut self, inside_function: bool) -> Result<Vec<Stmt>, ParseError> {
        let mut out = Vec::new();
        while self.pos < self.lines.len() {
            if self.lines[self.pos].text.trim() == "endfunction" {
                break;
            }
            out.push(self.parse_line(inside_function)?);
        }
        Ok(out)
    }

    fn parse_line(&mut self, inside_function: bool) -> Result<Stmt, ParseError> {
        let line = &self.lines[self.pos];
        let tokens = Lexer::new(&line.text, line.offset, line.line_no).tokenize()?;

        let first_ident = ident_text(&tokens, 0);
        let second_ident = ident_text(&tokens, 1);

        if first_ident == Some("async") && second_ident == Some("function") {
            return self.parse_function(&tokens, line, true, inside_function);
        }
        if first_ident == Some("function") {
            return self.parse_function(&tokens, line, false, inside_function);
        }
        if tokens.len() == 3
            && matches!(tokens[1].kind, TokenKind::Colon)
            && matches!(tokens[2].kind, TokenKind::Eof)
        {
            if let TokenKind::Ident(name) = &tokens[0].kind {
                let span = tokens[0].span.merge(tokens[1].span);
                self.pos += 1;
                return Ok(Stmt::Label {
                    name: name.clone(),
                    span,
                });
            }
        }
        if first_ident == Some("jumpif") {
            self.pos += 1;
            return self.parse_jump(&tokens, line, true);
        }
        if first_ident == Some("jump") {
            self.pos += 1;
            return self.parse_jump(&tokens, line, false);
        }
        if first_ident == Some("return") {
            self.pos += 1;
            return self.parse_return(&tokens, line);
        }
        if first_ident == Some("include") {
            self.pos += 1;
            return self.parse_include(&tokens, line);
        }
        if let (Some(TokenKind::Ident(name)), Some(TokenKind::Assign)) =
            (tokens.first().map(|t| &t.kind), tokens.get(1).map(|t| &t.kind))
        {
            self.pos += 1;
            let mut cursor = cursor_from(&tokens, 2, line);
            let expr = parse_expr_bp(&mut cursor, 0)?;
            cursor.expect_eof()?;
            let span = tokens[0].span.merge(expr.span());
            return Ok(Stmt::Expr {
                name: Some(name.clone()),
                expr,
                span,
            });
        }

        self.pos += 1;
        let mut cursor = cursor_from(&tokens, 0, line);
        let expr = parse_expr_bp(&mut cursor, 0)?;
        cursor.expect_eof()?;
        let span = expr.span();
        Ok(Stmt::Expr {
            name: None,
            expr,
            span,
        })
    }

    fn parse_function(
        &mut self,
        tokens: &[Token],
        line: &crate::lines::LogicalLine,
        is_async: bool,
        inside_function: bool,
    ) -> Result<Stmt, ParseError> {
        if inside_function {
            return Err(ParseError::NestedFunction);
        }
        let name_idx = if is_async { 2 } else { 1 };
        let name = match tokens.get(name_idx).map(|t| &t.kind) {
            Some(TokenKind::Ident(n)) => n.clone(),
            _ => return Err(ParseError::Syntax(remaining(tokens, name_idx, line))),
        };
        let mut idx = name_idx + 1;
        match tokens.get(idx).map(|t| &t.kind) {
            Some(TokenKind::LParen) => idx += 1,
            _ => return Err(ParseError::Syntax(remaining(tokens, idx, line))),
        }
        let mut args = Vec::new();
        if !matches!(tokens.get(idx).map(|t| &t.kind), Some(TokenKind::RParen)) {
            loop {
                match tokens.get(idx).map(|t| &t.kind) {
                    Some(TokenKind::Ident(p)) => {
                        args.push(p.clone());
                        idx += 1;
                    }
                    _ => return Err(ParseError::Syntax(remaining(tokens, idx, line))),
                }
                match tokens.get(idx).map(|t| &t.kind) {
                    Some(TokenKind::Comma) => {
                        idx += 1;
                        continue;
                    }
                    _ => break,
                }
            }
        }
        match tokens.get(idx).map(|t| &t.kind) {
            Some(TokenKind::RParen) => idx += 1,
            _ => return Err(ParseError::UnmatchedParenthesis),
        }
        if !matches!(tokens.get(idx).map(|t| &t.kind), Some(TokenKind::Eof)) {
            return Err(ParseError::Syntax(remaining(tokens, idx, line)));
        }

        let start_span = tokens[0].span;
        self.pos += 1;
        let body = self.parse_block(true)?;
        if self.pos >= self.lines.len() {
            return Err(ParseError::UnterminatedFunction(name));
        }
        let end_span = {
            let end_tokens =
                Lexer::new(&self.lines[self.pos].text, self.lines[self.pos].offset, self.lines[self.pos].line_no)
                    .tokenize()?;
            end_tokens[0].span
        };
        self.pos += 1; // consume `endfunction`

        Ok(Stmt::Function {
            is_async,
            name,
            args,
            statements: body,
            span: start_span.merge(end_span),
        })
    }

    fn parse_jump(
        &mut self,
        tokens: &[Token],
        line: &crate::lines::LogicalLine,
        conditional: bool,
    ) -> Result<Stmt, ParseError> {
        let keyword_span = tokens[0].span;
        let mut idx = 1;
        let expr = if conditional {
            match tokens.get(idx).map(|t| &t.kind) {
                Some(TokenKind::LParen) => idx += 1,
                _ => return Err(ParseError::Syntax(remaining(tokens, idx, line))),
            }
            let mut cursor = cursor_from(tokens, idx, line);
            let e = parse_expr_bp(&mut cursor, 0)?;
            idx = cursor.pos;
            match tokens.get(idx).map(|t| &t.kind) {
                Some(TokenKind::RParen) => idx += 1,
                _ => return Err(ParseError::UnmatchedParenthesis),
            }
            Some(e)
        } else {
            None
        };
        let label = match tokens.get(idx).map(|t| &t.kind) {
            Some(TokenKind::Ident(l)) => l.clone(),
            _ => return Err(ParseError::Syntax(remaining(tokens, idx, line))),
        };
        idx += 1;
        if !matches!(tokens.get(idx).map(|t| &t.kind), Some(TokenKind::Eof)) {
            return Err(ParseError::Syntax(remaining(tokens, idx, line)));
        }
        let span = keyword_span.merge(tokens[idx - 1].span);
        Ok(Stmt::Jump { label, expr, span })
    }

    fn parse_return(
        &mut self,
        tokens: &[Token],
        line: &crate::lines::LogicalLine,
    ) -> Result<Stmt, ParseError> {
        let keyword_span = tokens[0].span;
        if matches!(tokens.get(1).map(|t| &t.kind), Some(TokenKind::Eof)) {
            return Ok(Stmt::Return {
                expr: None,
                span: keyword_span,
            });
        }
        let mut cursor = cursor_from(tokens, 1, line);
        let expr = parse_expr_bp(&mut cursor, 0)?;
        cursor.expect_eof()?;
        let span = keyword_span.merge(expr.span());
        Ok(Stmt::Return {
            expr: Some(expr),
            span,
        })
    }

    fn parse_include(
        &mut self,
        tokens: &[Token],
        line: &crate::lines::LogicalLine,
    ) -> Result<Stmt, ParseError> {
        let keyword_span = tokens[0].span;
        match tokens.get(1).map(|t| &t.kind) {
            Some(TokenKind::Str(path)) => {
                let path_span = tokens[1].span;
                if !matches!(tokens.get(2).map(|t| &t.kind), Some(TokenKind::Eof)) {
                    return Err(ParseError::Syntax(remaining(tokens, 2, line)));
                }
                Ok(Stmt::Include {
                    path: path.clone(),
                    span: keyword_span.merge(path_span),
                })
            }
            _ => Err(ParseError::Syntax(remaining(tokens, 1, line))),
        }
    }
}

fn ident_text(tokens: &[Token], idx: usize) -> Option<&str> {
    match tokens.get(idx).map(|t| &t.kind) {
        Some(TokenKind::Ident(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn remaining(tokens: &[Token], idx: usize, line: &crate::lines::LogicalLine) -> String {
    let tok = tokens.get(idx).unwrap_or_else(|| tokens.last().unwrap());
    let rel = tok.span.start.saturating_sub(line.offset);
    line.text.get(rel.min(line.text.len())..).unwrap_or("").to_string()
}

fn cursor_from<'a>(
    tokens: &'a [Token],
    start: usize,
    line: &'a crate::lines::LogicalLine,
) -> ExprCursor<'a> {
    ExprCursor {
        tokens,
        pos: start,
        line_text: &line.text,
        line_start: line.offset,
    }
}

// ---------------------------------------------------------------------------
// Expression parser: precedence climbing (binding powers)
// ---------------------------------------------------------------------------

struct ExprCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    line_text: &'a str,
    line_start: usize,
}

impl<'a> ExprCursor<'a> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn remaining_text(&self) -> String {
        let span = self.peek_span();
        let rel = span.start.saturating_sub(self.line_start);
        self.line_text.get(rel.min(self.line_text.len())..).unwrap_or("").to_string()
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if matches!(self.peek(), TokenKind::Eof) {
            Ok(())
        } else {
            Err(ParseError::Syntax(self.remaining_text()))
        }
    }
}

/// Binding power per binary operator: `(left, right)`. A higher number
/// binds tighter. `**` is right-associative (rbp < lbp); every other
/// operator is left-associative (rbp > lbp) — see DESIGN.md for why `**`'s
/// associativity was decided this way (§9 open question).
fn binary_binding_power(kind: &TokenKind) -> Option<(BinOp, u8, u8)> {
    Some(match kind {
        TokenKind::OrOr => (BinOp::Or, 1, 2),
        TokenKind::AndAnd => (BinOp::And, 3, 4),
        TokenKind::EqEq => (BinOp::Eq, 5, 6),
        TokenKind::NotEq => (BinOp::NotEq, 5, 6),
        TokenKind::Le => (BinOp::Le, 7, 8),
        TokenKind::Lt => (BinOp::Lt, 7, 8),
        TokenKind::Ge => (BinOp::Ge, 7, 8),
        TokenKind::Gt => (BinOp::Gt, 7, 8),
        TokenKind::Plus => (BinOp::Add, 9, 10),
        TokenKind::Minus => (BinOp::Sub, 9, 10),
        TokenKind::Star => (BinOp::Mul, 11, 12),
        TokenKind::Slash => (BinOp::Div, 11, 12),
        TokenKind::Percent => (BinOp::Mod, 11, 12),
        TokenKind::StarStar => (BinOp::Pow, 14, 13),
        _ => return None,
    })
}

fn parse_expr_bp(cur: &mut ExprCursor, min_bp: u8) -> Result<Expr, ParseError> {
    let mut left = parse_unary(cur)?;
    loop {
        let Some((op, lbp, rbp)) = binary_binding_power(cur.peek()) else {
            break;
        };
        if lbp < min_bp {
            break;
        }
        cur.advance();
        let right = parse_expr_bp(cur, rbp)?;
        let span = left.span().merge(right.span());
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        };
    }
    Ok(left)
}

fn parse_unary(cur: &mut ExprCursor) -> Result<Expr, ParseError> {
    match cur.peek().clone() {
        TokenKind::Minus => {
            let start = cur.advance().span;
            let inner = parse_unary(cur)?;
            let span = start.merge(inner.span());
            Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(inner),
                span,
            })
        }
        TokenKind::Bang => {
            let start = cur.advance().span;
            let inner = parse_unary(cur)?;
            let span = start.merge(inner.span());
            Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(inner),
                span,
            })
        }
        TokenKind::LParen => {
            let start = cur.advance().span;
            let inner = parse_expr_bp(cur, 0)?;
            match cur.peek() {
                TokenKind::RParen => {
                    let end = cur.advance().span;
                    Ok(Expr::Group(Box::new(inner), start.merge(end)))
                }
                _ => Err(ParseError::UnmatchedParenthesis),
            }
        }
        TokenKind::Number(n) => {
            let span = cur.advance().span;
            Ok(Expr::Number(n, span))
        }
        TokenKind::Str(s) => {
            let span = cur.advance().span;
            Ok(Expr::String(s, span))
        }
        TokenKind::ExtIdent(name) => {
            let span = cur.advance().span;
            Ok(Expr::Variable(name, span))
        }
        TokenKind::Ident(name) => {
            let start = cur.advance().span;
            if matches!(cur.peek(), TokenKind::LParen) {
                cur.advance();
                let mut args = Vec::new();
                if !matches!(cur.peek(), TokenKind::RParen) {
                    loop {
                        args.push(parse_expr_bp(cur, 0)?);
                        if matches!(cur.peek(), TokenKind::Comma) {
                            cur.advance();
                            continue;
                        }
                        break;
                    }
                }
                match cur.peek() {
                    TokenKind::RParen => {
                        let end = cur.advance().span;
                        let args = if args.is_empty() { None } else { Some(args) };
                        Ok(Expr::Function {
                            name,
                            args,
                            span: start.merge(end),
                        })
                    }
                    _ => Err(ParseError::UnmatchedParenthesis),
                }
            } else {
                Ok(Expr::Variable(name, start))
            }
        }
        _ => Err(ParseError::Syntax(cur.remaining_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_shape(src: &str) -> Expr {
        parse_expression(src).unwrap()
    }

    #[test]
    fn precedence_mul_over_add() {
        // 7 + 3 * 5 should parse as 7 + (3 * 5)
        let e = eval_shape("7 + 3 * 5");
        match e {
            Expr::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. }));
            }
            _ => panic!("expected Add at root"),
        }
    }

    #[test]
    fn groups_override_precedence() {
        let e = eval_shape("(7 + 3) * 5");
        match e {
            Expr::Binary { op: BinOp::Mul, left, .. } => {
                assert!(matches!(*left, Expr::Group(_, _)));
            }
            _ => panic!("expected Mul at root"),
        }
    }

    #[test]
    fn pow_is_right_associative() {
        // a ** b ** c => a ** (b ** c)
        let e = eval_shape("2 ** 3 ** 2");
        match e {
            Expr::Binary { op: BinOp::Pow, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinOp::Pow, .. }));
            }
            _ => panic!("expected Pow at root"),
        }
    }

    #[test]
    fn unmatched_paren_is_distinct_error() {
        assert_eq!(parse_expression("(1 + 2"), Err(ParseError::UnmatchedParenthesis));
    }

    #[test]
    fn function_call_with_args() {
        let e = eval_shape("mul(6, 7)");
        match e {
            Expr::Function { name, args, .. } => {
                assert_eq!(name, "mul");
                assert_eq!(args.unwrap().len(), 2);
            }
            _ => panic!("expected function call"),
        }
    }

    #[test]
    fn extended_variable_name() {
        let e = eval_shape("[a weird name]");
        assert!(matches!(e, Expr::Variable(n, _) if n == "a weird name"));
    }

    #[test]
    fn rejects_nested_function_definitions() {
        let err = parse_script("function outer()\nfunction inner()\nreturn 1\nendfunction\nendfunction\n")
            .unwrap_err();
        assert_eq!(err, ParseError::NestedFunction);
    }

    #[test]
    fn parses_fibonacci_via_labels() {
        let script = parse_script(
            "n = 10\ni = 0\na = 0\nb = 1\nfib:\njumpif (i >= n) fibend\ntmp = b\nb = a + b\na = tmp\ni = i + 1\njump fib\nfibend:\nreturn a\n",
        )
        .unwrap();
        assert_eq!(script.statements.len(), 13);
    }
}
