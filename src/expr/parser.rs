//! Recursive-descent parser for rule expressions
//!
//! Precedence, lowest first:
//!
//! ```text
//! or_expr    := and_expr (("or" | "||") and_expr)*
//! and_expr   := not_expr (("and" | "&&") not_expr)*
//! not_expr   := ("not" | "!") not_expr | comparison
//! comparison := additive (cmp_op additive | "in" additive | "not" "in" additive)?
//! additive   := unary (("+" | "-") unary)*
//! unary      := "-" unary | postfix
//! postfix    := primary ("." IDENT "(" args ")")*
//! primary    := NUMBER | STRING | "true" | "false" | "{" IDENT "}"
//!             | IDENT | IDENT "(" args ")" | NAMESPACE ("." IDENT)+ "(" args ")"
//!             | "(" ")" | "(" expr ")" | "(" expr ("," expr)* ","? ")"
//!             | "[" (expr ("," expr)* ","?)? "]"
//! args       := (arg ("," arg)* ","?)?
//! arg        := expr | IDENT "=" expr
//! ```

use super::ast::{ArithOp, CmpOp, Expr};
use super::builtins;
use super::lexer::{Token, TokenKind, tokenize};
use super::{ParseError, Value};

/// Parse an expression
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.len(),
    };
    let expr = parser.or_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) if token.kind == TokenKind::Assign => Err(ParseError::new(
            token.offset,
            "unexpected '=', did you mean '=='?",
        )),
        Some(token) => Err(ParseError::new(
            token.offset,
            format!("unexpected {} after end of expression", token.kind),
        )),
    }
}

type CallArgs = (Vec<Expr>, Vec<(String, Expr)>);

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn peek_kind_at(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.end, |t| t.offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            return Ok(());
        }
        Err(self.unexpected(&format!("expected {kind}")))
    }

    fn unexpected(&self, context: &str) -> ParseError {
        match self.peek() {
            Some(token) => {
                ParseError::new(token.offset, format!("{context}, found {}", token.kind))
            },
            None => ParseError::new(self.end, format!("{context}, found end of expression")),
        }
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.eat(&TokenKind::Or) {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.not_expr()?;
        while self.eat(&TokenKind::And) {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::Not) {
            let inner = self.not_expr()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.additive()?;

        let op = match self.peek_kind() {
            Some(TokenKind::EqEq) => CmpOp::Eq,
            Some(TokenKind::NotEq) => CmpOp::Ne,
            Some(TokenKind::Lt) => CmpOp::Lt,
            Some(TokenKind::Le) => CmpOp::Le,
            Some(TokenKind::Gt) => CmpOp::Gt,
            Some(TokenKind::Ge) => CmpOp::Ge,
            Some(TokenKind::In) => {
                self.pos += 1;
                return self.membership(left, false);
            },
            Some(TokenKind::Not) if self.peek_kind_at(1) == Some(&TokenKind::In) => {
                self.pos += 2;
                return self.membership(left, true);
            },
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.additive()?;
        Ok(Expr::Compare(op, Box::new(left), Box::new(right)))
    }

    fn membership(&mut self, needle: Expr, negated: bool) -> Result<Expr, ParseError> {
        let haystack = self.additive()?;
        Ok(Expr::In {
            needle: Box::new(needle),
            haystack: Box::new(haystack),
            negated,
        })
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => ArithOp::Add,
                Some(TokenKind::Minus) => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Arith(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::Minus) {
            let inner = self.unary()?;
            return Ok(match inner {
                Expr::Const(Value::Num(n)) => Expr::Const(Value::Num(-n)),
                other => Expr::Neg(Box::new(other)),
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        while self.eat(&TokenKind::Dot) {
            let name = self.ident("expected method name after '.'")?;
            let (rest, keywords) = self.args()?;
            let mut args = vec![expr];
            args.extend(rest);
            expr = Expr::Call {
                name,
                args,
                keywords,
            };
        }
        Ok(expr)
    }

    fn ident(&mut self, context: &str) -> Result<String, ParseError> {
        if let Some(TokenKind::Ident(name)) = self.peek_kind() {
            let name = name.clone();
            self.pos += 1;
            return Ok(name);
        }
        Err(self.unexpected(context))
    }

    /// `"(" args ")"`: positional arguments, then keyword arguments
    fn args(&mut self) -> Result<CallArgs, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        let mut keywords: Vec<(String, Expr)> = Vec::new();
        loop {
            if self.eat(&TokenKind::RParen) {
                return Ok((args, keywords));
            }
            let offset = self.offset();
            let keyword = match (self.peek_kind(), self.peek_kind_at(1)) {
                (Some(TokenKind::Ident(name)), Some(TokenKind::Assign)) => Some(name.clone()),
                _ => None,
            };
            if let Some(name) = keyword {
                self.pos += 2;
                if keywords.iter().any(|(seen, _)| *seen == name) {
                    let message = format!("repeated keyword argument '{name}'");
                    return Err(ParseError::new(offset, message));
                }
                keywords.push((name, self.or_expr()?));
            } else if keywords.is_empty() {
                args.push(self.or_expr()?);
            } else {
                return Err(ParseError::new(offset, "positional argument after keyword argument"));
            }
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RParen)?;
                return Ok((args, keywords));
            }
        }
    }

    /// Comma-separated expressions up to and including `close`
    fn sequence(&mut self, close: &TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.or_expr()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let offset = self.offset();
        let Some(token) = self.advance() else {
            return Err(ParseError::new(self.end, "expected expression, found end of expression"));
        };

        match token.kind {
            TokenKind::Num(n) => Ok(Expr::Const(Value::Num(n))),
            TokenKind::True => Ok(Expr::Const(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Const(Value::Bool(false))),
            TokenKind::Str(template) => Ok(Expr::Text(template)),
            TokenKind::Field(name) => Ok(Expr::Field(name)),
            TokenKind::Ident(name) => self.named(name),
            TokenKind::LBracket => Ok(Expr::List(self.sequence(&TokenKind::RBracket)?)),
            TokenKind::LParen => self.parenthesized(),
            other => {
                Err(ParseError::new(offset, format!("expected expression, found {other}")))
            },
        }
    }

    /// An identifier: namespaced call, call, or field reference
    fn named(&mut self, name: String) -> Result<Expr, ParseError> {
        if builtins::is_namespace(&name) && self.peek_kind() == Some(&TokenKind::Dot) {
            let mut path = name;
            while self.eat(&TokenKind::Dot) {
                let member = self.ident(&format!("expected function name after '{path}.'"))?;
                path = format!("{path}.{member}");
                if self.peek_kind() == Some(&TokenKind::LParen) {
                    break;
                }
            }
            let (args, keywords) = self.args()?;
            return Ok(Expr::Call {
                name: path,
                args,
                keywords,
            });
        }
        if self.peek_kind() == Some(&TokenKind::LParen) {
            let (args, keywords) = self.args()?;
            return Ok(Expr::Call {
                name,
                args,
                keywords,
            });
        }
        Ok(Expr::Field(name))
    }

    /// After `(`: grouping, or a list when a comma appears
    fn parenthesized(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::RParen) {
            return Ok(Expr::List(Vec::new()));
        }
        let first = self.or_expr()?;
        if self.eat(&TokenKind::RParen) {
            return Ok(first);
        }
        if !self.eat(&TokenKind::Comma) {
            return Err(self.unexpected("expected ',' or ')'"));
        }
        let mut items = vec![first];
        items.extend(self.sequence(&TokenKind::RParen)?);
        Ok(Expr::List(items))
    }
}
