//! Hand-written tokenizer for rule expressions
//!
//! Tokens: string literals (`"..."`, `'...'`, raw `r"..."`) with `{field}`
//! placeholders, numbers, identifiers and keywords, `{field}` references,
//! punctuation and operators.

use super::ast::{Segment, Template};
use super::ParseError;

/// A lexical token with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was read
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub offset: usize,
}

/// Kind of token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// String literal, possibly with placeholders
    Str(Template),
    /// Numeric literal
    Num(f64),
    /// Identifier (function or field name)
    Ident(String),
    /// `{name}` outside a string
    Field(String),
    /// `true` / `True`
    True,
    /// `false` / `False`
    False,
    /// `and` / `&&`
    And,
    /// `or` / `||`
    Or,
    /// `not` / `!`
    Not,
    /// `in`
    In,
    /// `=`, only valid between a keyword argument's name and value
    Assign,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `.`
    Dot,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(_) => write!(f, "string"),
            Self::Num(n) => write!(f, "{n}"),
            Self::Ident(name) => write!(f, "'{name}'"),
            Self::Field(name) => write!(f, "'{{{name}}}'"),
            Self::True => write!(f, "'true'"),
            Self::False => write!(f, "'false'"),
            Self::And => write!(f, "'and'"),
            Self::Or => write!(f, "'or'"),
            Self::Not => write!(f, "'not'"),
            Self::In => write!(f, "'in'"),
            Self::Assign => write!(f, "'='"),
            Self::EqEq => write!(f, "'=='"),
            Self::NotEq => write!(f, "'!='"),
            Self::Lt => write!(f, "'<'"),
            Self::Le => write!(f, "'<='"),
            Self::Gt => write!(f, "'>'"),
            Self::Ge => write!(f, "'>='"),
            Self::Plus => write!(f, "'+'"),
            Self::Minus => write!(f, "'-'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::Comma => write!(f, "','"),
            Self::Dot => write!(f, "'.'"),
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Split an expression into tokens
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.chars.next();
        }
        let Some((offset, ch)) = self.chars.next() else {
            return Ok(None);
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '=' if self.eat('=') => TokenKind::EqEq,
            '=' => TokenKind::Assign,
            '!' if self.eat('=') => TokenKind::NotEq,
            '!' => TokenKind::Not,
            '<' if self.eat('=') => TokenKind::Le,
            '<' => TokenKind::Lt,
            '>' if self.eat('=') => TokenKind::Ge,
            '>' => TokenKind::Gt,
            '&' if self.eat('&') => TokenKind::And,
            '|' if self.eat('|') => TokenKind::Or,
            '"' | '\'' => TokenKind::Str(self.string(offset, ch, false)?),
            '{' => TokenKind::Field(self.placeholder(offset)?),
            c if c.is_ascii_digit() => TokenKind::Num(self.number(offset)?),
            c if is_ident_start(c) => {
                let word = self.word(offset);
                match (word, self.peek_char()) {
                    ("r" | "R", Some(quote @ ('"' | '\''))) => {
                        self.chars.next();
                        TokenKind::Str(self.string(offset, quote, true)?)
                    },
                    ("and", _) => TokenKind::And,
                    ("or", _) => TokenKind::Or,
                    ("not", _) => TokenKind::Not,
                    ("in", _) => TokenKind::In,
                    ("true" | "True", _) => TokenKind::True,
                    ("false" | "False", _) => TokenKind::False,
                    (other, _) => TokenKind::Ident(other.to_string()),
                }
            },
            other => {
                return Err(ParseError::new(offset, format!("unexpected character '{other}'")));
            },
        };
        Ok(Some(Token { kind, offset }))
    }

    /// Consume the rest of an identifier whose first char is at `start`
    fn word(&mut self, start: usize) -> &'a str {
        let input = self.input;
        let mut end = start + 1;
        while let Some(&(pos, ch)) = self.chars.peek() {
            if !is_ident_char(ch) {
                break;
            }
            end = pos + ch.len_utf8();
            self.chars.next();
        }
        &input[start..end]
    }

    fn number(&mut self, start: usize) -> Result<f64, ParseError> {
        let mut end = start + 1;
        let mut seen_dot = false;
        while let Some(&(pos, ch)) = self.chars.peek() {
            if ch.is_ascii_digit() {
                end = pos + 1;
            } else if ch == '.'
                && !seen_dot
                && self.input[pos + 1..].starts_with(|c: char| c.is_ascii_digit())
            {
                seen_dot = true;
                end = pos + 1;
            } else {
                break;
            }
            self.chars.next();
        }
        let text = &self.input[start..end];
        text.parse().map_err(|_| ParseError::new(start, format!("invalid number '{text}'")))
    }

    /// Read `name}` after an opening brace
    fn placeholder(&mut self, start: usize) -> Result<String, ParseError> {
        let mut name = String::new();
        loop {
            match self.chars.next() {
                Some((_, '}')) => break,
                Some((_, ch)) if is_ident_char(ch) => name.push(ch),
                Some((pos, ch)) => {
                    return Err(ParseError::new(
                        pos,
                        format!("unexpected character '{ch}' in placeholder"),
                    ));
                },
                None => return Err(ParseError::new(start, "unterminated placeholder")),
            }
        }
        if name.is_empty() {
            return Err(ParseError::new(start, "empty placeholder '{}'"));
        }
        Ok(name)
    }

    /// Read a string body up to the closing `quote`
    fn string(&mut self, start: usize, quote: char, raw: bool) -> Result<Template, ParseError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        loop {
            let Some((pos, ch)) = self.chars.next() else {
                return Err(ParseError::new(start, "unterminated string"));
            };
            match ch {
                c if c == quote => break,
                '\\' if raw => {
                    // A raw string still cannot end on an escaped quote.
                    literal.push('\\');
                    if let Some((_, next)) = self.chars.next() {
                        literal.push(next);
                    }
                },
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => literal.push('\n'),
                    Some((_, 't')) => literal.push('\t'),
                    Some((_, c @ ('\\' | '"' | '\''))) => literal.push(c),
                    Some((_, other)) => {
                        literal.push('\\');
                        literal.push(other);
                    },
                    None => return Err(ParseError::new(start, "unterminated string")),
                },
                '{' if self.eat('{') => literal.push('{'),
                '}' if self.eat('}') => literal.push('}'),
                '{' => {
                    let name = self.placeholder(pos)?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(name));
                },
                '}' => {
                    return Err(ParseError::new(pos, "single '}' in string, use '}}'"));
                },
                other => literal.push(other),
            }
        }
        if !literal.is_empty() || segments.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Template::new(segments))
    }
}
