//! Expression tree

use super::Value;

/// One piece of a string literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied as-is
    Literal(String),
    /// `{name}`: replaced by the record's field value
    Field(String),
}

/// A string literal with optional `{field}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Create a template from its segments
    #[must_use]
    pub const fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The template's segments
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => write!(f, "=="),
            Self::Ne => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
}

impl std::fmt::Display for ArithOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
        }
    }
}

/// A parsed rule expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant value (number, boolean)
    Const(Value),
    /// String literal, placeholders resolved at evaluation
    Text(Template),
    /// Field value, `{name}` or a bare identifier
    Field(String),
    /// `(a, b)` or `[a, b]`
    List(Vec<Expr>),
    /// `not x`
    Not(Box<Expr>),
    /// `-x`
    Neg(Box<Expr>),
    /// `a and b`
    And(Box<Expr>, Box<Expr>),
    /// `a or b`
    Or(Box<Expr>, Box<Expr>),
    /// `a == b`, `a < b`, ...
    Compare(CmpOp, Box<Expr>, Box<Expr>),
    /// `a in b`, or `a not in b` when `negated`
    In {
        /// Value searched for
        needle: Box<Expr>,
        /// String or list searched in
        haystack: Box<Expr>,
        /// `not in`
        negated: bool,
    },
    /// `a + b`, `a - b`
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    /// `name(args)`; method calls `x.name(args)` become `name(x, args)`
    Call {
        /// Function name, possibly dotted (`re.search`)
        name: String,
        /// Positional arguments
        args: Vec<Expr>,
        /// Keyword arguments (`days=30`), in source order
        keywords: Vec<(String, Expr)>,
    },
}
