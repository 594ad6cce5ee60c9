//! Condition grammar: `<tag> <operator> '<literal>'`

use crate::tag::{Tag, TAG_PATTERN, unquote};
use crate::value::lenient_f64;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s)^\s*(?P<tag>{tag})\s+(?P<op>==|!=|>=|<=|>|<|not_contains|contains)\s+(?P<literal>.*?)\s*$",
        tag = TAG_PATTERN.as_str()
    ))
    .expect("condition pattern is valid")
});

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
    NotContains,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "==" => Operator::Eq,
            "!=" => Operator::Ne,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            "contains" => Operator::Contains,
            "not_contains" => Operator::NotContains,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
        }
    }

    /// Compare the rendered tag value against the literal.
    ///
    /// Ordering operators compare leading numbers (non-numeric text is 0);
    /// the rest compare strings.
    pub fn apply(self, left: &str, right: &str) -> bool {
        match self {
            Operator::Eq => left == right,
            Operator::Ne => left != right,
            Operator::Gt => lenient_f64(left) > lenient_f64(right),
            Operator::Lt => lenient_f64(left) < lenient_f64(right),
            Operator::Ge => lenient_f64(left) >= lenient_f64(right),
            Operator::Le => lenient_f64(left) <= lenient_f64(right),
            Operator::Contains => left.contains(right),
            Operator::NotContains => !left.contains(right),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub tag: Tag,
    pub operator: Operator,
    pub literal: String,
}

impl Condition {
    /// Parse condition text; `None` when it does not match the grammar
    pub fn parse(text: &str) -> Option<Self> {
        let caps = CONDITION_RE.captures(text)?;
        let tag = Tag::parse(caps.name("tag")?.as_str())?;
        let operator = Operator::from_symbol(caps.name("op")?.as_str())?;
        let literal = unquote(caps.name("literal")?.as_str()).to_string();
        Some(Self {
            tag,
            operator,
            literal,
        })
    }

    /// Evaluate against an already rendered tag value
    pub fn holds_for(&self, rendered: &str) -> bool {
        self.operator.apply(rendered, &self.literal)
    }
}
