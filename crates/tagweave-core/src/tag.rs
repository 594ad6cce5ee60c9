//! Tag grammar
//!
//! ```text
//! tag         := "%" source ":" path (ws* "|" ws* filterchain)? "%"
//! source      := "custom" | "native" | "row"
//! path        := segment ("." segment)*
//! filterchain := filter (ws* "|" ws* filter)*
//! filter      := name ("(" arglist ")")?
//! arglist     := arg ("," arg)*
//! arg         := quoted-string | bareword
//! ```

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Filter chain following a path: `|name` or `|name(args)`, quotes honoured
/// inside argument lists.
const CHAIN_PATTERN: &str = r#"(?:\s*\|\s*\w+(?:\((?:[^()'"]|'[^']*'|"[^"]*")*\))?)*"#;

/// Unanchored tag pattern without capture groups, for embedding in larger
/// patterns
pub(crate) static TAG_PATTERN: LazyLock<String> =
    LazyLock::new(|| format!(r"%(?:custom|native|row):[\w.\-]+{CHAIN_PATTERN}%"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^%(?P<source>custom|native|row):(?P<path>[\w.\-]+)(?P<chain>{CHAIN_PATTERN})%$"
    ))
    .expect("tag pattern is valid")
});

/// Property name reserved for field metadata access (`field.label`)
pub const LABEL_PROPERTY: &str = "label";

/// Which data source a tag reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// Custom-fields store
    Custom,
    /// Native record properties (title, date, author, ...)
    Native,
    /// Current loop row
    Row,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Custom, Source::Native, Source::Row];

    pub fn keyword(self) -> &'static str {
        match self {
            Source::Custom => "custom",
            Source::Native => "native",
            Source::Row => "row",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Source::ALL.into_iter().find(|s| s.keyword() == keyword)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::from_keyword(s).ok_or_else(|| format!("unknown source keyword '{}'", s))
    }
}

/// `name(arg, ...)` as written in a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInvocation {
    pub name: String,
    pub args: Vec<String>,
}

impl FilterInvocation {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Parse `name` or `name(a, 'b, c')`
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (name, args) = match text.find('(') {
            Some(open) => {
                let inner = text[open + 1..].strip_suffix(')')?;
                (&text[..open], split_args(inner))
            }
            None => (text, Vec::new()),
        };
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }
        Some(Self::new(name, args))
    }
}

/// A parsed `%source:path|filters%` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub source: Source,
    /// Never empty; only [`Tag::parse`] builds tags
    path: Vec<String>,
    pub filters: Vec<FilterInvocation>,
}

impl Tag {
    /// Parse a complete tag (delimiters included).
    ///
    /// Returns `None` for anything that is not exactly one tag; such text is
    /// treated as literal by the engine.
    pub fn parse(text: &str) -> Option<Tag> {
        let caps = TAG_RE.captures(text)?;
        let source = Source::from_keyword(caps.name("source")?.as_str())?;

        let path: Vec<String> = caps
            .name("path")?
            .as_str()
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if path.is_empty() {
            return None;
        }

        let chain = caps.name("chain").map(|m| m.as_str()).unwrap_or("");
        let filters = split_top_level(chain, '|')
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(FilterInvocation::parse)
            .collect::<Option<Vec<_>>>()?;

        Some(Tag {
            source,
            path,
            filters,
        })
    }

    /// Full dotted path, field first
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// First path segment
    pub fn field(&self) -> &str {
        &self.path[0]
    }

    /// Path segments after the field
    pub fn properties(&self) -> &[String] {
        &self.path[1..]
    }

    /// `field.label`: metadata lookup instead of value traversal
    pub fn is_label_access(&self) -> bool {
        self.path.len() == 2 && self.path[1] == LABEL_PROPERTY
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}:{}", self.source, self.path.join("."))?;
        for filter in &self.filters {
            write!(f, "|{}", filter.name)?;
            if !filter.args.is_empty() {
                let args: Vec<String> = filter
                    .args
                    .iter()
                    .map(|a| format!("'{}'", a))
                    .collect();
                write!(f, "({})", args.join(","))?;
            }
        }
        f.write_str("%")
    }
}

/// Split `text` on `separator` outside quotes and parentheses
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Split an argument list on top-level commas, trimming and unquoting
fn split_args(inner: &str) -> Vec<String> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    split_top_level(inner, ',')
        .into_iter()
        .map(|arg| unquote(arg.trim()).to_string())
        .collect()
}

/// Strip one pair of matching surrounding quotes
pub(crate) fn unquote(text: &str) -> &str {
    for q in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(q) && text.ends_with(q) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
