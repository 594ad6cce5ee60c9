//! Tokenization for the template processor
//!
//! Produces a lazy, forward-only stream of tokens over three pattern classes,
//! attempted in priority order at each position:
//!
//! 1. conditional markers: `[if:cond]`, `[elseif:cond]`, `[else]`, `[/if]`
//! 2. fallback wrappers: `TAG[fallback]body[/fallback]`, closed at the
//!    marker matching the opener's depth so fallbacks may nest
//! 3. bare tags: `%source:path|filters%`
//!
//! Text between tokens is literal and never reported.

use crate::tag::{Tag, TAG_PATTERN};
use regex::{Captures, Regex};
use std::sync::LazyLock;

const FALLBACK_OPEN: &str = "[fallback]";
const FALLBACK_CLOSE: &str = "[/fallback]";

/// Condition text inside `[if:...]`; quoted strings may contain `]`
const CONDITION_PATTERN: &str = r#"(?:[^\]'"]|'[^']*'|"[^"]*"|['"])*"#;

fn marker_pattern() -> String {
    format!(
        r"\[if:(?P<if>{c})\]|\[elseif:(?P<elseif>{c})\]|(?P<else>\[else\])|(?P<endif>\[/if\])",
        c = CONDITION_PATTERN
    )
}

/// Markers, fallbacks and tags
static FULL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s){markers}|(?P<ftag>{tag})\[fallback\]|(?P<tag>{tag})",
        markers = marker_pattern(),
        tag = TAG_PATTERN.as_str()
    ))
    .expect("token pattern is valid")
});

/// Markers and tags only; fallback wrappers stay invisible so markers inside
/// a fallback body are still found
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s){markers}|(?P<tag>{tag})",
        markers = marker_pattern(),
        tag = TAG_PATTERN.as_str()
    ))
    .expect("block pattern is valid")
});

/// Token classification
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `[if:condition]`
    IfOpen { condition: String },

    /// `[elseif:condition]`
    ElseIf { condition: String },

    /// `[else]`
    Else,

    /// `[/if]`
    IfClose,

    /// `TAG[fallback]body[/fallback]`
    Fallback { tag: String, body: String },

    /// `%source:path|filters%`
    Tag { tag: Tag, text: String },
}

impl TokenKind {
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            TokenKind::IfOpen { .. } | TokenKind::ElseIf { .. } | TokenKind::Else | TokenKind::IfClose
        )
    }
}

/// A token with its byte span in the scanned text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Absolute byte position of the token start
    pub start: usize,
    /// Total length in bytes
    pub length: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Iterator over tokens in a template string.
///
/// Finite and non-restartable: each call to `next` resumes after the
/// previous match.
pub struct TokenStream<'a> {
    text: &'a str,
    regex: &'static Regex,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    /// Stream of markers, fallback wrappers and bare tags
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            regex: &FULL_RE,
            pos: 0,
        }
    }

    /// Stream of conditional markers and bare tags.
    ///
    /// Tags are still consumed so a marker-like string inside a quoted
    /// filter argument is not mistaken for a marker.
    pub fn blocks(text: &'a str) -> Self {
        Self {
            text,
            regex: &BLOCK_RE,
            pos: 0,
        }
    }

    fn classify(caps: &Captures<'_>) -> Option<TokenKind> {
        if let Some(m) = caps.name("if") {
            return Some(TokenKind::IfOpen {
                condition: m.as_str().to_string(),
            });
        }
        if let Some(m) = caps.name("elseif") {
            return Some(TokenKind::ElseIf {
                condition: m.as_str().to_string(),
            });
        }
        if caps.name("else").is_some() {
            return Some(TokenKind::Else);
        }
        if caps.name("endif").is_some() {
            return Some(TokenKind::IfClose);
        }
        bare_tag(caps.name("tag")?.as_str())
    }

    /// Fallback wrapper opened by `caps`, or the bare tag when it never closes
    fn fallback(&mut self, caps: &Captures<'_>) -> Option<Token> {
        let whole = caps.get(0)?;
        let tag = caps.name("ftag")?;
        match find_fallback_close(self.text, whole.end()) {
            Some((body_end, close_end)) => {
                self.pos = close_end;
                Some(Token {
                    kind: TokenKind::Fallback {
                        tag: tag.as_str().to_string(),
                        body: self.text[whole.end()..body_end].to_string(),
                    },
                    start: whole.start(),
                    length: close_end - whole.start(),
                })
            }
            None => {
                self.pos = tag.end();
                bare_tag(tag.as_str()).map(|kind| Token {
                    kind,
                    start: tag.start(),
                    length: tag.len(),
                })
            }
        }
    }
}

fn bare_tag(text: &str) -> Option<TokenKind> {
    Tag::parse(text).map(|tag| TokenKind::Tag {
        tag,
        text: text.to_string(),
    })
}

/// Span of the `[/fallback]` closing a body that starts at `from`.
///
/// Returns `(body_end, close_end)`; nested openers raise the depth.
fn find_fallback_close(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut pos = from;
    while let Some(offset) = text[pos..].find('[') {
        let at = pos + offset;
        let rest = &text[at..];
        if rest.starts_with(FALLBACK_CLOSE) {
            depth -= 1;
            if depth == 0 {
                return Some((at, at + FALLBACK_CLOSE.len()));
            }
            pos = at + FALLBACK_CLOSE.len();
        } else if rest.starts_with(FALLBACK_OPEN) {
            depth += 1;
            pos = at + FALLBACK_OPEN.len();
        } else {
            pos = at + 1;
        }
    }
    None
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if self.pos > self.text.len() {
                return None;
            }
            let caps = self.regex.captures_at(self.text, self.pos)?;
            if caps.name("ftag").is_some() {
                match self.fallback(&caps) {
                    Some(token) => return Some(token),
                    None => continue,
                }
            }
            let whole = caps.get(0)?;
            self.pos = whole.end();
            if let Some(kind) = Self::classify(&caps) {
                return Some(Token {
                    kind,
                    start: whole.start(),
                    length: whole.end() - whole.start(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        TokenStream::new(text).map(|t| t.kind).collect()
    }

    #[test]
    fn test_plain_text_has_no_tokens() {
        assert!(kinds("Hello world, 100% sure [not a marker]").is_empty());
    }

    #[test]
    fn test_bare_tag_positions() {
        let tokens: Vec<Token> = TokenStream::new("<h3>%native:title%</h3>").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].start, 4);
        assert_eq!(tokens[0].length, "%native:title%".len());
        match &tokens[0].kind {
            TokenKind::Tag { tag, text } => {
                assert_eq!(tag.field(), "title");
                assert_eq!(text, "%native:title%");
            }
            other => panic!("Expected tag, got {other:?}"),
        }
    }

    #[test]
    fn test_markers() {
        let found = kinds("[if:%custom:a% == '1']x[elseif:%custom:a% > 2]y[else]z[/if]");
        assert_eq!(
            found,
            vec![
                TokenKind::IfOpen {
                    condition: "%custom:a% == '1'".to_string()
                },
                TokenKind::ElseIf {
                    condition: "%custom:a% > 2".to_string()
                },
                TokenKind::Else,
                TokenKind::IfClose,
            ]
        );
    }

    #[test]
    fn test_condition_with_bracket_in_quotes() {
        let found = kinds("[if:%native:title% == 'a]b']ok[/if]");
        assert_eq!(
            found[0],
            TokenKind::IfOpen {
                condition: "%native:title% == 'a]b'".to_string()
            }
        );
    }

    #[test]
    fn test_fallback_has_priority_over_bare_tag() {
        let found = kinds("%native:subtitle%[fallback]None[/fallback] %native:title%");
        assert_eq!(found.len(), 2);
        assert_eq!(
            found[0],
            TokenKind::Fallback {
                tag: "%native:subtitle%".to_string(),
                body: "None".to_string()
            }
        );
        assert!(matches!(found[1], TokenKind::Tag { .. }));
    }

    #[test]
    fn test_nested_fallback_closes_at_matching_marker() {
        let text = "%custom:a%[fallback]%custom:b%[fallback]X[/fallback][/fallback] tail";
        let tokens: Vec<Token> = TokenStream::new(text).collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            TokenKind::Fallback {
                tag: "%custom:a%".to_string(),
                body: "%custom:b%[fallback]X[/fallback]".to_string()
            }
        );
        assert_eq!(&text[tokens[0].end()..], " tail");
    }

    #[test]
    fn test_sibling_fallbacks_stay_separate() {
        let found = kinds("%custom:a%[fallback]A[/fallback] %custom:b%[fallback]B[/fallback]");
        assert_eq!(found.len(), 2);
        assert!(matches!(&found[1], TokenKind::Fallback { body, .. } if body == "B"));
    }

    #[test]
    fn test_unclosed_fallback_is_a_bare_tag() {
        let found = kinds("%custom:a%[fallback]never closed");
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], TokenKind::Tag { .. }));
    }

    #[test]
    fn test_fallback_body_spans_lines() {
        let found = kinds("%custom:bio%[fallback]\nline one\nline two\n[/fallback]");
        assert!(matches!(&found[0], TokenKind::Fallback { body, .. } if body.contains("line two")));
    }

    #[test]
    fn test_blocks_stream_sees_markers_inside_fallbacks() {
        let text = "%custom:a%[fallback][if:%custom:b% == 'x']B[/if][/fallback]";
        let markers: Vec<TokenKind> = TokenStream::blocks(text)
            .map(|t| t.kind)
            .filter(TokenKind::is_marker)
            .collect();
        assert_eq!(markers.len(), 2);
    }

    #[test]
    fn test_marker_inside_quoted_argument_is_not_a_marker() {
        let found: Vec<TokenKind> = TokenStream::blocks("%custom:a|default('[else]')%").map(|t| t.kind).collect();
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], TokenKind::Tag { .. }));
    }

    #[test]
    fn test_stream_is_lazy_and_finite() {
        let text = "%native:a% %native:b% %native:c%";
        let mut stream = TokenStream::new(text);
        assert!(stream.next().is_some());
        assert_eq!(stream.count(), 2);
    }
}
