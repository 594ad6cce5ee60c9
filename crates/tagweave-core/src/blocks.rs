//! Block matching for `[if]...[/if]` (closing marker lookup, branch splitting)

use crate::tokenize::{Token, TokenKind, TokenStream};

/// One branch of a conditional block
#[derive(Debug, Clone, PartialEq)]
pub struct Branch<'a> {
    /// `None` for `[else]`
    pub condition: Option<&'a str>,
    /// Raw, unprocessed body text
    pub body: &'a str,
}

/// A complete `[if]...[/if]` block found in a template
#[derive(Debug, Clone, PartialEq)]
pub struct IfBlock<'a> {
    /// Byte position of `[if:`
    pub start: usize,
    /// Byte position just past `[/if]`
    pub end: usize,
    /// Branches in source order
    pub branches: Vec<Branch<'a>>,
}

/// Find the leftmost `[if]` block that has a matching `[/if]`.
///
/// # Nesting
///
/// Markers of nested blocks are skipped by depth counting, so the returned
/// block's branch bodies keep nested blocks as raw text. `[elseif]` and
/// `[else]` split the body only at depth 0.
///
/// An `[if]` without a matching `[/if]` is skipped and the search continues
/// with the next `[if]`.
pub fn find_first_if_block(text: &str) -> Option<IfBlock<'_>> {
    let markers: Vec<Token> = TokenStream::blocks(text)
        .filter(|token| token.kind.is_marker())
        .collect();

    for (open_index, open) in markers.iter().enumerate() {
        let TokenKind::IfOpen { condition } = &open.kind else {
            continue;
        };
        if let Some(block) = match_block(text, &markers, open_index, condition) {
            return Some(block);
        }
    }

    None
}

fn match_block<'a>(
    text: &'a str,
    markers: &[Token],
    open_index: usize,
    first_condition: &str,
) -> Option<IfBlock<'a>> {
    let open = &markers[open_index];
    let mut depth = 0usize;
    let mut branches = Vec::new();
    let mut condition = Some(condition_slice(text, open, first_condition));
    let mut body_start = open.end();

    for marker in &markers[open_index + 1..] {
        match &marker.kind {
            TokenKind::IfOpen { .. } => depth += 1,
            TokenKind::IfClose if depth > 0 => depth -= 1,
            TokenKind::IfClose => {
                branches.push(Branch {
                    condition,
                    body: &text[body_start..marker.start],
                });
                return Some(IfBlock {
                    start: open.start,
                    end: marker.end(),
                    branches,
                });
            }
            TokenKind::ElseIf { condition: next } if depth == 0 => {
                branches.push(Branch {
                    condition,
                    body: &text[body_start..marker.start],
                });
                condition = Some(condition_slice(text, marker, next));
                body_start = marker.end();
            }
            TokenKind::Else if depth == 0 => {
                branches.push(Branch {
                    condition,
                    body: &text[body_start..marker.start],
                });
                condition = None;
                body_start = marker.end();
            }
            _ => {}
        }
    }

    None
}

/// Borrow the condition text from the template instead of the token copy
fn condition_slice<'a>(text: &'a str, marker: &Token, condition: &str) -> &'a str {
    let prefix = match marker.kind {
        TokenKind::ElseIf { .. } => "[elseif:".len(),
        _ => "[if:".len(),
    };
    let start = marker.start + prefix;
    &text[start..start + condition.len()]
}

/// Count `[if:` openings; the reduction loop uses this as its progress
/// measure
pub fn count_if_blocks(text: &str) -> usize {
    TokenStream::blocks(text)
        .filter(|token| matches!(token.kind, TokenKind::IfOpen { .. }))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_block() {
        let text = "a[if:%custom:x% == '1']yes[/if]b";
        let block = find_first_if_block(text).unwrap();
        assert_eq!(block.start, 1);
        assert_eq!(&text[block.end..], "b");
        assert_eq!(
            block.branches,
            vec![Branch {
                condition: Some("%custom:x% == '1'"),
                body: "yes"
            }]
        );
    }

    #[test]
    fn test_elseif_and_else_branches() {
        let text = "[if:%custom:p% > 100]P[elseif:%custom:p% > 50]S[else]B[/if]";
        let block = find_first_if_block(text).unwrap();
        let bodies: Vec<&str> = block.branches.iter().map(|b| b.body).collect();
        assert_eq!(bodies, vec!["P", "S", "B"]);
        assert_eq!(block.branches[1].condition, Some("%custom:p% > 50"));
        assert_eq!(block.branches[2].condition, None);
    }

    #[test]
    fn test_nested_block_stays_raw() {
        let text = "[if:%custom:a% == '1']outer[if:%custom:b% == '1']inner[else]no[/if]after[else]E[/if]";
        let block = find_first_if_block(text).unwrap();
        assert_eq!(block.end, text.len());
        assert_eq!(block.branches.len(), 2);
        assert_eq!(
            block.branches[0].body,
            "outer[if:%custom:b% == '1']inner[else]no[/if]after"
        );
        assert_eq!(block.branches[1].body, "E");
    }

    #[test]
    fn test_unclosed_outer_falls_through_to_next_block() {
        let text = "[if:%custom:a% == '1']never closed [if:%custom:b% == '2']B[/if]";
        let block = find_first_if_block(text).unwrap();
        assert_eq!(block.branches[0].condition, Some("%custom:b% == '2'"));
        assert_eq!(block.branches[0].body, "B");
    }

    #[test]
    fn test_no_blocks() {
        assert!(find_first_if_block("plain [/if] text [else]").is_none());
        assert!(find_first_if_block("[if:%custom:a% == '1'] unclosed").is_none());
    }

    #[test]
    fn test_count_if_blocks() {
        assert_eq!(count_if_blocks("[if:x]a[if:y]b[/if][/if][if:z]c[/if]"), 3);
        assert_eq!(count_if_blocks("no blocks"), 0);
    }
}
