// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Template list discovery.
//!
//! A `<` directly after a name may open a template list (`Array<Integer, 3>`)
//! or be a comparison (`a < b`). The decision is made by scanning ahead over
//! the already lexed tokens without consuming them.

use pgsl_ast::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Paren,
    Bracket,
    /// A nested `<` that may itself be a template list or a comparison.
    Template,
}

/// Replace every confirmed template-list `<` with `TemplateListStart`.
///
/// All decisions are taken on the unmodified stream first.
pub(crate) fn mark_template_lists(tokens: &mut [Token]) {
    let starts: Vec<usize> = (0..tokens.len())
        .filter(|&i| is_template_list_start(tokens, i))
        .collect();
    for i in starts {
        tokens[i].kind = TokenKind::TemplateListStart;
    }
}

fn follows_name(tokens: &[Token], index: usize) -> bool {
    index > 0 && matches!(tokens[index - 1].kind, TokenKind::Ident(_))
}

/// Whether the `<` at `index` opens a template list.
///
/// Returns false for anything that is not a `<` directly after a name.
pub fn is_template_list_start(tokens: &[Token], index: usize) -> bool {
    if !matches!(tokens.get(index).map(|t| &t.kind), Some(TokenKind::Lt)) || !follows_name(tokens, index) {
        return false;
    }

    let mut stack: Vec<Frame> = Vec::new();
    let confirmed = scan(tokens, index + 1, &mut stack);
    log::trace!("template candidate at byte {}: {}", tokens[index].span.start, confirmed);
    confirmed
}

fn scan(tokens: &[Token], from: usize, stack: &mut Vec<Frame>) -> bool {
    for i in from..tokens.len() {
        match &tokens[i].kind {
            TokenKind::Lt if follows_name(tokens, i) => stack.push(Frame::Template),
            TokenKind::LParen => stack.push(Frame::Paren),
            TokenKind::LBracket => stack.push(Frame::Bracket),
            TokenKind::RParen => {
                if !close(stack, Frame::Paren) {
                    return false;
                }
            }
            TokenKind::RBracket => {
                if !close(stack, Frame::Bracket) {
                    return false;
                }
            }
            TokenKind::AmpAmp | TokenKind::PipePipe => match stack.last() {
                None => return false,
                Some(Frame::Template) => {
                    stack.pop();
                }
                Some(_) => {}
            },
            // `>=` and `>>=`: the `=` is preceded by `>` and stays legal.
            TokenKind::Gt | TokenKind::GtEq => {
                if greater_than(stack) {
                    return true;
                }
            }
            TokenKind::GtGt | TokenKind::GtGtEq => {
                if greater_than(stack) {
                    return true;
                }
                // The first `>` closed a nested frame; the second may confirm.
                if greater_than(stack) {
                    return true;
                }
            }
            // A bare `=`, including the one in compound assignments.
            TokenKind::Eq
            | TokenKind::PlusEq
            | TokenKind::MinusEq
            | TokenKind::StarEq
            | TokenKind::SlashEq
            | TokenKind::PercentEq
            | TokenKind::AmpEq
            | TokenKind::PipeEq
            | TokenKind::CaretEq => return false,
            TokenKind::Semi | TokenKind::Colon | TokenKind::LBrace | TokenKind::RBrace if stack.is_empty() => {
                return false;
            }
            TokenKind::Eof => return false,
            _ => {}
        }
    }
    false
}

/// Handle one `>`. Returns true when it closes the candidate itself.
fn greater_than(stack: &mut Vec<Frame>) -> bool {
    match stack.last() {
        None => true,
        Some(Frame::Template) => {
            stack.pop();
            false
        }
        Some(_) => false,
    }
}

/// Pop a closing delimiter. Open `<` frames above it were comparisons.
fn close(stack: &mut Vec<Frame>, expected: Frame) -> bool {
    while stack.last() == Some(&Frame::Template) {
        stack.pop();
    }
    stack.pop() == Some(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    fn template_starts(source: &str) -> usize {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .iter()
            .filter(|t| t.kind == TokenKind::TemplateListStart)
            .count()
    }

    #[test]
    fn comparison_is_not_a_template() {
        assert_eq!(template_starts("x = a < b;"), 0);
    }

    #[test]
    fn array_type_is_a_template() {
        assert_eq!(template_starts("private v: Array<Integer, 3>;"), 1);
    }

    #[test]
    fn logical_operator_disqualifies() {
        assert_eq!(template_starts("if (a < b && c > d) { }"), 0);
    }

    #[test]
    fn nested_templates_share_a_shift_token() {
        assert_eq!(template_starts("private v: Array<Vector3<Float>>;"), 2);
    }

    #[test]
    fn parenthesized_comparison_inside_list() {
        assert_eq!(template_starts("private v: Array<Float, (A > B)>;"), 1);
    }

    #[test]
    fn unbalanced_paren_disqualifies() {
        assert_eq!(template_starts("if (a < b) { }"), 0);
    }

    #[test]
    fn semicolon_disqualifies() {
        assert_eq!(template_starts("for (let i: Integer = 0; i < 10; i++) { }"), 0);
    }

    #[test]
    fn assignment_disqualifies() {
        assert_eq!(template_starts("a < b; c = d > e;"), 0);
        assert_eq!(template_starts("x = a < b += c > d"), 0);
    }

    #[test]
    fn comparison_without_closing_reaches_end() {
        assert_eq!(template_starts("a < b"), 0);
    }

    #[test]
    fn less_equal_is_never_a_candidate() {
        assert_eq!(template_starts("x = a <= b > c;"), 0);
    }

    #[test]
    fn nested_comparison_closed_by_logical_operator() {
        // The inner `c < d` is closed by `&&`, the outer list by the final `>`.
        assert_eq!(template_starts("f(a < (c < d && e) >);"), 1);
    }

    #[test]
    fn predicate_ignores_other_tokens() {
        let tokens = Lexer::new("a + b").tokenize().unwrap();
        assert!(!is_template_list_start(&tokens, 1));
        assert!(!is_template_list_start(&tokens, 99));
    }
}
