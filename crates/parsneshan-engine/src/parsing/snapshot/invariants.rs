use crate::token::{self, Nesting, Token};

/// Asserts nesting balance for `tokens` and every token's children, and
/// that block token levels match their depth.
pub fn check(tokens: &[Token]) {
    if let Err(err) = token::check_nesting(tokens) {
        panic!("token stream is not well nested: {err}");
    }
    check_levels(tokens);
}

fn check_levels(tokens: &[Token]) {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        if token.nesting == Nesting::Close {
            depth -= 1;
        }
        assert_eq!(
            token.level, depth,
            "token {index} (`{}`) has level {} at depth {depth}",
            token.kind, token.level
        );
        if let Some((start, end)) = token.map {
            assert!(start <= end, "token {index} (`{}`) has inverted map {start}..{end}", token.kind);
        }
        if token.nesting == Nesting::Open {
            depth += 1;
        }
    }
}
