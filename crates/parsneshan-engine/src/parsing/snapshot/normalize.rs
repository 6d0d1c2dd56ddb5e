use std::fmt::Write;

use crate::token::{Nesting, Token};

/// One line per token, indented by nesting depth; children of `inline`
/// tokens are listed one step deeper.
///
/// ```text
/// paragraph_open <p> dir="rtl"
///   inline "سلام"
///     text "سلام"
/// paragraph_close </p>
/// ```
pub fn outline(tokens: &[Token]) -> String {
    let mut out = String::new();
    write_tokens(&mut out, tokens, 0);
    out
}

fn write_tokens(out: &mut String, tokens: &[Token], base: usize) {
    let mut depth = base;
    for token in tokens {
        if token.nesting == Nesting::Close {
            depth = depth.saturating_sub(1);
        }
        let _ = write!(out, "{}{}", "  ".repeat(depth), token.kind);
        match token.nesting {
            _ if token.tag.is_empty() => {}
            Nesting::Close => {
                let _ = write!(out, " </{}>", token.tag);
            }
            _ => {
                let _ = write!(out, " <{}>", token.tag);
            }
        }
        for (name, value) in &token.attrs {
            let _ = write!(out, " {name}={value:?}");
        }
        if !token.content.is_empty() {
            let _ = write!(out, " {:?}", token.content);
        }
        if token.hidden {
            out.push_str(" (hidden)");
        }
        out.push('\n');

        if token.nesting == Nesting::Open {
            depth += 1;
        }
        write_tokens(out, &token.children, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Engine;

    #[test]
    fn outlines_tight_list() {
        let md = Engine::default();
        let tokens = md.parse("- a *b*");
        assert_eq!(
            outline(&tokens),
            concat!(
                "bullet_list_open <ul>\n",
                "  list_item_open <li>\n",
                "    paragraph_open <p> (hidden)\n",
                "      inline \"a *b*\"\n",
                "        text \"a \"\n",
                "        em_open <em>\n",
                "          text \"b\"\n",
                "        em_close </em>\n",
                "    paragraph_close </p> (hidden)\n",
                "  list_item_close </li>\n",
                "bullet_list_close </ul>\n",
            )
        );
    }
}
