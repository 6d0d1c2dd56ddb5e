use crate::parsing::blocks::state::BlockState;
use crate::parsing::html;
use crate::token::Nesting;

/// Raw HTML block, only with the `html` option on. Which of the seven
/// kinds opened the block decides how it ends and whether it may
/// interrupt a paragraph.
pub fn html_block(state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool) -> bool {
    if state.relative_indent(start_line) >= 4 || !state.md.options.html {
        return false;
    }
    let text = state.line_text(start_line);
    if !text.starts_with('<') {
        return false;
    }
    let Some(kind) = html::sequences().iter().find(|seq| seq.start.is_match(text)) else {
        return false;
    };
    if silent {
        return kind.interrupts;
    }

    let mut next_line = start_line + 1;
    if !kind.end.is_match(text) {
        while next_line < end_line {
            if state.indent(next_line) < state.blk_indent {
                break;
            }
            let line = state.line_text(next_line);
            if kind.end.is_match(line) {
                if !line.is_empty() {
                    next_line += 1;
                }
                break;
            }
            next_line += 1;
        }
    }

    state.line = next_line;
    let content = state.get_lines(start_line, next_line, state.blk_indent, true);
    let token = state.push("html_block", "", Nesting::SelfClosing);
    token.map = Some((start_line, next_line));
    token.content = content;
    true
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{Engine, EngineOptions};

    fn html_engine() -> Engine {
        Engine::new(EngineOptions {
            html: true,
            ..EngineOptions::default()
        })
    }

    #[test]
    fn block_runs_to_blank_line() {
        let html = html_engine().render("<div>\n*x*\n</div>\n\ntext").unwrap();
        assert_eq!(html, "<div>\n*x*\n</div>\n<p>text</p>\n");
    }

    #[test]
    fn comment_ends_at_terminator() {
        let html = html_engine().render("<!-- a\nb -->\ntext").unwrap();
        assert_eq!(html, "<!-- a\nb -->\n<p>text</p>\n");
    }

    #[test]
    fn disabled_without_html_option() {
        let html = Engine::default().render("<div>").unwrap();
        assert_eq!(html, "<p>&lt;div&gt;</p>\n");
    }
}
