use crate::parsing::blocks::kinds::interrupted;
use crate::parsing::blocks::state::{BlockContext, BlockState};
use crate::token::Nesting;

/// Consumes lines until a blank line or a paragraph-interrupting construct.
/// Always matches.
pub fn paragraph(state: &mut BlockState<'_>, start_line: usize, end_line: usize, _silent: bool) -> bool {
    let old_parent = state.parent;
    state.parent = BlockContext::Paragraph;

    let mut next_line = start_line + 1;
    while next_line < end_line && !state.is_empty(next_line) {
        // lazy continuation: deep indent or a quote quirk line
        if state.relative_indent(next_line) > 3 || state.indent(next_line) < 0 {
            next_line += 1;
            continue;
        }
        if interrupted(state, "paragraph", next_line, end_line) {
            break;
        }
        next_line += 1;
    }

    let content = state
        .get_lines(start_line, next_line, state.blk_indent, false)
        .trim()
        .to_string();
    state.line = next_line;

    let map = Some((start_line, next_line));
    state.push("paragraph_open", "p", Nesting::Open).map = map;
    let inline = state.push("inline", "", Nesting::SelfClosing);
    inline.content = content;
    inline.map = map;
    state.push("paragraph_close", "p", Nesting::Close);

    state.parent = old_parent;
    true
}
