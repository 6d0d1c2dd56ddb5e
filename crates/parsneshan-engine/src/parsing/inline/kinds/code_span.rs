use crate::parsing::inline::state::InlineState;
use crate::token::Nesting;

/// Code spans are raw zones: nothing inside is parsed further.
pub struct CodeSpan;

impl CodeSpan {
    pub const TICK: u8 = b'`';
}

/// Strips one space from each side of `content` when both sides have one
/// and something else sits between them.
fn strip_padding(content: &str) -> &str {
    if content.len() > 2 && content.starts_with(' ') && content.ends_with(' ') {
        &content[1..content.len() - 1]
    } else {
        content
    }
}

pub fn backticks(state: &mut InlineState<'_>, silent: bool) -> bool {
    let start = state.pos;
    if state.byte(start) != CodeSpan::TICK {
        return false;
    }
    let max = state.pos_max;
    let mut pos = start + 1;
    while pos < max && state.byte(pos) == CodeSpan::TICK {
        pos += 1;
    }
    let src = state.src;
    let marker = &src[start..pos];
    let opener_len = marker.len();

    // a previous scan proved no closer of this length follows
    let known_missing = state.backticks_scanned
        && state.backticks.get(&opener_len).copied().unwrap_or(0) <= start;
    if !known_missing {
        let mut match_end = pos;
        while let Some(found) = src[match_end..max].find('`') {
            let match_start = match_end + found;
            match_end = match_start + 1;
            while match_end < max && state.byte(match_end) == CodeSpan::TICK {
                match_end += 1;
            }
            let closer_len = match_end - match_start;
            if closer_len == opener_len {
                if !silent {
                    let content = src[pos..match_start].replace('\n', " ");
                    let token = state.push("code_inline", "code", Nesting::SelfClosing);
                    token.markup = marker.to_string();
                    token.content = strip_padding(&content).to_string();
                }
                state.pos = match_end;
                return true;
            }
            state.backticks.insert(closer_len, match_start);
        }
        state.backticks_scanned = true;
    }

    if !silent {
        state.pending.push_str(marker);
    }
    state.pos += opener_len;
    true
}
