use std::collections::HashMap;

use crate::parsing::inline::state::{Delimiter, InlineState};
use crate::token::{Nesting, Token};

/// Pushes one placeholder text token and one delimiter per `*` / `_`.
/// Pairing happens later in [`balance_pairs`].
pub fn tokenize(state: &mut InlineState<'_>, silent: bool) -> bool {
    let start = state.pos;
    let marker = state.byte(start);
    if silent || (marker != b'*' && marker != b'_') {
        return false;
    }
    let run = state.scan_delims(start, marker == b'*');
    for _ in 0..run.length {
        state.push("text", "", Nesting::SelfClosing).content = (marker as char).to_string();
        let token = state.tokens.len() - 1;
        state.delimiters.push(Delimiter {
            marker,
            length: run.length,
            token,
            end: None,
            open: run.can_open,
            close: run.can_close,
        });
    }
    state.pos += run.length;
    true
}

/// Pairs openers with closers in one delimiter list. Linear thanks to the
/// per-marker lower bounds of failed searches.
fn process_delimiters(delimiters: &mut [Delimiter]) {
    if delimiters.is_empty() {
        return;
    }
    let mut openers_bottom: HashMap<u8, [isize; 6]> = HashMap::new();
    let mut header_idx = 0usize;
    let mut last_token_idx: isize = -2;
    let mut jumps: Vec<usize> = Vec::with_capacity(delimiters.len());

    for closer_idx in 0..delimiters.len() {
        jumps.push(0);
        let closer = delimiters[closer_idx];
        // same run: adjacent tokens with the same marker
        if delimiters[header_idx].marker != closer.marker || last_token_idx != closer.token as isize - 1 {
            header_idx = closer_idx;
        }
        last_token_idx = closer.token as isize;
        if !closer.close {
            continue;
        }

        let bucket = (if closer.open { 3 } else { 0 }) + closer.length % 3;
        let bottoms = openers_bottom.entry(closer.marker).or_insert([-1; 6]);
        let min_opener_idx = bottoms[bucket];

        let mut opener_idx = header_idx as isize - jumps[header_idx] as isize - 1;
        let mut new_min_opener_idx = opener_idx;
        while opener_idx > min_opener_idx {
            let oi = opener_idx as usize;
            let opener = delimiters[oi];
            if opener.marker == closer.marker && opener.open && opener.end.is_none() {
                let odd_match = (opener.close || closer.open)
                    && (opener.length + closer.length) % 3 == 0
                    && (opener.length % 3 != 0 || closer.length % 3 != 0);
                if !odd_match {
                    let last_jump = if oi > 0 && !delimiters[oi - 1].open {
                        jumps[oi - 1] + 1
                    } else {
                        0
                    };
                    jumps[closer_idx] = closer_idx - oi + last_jump;
                    jumps[oi] = last_jump;
                    delimiters[closer_idx].open = false;
                    delimiters[oi].end = Some(closer_idx);
                    delimiters[oi].close = false;
                    new_min_opener_idx = -1;
                    last_token_idx = -2;
                    break;
                }
            }
            opener_idx -= jumps[oi] as isize + 1;
        }

        if new_min_opener_idx != -1 {
            let bucket = (if delimiters[closer_idx].open { 3 } else { 0 }) + closer.length % 3;
            openers_bottom.entry(closer.marker).or_insert([-1; 6])[bucket] = new_min_opener_idx;
        }
    }
}

pub fn balance_pairs(state: &mut InlineState<'_>) {
    for list in state.delimiter_lists_mut() {
        process_delimiters(list);
    }
}

fn retag(token: &mut Token, strong: bool, nesting: Nesting, marker: u8) {
    let open = nesting == Nesting::Open;
    token.kind = match (strong, open) {
        (true, true) => "strong_open",
        (true, false) => "strong_close",
        (false, true) => "em_open",
        (false, false) => "em_close",
    }
    .into();
    token.tag = if strong { "strong" } else { "em" }.into();
    token.nesting = nesting;
    token.markup = (marker as char).to_string().repeat(if strong { 2 } else { 1 });
    token.content.clear();
}

fn rewrite(tokens: &mut [Token], delimiters: &[Delimiter]) {
    let mut i = delimiters.len();
    while i > 0 {
        i -= 1;
        let start = delimiters[i];
        if start.marker != b'_' && start.marker != b'*' {
            continue;
        }
        let Some(end_idx) = start.end else {
            continue;
        };
        let end = delimiters[end_idx];

        // `<em><em>x</em></em>` collapses into `<strong>x</strong>`
        let strong = i > 0
            && delimiters[i - 1].end == Some(end_idx + 1)
            && delimiters[i - 1].marker == start.marker
            && delimiters[i - 1].token + 1 == start.token
            && delimiters.get(end_idx + 1).is_some_and(|d| d.token == end.token + 1);

        retag(&mut tokens[start.token], strong, Nesting::Open, start.marker);
        retag(&mut tokens[end.token], strong, Nesting::Close, start.marker);

        if strong {
            tokens[delimiters[i - 1].token].content.clear();
            tokens[delimiters[end_idx + 1].token].content.clear();
            i -= 1;
        }
    }
}

/// Turns paired placeholder tokens into `em` / `strong` tags.
pub fn post_process(state: &mut InlineState<'_>) {
    let lists: Vec<Vec<Delimiter>> = state.delimiter_lists().cloned().collect();
    for list in &lists {
        rewrite(&mut state.tokens[..], list);
    }
}
