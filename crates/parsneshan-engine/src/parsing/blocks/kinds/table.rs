use crate::parsing::blocks::kinds::interrupted;
use crate::parsing::blocks::state::{BlockContext, BlockState, is_space};
use crate::token::Nesting;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

impl Align {
    /// Parses one delimiter-row cell such as `:---:`.
    fn parse(cell: &str) -> Option<Self> {
        let left = cell.starts_with(':');
        let right = cell.len() > 1 && cell.ends_with(':');
        let dashes = &cell[usize::from(left)..cell.len() - usize::from(right)];
        if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
            return None;
        }
        Some(match (left, right) {
            (true, true) => Align::Center,
            (false, true) => Align::Right,
            (true, false) => Align::Left,
            (false, false) => Align::None,
        })
    }

    fn style(self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("text-align:left"),
            Align::Center => Some("text-align:center"),
            Align::Right => Some("text-align:right"),
        }
    }
}

/// Splits a row on `|`, keeping `\|` as a literal pipe.
fn split_row(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in row.chars() {
        match ch {
            '|' if escaped => {
                current.pop();
                current.push('|');
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
        escaped = ch == '\\';
    }
    cells.push(current);

    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

fn is_delimiter_byte(b: u8) -> bool {
    matches!(b, b'|' | b'-' | b':')
}

/// GFM table: header row, delimiter row, then body rows until a blank line
/// or a block that interrupts a quote.
pub fn table(state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool) -> bool {
    if start_line + 2 > end_line {
        return false;
    }
    let delim_line = start_line + 1;
    if state.indent(delim_line) < state.blk_indent || state.relative_indent(delim_line) >= 4 {
        return false;
    }

    let mut pos = state.content_start(delim_line);
    let max = state.lines[delim_line].end;
    if pos >= max {
        return false;
    }
    let first = state.byte(pos);
    pos += 1;
    if !is_delimiter_byte(first) || pos >= max {
        return false;
    }
    let second = state.byte(pos);
    pos += 1;
    if !is_delimiter_byte(second) && !is_space(second) {
        return false;
    }
    // `- ` would be a list item
    if first == b'-' && is_space(second) {
        return false;
    }
    while pos < max {
        let ch = state.byte(pos);
        if !is_delimiter_byte(ch) && !is_space(ch) {
            return false;
        }
        pos += 1;
    }

    let delim_text = state.line_text(delim_line);
    let parts: Vec<&str> = delim_text.split('|').collect();
    let mut aligns = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let cell = part.trim();
        if cell.is_empty() {
            // outer pipes only
            if i == 0 || i == parts.len() - 1 {
                continue;
            }
            return false;
        }
        match Align::parse(cell) {
            Some(align) => aligns.push(align),
            None => return false,
        }
    }

    let header = state.line_text(start_line).trim();
    if !header.contains('|') || state.relative_indent(start_line) >= 4 {
        return false;
    }
    let header_cells = split_row(header);
    let columns = header_cells.len();
    if columns == 0 || columns != aligns.len() {
        return false;
    }
    if silent {
        return true;
    }

    let old_parent = state.parent;
    state.parent = BlockContext::Table;

    let table_idx = state.tokens.len();
    state.push("table_open", "table", Nesting::Open);
    state.push("thead_open", "thead", Nesting::Open).map = Some((start_line, start_line + 1));
    state.push("tr_open", "tr", Nesting::Open).map = Some((start_line, start_line + 1));
    for (cell, align) in header_cells.iter().zip(&aligns) {
        push_cell(state, "th_open", "th_close", "th", cell, *align);
    }
    state.push("tr_close", "tr", Nesting::Close);
    state.push("thead_close", "thead", Nesting::Close);

    let mut body_idx = None;
    let mut next_line = start_line + 2;
    while next_line < end_line {
        if state.indent(next_line) < state.blk_indent {
            break;
        }
        if interrupted(state, "blockquote", next_line, end_line) {
            break;
        }
        let row = state.line_text(next_line).trim();
        if row.is_empty() || state.relative_indent(next_line) >= 4 {
            break;
        }
        let cells = split_row(row);

        if body_idx.is_none() {
            body_idx = Some(state.tokens.len());
            state.push("tbody_open", "tbody", Nesting::Open);
        }
        state.push("tr_open", "tr", Nesting::Open).map = Some((next_line, next_line + 1));
        for (i, align) in aligns.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            push_cell(state, "td_open", "td_close", "td", cell, *align);
        }
        state.push("tr_close", "tr", Nesting::Close);
        next_line += 1;
    }

    if let Some(idx) = body_idx {
        state.push("tbody_close", "tbody", Nesting::Close);
        state.tokens[idx].map = Some((start_line + 2, next_line));
    }
    state.push("table_close", "table", Nesting::Close);
    state.tokens[table_idx].map = Some((start_line, next_line));

    state.parent = old_parent;
    state.line = next_line;
    true
}

fn push_cell(
    state: &mut BlockState<'_>,
    open: &'static str,
    close: &'static str,
    tag: &'static str,
    content: &str,
    align: Align,
) {
    let token = state.push(open, tag, Nesting::Open);
    if let Some(style) = align.style() {
        token.attr_set("style", style);
    }
    state.push("inline", "", Nesting::SelfClosing).content = content.trim().to_string();
    state.push(close, tag, Nesting::Close);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::Engine;

    #[rstest]
    #[case("---", Some(Align::None))]
    #[case(":--", Some(Align::Left))]
    #[case(":-:", Some(Align::Center))]
    #[case("--:", Some(Align::Right))]
    #[case("::", None)]
    #[case("-x-", None)]
    fn delimiter_cells(#[case] cell: &str, #[case] expected: Option<Align>) {
        assert_eq!(Align::parse(cell), expected);
    }

    #[test]
    fn escaped_pipes_stay_in_cell() {
        assert_eq!(split_row(r"| a \| b | c |"), vec![" a | b ", " c "]);
    }

    #[test]
    fn renders_table() {
        let md = Engine::default();
        let html = md.render("| a | b |\n|:--|--:|\n| 1 | 2 |").unwrap();
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr>\n<th style=\"text-align:left\">a</th>\n\
             <th style=\"text-align:right\">b</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n\
             <td style=\"text-align:left\">1</td>\n<td style=\"text-align:right\">2</td>\n\
             </tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn column_count_must_match() {
        let md = Engine::default();
        assert_eq!(md.parse("| a | b |\n|---|")[0].kind, "paragraph_open");
    }
}
