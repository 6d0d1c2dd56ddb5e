pub mod blockquote;
pub mod code;
pub mod fence;
pub mod heading;
pub mod hr;
pub mod html_block;
pub mod list;
pub mod paragraph;
pub mod table;

use super::state::BlockState;

/// Whether any rule of the alternate `chain` matches at `line` in silent
/// mode, i.e. the line interrupts the construct being scanned.
pub(crate) fn interrupted(
    state: &mut BlockState<'_>,
    chain: &str,
    line: usize,
    end_line: usize,
) -> bool {
    let md = state.md;
    md.block
        .ruler
        .chain(chain)
        .any(|rule| rule.run(state, line, end_line, true))
}
