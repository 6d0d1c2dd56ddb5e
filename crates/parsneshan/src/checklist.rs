use std::sync::Arc;

use parsneshan_engine::{CoreRule, CoreState, Engine, Token};

use crate::error::PluginError;
use crate::plugin::{Plugin, no_options};

const UNCHECKED: &str = "[ ] ";
const CHECKED: [&str; 2] = ["[x] ", "[X] "];

/// `Some(checked)` when `text` starts with a task marker.
fn task_marker(text: &str) -> Option<bool> {
    if text.starts_with(UNCHECKED) {
        Some(false)
    } else if CHECKED.iter().any(|marker| text.starts_with(marker)) {
        Some(true)
    } else {
        None
    }
}

fn checkbox(checked: bool) -> Token {
    let state = if checked { " checked" } else { "" };
    Token::html_inline(format!(
        "<input type=\"checkbox\" class=\"task-list-item-checkbox\" disabled{state}> "
    ))
}

/// `tokens[idx]` is the inline content of a list item's first paragraph
/// and starts with a task marker.
fn is_todo_item(tokens: &[Token], idx: usize) -> Option<bool> {
    if idx < 2
        || !tokens[idx].is("inline")
        || !tokens[idx - 1].is("paragraph_open")
        || !tokens[idx - 2].is("list_item_open")
    {
        return None;
    }
    task_marker(&tokens[idx].content)
}

/// Strips the marker and wraps the remaining children as
/// `checkbox <span> … </span>`.
fn todoify(token: &mut Token, checked: bool) {
    token.content.drain(..UNCHECKED.len());
    if let Some(first) = token.children.iter_mut().find(|child| child.is("text"))
        && task_marker(&first.content).is_some()
    {
        first.content.drain(..UNCHECKED.len());
    }
    token.children.insert(0, checkbox(checked));
    token.children.insert(1, Token::html_inline("<span>"));
    token.children.push(Token::html_inline("</span>"));
}

/// Core rule `task_lists`, after `inline`. Matches on stream shape only,
/// so ordered list items qualify too.
pub fn task_lists(state: &mut CoreState<'_>) {
    let tokens = &mut state.tokens;
    for idx in 2..tokens.len() {
        let Some(checked) = is_todo_item(tokens, idx) else {
            continue;
        };
        todoify(&mut tokens[idx], checked);
        tokens[idx - 2].attr_set("class", "task-list-item");
    }
}

pub struct Checklist;

impl Checklist {
    pub const RULE: &'static str = "task_lists";
}

impl Plugin for Checklist {
    fn name(&self) -> &str {
        Self::RULE
    }

    fn apply(&self, md: &mut Engine, options: Option<&toml::Table>) -> Result<(), PluginError> {
        no_options(self.name(), options)?;
        let rule: Arc<dyn CoreRule> = Arc::new(task_lists);
        md.core
            .ruler
            .after("inline", Self::RULE, rule)
            .map_err(PluginError::registration(Self::RULE))
    }
}
