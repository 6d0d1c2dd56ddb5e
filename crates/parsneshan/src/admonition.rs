//! Callout boxes:
//!
//! ```text
//! ...توجه
//! Body, parsed as ordinary Markdown.
//! ...
//! ```
//!
//! renders as
//!
//! ```html
//! <div class="admonition note">
//! <p class="admonition-title">توجه</p>
//! <p>Body, parsed as ordinary Markdown.</p>
//! </div>
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use parsneshan_config::AdmonitionConfig;
use parsneshan_engine::{BlockRule, BlockState, Engine, Nesting, Token};

use crate::error::{AdmonitionTableError, PluginError};
use crate::plugin::Plugin;

/// Opens (followed by a keyword) and closes (alone on its line) a block.
pub const SENTINEL: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmonitionKind {
    pub keyword: String,
    /// Second class on the container, after `admonition`.
    pub class: String,
    pub title: String,
}

impl AdmonitionKind {
    pub fn new(keyword: &str, class: &str, title: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            class: class.to_string(),
            title: title.to_string(),
        }
    }
}

impl From<&AdmonitionConfig> for AdmonitionKind {
    fn from(config: &AdmonitionConfig) -> Self {
        Self::new(&config.keyword, &config.class, config.display_title())
    }
}

/// Keyword → callout type. Lookup is by exact keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmonitionTable {
    kinds: Vec<AdmonitionKind>,
}

impl AdmonitionTable {
    pub fn empty() -> Self {
        Self { kinds: Vec::new() }
    }

    pub fn with(mut self, kind: AdmonitionKind) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn push(&mut self, kind: AdmonitionKind) {
        self.kinds.push(kind);
    }

    pub fn get(&self, keyword: &str) -> Option<&AdmonitionKind> {
        self.kinds.iter().find(|kind| kind.keyword == keyword)
    }

    pub fn kinds(&self) -> &[AdmonitionKind] {
        &self.kinds
    }

    pub fn validate(&self) -> Result<(), AdmonitionTableError> {
        let mut seen = HashSet::new();
        for kind in &self.kinds {
            if kind.keyword.trim().is_empty() {
                return Err(AdmonitionTableError::EmptyKeyword);
            }
            if kind.class.trim().is_empty() {
                return Err(AdmonitionTableError::EmptyClass {
                    keyword: kind.keyword.clone(),
                });
            }
            if !seen.insert(kind.keyword.as_str()) {
                return Err(AdmonitionTableError::DuplicateKeyword(kind.keyword.clone()));
            }
        }
        Ok(())
    }
}

impl Default for AdmonitionTable {
    /// هشدار, توجه, نکته, مهم and احتیاط, each titled by its keyword.
    fn default() -> Self {
        Self {
            kinds: parsneshan_config::default_admonitions()
                .iter()
                .map(AdmonitionKind::from)
                .collect(),
        }
    }
}

impl FromIterator<AdmonitionKind> for AdmonitionTable {
    fn from_iter<I: IntoIterator<Item = AdmonitionKind>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

/// Scans `[start_line, end_line)` for a complete admonition. Returns the
/// matched kind and the line holding the closing sentinel.
fn scan<'t>(
    table: &'t AdmonitionTable,
    state: &BlockState<'_>,
    start_line: usize,
    end_line: usize,
) -> Option<(&'t AdmonitionKind, usize)> {
    let keyword = state.line_text(start_line).strip_prefix(SENTINEL)?.trim();
    let kind = table.get(keyword)?;
    let end = (start_line + 1..end_line).find(|&line| state.line_text(line).trim() == SENTINEL)?;
    Some((kind, end))
}

/// Block rule `admonition`. The lines strictly between the opener and the
/// closing sentinel are block-parsed again into the same token stream.
/// Admonitions do not nest: the first sentinel line closes the block.
fn admonition(
    table: &AdmonitionTable,
    state: &mut BlockState<'_>,
    start_line: usize,
    end_line: usize,
    silent: bool,
) -> bool {
    let Some((kind, end)) = scan(table, state, start_line, end_line) else {
        return false;
    };
    if silent {
        return true;
    }

    let open = state.push("admonition_open", "div", Nesting::Open);
    open.attr_set("class", format!("admonition {}", kind.class));
    open.markup = SENTINEL.to_string();
    open.info = kind.keyword.clone();
    open.map = Some((start_line, end + 1));

    state
        .push("admonition_title_open", "p", Nesting::Open)
        .attr_set("class", "admonition-title");
    // the title is literal text, never inline-parsed
    let title = state.push("inline", "", Nesting::SelfClosing);
    title.content = kind.title.clone();
    title.children.push(Token::text(kind.title.clone()));
    title.map = Some((start_line, start_line + 1));
    state.push("admonition_title_close", "p", Nesting::Close);

    // container prefixes (quote markers, list indent) are stripped
    let body = state.get_lines(start_line + 1, end, state.blk_indent, true);
    let md = state.md;
    md.block.parse_nested(&body, md, state.tokens, state.level);

    state.push("admonition_close", "div", Nesting::Close).markup = SENTINEL.to_string();
    state.line = end + 1;
    true
}

/// Registers the `admonition` block rule. Options, when given, add callout
/// types: `{ "<keyword>" = { class = "...", title = "..." } }`.
#[derive(Debug, Clone, Default)]
pub struct Admonition {
    table: AdmonitionTable,
}

impl Admonition {
    pub const RULE: &'static str = "admonition";

    pub fn new(table: AdmonitionTable) -> Self {
        Self { table }
    }

    fn extend_from_options(&self, options: &toml::Table) -> Result<AdmonitionTable, PluginError> {
        let invalid = |key: &str, reason: &str| PluginError::InvalidOption {
            plugin: Self::RULE.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        };

        let mut table = self.table.clone();
        for (keyword, value) in options {
            let entry = value
                .as_table()
                .ok_or_else(|| invalid(keyword, "expected a table with `class` and `title`"))?;
            let class = entry
                .get("class")
                .and_then(toml::Value::as_str)
                .ok_or_else(|| invalid(keyword, "`class` must be a string"))?;
            let title = match entry.get("title") {
                None => keyword.as_str(),
                Some(value) => value
                    .as_str()
                    .ok_or_else(|| invalid(keyword, "`title` must be a string"))?,
            };
            table.push(AdmonitionKind::new(keyword, class, title));
        }
        Ok(table)
    }
}

impl Plugin for Admonition {
    fn name(&self) -> &str {
        Self::RULE
    }

    fn apply(&self, md: &mut Engine, options: Option<&toml::Table>) -> Result<(), PluginError> {
        let table = match options {
            Some(options) => self.extend_from_options(options)?,
            None => self.table.clone(),
        };
        table.validate()?;

        let rule: Arc<dyn BlockRule> = Arc::new(
            move |state: &mut BlockState<'_>, start: usize, end: usize, silent: bool| {
                admonition(&table, state, start, end, silent)
            },
        );
        md.block
            .ruler
            .before("fence", Self::RULE, rule)
            .map_err(PluginError::registration(Self::RULE))
    }
}

#[cfg(test)]
mod tests {
    use parsneshan_engine::parsing::snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn engine() -> Engine {
        let mut md = Engine::default();
        Admonition::default().apply(&mut md, None).unwrap();
        md
    }

    #[rstest]
    #[case("هشدار", "warning")]
    #[case("توجه", "note")]
    #[case("نکته", "tip")]
    #[case("مهم", "important")]
    #[case("احتیاط", "caution")]
    fn default_keywords(#[case] keyword: &str, #[case] class: &str) {
        let html = engine().render(&format!("...{keyword}\nمتن\n...")).unwrap();
        assert_eq!(
            html,
            format!(
                "<div class=\"admonition {class}\">\n<p class=\"admonition-title\">{keyword}</p>\n<p>متن</p>\n</div>\n"
            )
        );
    }

    #[test]
    fn body_is_block_parsed() {
        let html = engine().render("...نکته\n# عنوان\n\n- یک\n- دو\n...\nبعد").unwrap();
        assert_eq!(
            html,
            "<div class=\"admonition tip\">\n<p class=\"admonition-title\">نکته</p>\n<h1>عنوان</h1>\n\
             <ul>\n<li>یک</li>\n<li>دو</li>\n</ul>\n</div>\n<p>بعد</p>\n"
        );
    }

    #[test]
    fn inner_sentinel_closes_outer_block() {
        let md = engine();
        let tokens = md.parse("...توجه\n...مهم\nx\n...\n...");
        snapshot::invariants(&tokens);
        let html = md.render("...توجه\n...مهم\nx\n...\n...").unwrap();
        assert_eq!(
            html,
            "<div class=\"admonition note\">\n<p class=\"admonition-title\">توجه</p>\n<p>...مهم\nx</p>\n</div>\n<p>...</p>\n"
        );
    }

    #[test]
    fn empty_body() {
        let html = engine().render("...مهم\n...").unwrap();
        assert_eq!(html, "<div class=\"admonition important\">\n<p class=\"admonition-title\">مهم</p>\n</div>\n");
    }

    #[rstest]
    #[case("...ناشناخته\nمتن\n...", "<p>...ناشناخته\nمتن\n...</p>\n")]
    #[case("...توجه\nبی‌پایان", "<p>...توجه\nبی‌پایان</p>\n")]
    fn falls_back_to_paragraphs(#[case] src: &str, #[case] expected: &str) {
        assert_eq!(engine().render(src).unwrap(), expected);
    }

    #[test]
    fn keyword_and_sentinel_tolerate_whitespace() {
        let html = engine().render("  ...  توجه  \nمتن\n   ...   ").unwrap();
        assert!(html.starts_with("<div class=\"admonition note\">"));
        assert!(html.ends_with("</div>\n"));
    }

    #[test]
    fn levels_follow_nesting() {
        let md = engine();
        let tokens = md.parse("> ...توجه\n> *متن*\n> ...");
        snapshot::invariants(&tokens);
        let kinds: Vec<(&str, usize)> = tokens.iter().map(|t| (t.kind.as_ref(), t.level)).collect();
        assert_eq!(
            kinds,
            vec![
                ("blockquote_open", 0),
                ("admonition_open", 1),
                ("admonition_title_open", 2),
                ("inline", 3),
                ("admonition_title_close", 2),
                ("paragraph_open", 2),
                ("inline", 3),
                ("paragraph_close", 2),
                ("admonition_close", 1),
                ("blockquote_close", 0),
            ]
        );
    }

    #[test]
    fn options_add_kinds() {
        let options: toml::Table = toml::from_str("[\"مثال\"]\nclass = \"example\"\n").unwrap();
        let mut md = Engine::default();
        Admonition::default().apply(&mut md, Some(&options)).unwrap();
        let html = md.render("...مثال\nx\n...").unwrap();
        assert!(html.starts_with("<div class=\"admonition example\">\n<p class=\"admonition-title\">مثال</p>"));
    }

    #[test]
    fn titles_render_as_literal_text() {
        let table = AdmonitionTable::empty().with(AdmonitionKind::new("x", "x", "*x* a<b"));
        let mut md = Engine::default();
        Admonition::new(table).apply(&mut md, None).unwrap();

        let tokens = md.parse("...x
متن
...");
        let title = &tokens[2];
        assert_eq!(title.children, vec![Token::text("*x* a<b")]);
        assert!(
            md.render("...x
متن
...")
                .unwrap()
                .starts_with("<div class=\"admonition x\">\n<p class=\"admonition-title\">*x* a&lt;b</p>\n")
        );
    }

    #[test]
    fn options_must_be_tables() {
        let options: toml::Table = toml::from_str("x = 1").unwrap();
        let err = Admonition::default()
            .apply(&mut Engine::default(), Some(&options))
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidOption { ref key, .. } if key == "x"));
    }

    #[rstest]
    #[case(AdmonitionKind::new("", "x", "t"), AdmonitionTableError::EmptyKeyword)]
    #[case(AdmonitionKind::new("k", " ", "t"), AdmonitionTableError::EmptyClass { keyword: "k".into() })]
    #[case(AdmonitionKind::new("توجه", "y", "t"), AdmonitionTableError::DuplicateKeyword("توجه".into()))]
    fn invalid_tables(#[case] extra: AdmonitionKind, #[case] expected: AdmonitionTableError) {
        let table = AdmonitionTable::default().with(extra);
        assert_eq!(table.validate(), Err(expected));
    }

    #[test]
    fn registered_before_fence() {
        let md = engine();
        let names = md.block.ruler.names();
        assert_eq!(names[..4], ["table", "code", "admonition", "fence"]);
    }
}
