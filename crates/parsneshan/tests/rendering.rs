use parsneshan::{CachePolicy, Options, ParsNeshan};
use parsneshan_engine::parsing::snapshot;

#[test]
fn fixture_callouts() {
    assert_fixture("callouts");
}

#[test]
fn fixture_tasks() {
    assert_fixture("tasks");
}

#[test]
fn fixture_quote_code() {
    assert_fixture("quote_code");
}

fn assert_fixture(name: &str) {
    let src = std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap();

    let md = ParsNeshan::new(Options {
        direction_cache: CachePolicy::Disabled,
        ..Options::default()
    })
    .unwrap();
    snapshot::invariants(&md.parse(&src));

    let html = md.render(&src);
    insta::assert_snapshot!(name, html);
}
