use parsneshan_engine::Engine;
use parsneshan_engine::parsing::snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn fixture_quote_list() {
    assert_fixture("quote_list");
}

#[test]
fn fixture_inline_mix() {
    assert_fixture("inline_mix");
}

fn assert_fixture(name: &str) {
    let md = std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap();

    let tokens = Engine::default().parse(&md);
    snapshot::invariants(&tokens);

    insta::assert_snapshot!(name, snapshot::outline(&tokens));
}

#[rstest]
#[case("# سلام", "<h1>سلام</h1>\n")]
#[case("a\n===", "<h1>a</h1>\n")]
#[case("> quote\n\npara", "<blockquote>\n<p>quote</p>\n</blockquote>\n<p>para</p>\n")]
#[case("a\n\n---\nb", "<p>a</p>\n<hr>\n<p>b</p>\n")]
#[case("***bold italic***", "<p><em><strong>bold italic</strong></em></p>\n")]
#[case("x\\*y\\*", "<p>x*y*</p>\n")]
#[case("a ==b== c", "<p>a ==b== c</p>\n")]
fn renders_commonmark_subset(#[case] src: &str, #[case] expected: &str) {
    let md = Engine::default();
    let tokens = md.parse(src);
    snapshot::invariants(&tokens);
    assert_eq!(md.render(src).unwrap(), expected);
}

#[test]
fn rendering_is_idempotent() {
    let md = Engine::default();
    let src = "- [ ] a\n- b\n\n```\ncode\n```\n\n> q";
    assert_eq!(md.render(src).unwrap(), md.render(src).unwrap());
}

#[test]
fn crlf_input_matches_lf_input() {
    let md = Engine::default();
    assert_eq!(md.render("a\r\nb\r\n").unwrap(), md.render("a\nb\n").unwrap());
}
