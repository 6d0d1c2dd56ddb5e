#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("no rule named `{0}` is registered")]
    UnknownRule(String),
    #[error("a rule named `{0}` is already registered")]
    DuplicateRule(String),
    #[error("`{kind}` at token {index} closes an element that was never opened")]
    UnopenedClose { index: usize, kind: String },
    #[error("`{kind}` at token {index} closes <{found}> while <{expected}> is open")]
    MismatchedClose {
        index: usize,
        kind: String,
        expected: String,
        found: String,
    },
    #[error("{count} element(s) left open at end of stream, innermost <{tag}>")]
    Unclosed { count: usize, tag: String },
}
