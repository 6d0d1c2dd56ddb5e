use crate::error::EngineError;

struct Rule<R> {
    name: String,
    enabled: bool,
    /// Alternate chains this rule also belongs to (used as terminators).
    alt: Vec<String>,
    func: R,
}

/// An ordered, named list of rules for one pipeline stage.
///
/// Order is priority: rules run first to last until one matches. Plugins
/// place their rules relative to an existing name with [`Ruler::before`] or
/// [`Ruler::after`].
pub struct Ruler<R> {
    rules: Vec<Rule<R>>,
}

impl<R> Ruler<R> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }

    fn make(&self, name: &str, func: R, alt: &[&str]) -> Result<Rule<R>, EngineError> {
        if self.find(name).is_some() {
            return Err(EngineError::DuplicateRule(name.to_string()));
        }
        Ok(Rule {
            name: name.to_string(),
            enabled: true,
            alt: alt.iter().map(|s| s.to_string()).collect(),
            func,
        })
    }

    /// Appends one of the engine's default rules.
    pub(crate) fn builtin(&mut self, name: &str, func: R, alt: &[&str]) {
        self.rules.push(Rule {
            name: name.to_string(),
            enabled: true,
            alt: alt.iter().map(|s| s.to_string()).collect(),
            func,
        });
    }

    pub fn push(&mut self, name: &str, func: R) -> Result<(), EngineError> {
        self.push_with_alt(name, func, &[])
    }

    pub fn push_with_alt(&mut self, name: &str, func: R, alt: &[&str]) -> Result<(), EngineError> {
        let rule = self.make(name, func, alt)?;
        self.rules.push(rule);
        log::debug!("rule `{name}` appended");
        Ok(())
    }

    /// Inserts `name` immediately before the rule called `anchor`.
    pub fn before(&mut self, anchor: &str, name: &str, func: R) -> Result<(), EngineError> {
        self.before_with_alt(anchor, name, func, &[])
    }

    pub fn before_with_alt(
        &mut self,
        anchor: &str,
        name: &str,
        func: R,
        alt: &[&str],
    ) -> Result<(), EngineError> {
        let idx = self
            .find(anchor)
            .ok_or_else(|| EngineError::UnknownRule(anchor.to_string()))?;
        let rule = self.make(name, func, alt)?;
        self.rules.insert(idx, rule);
        log::debug!("rule `{name}` inserted before `{anchor}`");
        Ok(())
    }

    /// Inserts `name` immediately after the rule called `anchor`.
    pub fn after(&mut self, anchor: &str, name: &str, func: R) -> Result<(), EngineError> {
        self.after_with_alt(anchor, name, func, &[])
    }

    pub fn after_with_alt(
        &mut self,
        anchor: &str,
        name: &str,
        func: R,
        alt: &[&str],
    ) -> Result<(), EngineError> {
        let idx = self
            .find(anchor)
            .ok_or_else(|| EngineError::UnknownRule(anchor.to_string()))?;
        let rule = self.make(name, func, alt)?;
        self.rules.insert(idx + 1, rule);
        log::debug!("rule `{name}` inserted after `{anchor}`");
        Ok(())
    }

    /// Replaces the body of an existing rule, keeping its position.
    pub fn at(&mut self, name: &str, func: R) -> Result<(), EngineError> {
        let idx = self
            .find(name)
            .ok_or_else(|| EngineError::UnknownRule(name.to_string()))?;
        self.rules[idx].func = func;
        Ok(())
    }

    pub fn enable(&mut self, name: &str) -> Result<(), EngineError> {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &str) -> Result<(), EngineError> {
        self.set_enabled(name, false)
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), EngineError> {
        let idx = self
            .find(name)
            .ok_or_else(|| EngineError::UnknownRule(name.to_string()))?;
        self.rules[idx].enabled = enabled;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Names of all rules, enabled or not, in priority order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Enabled rules of the main chain, in priority order.
    pub fn active(&self) -> impl Iterator<Item = &R> {
        self.rules.iter().filter(|r| r.enabled).map(|r| &r.func)
    }

    /// Enabled rules that declared `chain` as an alternate chain.
    pub fn chain<'a>(&'a self, chain: &'a str) -> impl Iterator<Item = &'a R> + 'a {
        self.rules
            .iter()
            .filter(move |r| r.enabled && r.alt.iter().any(|a| a == chain))
            .map(|r| &r.func)
    }
}

impl<R> Default for Ruler<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ruler() -> Ruler<u8> {
        let mut r = Ruler::new();
        r.push("a", 1).unwrap();
        r.push_with_alt("b", 2, &["paragraph"]).unwrap();
        r.push("c", 3).unwrap();
        r
    }

    #[test]
    fn before_and_after_place_relative_to_anchor() {
        let mut r = ruler();
        r.before("b", "x", 9).unwrap();
        r.after("c", "y", 8).unwrap();
        assert_eq!(r.names(), vec!["a", "x", "b", "c", "y"]);
    }

    #[test]
    fn unknown_anchor_is_an_error() {
        let mut r = ruler();
        assert_eq!(
            r.before("missing", "x", 9),
            Err(EngineError::UnknownRule("missing".to_string()))
        );
        assert_eq!(r.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_name_is_an_error() {
        let mut r = ruler();
        assert_eq!(
            r.after("a", "c", 9),
            Err(EngineError::DuplicateRule("c".to_string()))
        );
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let mut r = ruler();
        r.disable("b").unwrap();
        assert_eq!(r.active().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(r.chain("paragraph").count(), 0);
        r.enable("b").unwrap();
        assert_eq!(r.chain("paragraph").copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn at_replaces_in_place() {
        let mut r = ruler();
        r.at("b", 7).unwrap();
        assert_eq!(r.active().copied().collect::<Vec<_>>(), vec![1, 7, 3]);
    }
}
