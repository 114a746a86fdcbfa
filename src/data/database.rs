use super::rule::Rule;
use std::collections::HashMap;

/// Ordered clause store with a functor-name index.
///
/// Clauses are tried in the order they were added; the index keeps one
/// position list per head functor so the resolution scan only visits
/// candidates for the goal at hand.
#[derive(Clone, Debug, Default)]
pub struct Database {
    rules: Vec<Rule>,
    index: HashMap<String, Vec<usize>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let mut db = Self::new();
        db.extend(rules);
        db
    }

    pub fn push(&mut self, rule: Rule) {
        if let Some(name) = rule.head_name() {
            self.index.entry(name.to_string()).or_default().push(self.rules.len());
        }
        self.rules.push(rule);
    }

    pub fn extend(&mut self, rules: impl IntoIterator<Item = Rule>) {
        for rule in rules {
            self.push(rule);
        }
    }

    /// Positions of clauses whose head functor is `name`, in authoring order.
    pub fn candidates(&self, name: &str) -> &[usize] {
        self.index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rule(&self, position: usize) -> &Rule {
        &self.rules[position]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::data::rule::Rule;
    use crate::data::term::Part;

    fn fact(name: &str, arg: &str) -> Rule {
        Rule::fact(Part::app(name, vec![Part::text(arg)]))
    }

    #[test]
    fn index_preserves_authoring_order() {
        let db = Database::from_rules(vec![
            fact("p", "a"),
            fact("q", "x"),
            fact("p", "b"),
            fact("p", "c"),
        ]);
        let heads: Vec<String> = db
            .candidates("p")
            .iter()
            .map(|&i| db.rule(i).head.to_string())
            .collect();
        assert_eq!(heads, vec!["p(a)", "p(b)", "p(c)"]);
        assert_eq!(db.candidates("q").len(), 1);
        assert!(db.candidates("missing").is_empty());
        assert_eq!(db.len(), 4);
    }

    #[test]
    fn extend_appends_after_existing_clauses() {
        let mut db = Database::from_rules(vec![fact("p", "a")]);
        db.extend(vec![fact("p", "b")]);
        assert_eq!(db.candidates("p"), &[0, 1]);
    }
}
