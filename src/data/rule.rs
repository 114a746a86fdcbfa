use super::term::Part;
use std::fmt;

/// A Horn clause: a head with an optional body. A missing body makes a fact.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub head: Part,
    pub body: Option<Vec<Part>>,
}

impl Rule {
    pub fn new(head: Part, body: Vec<Part>) -> Self {
        Self { head, body: Some(body) }
    }

    pub fn fact(head: Part) -> Self {
        Self { head, body: None }
    }

    pub fn is_fact(&self) -> bool {
        self.body.is_none()
    }

    /// Functor name the clause defines, used for database indexing.
    pub fn head_name(&self) -> Option<&str> {
        match &self.head {
            Part::Compound(c) => Some(&c.functor),
            Part::Atom(super::term::Atom::Text(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if let Some(body) = &self.body {
            write!(f, " :- ")?;
            for (i, goal) in body.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", goal)?;
            }
        }
        write!(f, ".")
    }
}

#[cfg(test)]
mod tests {
    use super::Rule;
    use crate::data::term::Part;

    #[test]
    fn facts_have_no_body() {
        let fact = Rule::fact(Part::app("parent", vec![Part::text("tom"), Part::text("bob")]));
        assert!(fact.is_fact());
        assert_eq!(fact.head_name(), Some("parent"));
        assert_eq!(fact.to_string(), "parent(tom, bob).");
    }

    #[test]
    fn rules_render_with_body() {
        let rule = Rule::new(
            Part::app("grandparent", vec![Part::var("X"), Part::var("Z")]),
            vec![
                Part::app("parent", vec![Part::var("X"), Part::var("Y")]),
                Part::app("parent", vec![Part::var("Y"), Part::var("Z")]),
            ],
        );
        assert!(!rule.is_fact());
        assert_eq!(
            rule.to_string(),
            "grandparent(X, Z) :- parent(X, Y), parent(Y, Z).",
        );
    }
}
