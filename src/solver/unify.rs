//! Two-phase unification over binding environments.
//!
//! Pairs are first classified with an explicit worklist; variable bindings
//! are proposed along the way and committed only after every pair has been
//! checked, so a failed unification leaves the environment untouched.

use crate::data::{Bindings, Part, Variable};
use std::collections::HashMap;
use std::rc::Rc;

/// Unifies `x` with `y` under `env`, binding variables in `env`'s owning
/// frame on success. Returns false (with no bindings made) on mismatch.
pub fn unify(env: &Bindings, x: &Part, y: &Part) -> bool {
    let mut queue: Vec<(Part, Part)> = vec![(env.value(x), env.value(y))];
    let mut leaves: Vec<(Part, Part)> = Vec::new();

    while let Some((a, b)) = queue.pop() {
        match (&a, &b) {
            (Part::Compound(ca), Part::Compound(cb)) => {
                if ca.functor != cb.functor || ca.args.len() != cb.args.len() {
                    return false;
                }
                for pair in ca.args.iter().cloned().zip(cb.args.iter().cloned()) {
                    queue.push(pair);
                }
            }
            (Part::Atom(aa), Part::Atom(ab)) => {
                if aa != ab {
                    return false;
                }
            }
            (Part::Atom(_), Part::Compound(_)) | (Part::Compound(_), Part::Atom(_)) => {
                return false;
            }
            // at least one side is a variable
            _ => leaves.push((a, b)),
        }
    }

    let mut order: Vec<Rc<str>> = Vec::new();
    let mut proposed: HashMap<Rc<str>, Part> = HashMap::new();
    for (a, b) in leaves.iter().rev() {
        let (var, value) = match (a, b) {
            (Part::Variable(v), other) => (v, other),
            (other, Part::Variable(v)) => (v, other),
            _ => continue,
        };
        if var.is_wildcard() {
            continue;
        }
        match proposed.get(&var.name) {
            Some(previous) => {
                // the same variable must not be asked for two different values
                if previous != value {
                    return false;
                }
            }
            None => {
                order.push(Rc::clone(&var.name));
                proposed.insert(Rc::clone(&var.name), value.clone());
            }
        }
    }

    // commit: variable-to-variable proposals become indirections first, so
    // later value proposals can land on the merged name
    let mut alias: HashMap<Rc<str>, Rc<str>> = HashMap::new();
    for name in &order {
        if let Some(Part::Variable(v)) = proposed.get(name) {
            if v.name == *name || chain_reaches(env, name, &v.name) {
                continue;
            }
            alias.insert(Rc::clone(&v.name), Rc::clone(name));
            env.bind(
                Rc::clone(&v.name),
                Part::Variable(Variable::new(Rc::clone(name))),
            );
        }
    }
    for name in &order {
        match proposed.get(name) {
            Some(Part::Variable(_)) | None => {}
            Some(value) => {
                let target = alias.get(name).cloned().unwrap_or_else(|| Rc::clone(name));
                env.bind(target, value.clone());
            }
        }
    }
    true
}

/// Follows variable indirections from `start`; true when the walk reaches
/// `needle`, meaning a binding `needle -> start` would close a cycle.
fn chain_reaches(env: &Bindings, start: &Rc<str>, needle: &str) -> bool {
    let mut cur = Rc::clone(start);
    loop {
        match env.lookup(&cur) {
            Some(Part::Variable(v)) => {
                if &*v.name == needle {
                    return true;
                }
                cur = Rc::clone(&v.name);
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::unify;
    use crate::data::{Bindings, Part};

    fn var(name: &str) -> Part {
        Part::var(name)
    }

    fn atom(name: &str) -> Part {
        Part::text(name)
    }

    fn app(name: &str, args: Vec<Part>) -> Part {
        Part::app(name, args)
    }

    #[test]
    fn unify_variable_with_constant() {
        let env = Bindings::new();
        assert!(unify(&env, &var("X"), &atom("a")));
        assert_eq!(env.value(&var("X")), atom("a"));
    }

    #[test]
    fn unify_identical_constants() {
        let env = Bindings::new();
        assert!(unify(&env, &atom("a"), &atom("a")));
        assert!(unify(&env, &Part::number(4.0), &Part::number(4.0)));
    }

    #[test]
    fn unify_different_constants_fails() {
        let env = Bindings::new();
        assert!(!unify(&env, &atom("a"), &atom("b")));
        assert!(!unify(&env, &atom("1"), &Part::number(1.0)));
        assert!(!unify(&env, &atom("a"), &app("a", vec![atom("b")])));
    }

    #[test]
    fn unify_compound_terms() {
        let env = Bindings::new();
        let t1 = app("f", vec![var("X"), atom("a")]);
        let t2 = app("f", vec![atom("b"), var("Y")]);
        assert!(unify(&env, &t1, &t2));
        assert_eq!(env.value(&var("X")), atom("b"));
        assert_eq!(env.value(&var("Y")), atom("a"));
    }

    #[test]
    fn functor_or_arity_mismatch_fails() {
        let env = Bindings::new();
        assert!(!unify(&env, &app("f", vec![atom("a")]), &app("g", vec![atom("a")])));
        assert!(!unify(
            &env,
            &app("f", vec![atom("a")]),
            &app("f", vec![atom("a"), atom("b")]),
        ));
    }

    #[test]
    fn failed_unification_binds_nothing() {
        let env = Bindings::new();
        let t1 = app("f", vec![var("X"), atom("a")]);
        let t2 = app("f", vec![atom("b"), atom("c")]);
        assert!(!unify(&env, &t1, &t2));
        assert_eq!(env.value(&var("X")), var("X"));
    }

    #[test]
    fn shared_variable_conflict_fails() {
        let env = Bindings::new();
        let t1 = app("f", vec![var("X"), var("X")]);
        let t2 = app("f", vec![atom("a"), atom("b")]);
        assert!(!unify(&env, &t1, &t2));
    }

    #[test]
    fn shared_variable_structural_conflict_fails() {
        let env = Bindings::new();
        let t1 = app("f", vec![var("X"), var("X")]);
        let t2 = app(
            "f",
            vec![app("g", vec![atom("a")]), app("g", vec![atom("b")])],
        );
        assert!(!unify(&env, &t1, &t2));
    }

    #[test]
    fn shared_variable_same_value_succeeds() {
        let env = Bindings::new();
        let t1 = app("f", vec![var("X"), var("X")]);
        let t2 = app("f", vec![atom("a"), atom("a")]);
        assert!(unify(&env, &t1, &t2));
        assert_eq!(env.value(&var("X")), atom("a"));
    }

    #[test]
    fn variable_to_variable_links_both_ways() {
        let env = Bindings::new();
        assert!(unify(&env, &var("X"), &var("Y")));
        assert!(unify(&env, &var("Y"), &atom("a")));
        assert_eq!(env.value(&var("X")), atom("a"));
        assert_eq!(env.value(&var("Y")), atom("a"));
    }

    #[test]
    fn repeated_variable_unification_terminates() {
        let env = Bindings::new();
        assert!(unify(&env, &var("X"), &var("Y")));
        assert!(unify(&env, &var("Y"), &var("X")));
        assert!(unify(&env, &var("X"), &var("X")));
        assert!(unify(&env, &var("X"), &atom("t")));
        assert_eq!(env.value(&var("X")), atom("t"));
        assert_eq!(env.value(&var("Y")), atom("t"));
    }

    #[test]
    fn wildcard_unifies_without_binding() {
        let env = Bindings::new();
        assert!(unify(&env, &var("_"), &atom("a")));
        assert!(unify(&env, &var("_"), &atom("b")));
        assert_eq!(env.lookup("_"), None);
    }

    #[test]
    fn mixed_proposals_for_same_variable_fail() {
        let env = Bindings::new();
        // X is asked to be Y and 3 in the same pass; proposals must agree
        let t1 = app("f", vec![var("X"), var("X")]);
        let t2 = app("f", vec![var("Y"), Part::number(3.0)]);
        assert!(!unify(&env, &t1, &t2));
    }

    #[test]
    fn deep_list_unification_is_iterative() {
        let env = Bindings::new();
        let items: Vec<Part> = (0..10_000).map(|i| Part::number(i as f64)).collect();
        let l1 = Part::list(items.clone(), Part::nil());
        let l2 = Part::list(items, Part::var("T"));
        assert!(unify(&env, &l1, &l2));
        assert_eq!(env.value(&var("T")), Part::nil());
    }
}
