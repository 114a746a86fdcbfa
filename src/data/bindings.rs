//! Chained binding frames for query evaluation.
//!
//! Every clause activation gets a fresh frame whose lookups fall through to
//! the parent chain. A frame entry holding `None` masks any ancestor binding
//! of the same name, which the tail-call frame-reuse path relies on;
//! removing the entry exposes the ancestor binding again.

use super::term::{Compound, Part};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub struct Bindings(Rc<Frame>);

#[derive(Debug, Default)]
struct Frame {
    slots: RefCell<HashMap<Rc<str>, Option<Part>>>,
    parent: Option<Rc<Frame>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chains a new empty frame on top of this one.
    pub fn child(&self) -> Self {
        Bindings(Rc::new(Frame {
            slots: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(&self.0)),
        }))
    }

    /// Binds `name` in the owning frame.
    pub fn bind(&self, name: Rc<str>, value: Part) {
        self.0.slots.borrow_mut().insert(name, Some(value));
    }

    /// Stores a raw slot in the owning frame; `None` masks ancestor bindings.
    pub(crate) fn set_raw(&self, name: Rc<str>, value: Option<Part>) {
        self.0.slots.borrow_mut().insert(name, value);
    }

    /// Drops the owning frame's slot for `name`; ancestor bindings become
    /// visible again.
    pub(crate) fn unbind(&self, name: &str) {
        self.0.slots.borrow_mut().remove(name);
    }

    /// Finds the binding for `name`, stopping at the first frame that has a
    /// slot for it. A masked slot reads as unbound.
    pub fn lookup(&self, name: &str) -> Option<Part> {
        let mut frame = Some(&self.0);
        while let Some(f) = frame {
            if let Some(slot) = f.slots.borrow().get(name) {
                return slot.clone();
            }
            frame = f.parent.as_ref();
        }
        None
    }

    /// Fully dereferences `part`: every bound variable is replaced by its
    /// value, recursively, following variable-to-variable chains.
    ///
    /// Works as an explicit flatten-then-rebuild pass so terms of any depth
    /// (a 10,000-element list, say) never recurse on the call stack.
    pub fn value(&self, part: &Part) -> Part {
        let mut queue: Vec<Part> = vec![part.clone()];
        let mut flat: Vec<Part> = Vec::new();
        while let Some(x) = queue.pop() {
            match &x {
                Part::Compound(c) => {
                    queue.extend(c.args.iter().cloned());
                    flat.push(x);
                }
                Part::Variable(v) => match self.lookup(&v.name) {
                    Some(bound) => queue.push(bound),
                    None => flat.push(x),
                },
                Part::Atom(_) => flat.push(x),
            }
        }

        let mut out: Vec<Part> = Vec::new();
        for x in flat.iter().rev() {
            match x {
                Part::Compound(c) => {
                    let args = out.split_off(out.len() - c.args.len());
                    out.push(Part::Compound(Rc::new(Compound::new(
                        Rc::clone(&c.functor),
                        args,
                    ))));
                }
                other => out.push(other.clone()),
            }
        }
        out.pop().unwrap_or_else(|| part.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::Bindings;
    use crate::data::term::Part;
    use std::rc::Rc;

    fn name(s: &str) -> Rc<str> {
        Rc::from(s)
    }

    #[test]
    fn lookup_falls_through_to_parent() {
        let root = Bindings::new();
        root.bind(name("X"), Part::text("a"));
        let child = root.child();
        assert_eq!(child.lookup("X"), Some(Part::text("a")));
        assert_eq!(child.lookup("Y"), None);
    }

    #[test]
    fn child_binding_shadows_parent() {
        let root = Bindings::new();
        root.bind(name("X"), Part::text("a"));
        let child = root.child();
        child.bind(name("X"), Part::text("b"));
        assert_eq!(child.lookup("X"), Some(Part::text("b")));
        assert_eq!(root.lookup("X"), Some(Part::text("a")));
    }

    #[test]
    fn masked_slot_reads_as_unbound_until_removed() {
        let root = Bindings::new();
        root.bind(name("X"), Part::text("a"));
        let child = root.child();
        child.set_raw(name("X"), None);
        assert_eq!(child.lookup("X"), None);
        child.unbind("X");
        assert_eq!(child.lookup("X"), Some(Part::text("a")));
    }

    #[test]
    fn value_substitutes_recursively() {
        let env = Bindings::new();
        env.bind(name("X"), Part::app("g", vec![Part::var("Y")]));
        env.bind(name("Y"), Part::number(2.0));
        let t = Part::app("f", vec![Part::var("X"), Part::var("Z")]);
        let v = env.value(&t);
        assert_eq!(
            v,
            Part::app(
                "f",
                vec![Part::app("g", vec![Part::number(2.0)]), Part::var("Z")],
            ),
        );
    }

    #[test]
    fn value_follows_variable_chains() {
        let env = Bindings::new();
        env.bind(name("A"), Part::var("B"));
        env.bind(name("B"), Part::var("C"));
        env.bind(name("C"), Part::text("done"));
        assert_eq!(env.value(&Part::var("A")), Part::text("done"));
    }

    #[test]
    fn value_handles_deep_lists_without_overflow() {
        let env = Bindings::new();
        let items: Vec<Part> = (0..10_000).map(|i| Part::number(i as f64)).collect();
        let list = Part::list(items, Part::var("T"));
        env.bind(name("T"), Part::nil());
        let v = env.value(&list);
        // spine fully rebuilt with the tail substituted
        let mut cur = &v;
        let mut len = 0;
        while let Part::Compound(c) = cur {
            len += 1;
            cur = &c.args[1];
        }
        assert_eq!(len, 10_000);
        assert_eq!(*cur, Part::nil());
    }
}
