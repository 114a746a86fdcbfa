use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Functor used for list cells; `cons(Head, Tail)` chains terminated by
/// [`Atom::Nil`] form proper lists.
pub const LIST_FUNCTOR: &str = "cons";

/// Identifier of a clause activation, used to decide how far a cut reaches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Basic classification of parts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartKind {
    Atom,
    Variable,
    Compound,
}

/// Constant values: text atoms, numbers, and the empty-list terminator.
#[derive(Clone, Debug, PartialEq)]
pub enum Atom {
    Text(Rc<str>),
    Number(f64),
    Nil,
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Text(name) => write!(f, "{}", name),
            Atom::Number(value) => write_number(f, *value),
            Atom::Nil => write!(f, "[]"),
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{}", value)
    }
}

/// A named logic variable; the name `_` is the anonymous wildcard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: Rc<str>,
}

impl Variable {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wildcard never binds and never shows up in results.
    pub fn is_wildcard(&self) -> bool {
        &*self.name == "_"
    }
}

/// A functor applied to an ordered argument list.
///
/// The `parent` link records which clause activation the term belongs to;
/// it is set during renaming, ignored by equality, and consulted only when
/// a cut decides which choice points to discard.
#[derive(Debug)]
pub struct Compound {
    pub functor: Rc<str>,
    pub args: Vec<Part>,
    parent: Cell<Option<ScopeId>>,
}

impl Compound {
    pub fn new(functor: impl Into<Rc<str>>, args: Vec<Part>) -> Self {
        Self { functor: functor.into(), args, parent: Cell::new(None) }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent.get()
    }

    pub fn set_parent(&self, parent: Option<ScopeId>) {
        self.parent.set(parent);
    }

    fn is_list_cell(&self) -> bool {
        &*self.functor == LIST_FUNCTOR && self.args.len() == 2
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.functor == other.functor && self.args == other.args
    }
}

/// A term: an atom, a variable, or a compound.
#[derive(Clone, Debug, PartialEq)]
pub enum Part {
    Atom(Atom),
    Variable(Variable),
    Compound(Rc<Compound>),
}

impl Part {
    pub fn text(name: impl Into<Rc<str>>) -> Self {
        Part::Atom(Atom::Text(name.into()))
    }

    pub fn number(value: f64) -> Self {
        Part::Atom(Atom::Number(value))
    }

    pub fn nil() -> Self {
        Part::Atom(Atom::Nil)
    }

    pub fn var(name: impl Into<Rc<str>>) -> Self {
        Part::Variable(Variable::new(name))
    }

    pub fn app(functor: impl Into<Rc<str>>, args: Vec<Part>) -> Self {
        Part::Compound(Rc::new(Compound::new(functor, args)))
    }

    pub fn kind(&self) -> PartKind {
        match self {
            Part::Atom(_) => PartKind::Atom,
            Part::Variable(_) => PartKind::Variable,
            Part::Compound(_) => PartKind::Compound,
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        match self {
            Part::Compound(c) => c.parent(),
            _ => None,
        }
    }

    /// Builds a cons-chain over `items` ending in `tail`.
    pub fn list(items: Vec<Part>, tail: Part) -> Self {
        let mut cdr = tail;
        for item in items.into_iter().rev() {
            cdr = Part::app(LIST_FUNCTOR, vec![item, cdr]);
        }
        cdr
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Atom(atom) => write!(f, "{}", atom),
            Part::Variable(var) => write!(f, "{}", var.name),
            Part::Compound(c) => write_compound(f, c),
        }
    }
}

fn write_compound(f: &mut fmt::Formatter<'_>, compound: &Compound) -> fmt::Result {
    if compound.is_list_cell() && has_list_shape(compound) {
        // [a, b, c] when Nil-terminated, [a, b | T] for a variable tail
        write!(f, "[")?;
        let mut cell = compound;
        let mut first = true;
        loop {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", cell.args[0])?;
            first = false;
            match &cell.args[1] {
                Part::Compound(next) if next.is_list_cell() => cell = next,
                Part::Atom(Atom::Nil) => break,
                Part::Variable(tail) => {
                    write!(f, " | {}", tail.name)?;
                    break;
                }
                // unreachable given has_list_shape
                other => {
                    write!(f, " | {}", other)?;
                    break;
                }
            }
        }
        return write!(f, "]");
    }

    write!(f, "{}(", compound.functor)?;
    for (i, arg) in compound.args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ")")
}

/// True when the cons spine ends in `Nil` or a variable.
fn has_list_shape(compound: &Compound) -> bool {
    let mut cell = compound;
    loop {
        match &cell.args[1] {
            Part::Compound(next) if next.is_list_cell() => cell = next,
            Part::Atom(Atom::Nil) | Part::Variable(_) => return true,
            _ => return false,
        }
    }
}

/// Collects every distinct named variable mentioned in `parts`.
///
/// The wildcard `_` is skipped; each variable appears once, in the order the
/// depth-first walk discovers it. The walk is iterative so arbitrarily deep
/// terms cannot exhaust the call stack.
pub fn collect_variables(parts: &[Part]) -> Vec<Variable> {
    let mut out = Vec::new();
    let mut seen: HashSet<Rc<str>> = HashSet::new();
    let mut stack: Vec<&Part> = parts.iter().collect();
    while let Some(part) = stack.pop() {
        match part {
            Part::Variable(var) => {
                if !var.is_wildcard() && seen.insert(Rc::clone(&var.name)) {
                    out.push(var.clone());
                }
            }
            Part::Compound(c) => stack.extend(c.args.iter()),
            Part::Atom(_) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{collect_variables, Atom, Part, PartKind};

    #[test]
    fn classify_parts() {
        assert_eq!(Part::text("a").kind(), PartKind::Atom);
        assert_eq!(Part::var("X").kind(), PartKind::Variable);
        assert_eq!(Part::app("f", vec![Part::text("a")]).kind(), PartKind::Compound);
    }

    #[test]
    fn structural_equality_ignores_parent() {
        let a = Part::app("f", vec![Part::var("X"), Part::text("a")]);
        let b = Part::app("f", vec![Part::var("X"), Part::text("a")]);
        if let Part::Compound(c) = &a {
            c.set_parent(Some(super::ScopeId::new(7)));
        }
        assert_eq!(a, b);
        assert_ne!(a, Part::app("f", vec![Part::var("Y"), Part::text("a")]));
    }

    #[test]
    fn render_proper_list() {
        let l = Part::list(
            vec![Part::number(1.0), Part::number(2.0), Part::number(3.0)],
            Part::nil(),
        );
        assert_eq!(l.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn render_variable_tail() {
        let l = Part::list(vec![Part::text("a"), Part::text("b")], Part::var("T"));
        assert_eq!(l.to_string(), "[a, b | T]");
    }

    #[test]
    fn render_improper_list_as_plain_compound() {
        let l = Part::app("cons", vec![Part::number(1.0), Part::text("x")]);
        assert_eq!(l.to_string(), "cons(1, x)");
    }

    #[test]
    fn render_nil_and_numbers() {
        assert_eq!(Part::nil().to_string(), "[]");
        assert_eq!(Part::number(3.0).to_string(), "3");
        assert_eq!(Part::number(2.5).to_string(), "2.5");
        assert_eq!(Atom::Number(-4.0).to_string(), "-4");
    }

    #[test]
    fn collect_skips_wildcard_and_duplicates() {
        let t = Part::app(
            "f",
            vec![
                Part::var("X"),
                Part::var("_"),
                Part::app("g", vec![Part::var("Y"), Part::var("X")]),
            ],
        );
        let vars = collect_variables(std::slice::from_ref(&t));
        let names: Vec<&str> = vars.iter().map(|v| v.name()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"X"));
        assert!(names.contains(&"Y"));
    }

    #[test]
    fn collect_handles_deep_terms() {
        let mut t = Part::var("X");
        for _ in 0..50_000 {
            t = Part::app("f", vec![t]);
        }
        let vars = collect_variables(std::slice::from_ref(&t));
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name(), "X");
    }
}
