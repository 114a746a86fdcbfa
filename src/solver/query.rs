//! Query entry point, solution iteration, and result projection.

use crate::config::{Settings, SolveStats};
use crate::data::{collect_variables, Atom, Database, Part, Variable, LIST_FUNCTOR};
use crate::solver::machine::{Machine, SolveError, Step};
use std::collections::HashMap;
use std::fmt;

/// A projected result value handed to callers.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    List(Vec<Value>),
    /// Anything that is neither a scalar nor a proper list, rendered as text.
    Other(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", Atom::Number(*n)),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Other(s) => write!(f, "{}", s),
        }
    }
}

fn project(part: &Part) -> Value {
    match part {
        Part::Atom(Atom::Nil) => Value::List(Vec::new()),
        Part::Atom(Atom::Text(s)) => Value::Text(s.to_string()),
        Part::Atom(Atom::Number(n)) => Value::Number(*n),
        Part::Compound(c) if &*c.functor == LIST_FUNCTOR && c.args.len() == 2 => {
            let mut items = Vec::new();
            let mut cur = part;
            loop {
                match cur {
                    Part::Compound(cell)
                        if &*cell.functor == LIST_FUNCTOR && cell.args.len() == 2 =>
                    {
                        items.push(project(&cell.args[0]));
                        cur = &cell.args[1];
                    }
                    Part::Atom(Atom::Nil) => return Value::List(items),
                    _ => return Value::Other(part.to_string()),
                }
            }
        }
        other => Value::Other(other.to_string()),
    }
}

/// Pull-based stream of solutions for one query.
pub struct Solutions<'db> {
    machine: Machine<'db>,
    state: Step,
    vars: Vec<Variable>,
    current: Option<HashMap<String, Value>>,
}

/// Starts a query over `goals` against `db`. Solutions are produced lazily;
/// dropping the returned stream abandons the search.
pub fn query<'db>(db: &'db Database, goals: &[Part], settings: Settings) -> Solutions<'db> {
    let vars = collect_variables(goals);
    Solutions {
        machine: Machine::new(db, settings),
        state: Machine::initial(goals.to_vec()),
        vars,
        current: None,
    }
}

impl<'db> Solutions<'db> {
    /// Advances to the next solution. Returns `Ok(true)` when one was found
    /// (see [`Solutions::current`]), `Ok(false)` when the search space is
    /// exhausted, and an error when the step budget runs out.
    pub fn next_solution(&mut self) -> Result<bool, SolveError> {
        self.current = None;
        loop {
            let state = std::mem::replace(&mut self.state, Step::Done);
            match state {
                Step::Done => return Ok(false),
                Step::Yield { env, resume } => {
                    let mut row = HashMap::with_capacity(self.vars.len());
                    for var in &self.vars {
                        let value = env.value(&Part::Variable(var.clone()));
                        row.insert(var.name().to_string(), project(&value));
                    }
                    self.current = Some(row);
                    self.state = Step::Resume(resume);
                    return Ok(true);
                }
                other => self.state = self.machine.step(other)?,
            }
        }
    }

    /// Bindings of the query's free variables for the latest solution.
    pub fn current(&self) -> Option<&HashMap<String, Value>> {
        self.current.as_ref()
    }

    pub fn stats(&self) -> &SolveStats {
        self.machine.stats()
    }
}

impl<'db> Iterator for Solutions<'db> {
    type Item = Result<HashMap<String, Value>, SolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_solution() {
            Ok(true) => self.current.clone().map(Ok),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
