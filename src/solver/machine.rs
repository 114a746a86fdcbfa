//! The resolution state machine.
//!
//! Search is driven as a flat loop over reified [`Step`] states rather than
//! by recursion: descending into a clause body, retrying the next candidate
//! clause, and delivering a cut signal are all explicit transitions. The
//! pending alternatives form a [`Backtrack`] chain that doubles as the
//! continuation to run after each solution is reported.

use crate::config::{Settings, SolveStats};
use crate::data::{collect_variables, Bindings, Compound, Database, Part, ScopeId};
use crate::solver::eval::eval_arithmetic;
use crate::solver::rename::rename_parts;
use crate::solver::unify::unify;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Fatal conditions raised while driving a query. Goal failure is not an
/// error; running out of the configured step budget is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveError {
    IterationLimit { limit: u64 },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::IterationLimit { limit } => {
                write!(f, "iteration limit of {} steps reached", limit)
            }
        }
    }
}

impl std::error::Error for SolveError {}

/// A pending alternative to explore when the current branch fails.
#[derive(Debug)]
pub(crate) enum Backtrack {
    /// Nothing left; the search is over.
    Exhausted,
    /// Re-enter the clause scan for `goals[0]` at `cursor` with the
    /// pre-activation environment.
    Retry {
        goals: Vec<Part>,
        cursor: usize,
        env: Bindings,
        outer: Box<Backtrack>,
    },
    /// Installed by `!`: any resumption turns into a cut signal at `target`.
    CutFire {
        target: Option<ScopeId>,
        outer: Box<Backtrack>,
    },
}

/// One reified state of the search loop.
#[derive(Debug)]
pub(crate) enum Step {
    Run {
        goals: Vec<Part>,
        cursor: usize,
        env: Bindings,
        backtrack: Box<Backtrack>,
    },
    Resume(Box<Backtrack>),
    /// A cut signal travelling outward; `target` is the scope of the clause
    /// body the cut appeared in.
    CutResume {
        backtrack: Box<Backtrack>,
        target: Option<ScopeId>,
    },
    /// A solution; the driver reports `env` and continues from `resume`.
    Yield { env: Bindings, resume: Box<Backtrack> },
    Done,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Builtin {
    Cut,
    Fail,
    Call,
    Unify,
    FindAll,
    Is,
}

fn builtin_for(name: &str, arity: usize) -> Option<Builtin> {
    match (name, arity) {
        ("!", 0) => Some(Builtin::Cut),
        ("fail", 0) => Some(Builtin::Fail),
        ("call", 1) => Some(Builtin::Call),
        ("=", 2) => Some(Builtin::Unify),
        ("findall", 3) => Some(Builtin::FindAll),
        ("is", 2) => Some(Builtin::Is),
        _ => None,
    }
}

/// Per-query machine: the clause database, the activation-scope table, the
/// fresh-variable counter, and the step budget.
pub(crate) struct Machine<'db> {
    db: &'db Database,
    settings: Settings,
    /// scope -> parent scope of the goal whose activation opened it
    scopes: Vec<Option<ScopeId>>,
    fresh: u64,
    stats: SolveStats,
}

impl<'db> Machine<'db> {
    pub(crate) fn new(db: &'db Database, settings: Settings) -> Self {
        Self { db, settings, scopes: Vec::new(), fresh: 0, stats: SolveStats::default() }
    }

    pub(crate) fn initial(goals: Vec<Part>) -> Step {
        Step::Run {
            goals,
            cursor: 0,
            env: Bindings::new(),
            backtrack: Box::new(Backtrack::Exhausted),
        }
    }

    pub(crate) fn stats(&self) -> &SolveStats {
        &self.stats
    }

    fn new_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(parent);
        id
    }

    fn scope_parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()]
    }

    /// Performs one transition, charging it against the step budget.
    pub(crate) fn step(&mut self, step: Step) -> Result<Step, SolveError> {
        self.stats.steps += 1;
        if let Some(limit) = self.settings.max_iterations {
            if self.stats.steps > limit {
                return Err(SolveError::IterationLimit { limit });
            }
        }
        match step {
            Step::Run { goals, cursor, env, backtrack } => {
                self.run(goals, cursor, env, backtrack)
            }
            Step::Resume(backtrack) => Ok(resume(backtrack)),
            Step::CutResume { backtrack, target } => Ok(self.cut_resume(backtrack, target)),
            Step::Yield { resume: r, .. } => Ok(resume(r)),
            Step::Done => Ok(Step::Done),
        }
    }

    fn run(
        &mut self,
        goals: Vec<Part>,
        cursor: usize,
        env: Bindings,
        backtrack: Box<Backtrack>,
    ) -> Result<Step, SolveError> {
        if goals.is_empty() {
            self.stats.solutions += 1;
            return Ok(Step::Yield { env, resume: backtrack });
        }

        let goal = goals[0].clone();
        let head = match &goal {
            Part::Compound(c) => Rc::clone(c),
            // only compound goals are provable
            _ => return Ok(Step::Resume(backtrack)),
        };
        let child = env.child();

        if let Some(builtin) = builtin_for(&head.functor, head.args.len()) {
            return self.builtin(builtin, &head, goals, child, backtrack);
        }

        let db = self.db;
        let candidates = db.candidates(&head.functor);
        for i in cursor..candidates.len() {
            let rule = db.rule(candidates[i]);
            let mut var_map = HashMap::new();
            let mut renamed =
                rename_parts(std::slice::from_ref(&rule.head), None, &mut var_map, &mut self.fresh);
            let renamed_head = match renamed.pop() {
                Some(part) => part,
                None => continue,
            };
            if !unify(&child, &goal, &renamed_head) {
                continue;
            }
            self.stats.activations += 1;

            let rest = &goals[1..];
            let (next_goals, scope) = match &rule.body {
                Some(body) => {
                    let scope = self.new_scope(goal.parent());
                    let mut next =
                        rename_parts(body, Some(scope), &mut var_map, &mut self.fresh);
                    next.extend(rest.iter().cloned());
                    (next, Some(scope))
                }
                None => (rest.to_vec(), None),
            };

            if self.settings.tail_call_reuse && rule.body.is_some() && next_goals.len() == 1 {
                // last goal of the last call: alternatives at this level are
                // dropped and the caller's variable slots may be reused
                let mut next_goals = next_goals;
                if let (Some(body), Some(scope)) = (&rule.body, scope) {
                    self.reuse_frame(&goal, body, scope, &mut var_map, &child, &mut next_goals);
                }
                return Ok(Step::Run { goals: next_goals, cursor: 0, env: child, backtrack });
            }

            let retry = Backtrack::Retry { goals, cursor: i + 1, env, outer: backtrack };
            return Ok(Step::Run {
                goals: next_goals,
                cursor: 0,
                env: child,
                backtrack: Box::new(retry),
            });
        }

        Ok(Step::Resume(backtrack))
    }

    /// Tail-call environment reuse: when the caller goal and the single
    /// remaining body goal mention equally many variables, rebind the
    /// caller's slots over the fresh ones and re-rename the body. Best
    /// effort; the `tail_call_reuse` setting gates the whole path.
    fn reuse_frame(
        &mut self,
        goal: &Part,
        body: &[Part],
        scope: ScopeId,
        var_map: &mut HashMap<Rc<str>, crate::data::Variable>,
        env: &Bindings,
        next_goals: &mut Vec<Part>,
    ) {
        let current_vars = collect_variables(std::slice::from_ref(goal));
        let next_vars = collect_variables(next_goals);
        if current_vars.len() != next_vars.len() {
            return;
        }

        let keys: Vec<Rc<str>> = var_map.keys().cloned().collect();
        for key in keys {
            for k in (0..current_vars.len()).rev() {
                let cn = &current_vars[k];
                let nn = &next_vars[k];
                if cn.name == nn.name {
                    continue;
                }
                let mapped = var_map.get(&key).map_or(false, |v| v.name == nn.name);
                if !mapped {
                    continue;
                }
                // not safe to reuse the slot if cn's value mentions nn
                let cv = env.value(&Part::Variable(cn.clone()));
                let mentions_nn = collect_variables(std::slice::from_ref(&cv))
                    .iter()
                    .any(|v| v.name == nn.name);
                if mentions_nn {
                    continue;
                }
                var_map.insert(Rc::clone(&key), cn.clone());
                env.set_raw(Rc::clone(&cn.name), env.lookup(&nn.name));
                env.unbind(&nn.name);
            }
        }

        *next_goals = rename_parts(body, Some(scope), var_map, &mut self.fresh);
    }

    fn builtin(
        &mut self,
        which: Builtin,
        head: &Rc<Compound>,
        goals: Vec<Part>,
        ctx: Bindings,
        backtrack: Box<Backtrack>,
    ) -> Result<Step, SolveError> {
        match which {
            Builtin::Cut => {
                let fire = Backtrack::CutFire { target: head.parent(), outer: backtrack };
                Ok(Step::Run {
                    goals: goals[1..].to_vec(),
                    cursor: 0,
                    env: ctx.child(),
                    backtrack: Box::new(fire),
                })
            }
            Builtin::Fail => Ok(Step::Resume(backtrack)),
            Builtin::Call => {
                let target = ctx.value(&head.args[0]);
                match target {
                    Part::Compound(inner) => {
                        // the substituted goal is scoped as if the call site
                        // had spelled it out
                        let scope = self.new_scope(head.parent());
                        inner.set_parent(Some(scope));
                        let mut next = Vec::with_capacity(goals.len());
                        next.push(Part::Compound(inner));
                        next.extend(goals[1..].iter().cloned());
                        Ok(Step::Run { goals: next, cursor: 0, env: ctx, backtrack })
                    }
                    _ => Ok(Step::Resume(backtrack)),
                }
            }
            Builtin::Unify => {
                let env = ctx.child();
                if unify(&env, &head.args[0], &head.args[1]) {
                    Ok(Step::Run { goals: goals[1..].to_vec(), cursor: 0, env, backtrack })
                } else {
                    Ok(Step::Resume(backtrack))
                }
            }
            Builtin::Is => {
                let expr = ctx.value(&head.args[1]);
                if !collect_variables(std::slice::from_ref(&expr)).is_empty() {
                    return Ok(Step::Resume(backtrack));
                }
                match eval_arithmetic(&expr) {
                    Some(result) => {
                        let env = ctx.child();
                        if unify(&env, &head.args[0], &Part::number(result)) {
                            Ok(Step::Run { goals: goals[1..].to_vec(), cursor: 0, env, backtrack })
                        } else {
                            Ok(Step::Resume(backtrack))
                        }
                    }
                    None => Ok(Step::Resume(backtrack)),
                }
            }
            Builtin::FindAll => {
                if self.find_all(head, &ctx)? {
                    Ok(Step::Run { goals: goals[1..].to_vec(), cursor: 0, env: ctx, backtrack })
                } else {
                    Ok(Step::Resume(backtrack))
                }
            }
        }
    }

    /// Exhausts an independent search over the second argument, collecting
    /// the dereferenced template per solution, then unifies the bag. Shares
    /// this machine's step budget.
    fn find_all(&mut self, head: &Rc<Compound>, ctx: &Bindings) -> Result<bool, SolveError> {
        let template = head.args[0].clone();
        let goal = match &head.args[1] {
            Part::Compound(_) => head.args[1].clone(),
            other => ctx.value(other),
        };
        if !matches!(goal, Part::Compound(_)) {
            return Ok(false);
        }

        let mut results = Vec::new();
        let mut state = Step::Run {
            goals: vec![goal],
            cursor: 0,
            env: ctx.clone(),
            backtrack: Box::new(Backtrack::Exhausted),
        };
        loop {
            state = self.step(state)?;
            match state {
                Step::Yield { env, resume } => {
                    results.push(env.value(&template));
                    state = Step::Resume(resume);
                }
                Step::Done => break,
                other => state = other,
            }
        }

        let bag = Part::list(results, Part::nil());
        Ok(unify(ctx, &head.args[2], &bag))
    }

    fn cut_resume(&self, backtrack: Box<Backtrack>, target: Option<ScopeId>) -> Step {
        match *backtrack {
            Backtrack::Exhausted => Step::Done,
            // a cut's own continuation re-fires at its own target
            Backtrack::CutFire { target: own, outer } => {
                Step::CutResume { backtrack: outer, target: own }
            }
            Backtrack::Retry { goals, cursor: _, env: _, outer } => {
                let level = goals.first().and_then(Part::parent);
                let stop = match target {
                    Some(scope) => self.scope_parent(scope) == level,
                    // a cut at query level discards every choice point
                    None => false,
                };
                if stop {
                    resume(outer)
                } else {
                    Step::CutResume { backtrack: outer, target }
                }
            }
        }
    }
}

fn resume(backtrack: Box<Backtrack>) -> Step {
    match *backtrack {
        Backtrack::Exhausted => Step::Done,
        Backtrack::Retry { goals, cursor, env, outer } => {
            Step::Run { goals, cursor, env, backtrack: outer }
        }
        Backtrack::CutFire { target, outer } => {
            Step::CutResume { backtrack: outer, target }
        }
    }
}
