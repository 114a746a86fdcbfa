//! Renaming apart: fresh copies of clause terms for each activation.

use crate::data::{Compound, Part, ScopeId, Variable};
use std::collections::HashMap;
use std::rc::Rc;

/// Structurally copies `parts`, replacing every named variable with a fresh
/// `_G{n}` variable drawn from `fresh`. The shared `var_map` keeps one fresh
/// variable per source name, so a clause head and body renamed with the same
/// map stay connected. The wildcard `_` is left as is.
///
/// Top-level compounds in the output are tagged with `parent`, the scope a
/// cut inside them would belong to.
pub(crate) fn rename_parts(
    parts: &[Part],
    parent: Option<ScopeId>,
    var_map: &mut HashMap<Rc<str>, Variable>,
    fresh: &mut u64,
) -> Vec<Part> {
    let mut flat: Vec<&Part> = Vec::new();
    let mut stack: Vec<&Part> = parts.iter().collect();
    while let Some(part) = stack.pop() {
        flat.push(part);
        if let Part::Compound(c) = part {
            stack.extend(c.args.iter());
        }
    }

    let mut out: Vec<Part> = Vec::new();
    for part in flat.iter().rev() {
        match part {
            Part::Atom(_) => out.push((*part).clone()),
            Part::Variable(v) => {
                if v.is_wildcard() {
                    out.push((*part).clone());
                } else {
                    let renamed = var_map
                        .entry(Rc::clone(&v.name))
                        .or_insert_with(|| {
                            let name = format!("_G{}", *fresh);
                            *fresh += 1;
                            Variable::new(name)
                        })
                        .clone();
                    out.push(Part::Variable(renamed));
                }
            }
            Part::Compound(c) => {
                let args = out.split_off(out.len() - c.args.len());
                out.push(Part::Compound(Rc::new(Compound::new(
                    Rc::clone(&c.functor),
                    args,
                ))));
            }
        }
    }

    for part in &out {
        if let Part::Compound(c) = part {
            c.set_parent(parent);
        }
    }
    out
}
