//! Arithmetic evaluation for `is/2`.

use crate::data::{Atom, Part};

/// Evaluates a ground arithmetic expression over the binary operators
/// `+ - * /` and numeric atoms. Returns `None` when the expression mentions
/// anything else; the caller treats that as goal failure.
///
/// Post-order evaluation over explicit stacks, so nesting depth is not
/// limited by the call stack.
pub(crate) fn eval_arithmetic(expr: &Part) -> Option<f64> {
    let mut flat: Vec<&Part> = Vec::new();
    let mut stack: Vec<&Part> = vec![expr];
    while let Some(part) = stack.pop() {
        flat.push(part);
        if let Part::Compound(c) = part {
            stack.extend(c.args.iter());
        }
    }

    let mut values: Vec<f64> = Vec::new();
    for part in flat.iter().rev() {
        match part {
            Part::Atom(Atom::Number(n)) => values.push(*n),
            Part::Compound(c) => {
                if c.args.len() != 2 || values.len() < 2 {
                    return None;
                }
                let rhs = values.pop()?;
                let lhs = values.pop()?;
                let result = match &*c.functor {
                    "+" => lhs + rhs,
                    "-" => lhs - rhs,
                    "*" => lhs * rhs,
                    "/" => lhs / rhs,
                    _ => return None,
                };
                values.push(result);
            }
            _ => return None,
        }
    }
    values.pop()
}
