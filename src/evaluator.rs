use std::collections::HashSet;

use tracing::trace;

use crate::{
    ast::{Expr, Type},
    interpreter::{EvalError, Interpreter},
};

/// Default nomination predicate: anything but a parameter reference.
pub fn can_be_evaluated_locally(expr: &Expr) -> bool {
    !expr.is_parameter()
}

/// Like [`can_be_evaluated_locally`], but also leaves static "current
/// moment" reads (`DateTime.Now`, `DateTimeOffset.UtcNow`, ...) in the
/// tree so they resolve on the remote side at execution time.
///
/// Only the bare static read is deferred. `DateTime.Today` and values
/// computed from it fold as usual.
pub fn can_be_evaluated_locally_deferring_now(expr: &Expr) -> bool {
    can_be_evaluated_locally(expr) && !is_current_moment(expr)
}

fn is_current_moment(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::MemberAccess { object: None, member }
            if matches!(member.declaring_type, Type::DateTime | Type::DateTimeOffset)
                && matches!(member.name.as_str(), "Now" | "UtcNow")
    )
}

/// Replaces every parameter-independent subtree of `expr` with the
/// constant it evaluates to.
///
/// The base of a query operator chain (see [`Expr::query_root`]) is never
/// folded, so the operator calls over it survive.
///
/// # Examples
///
/// ```
/// use seqwire::{BinaryOp, Expr, Value, evaluator::{partially_evaluate, can_be_evaluated_locally}};
///
/// let sum = Expr::binary(
///     BinaryOp::Add,
///     Expr::constant(Value::Int32(2)),
///     Expr::constant(Value::Int32(3)),
/// );
/// let folded = partially_evaluate(&sum, can_be_evaluated_locally).unwrap();
/// assert_eq!(folded, Expr::constant(Value::Int32(5)));
/// ```
pub fn partially_evaluate<P>(expr: &Expr, predicate: P) -> Result<Expr, EvalError>
where
    P: Fn(&Expr) -> bool,
{
    let root = match expr {
        Expr::MethodCall { .. } => Some(expr.query_root()),
        _ => None,
    };

    let mut nominator = Nominator {
        predicate,
        root,
        candidates: HashSet::new(),
    };
    nominator.nominate(expr);
    trace!(candidates = nominator.candidates.len(), "nominated subtrees");

    SubtreeEvaluator {
        candidates: &nominator.candidates,
        interpreter: Interpreter::new(),
    }
    .evaluate(expr)
}

/// Identity of a node for the duration of one pass.
fn node_id(expr: &Expr) -> usize {
    expr as *const Expr as usize
}

/// Bottom-up pass collecting the nodes whose whole subtree can be
/// evaluated without the per-element parameter.
struct Nominator<'a, P> {
    predicate: P,
    root: Option<&'a Expr>,
    candidates: HashSet<usize>,
}

impl<P> Nominator<'_, P>
where
    P: Fn(&Expr) -> bool,
{
    /// Returns whether `expr` and all its descendants are evaluable.
    fn nominate(&mut self, expr: &Expr) -> bool {
        let mut evaluable = true;
        for child in expr.children() {
            // every child is visited, even after one has failed
            evaluable &= self.nominate(child);
        }
        if !evaluable || !self.accepts(expr) {
            return false;
        }
        self.candidates.insert(node_id(expr));
        true
    }

    fn accepts(&self, expr: &Expr) -> bool {
        if self.root.is_some_and(|root| std::ptr::eq(root, expr)) {
            return false;
        }
        // a lambda is a function, not a value; its body is nominated on its own
        if matches!(expr, Expr::Lambda { .. }) {
            return false;
        }
        (self.predicate)(expr)
    }
}

/// Top-down pass replacing nominated subtrees with constants.
struct SubtreeEvaluator<'a> {
    candidates: &'a HashSet<usize>,
    interpreter: Interpreter,
}

impl SubtreeEvaluator<'_> {
    fn evaluate(&self, expr: &Expr) -> Result<Expr, EvalError> {
        if self.candidates.contains(&node_id(expr)) {
            if let Expr::Constant { .. } = expr {
                return Ok(expr.clone());
            }
            let value = self.interpreter.eval(expr)?;
            trace!(?value, "folded subtree");
            return Ok(Expr::typed_constant(value, expr.static_type()));
        }

        if let Expr::MemberInit { new, .. } = expr {
            let new = self.evaluate(new)?;
            if let Expr::Constant { .. } = new {
                return Ok(new);
            }
        }

        expr.try_map_children(|child| self.evaluate(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_moment_reads_are_recognized() {
        let now = Expr::static_member(Type::DateTime, "Now", Type::DateTime);
        let today = Expr::static_member(Type::DateTime, "Today", Type::DateTime);
        assert!(is_current_moment(&now));
        assert!(!is_current_moment(&today));
        assert!(can_be_evaluated_locally(&now));
        assert!(!can_be_evaluated_locally_deferring_now(&now));
    }
}
