//! Rewrites alternate source-surface shapes into the canonical nodes the
//! serializer understands.
//!
//! Some front ends lower comparisons, inline conditionals and string
//! comparisons to calls on helper libraries ([`Type::Operators`],
//! [`Type::Interaction`]) instead of emitting operator nodes. The
//! normalizer maps those calls back, bottom-up. Shapes it does not
//! recognize pass through unchanged; it never fails.

use tracing::debug;

use crate::{
    ast::{BinaryOp, Expr, Method, Type, UnaryOp},
    value::Value,
};

/// Returns the canonical form of `expr`. The input tree is not modified.
pub fn normalize(expr: &Expr) -> Expr {
    let children_done = expr.map_children(normalize);
    rewrite(children_done)
}

fn rewrite(expr: Expr) -> Expr {
    match expr {
        Expr::MethodCall {
            object: None,
            method,
            args,
        } => match <[Expr; 3]>::try_from(args) {
            Ok(args) => rewrite_helper_call(method, args),
            Err(args) => Expr::MethodCall {
                object: None,
                method,
                args,
            },
        },

        // a comparison wrapped in `?? false`
        Expr::Binary {
            op: BinaryOp::Coalesce,
            left,
            right,
            conversion,
        } => {
            if left.is_comparison() && is_constant(&right, &Value::Boolean(false)) {
                debug!("stripped coalesce around comparison");
                *left
            } else {
                Expr::Binary {
                    op: BinaryOp::Coalesce,
                    left,
                    right,
                    conversion,
                }
            }
        }

        Expr::Binary {
            op,
            left,
            right,
            conversion,
        } if op.is_comparison() && is_constant(&right, &Value::Int32(0)) => {
            match rewrite_string_comparison(op, &left) {
                Some(rewritten) => rewritten,
                None => Expr::Binary {
                    op,
                    left,
                    right,
                    conversion,
                },
            }
        }

        Expr::Unary {
            op: UnaryOp::Convert,
            operand,
            ty: Type::Object,
        } => {
            debug!("stripped conversion to object");
            *operand
        }

        Expr::Unary {
            op: UnaryOp::Convert,
            operand,
            ty,
        } if ty.is_boolean()
            && (operand.is_comparison() || matches!(*operand, Expr::Conditional { .. })) =>
        {
            debug!("stripped boolean conversion");
            *operand
        }

        other => other,
    }
}

/// Three-argument calls on the comparison and conditional helpers.
fn rewrite_helper_call(method: Method, [first, second, third]: [Expr; 3]) -> Expr {
    if method.declaring_type == Type::Operators {
        if let Some(op) = compare_object_operator(&method.name) {
            debug!(helper = %method.name, ?op, "rewrote object comparison");
            // third argument selects text comparison, which the remote side ignores
            return Expr::binary(op, first, second);
        }
    }
    if method.declaring_type == Type::Interaction && method.name == "IIf" {
        debug!("rewrote IIf to conditional");
        return Expr::conditional(first, second, third);
    }
    Expr::MethodCall {
        object: None,
        method,
        args: vec![first, second, third],
    }
}

fn compare_object_operator(name: &str) -> Option<BinaryOp> {
    Some(match name {
        "CompareObjectEqual" => BinaryOp::Equal,
        "CompareObjectNotEqual" => BinaryOp::NotEqual,
        "CompareObjectGreater" => BinaryOp::GreaterThan,
        "CompareObjectGreaterEqual" => BinaryOp::GreaterThanOrEqual,
        "CompareObjectLess" => BinaryOp::LessThan,
        "CompareObjectLessEqual" => BinaryOp::LessThanOrEqual,
        _ => return None,
    })
}

/// `CompareString(l, r, ignoreCase) <op> 0`
///
/// Case-sensitive equality collapses to `l <op> r`; every other
/// combination becomes `String.Compare(l, r[, OrdinalIgnoreCase]) <op> 0`.
/// `None` when `call` is not a `CompareString` call with a constant flag.
fn rewrite_string_comparison(op: BinaryOp, call: &Expr) -> Option<Expr> {
    let Expr::MethodCall {
        object: None,
        method,
        args,
    } = call
    else {
        return None;
    };
    if method.declaring_type != Type::Operators || method.name != "CompareString" {
        return None;
    }
    let [left, right, flag] = args.as_slice() else {
        return None;
    };
    let ignore_case = match flag {
        Expr::Constant {
            value: Value::Boolean(b),
            ..
        } => *b,
        _ => return None,
    };

    if !ignore_case && matches!(op, BinaryOp::Equal | BinaryOp::NotEqual) {
        debug!(?op, "collapsed case-sensitive string comparison");
        return Some(Expr::binary(op, left.clone(), right.clone()));
    }

    let mut compare_args = vec![left.clone(), right.clone()];
    if ignore_case {
        compare_args.push(Expr::typed_constant(
            Value::enumeration("StringComparison", "OrdinalIgnoreCase"),
            Type::StringComparison,
        ));
    }
    debug!(?op, ignore_case, "rewrote string comparison to String.Compare");
    let compare = Expr::static_call(
        Method::new(Type::String, "Compare", Type::Int32),
        compare_args,
    );
    Some(Expr::binary(op, compare, Expr::constant(Value::Int32(0))))
}

fn is_constant(expr: &Expr, expected: &Value) -> bool {
    matches!(expr, Expr::Constant { value, .. } if value == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_map_to_comparisons() {
        assert_eq!(compare_object_operator("CompareObjectLessEqual"), Some(BinaryOp::LessThanOrEqual));
        assert_eq!(compare_object_operator("CompareString"), None);
    }
}
