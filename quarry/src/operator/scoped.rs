//! Operators that bind variables for their body expression.
//!
//! The body is a closure receiving an [`ExprBuilder`] whose scope includes the bound
//! names. It runs when the enclosing tree resolves.

use super::combinator::options;
use crate::expression::{Expr, ExprBuilder};

/// `{ $map: { input, as: name, in: body } }`.
pub fn map<F>(input: impl Into<Expr>, name: &str, body: F) -> Expr
where
    F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
{
    options("map").call1(
        Expr::record()
            .with("input", input)
            .with("as", name)
            .with("in", Expr::scoped([name], body)),
    )
}

/// `{ $filter: { input, as: name, cond } }`.
pub fn filter<F>(input: impl Into<Expr>, name: &str, cond: F) -> Expr
where
    F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
{
    filter_spec(input.into(), name, cond, None)
}

/// `{ $filter: { input, as: name, cond, limit } }`.
pub fn filter_with_limit<F>(input: impl Into<Expr>, name: &str, limit: impl Into<Expr>, cond: F) -> Expr
where
    F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
{
    filter_spec(input.into(), name, cond, Some(limit.into()))
}

fn filter_spec<F>(input: Expr, name: &str, cond: F, limit: Option<Expr>) -> Expr
where
    F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
{
    options("filter").call1(
        Expr::record()
            .with("input", input)
            .with("as", name)
            .with("cond", Expr::scoped([name], cond))
            .with_opt("limit", limit),
    )
}

/// `{ $reduce: { input, initialValue, in: body } }`.
///
/// The body sees `$$value` (the accumulated value) and `$$this` (the element).
pub fn reduce<F>(input: impl Into<Expr>, initial_value: impl Into<Expr>, body: F) -> Expr
where
    F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
{
    options("reduce").call1(
        Expr::record()
            .with("input", input)
            .with("initialValue", initial_value)
            .with("in", Expr::scoped(["value", "this"], body)),
    )
}

/// `{ $let: { vars, in: body } }`.
///
/// The names declared in `vars` are in scope for the body. If `vars` is not a record
/// (a callback, say) nothing is added to the scope, which only affects
/// [`ExprBuilder::is_bound`].
pub fn let_<F>(vars: impl Into<Expr>, body: F) -> Expr
where
    F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
{
    let vars = vars.into();
    let names: Vec<String> = vars
        .as_record()
        .map(|fields| fields.keys().cloned().collect())
        .unwrap_or_default();

    options("let").call1(
        Expr::record()
            .with("vars", vars)
            .with("in", Expr::scoped(names, body)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;
    use crate::operator::{add, gt, multiply};
    use crate::{doc, record};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_map() {
        let expr = map("$scores", "s", |b| multiply([b.var("s"), 2.into()]));
        assert_eq!(
            expr.resolve(),
            Value::from(doc! {
                "$map": { input: "$scores", as: "s", in: { "$multiply": ["$$s", 2] } }
            })
        );
    }

    #[test]
    fn test_filter() {
        let expr = filter("$items", "item", |b| gt(b.var_field("item", "price"), 100));
        assert_eq!(
            expr.resolve(),
            Value::from(doc! {
                "$filter": {
                    input: "$items",
                    as: "item",
                    cond: { "$gt": ["$$item.price", 100] }
                }
            })
        );
    }

    #[test]
    fn test_filter_with_limit() {
        let expr = filter_with_limit("$items", "item", 2, |b| b.var("item"));
        assert_eq!(
            expr.resolve(),
            Value::from(doc! {
                "$filter": { input: "$items", as: "item", cond: "$$item", limit: 2 }
            })
        );
    }

    #[test]
    fn test_reduce_binds_value_and_this() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let expr = reduce("$nums", 0, move |b| {
            if let Ok(mut seen) = captured.lock() {
                seen.extend(b.bound().iter().cloned());
            }
            add([b.var("value"), b.var("this")])
        });
        assert_eq!(
            expr.resolve(),
            Value::from(doc! {
                "$reduce": { input: "$nums", initialValue: 0, in: { "$add": ["$$value", "$$this"] } }
            })
        );
        assert_eq!(*seen.lock().unwrap(), vec!["value".to_string(), "this".to_string()]);
    }

    #[test]
    fn test_let_scopes_declared_names() {
        let expr = let_(record! { total: (add(["$price", "$tax"])) }, |b| {
            assert!(b.is_bound("total"));
            gt(b.var("total"), 10)
        });
        assert_eq!(
            expr.resolve(),
            Value::from(doc! {
                "$let": {
                    vars: { total: { "$add": ["$price", "$tax"] } },
                    in: { "$gt": ["$$total", 10] }
                }
            })
        );
    }

    #[test]
    fn test_nested_scopes() {
        let expr = map("$orders", "order", |outer| {
            let order = outer.var_field("order", "lines");
            map(order, "line", |inner| {
                assert!(inner.is_bound("order"));
                assert!(inner.is_bound("line"));
                inner.var_field("line", "qty")
            })
        });
        assert_eq!(
            expr.resolve(),
            Value::from(doc! {
                "$map": {
                    input: "$orders",
                    as: "order",
                    in: { "$map": { input: "$$order.lines", as: "line", in: "$$line.qty" } }
                }
            })
        );
    }
}
