use quarry::common::Value;
use quarry::expression::{resolve, Expr, ExprBuilder};
use quarry::operator::{
    add, cond, derivative, flexible, gte, identity, integral, let_, map, multiply, nullary, rank, reduce, size, sum, variadic, windowed,
    Bound, Window,
};
use quarry::{doc, doc_value, record};

#[test]
fn test_identity_shape() {
    assert_eq!(resolve(&identity("size").call1("$tags")), doc_value!({ "$size": "$tags" }));
    assert_eq!(resolve(&size("$tags")), doc_value!({ "$size": "$tags" }));
}

#[test]
fn test_variadic_shape() {
    let args = vec![Expr::from(1), Expr::from(2), Expr::from(3)];
    assert_eq!(resolve(&variadic("add").call(args)), doc_value!({ "$add": [1, 2, 3] }));
    assert_eq!(resolve(&add([1, 2, 3])), doc_value!({ "$add": [1, 2, 3] }));
}

#[test]
fn test_flexible_shape() {
    let sum_op = flexible("sum");
    assert_eq!(resolve(&sum_op.call1("$score")), doc_value!({ "$sum": "$score" }));
    assert_eq!(
        resolve(&sum_op.call(vec![Expr::from("$a"), Expr::from("$b")])),
        doc_value!({ "$sum": ["$a", "$b"] })
    );
    assert_eq!(resolve(&sum(["$score"])), doc_value!({ "$sum": "$score" }));
}

#[test]
fn test_nullary_shape() {
    assert_eq!(resolve(&nullary("rand").call(Vec::new())), doc_value!({ "$rand": {} }));
    assert_eq!(resolve(&rank()), doc_value!({ "$rank": {} }));
}

#[test]
fn test_operators_nest() {
    let price = cond(
        gte("$qty", 100),
        multiply([Expr::from("$price"), Expr::from(0.9)]),
        "$price",
    );
    assert_eq!(
        resolve(&price),
        Value::from(doc! {
            "$cond": {
                "if": { "$gte": ["$qty", 100] },
                "then": { "$multiply": ["$price", 0.9] },
                "else": "$price"
            }
        })
    );
}

#[test]
fn test_scoped_operators_pass_variables_through() {
    let doubled = map("$items", "item", |b: &ExprBuilder| {
        multiply([b.var_field("item", "qty"), Expr::from(2)])
    });
    assert_eq!(
        resolve(&doubled),
        doc_value!({
            "$map": {
                "input": "$items",
                "as": "item",
                "in": { "$multiply": ["$$item.qty", 2] }
            }
        })
    );

    let total = reduce("$items", 0, |b: &ExprBuilder| add([b.var("value"), b.var("this")]));
    assert_eq!(
        resolve(&total),
        doc_value!({
            "$reduce": {
                "input": "$items",
                "initialValue": 0,
                "in": { "$add": ["$$value", "$$this"] }
            }
        })
    );

    let discounted = let_(record! { rate: 0.8 }, |b: &ExprBuilder| {
        assert!(b.is_bound("rate"));
        multiply([Expr::from("$price"), b.var("rate")])
    });
    assert_eq!(
        resolve(&discounted),
        doc_value!({
            "$let": {
                "vars": { rate: 0.8 },
                "in": { "$multiply": ["$price", "$$rate"] }
            }
        })
    );
}

#[test]
fn test_windowed_accumulator() {
    let running = windowed(sum(["$qty"]), Window::documents(Bound::Unbounded, Bound::Current));
    assert_eq!(
        resolve(&running),
        doc_value!({ "$sum": "$qty", window: { documents: ["unbounded", "current"] } })
    );
}

#[test]
fn test_window_operators_hoist_from_any_options() {
    let from_document = derivative(doc! { input: "$odometer", unit: "hour", window: { range: [(-1), 0] } });
    assert_eq!(
        resolve(&from_document),
        doc_value!({
            "$derivative": { input: "$odometer", unit: "hour" },
            window: { range: [(-1), 0] }
        })
    );

    let from_callback = integral(Expr::callback(|b| {
        record! { input: (b.field("kw")), window: (Window::range(-60, 0).unit("second")) }
    }));
    assert_eq!(
        resolve(&from_callback),
        doc_value!({
            "$integral": { input: "$kw" },
            window: { range: [(-60i64), 0i64], unit: "second" }
        })
    );
}
