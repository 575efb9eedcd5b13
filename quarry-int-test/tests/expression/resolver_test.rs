use chrono::{TimeZone, Utc};
use quarry::common::{ObjectId, Pattern, Timestamp, Value};
use quarry::expression::{resolve, resolve_document, Expr, ExprBuilder};
use quarry::operator::{add, size};
use quarry::{doc, record};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_opaque_leaves_resolve_to_themselves() {
    let leaves = vec![
        Value::from(Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()),
        Value::from(ObjectId::new()),
        Value::from(Pattern::new("^ad", "i")),
        Value::from(Timestamp::new(1_700_000_000, 3)),
    ];
    for leaf in leaves {
        assert_eq!(resolve(&Expr::from(leaf.clone())), leaf);
    }
}

#[test]
fn test_plain_record_resolves_to_itself() {
    let plain = record! {
        name: "ada",
        age: 36,
        active: true,
        score: 9.5,
        tags: ["math", "engines"],
        address: { city: "London", zip: "N1" },
        nothing: ()
    };
    assert_eq!(
        resolve(&plain),
        Value::from(doc! {
            name: "ada",
            age: 36,
            active: true,
            score: 9.5,
            tags: ["math", "engines"],
            address: { city: "London", zip: "N1" },
            nothing: ()
        })
    );
}

#[test]
fn test_nested_nodes_and_callbacks() {
    let expr = record! {
        total: (add([Expr::from("$price"), Expr::from("$tax")])),
        count: (Expr::callback(|b: &ExprBuilder| size(b.field("items")))),
        wrapped: (Expr::node(Expr::node(Expr::from(7))))
    };
    assert_eq!(
        resolve(&expr),
        Value::from(doc! {
            total: { "$add": ["$price", "$tax"] },
            count: { "$size": "$items" },
            wrapped: 7
        })
    );
}

#[test]
fn test_resolution_is_not_memoised() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let expr = Expr::callback(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Expr::from(1)
    });
    resolve(&expr);
    resolve(&expr);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_filter_documents() {
    assert_eq!(resolve_document(&Expr::from(())), doc! {});
    assert_eq!(
        resolve_document(&quarry::operator::gt("$a", "$b")),
        doc! { "$expr": { "$gt": ["$a", "$b"] } }
    );
}
