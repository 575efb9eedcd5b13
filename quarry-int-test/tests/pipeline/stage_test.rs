use quarry::expression::{Expr, ExprBuilder};
use quarry::operator::{add, document_number, sum, windowed, Bound, Window};
use quarry::pipeline::{add_fields, bucket, count, pipeline, set_window_fields, unwind, Pipeline};
use quarry::{doc, record};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_stage_options_resolve_on_every_application() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let stage = add_fields(record! {
        total: (Expr::callback(move |b: &ExprBuilder| {
            counter.fetch_add(1, Ordering::SeqCst);
            add([b.field("price"), b.field("tax")])
        }))
    });

    let first = Pipeline::new().pipe(&stage);
    let second = Pipeline::new().pipe(&stage);
    assert_eq!(first.stages(), second.stages());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        first.stages(),
        vec![doc! { "$addFields": { total: { "$add": ["$price", "$tax"] } } }]
    );
}

#[test]
fn test_window_fields() {
    let stage = set_window_fields(record! {
        partitionBy: "$state",
        sortBy: { date: 1 },
        output: {
            running: (windowed(sum(["$qty"]), Window::documents(Bound::Unbounded, Bound::Current))),
            position: (document_number())
        }
    });
    assert_eq!(
        pipeline([stage]).stages(),
        vec![doc! {
            "$setWindowFields": {
                partitionBy: "$state",
                sortBy: { date: 1 },
                output: {
                    running: { "$sum": "$qty", window: { documents: ["unbounded", "current"] } },
                    position: { "$documentNumber": {} }
                }
            }
        }]
    );
}

#[test]
fn test_simple_stages() {
    let stages = pipeline([
        unwind("items"),
        bucket(record! { groupBy: "$price", boundaries: [0, 100, 200], default: "other" }),
        count("n"),
    ])
    .into_stages();
    assert_eq!(
        stages,
        vec![
            doc! { "$unwind": "$items" },
            doc! { "$bucket": { groupBy: "$price", boundaries: [0, 100, 200], default: "other" } },
            doc! { "$count": "n" },
        ]
    );
}
