use quarry::common::{Document, SortFields, SortOrder};
use quarry::expression::Expr;
use quarry::filter::field;
use quarry::operator::sum;
use quarry::pipeline::{
    compose, facet, group, limit, lookup_pipeline, match_, merge, out, pipeline, project, skip, sort,
    union_with_pipeline, Pipeline, Stage,
};
use quarry::{doc, record};

fn match_stage() -> Stage {
    match_(field("status").eq("A"))
}

fn project_stage() -> Stage {
    project(record! { _id: 0, name: 1 })
}

fn limit_stage() -> Stage {
    limit(5)
}

#[test]
fn test_composition_is_associative() {
    let (a, b, c) = (match_stage(), project_stage(), limit_stage());
    let expected = vec![
        doc! { "$match": { status: "A" } },
        doc! { "$project": { _id: 0, name: 1 } },
        doc! { "$limit": 5i64 },
    ];

    assert_eq!(pipeline([&a, &b, &c]).into_stages(), expected);
    assert_eq!(pipeline([compose([&a, &b]), c.clone()]).into_stages(), expected);
    assert_eq!(pipeline([a.clone(), compose([&b, &c])]).into_stages(), expected);
    assert_eq!(Pipeline::new().pipe(&a.then(b.then(c))).into_stages(), expected);
}

#[test]
fn test_sub_pipeline_is_a_bare_array() {
    let join = lookup_pipeline(
        record! { from: "inventory", as: "stock" },
        [match_stage(), project_stage()],
    );
    let stages = pipeline([join]).into_stages();
    assert_eq!(
        stages,
        vec![doc! {
            "$lookup": {
                from: "inventory",
                as: "stock",
                pipeline: [
                    { "$match": { status: "A" } },
                    { "$project": { _id: 0, name: 1 } }
                ]
            }
        }]
    );
}

#[test]
fn test_sub_pipeline_survives_document_and_callback_options() {
    let expected = doc! {
        "$lookup": {
            from: "inventory",
            as: "stock",
            pipeline: [{ "$match": { status: "A" } }, { "$limit": 5i64 }]
        }
    };

    let from_document = lookup_pipeline(doc! { from: "inventory", as: "stock" }, [match_stage(), limit_stage()]);
    assert_eq!(pipeline([from_document]).into_stages(), vec![expected.clone()]);

    let from_callback = lookup_pipeline(
        Expr::callback(|_| record! { from: "inventory", as: "stock" }),
        [match_stage(), limit_stage()],
    );
    assert_eq!(pipeline([from_callback]).into_stages(), vec![expected]);
}

#[test]
fn test_facet_and_union_embed_sub_pipelines() {
    let stages = pipeline([
        facet([
            ("recent", vec![sort(SortFields::new().by("at", SortOrder::Descending)), limit(3)]),
            ("count", vec![group((), record! { n: (sum([1])) })]),
        ]),
        union_with_pipeline("archive", [match_stage()]),
    ])
    .into_stages();

    assert_eq!(
        stages[0],
        doc! {
            "$facet": {
                recent: [{ "$sort": { at: (-1) } }, { "$limit": 3i64 }],
                count: [{ "$group": { _id: (), n: { "$sum": 1 } } }]
            }
        }
    );
    assert_eq!(
        stages[1],
        doc! { "$unionWith": { coll: "archive", pipeline: [{ "$match": { status: "A" } }] } }
    );
}

#[test]
fn test_stages_after_terminal_stage_are_not_rejected() {
    let stages = pipeline([match_stage(), out("report"), skip(1), merge("other")]).into_stages();
    assert_eq!(stages.len(), 4);
    assert_eq!(stages[1], doc! { "$out": "report" });
    assert_eq!(stages[2], doc! { "$skip": 1i64 });
}

#[test]
fn test_pipelines_are_immutable() {
    let base = Pipeline::for_collection("orders").pipe(&match_stage());
    let limited = base.pipe(&limit_stage());
    let projected = base.pipe(&project_stage());

    assert_eq!(base.len(), 1);
    assert_eq!(limited.len(), 2);
    assert_eq!(projected.len(), 2);
    assert_eq!(limited.collection(), Some("orders"));
    assert_ne!(limited.stages(), projected.stages());
}

#[test]
fn test_custom_stage() {
    let tag = Stage::new("tag", |pipeline: &Pipeline| {
        pipeline.push(Document::single("$addFields", doc! { tagged: true }))
    });
    assert_eq!(tag.name(), "tag");
    assert_eq!(
        pipeline([tag]).to_json().unwrap(),
        r#"[{"$addFields":{"tagged":true}}]"#
    );
}
