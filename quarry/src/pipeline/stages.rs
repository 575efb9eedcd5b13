//! The stage catalog.
//!
//! Options are taken as expressions and resolved when the stage is applied, so they
//! may contain operator nodes, callbacks and collection handles. A collection handle
//! is written as its bare name.

use super::stage::Stage;
use super::{pipeline, Pipeline};
use crate::common::{Document, Value};
use crate::expression::{resolve, resolve_document, Expr};
use crate::filter;
use std::borrow::Borrow;

fn sub_pipeline(stages: &[Stage]) -> Expr {
    Expr::from(pipeline(stages))
}

fn collect_stages<I, S>(stages: I) -> Vec<Stage>
where
    I: IntoIterator<Item = S>,
    S: Borrow<Stage>,
{
    stages.into_iter().map(|stage| stage.borrow().clone()).collect()
}

/// `{ $match: filter }`.
///
/// `filter` is a query document (see [`crate::filter`]). An expression that does not
/// resolve to a document is treated as an aggregation predicate and wrapped in
/// `$expr`; `()` matches everything.
pub fn match_(filter: impl Into<Expr>) -> Stage {
    let filter = filter.into();
    Stage::new("$match", move |pipeline: &Pipeline| {
        pipeline.push(Document::single("$match", resolve_document(&filter)))
    })
}

/// `{ $match: { $expr: expression } }`.
pub fn match_expr(expression: impl Into<Expr>) -> Stage {
    match_(filter::expr(expression))
}

/// `{ $project: spec }`.
pub fn project(spec: impl Into<Expr>) -> Stage {
    Stage::raw("$project", spec)
}

/// `{ $addFields: spec }`.
pub fn add_fields(spec: impl Into<Expr>) -> Stage {
    Stage::raw("$addFields", spec)
}

/// `{ $set: spec }`, the alias of `$addFields`.
pub fn set(spec: impl Into<Expr>) -> Stage {
    Stage::raw("$set", spec)
}

/// `{ $unset: [fields...] }`.
pub fn unset<I, S>(fields: I) -> Stage
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields: Vec<Expr> = fields.into_iter().map(|f| Expr::from(f.into())).collect();
    Stage::raw("$unset", fields)
}

/// `{ $group: { _id: id, ...accumulators } }`.
///
/// `accumulators` maps output field names to accumulator expressions
/// (`record! { total: (sum(["$qty"])) }`).
pub fn group(id: impl Into<Expr>, accumulators: impl Into<Expr>) -> Stage {
    let id = id.into();
    let accumulators = accumulators.into();
    Stage::new("$group", move |pipeline: &Pipeline| {
        let mut spec = Document::single(crate::DOC_ID, resolve(&id));
        match resolve(&accumulators) {
            Value::Document(fields) => spec.merge(fields),
            Value::Null => {}
            other => log::warn!("Ignoring non-document $group accumulators {}", other),
        }
        pipeline.push(Document::single("$group", spec))
    })
}

/// `{ $sort: spec }`. Accepts a record or [`crate::common::SortFields`].
pub fn sort(spec: impl Into<Expr>) -> Stage {
    Stage::raw("$sort", spec)
}

pub fn limit(n: i64) -> Stage {
    Stage::raw("$limit", n)
}

pub fn skip(n: i64) -> Stage {
    Stage::raw("$skip", n)
}

/// `{ $unwind: "$path" }`. A missing `$` is added.
pub fn unwind(path: &str) -> Stage {
    Stage::raw("$unwind", Expr::field(path))
}

/// `{ $unwind: { path, includeArrayIndex, preserveNullAndEmptyArrays } }`.
pub fn unwind_with(options: impl Into<Expr>) -> Stage {
    Stage::raw("$unwind", options)
}

/// `{ $count: field }`: replaces the documents by a single `{ field: n }`.
pub fn count(field: &str) -> Stage {
    Stage::raw("$count", field)
}

/// An equality join:
/// `{ $lookup: { from, localField, foreignField, as } }`.
pub fn lookup(from: impl Into<Expr>, local_field: &str, foreign_field: &str, as_field: &str) -> Stage {
    Stage::raw(
        "$lookup",
        Expr::record()
            .with("from", from)
            .with("localField", local_field)
            .with("foreignField", foreign_field)
            .with("as", as_field),
    )
}

/// A join running `stages` against the joined collection:
/// `{ $lookup: { ...options, pipeline: [...] } }`.
///
/// `options` carries `from`, `as` and optionally `let`, `localField` and
/// `foreignField`. The sub-pipeline is embedded as a bare array of stage documents.
pub fn lookup_pipeline<I, S>(options: impl Into<Expr>, stages: I) -> Stage
where
    I: IntoIterator<Item = S>,
    S: Borrow<Stage>,
{
    let options = options.into();
    let stages = collect_stages(stages);
    Stage::new("$lookup", move |pipeline: &Pipeline| {
        let spec = options.clone().with("pipeline", sub_pipeline(&stages));
        pipeline.push(Document::single("$lookup", resolve(&spec)))
    })
}

/// `{ $graphLookup: { from, startWith, connectFromField, connectToField, as, ... } }`.
pub fn graph_lookup(options: impl Into<Expr>) -> Stage {
    Stage::raw("$graphLookup", options)
}

/// Parallel sub-pipelines: `{ $facet: { name: [...], ... } }`.
///
/// ```rust
/// use quarry::doc;
/// use quarry::pipeline::{count, facet, limit, pipeline};
///
/// let stage = facet([("total", vec![count("n")]), ("page", vec![limit(10)])]);
/// assert_eq!(
///     pipeline([stage]).stages(),
///     vec![doc! { "$facet": { total: [{ "$count": "n" }], page: [{ "$limit": 10i64 }] } }]
/// );
/// ```
pub fn facet<I, K, P, S>(facets: I) -> Stage
where
    I: IntoIterator<Item = (K, P)>,
    K: Into<String>,
    P: IntoIterator<Item = S>,
    S: Borrow<Stage>,
{
    let facets: Vec<(String, Vec<Stage>)> = facets
        .into_iter()
        .map(|(name, stages)| (name.into(), collect_stages(stages)))
        .collect();
    Stage::new("$facet", move |pipeline: &Pipeline| {
        let mut spec = Document::new();
        for (name, stages) in &facets {
            spec.put(name.as_str(), pipeline_value(stages));
        }
        pipeline.push(Document::single("$facet", spec))
    })
}

fn pipeline_value(stages: &[Stage]) -> Value {
    Value::from(pipeline(stages))
}

/// `{ $unionWith: collection }`.
pub fn union_with(collection: impl Into<Expr>) -> Stage {
    Stage::raw("$unionWith", collection)
}

/// `{ $unionWith: { coll, pipeline: [...] } }`.
pub fn union_with_pipeline<I, S>(collection: impl Into<Expr>, stages: I) -> Stage
where
    I: IntoIterator<Item = S>,
    S: Borrow<Stage>,
{
    let collection = collection.into();
    let stages = collect_stages(stages);
    Stage::new("$unionWith", move |pipeline: &Pipeline| {
        let spec = Expr::record()
            .with("coll", collection.clone())
            .with("pipeline", sub_pipeline(&stages));
        pipeline.push(Document::single("$unionWith", resolve(&spec)))
    })
}

/// `{ $bucket: { groupBy, boundaries, default, output } }`.
pub fn bucket(options: impl Into<Expr>) -> Stage {
    Stage::raw("$bucket", options)
}

/// `{ $bucketAuto: { groupBy, buckets, output, granularity } }`.
pub fn bucket_auto(options: impl Into<Expr>) -> Stage {
    Stage::raw("$bucketAuto", options)
}

/// `{ $replaceRoot: { newRoot } }`.
pub fn replace_root(new_root: impl Into<Expr>) -> Stage {
    Stage::raw("$replaceRoot", Expr::record().with("newRoot", new_root))
}

/// `{ $replaceWith: replacement }`.
pub fn replace_with(replacement: impl Into<Expr>) -> Stage {
    Stage::raw("$replaceWith", replacement)
}

/// `{ $sample: { size } }`.
pub fn sample(size: i64) -> Stage {
    Stage::raw("$sample", Expr::record().with("size", size))
}

/// `{ $sortByCount: expression }`.
pub fn sort_by_count(expression: impl Into<Expr>) -> Stage {
    Stage::raw("$sortByCount", expression)
}

/// `{ $setWindowFields: { partitionBy, sortBy, output } }`.
///
/// Output entries usually come from [`crate::operator::windowed`].
pub fn set_window_fields(options: impl Into<Expr>) -> Stage {
    Stage::raw("$setWindowFields", options)
}

pub fn densify(options: impl Into<Expr>) -> Stage {
    Stage::raw("$densify", options)
}

pub fn fill(options: impl Into<Expr>) -> Stage {
    Stage::raw("$fill", options)
}

/// `{ $redact: expression }`; the expression evaluates to `$$DESCEND`, `$$PRUNE` or
/// `$$KEEP`.
pub fn redact(expression: impl Into<Expr>) -> Stage {
    Stage::raw("$redact", expression)
}

/// `{ $geoNear: options }`. Must be the first stage of its pipeline; that is not
/// checked here.
pub fn geo_near(options: impl Into<Expr>) -> Stage {
    Stage::raw("$geoNear", options)
}

/// `{ $documents: [...] }`, literal input documents.
pub fn documents<I, E>(documents: I) -> Stage
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    let documents: Vec<Expr> = documents.into_iter().map(Into::into).collect();
    Stage::raw("$documents", documents)
}

/// `{ $out: collection }`. Writes the results to `collection`.
///
/// Terminal stages are ordinary stage documents: appending more stages after one is
/// not rejected here, the server does that.
pub fn out(collection: impl Into<Expr>) -> Stage {
    Stage::raw("$out", collection)
}

/// `{ $out: { db, coll } }`.
pub fn out_to(db: &str, collection: impl Into<Expr>) -> Stage {
    Stage::raw(
        "$out",
        Expr::record().with("db", db).with("coll", collection),
    )
}

/// `{ $merge: options }`. `options` is a collection or a record with `into`, `on`,
/// `whenMatched` and `whenNotMatched`.
pub fn merge(options: impl Into<Expr>) -> Stage {
    Stage::raw("$merge", options)
}
