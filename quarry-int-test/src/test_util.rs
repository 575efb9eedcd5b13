use anyhow::anyhow;
use quarry::bindings::{bind, Bindings};
use quarry::common::{Document, ObjectId, Value};
use quarry::driver::*;
use quarry::errors::QuarryResult;
use quarry::update::WireUpdate;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Runs an async test body on the current thread.
///
/// `before` builds the context, `after` always runs, even when the body fails.
pub fn run_test<B, T, F, A>(before: B, test: T, after: A)
where
    B: Fn() -> QuarryResult<TestContext>,
    T: Fn(TestContext) -> F,
    F: std::future::Future<Output = anyhow::Result<()>>,
    A: Fn(TestContext),
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = futures::executor::block_on(test(ctx.clone()));
    after(ctx.clone());

    if let Err(e) = result {
        eprintln!("\n==================== TEST FAILED ====================");
        for (index, call) in ctx.driver().calls().iter().enumerate() {
            eprintln!("call {}: {:?}", index, call);
        }
        eprintln!("=====================================================\n");
        panic!("Test failed: {:?}", e);
    }
}

/// Marker for the `people` collection used across the tests.
pub struct Person;
impl quarry::bindings::Schema for Person {}

/// Marker for the `orders` collection used across the tests.
pub struct Order;
impl quarry::bindings::Schema for Order {}

#[derive(Clone)]
pub struct TestContext {
    driver: Arc<MemoryDriver>,
    bindings: Bindings<MemoryDriver>,
}

impl TestContext {
    pub fn driver(&self) -> Arc<MemoryDriver> {
        self.driver.clone()
    }

    pub fn bindings(&self) -> &Bindings<MemoryDriver> {
        &self.bindings
    }
}

/// Binds `people` (to [`Person`]), `orders` (to [`Order`]) and an untyped `events`
/// collection over a fresh [`MemoryDriver`].
pub fn create_test_context() -> QuarryResult<TestContext> {
    let driver = Arc::new(MemoryDriver::new());
    let bindings = quarry::bindings::BindingsBuilder::new(driver.clone())
        .collection::<Person>("people")
        .collection::<Order>("orders")
        .collection::<Document>("events")
        .build()?;
    Ok(TestContext { driver, bindings })
}

/// Same as [`create_test_context`], with operation defaults set.
pub fn create_configured_test_context() -> QuarryResult<TestContext> {
    let driver = Arc::new(MemoryDriver::new());
    let bindings = quarry::bindings::BindingsBuilder::new(driver.clone())
        .max_time_ms(1_500)
        .comment("int-test")
        .collection::<Person>("people")
        .build()?;
    Ok(TestContext { driver, bindings })
}

pub fn cleanup(ctx: TestContext) {
    ctx.driver().clear();
}

/// Binds a single untyped collection over an owned driver.
pub fn bind_untyped(name: &str) -> QuarryResult<Bindings<MemoryDriver>> {
    bind(MemoryDriver::new()).collection::<Document>(name).build()
}

pub fn insert_test_people(ctx: &TestContext) {
    ctx.driver().seed(
        "people",
        vec![
            quarry::doc! { _id: 1, name: "ada", age: 36, tags: ["math", "engines"], address: { city: "London" } },
            quarry::doc! { _id: 2, name: "grace", age: 45, tags: ["navy", "compilers"], address: { city: "Arlington" } },
            quarry::doc! { _id: 3, name: "alan", age: 41, tags: ["math"], address: { city: "London" } },
        ],
    );
}

/// One driver call, as received.
#[derive(Clone, Debug)]
pub struct Call {
    pub method: &'static str,
    pub collection: String,
    pub filter: Document,
    pub update: Option<WireUpdate>,
    pub pipeline: Option<Vec<Document>>,
    pub array_filters: Option<Vec<Document>>,
    pub comment: Option<Value>,
    pub max_time_ms: Option<u64>,
}

impl Call {
    fn new(method: &'static str, collection: &str, filter: &Document) -> Self {
        Call {
            method,
            collection: collection.to_string(),
            filter: filter.clone(),
            update: None,
            pipeline: None,
            array_filters: None,
            comment: None,
            max_time_ms: None,
        }
    }
}

/// An in-memory driver that records every call.
///
/// It understands enough of the query language for the tests: equality, `$eq`,
/// `$ne`, comparisons, `$in`, `$nin`, `$exists`, `$and`, `$or` and `$nor` in
/// filters; `$set`, `$unset`, `$inc` and `$push` in keyword updates; `$set`,
/// `$addFields` and `$unset` with literal values and field references in update
/// pipelines; `$match`, `$skip`, `$limit` and `$project` inclusions in
/// aggregations.
#[derive(Default)]
pub struct MemoryDriver {
    store: Mutex<BTreeMap<String, Vec<Document>>>,
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<String>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        MemoryDriver::default()
    }

    /// Adds documents to `collection` without going through a call.
    pub fn seed(&self, collection: &str, documents: Vec<Document>) {
        self.store
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.store
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Makes the next call fail with `message`.
    pub fn fail_next(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn clear(&self) {
        self.store.lock().unwrap().clear();
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) -> anyhow::Result<()> {
        log::debug!("{} on {}: {}", call.method, call.collection, call.filter);
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().take() {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }

    fn matching(&self, collection: &str, filter: &Document) -> Vec<Document> {
        self.documents(collection)
            .into_iter()
            .filter(|doc| matches(doc, filter))
            .collect()
    }

    fn update_matching(
        &self,
        collection: &str,
        filter: &Document,
        many: bool,
        change: impl Fn(&Document) -> Document,
    ) -> (u64, Option<(Document, Document)>) {
        let mut store = self.store.lock().unwrap();
        let documents = store.entry(collection.to_string()).or_default();
        let mut matched = 0;
        let mut first = None;
        for doc in documents.iter_mut().filter(|doc| matches(doc, filter)) {
            let before = doc.clone();
            *doc = change(doc);
            if first.is_none() {
                first = Some((before, doc.clone()));
            }
            matched += 1;
            if !many {
                break;
            }
        }
        (matched, first)
    }

    fn insert(&self, collection: &str, mut document: Document) -> Value {
        if !document.contains_key("_id") {
            document.put("_id", ObjectId::new());
        }
        let id = document.get("_id").cloned().unwrap_or_default();
        self.store
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(document);
        id
    }

    fn upsert(&self, collection: &str, filter: &Document, update: &WireUpdate) -> Value {
        let seed: Document = filter
            .iter()
            .filter(|(key, value)| !key.starts_with('$') && !is_operator_document(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        self.insert(collection, apply_update(&seed, update))
    }

    fn update(
        &self,
        method: &'static str,
        collection: &str,
        filter: Document,
        update: WireUpdate,
        options: UpdateOptions,
        many: bool,
    ) -> anyhow::Result<UpdateResult> {
        let mut call = Call::new(method, collection, &filter);
        call.update = Some(update.clone());
        call.array_filters = options.array_filters.clone();
        call.comment = options.comment.clone();
        self.record(call)?;

        let (matched, _) = self.update_matching(collection, &filter, many, |doc| apply_update(doc, &update));
        let upserted_id = if matched == 0 && options.upsert == Some(true) {
            Some(self.upsert(collection, &filter, &update))
        } else {
            None
        };
        Ok(UpdateResult {
            matched_count: matched,
            modified_count: matched,
            upserted_id,
        })
    }

    fn delete(&self, collection: &str, filter: &Document, many: bool) -> u64 {
        let mut store = self.store.lock().unwrap();
        let documents = store.entry(collection.to_string()).or_default();
        let mut deleted = 0;
        documents.retain(|doc| {
            if (many || deleted == 0) && matches(doc, filter) {
                deleted += 1;
                false
            } else {
                true
            }
        });
        deleted
    }

    fn first_sorted(&self, collection: &str, filter: &Document, sort: &Option<Document>) -> Option<Document> {
        let mut found = self.matching(collection, filter);
        if let Some(sort) = sort {
            sort_documents(&mut found, sort);
        }
        found.into_iter().next()
    }
}

#[async_trait::async_trait]
impl Driver for MemoryDriver {
    type Error = anyhow::Error;

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> anyhow::Result<Vec<Document>> {
        let mut call = Call::new("find", collection, &filter);
        call.comment = options.comment.clone();
        call.max_time_ms = options.max_time_ms;
        self.record(call)?;

        let mut found = self.matching(collection, &filter);
        if let Some(sort) = &options.sort {
            sort_documents(&mut found, sort);
        }
        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|n| n as usize).unwrap_or(usize::MAX);
        Ok(found
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| match &options.projection {
                Some(projection) => project(&doc, projection),
                None => doc,
            })
            .collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> anyhow::Result<Option<Document>> {
        let mut call = Call::new("find_one", collection, &filter);
        call.comment = options.comment.clone();
        call.max_time_ms = options.max_time_ms;
        self.record(call)?;
        Ok(self.first_sorted(collection, &filter, &options.sort))
    }

    async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
        options: CountOptions,
    ) -> anyhow::Result<u64> {
        let mut call = Call::new("count_documents", collection, &filter);
        call.max_time_ms = options.max_time_ms;
        self.record(call)?;
        Ok(self.matching(collection, &filter).len() as u64)
    }

    async fn distinct(
        &self,
        collection: &str,
        field_name: &str,
        filter: Document,
        _options: DistinctOptions,
    ) -> anyhow::Result<Vec<Value>> {
        self.record(Call::new("distinct", collection, &filter))?;
        let mut values: Vec<Value> = Vec::new();
        for doc in self.matching(collection, &filter) {
            let found = match doc.get_path(field_name) {
                Some(Value::Array(items)) => items.clone(),
                Some(value) => vec![value.clone()],
                None => Vec::new(),
            };
            for value in found {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        Ok(values)
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
        options: AggregateOptions,
    ) -> anyhow::Result<Vec<Document>> {
        let mut call = Call::new("aggregate", collection, &Document::new());
        call.pipeline = Some(pipeline.clone());
        call.comment = options.comment.clone();
        call.max_time_ms = options.max_time_ms;
        self.record(call)?;

        let mut documents = self.documents(collection);
        for stage in &pipeline {
            let Some((keyword, spec)) = stage.first() else {
                continue;
            };
            documents = match (keyword.as_str(), spec) {
                ("$match", Value::Document(filter)) => {
                    documents.into_iter().filter(|doc| matches(doc, filter)).collect()
                }
                ("$skip", value) => {
                    let n = value.as_integer().unwrap_or(0) as usize;
                    documents.into_iter().skip(n).collect()
                }
                ("$limit", value) => {
                    let n = value.as_integer().unwrap_or(0) as usize;
                    documents.into_iter().take(n).collect()
                }
                ("$sort", Value::Document(sort)) => {
                    sort_documents(&mut documents, sort);
                    documents
                }
                ("$project", Value::Document(projection)) => {
                    documents.iter().map(|doc| project(doc, projection)).collect()
                }
                (other, _) => {
                    log::warn!("MemoryDriver ignores stage {}", other);
                    documents
                }
            };
        }
        Ok(documents)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: InsertOptions,
    ) -> anyhow::Result<InsertOneResult> {
        let mut call = Call::new("insert_one", collection, &Document::new());
        call.comment = options.comment.clone();
        self.record(call)?;
        Ok(InsertOneResult {
            inserted_id: self.insert(collection, document),
        })
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: InsertOptions,
    ) -> anyhow::Result<InsertManyResult> {
        let mut call = Call::new("insert_many", collection, &Document::new());
        call.comment = options.comment.clone();
        self.record(call)?;
        Ok(InsertManyResult {
            inserted_ids: documents
                .into_iter()
                .map(|document| self.insert(collection, document))
                .collect(),
        })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: WireUpdate,
        options: UpdateOptions,
    ) -> anyhow::Result<UpdateResult> {
        self.update("update_one", collection, filter, update, options, false)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: WireUpdate,
        options: UpdateOptions,
    ) -> anyhow::Result<UpdateResult> {
        self.update("update_many", collection, filter, update, options, true)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: ReplaceOptions,
    ) -> anyhow::Result<UpdateResult> {
        self.record(Call::new("replace_one", collection, &filter))?;
        let (matched, _) = self.update_matching(collection, &filter, false, |doc| {
            let mut replaced = replacement.clone();
            if let Some(id) = doc.get("_id") {
                replaced.put("_id", id.clone());
            }
            replaced
        });
        let upserted_id = if matched == 0 && options.upsert == Some(true) {
            Some(self.insert(collection, replacement))
        } else {
            None
        };
        Ok(UpdateResult {
            matched_count: matched,
            modified_count: matched,
            upserted_id,
        })
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
        _options: DeleteOptions,
    ) -> anyhow::Result<DeleteResult> {
        self.record(Call::new("delete_one", collection, &filter))?;
        Ok(DeleteResult {
            deleted_count: self.delete(collection, &filter, false),
        })
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
        _options: DeleteOptions,
    ) -> anyhow::Result<DeleteResult> {
        self.record(Call::new("delete_many", collection, &filter))?;
        Ok(DeleteResult {
            deleted_count: self.delete(collection, &filter, true),
        })
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: WireUpdate,
        options: FindOneAndModifyOptions,
    ) -> anyhow::Result<Option<Document>> {
        let mut call = Call::new("find_one_and_update", collection, &filter);
        call.update = Some(update.clone());
        call.array_filters = options.array_filters.clone();
        call.max_time_ms = options.max_time_ms;
        self.record(call)?;

        // narrow the filter to the first document in sort order
        let target = match self.first_sorted(collection, &filter, &options.sort) {
            Some(doc) => doc,
            None => {
                if options.upsert == Some(true) {
                    let id = self.upsert(collection, &filter, &update);
                    if options.return_document == Some(ReturnDocument::After) {
                        return Ok(self.first_sorted(collection, &Document::single("_id", id), &None));
                    }
                }
                return Ok(None);
            }
        };
        let by_id = Document::single("_id", target.get("_id").cloned().unwrap_or_default());
        let (_, changed) = self.update_matching(collection, &by_id, false, |doc| apply_update(doc, &update));
        Ok(changed.map(|(before, after)| match options.return_document {
            Some(ReturnDocument::After) => after,
            _ => before,
        }))
    }

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: FindOneAndModifyOptions,
    ) -> anyhow::Result<Option<Document>> {
        self.record(Call::new("find_one_and_replace", collection, &filter))?;
        let Some(target) = self.first_sorted(collection, &filter, &options.sort) else {
            return Ok(None);
        };
        let by_id = Document::single("_id", target.get("_id").cloned().unwrap_or_default());
        let (_, changed) = self.update_matching(collection, &by_id, false, |doc| {
            let mut replaced = replacement.clone();
            if let Some(id) = doc.get("_id") {
                replaced.put("_id", id.clone());
            }
            replaced
        });
        Ok(changed.map(|(before, after)| match options.return_document {
            Some(ReturnDocument::After) => after,
            _ => before,
        }))
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: FindOneAndModifyOptions,
    ) -> anyhow::Result<Option<Document>> {
        self.record(Call::new("find_one_and_delete", collection, &filter))?;
        let Some(target) = self.first_sorted(collection, &filter, &options.sort) else {
            return Ok(None);
        };
        let by_id = Document::single("_id", target.get("_id").cloned().unwrap_or_default());
        self.delete(collection, &by_id, false);
        Ok(Some(target))
    }
}

fn is_operator_document(value: &Value) -> bool {
    match value {
        Value::Document(doc) => !doc.is_empty() && doc.keys().all(|key| key.starts_with('$')),
        _ => false,
    }
}

/// Evaluates a filter document against `doc`.
pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, condition)| match key.as_str() {
        "$and" => clauses(condition).iter().all(|clause| matches(doc, clause)),
        "$or" => clauses(condition).iter().any(|clause| matches(doc, clause)),
        "$nor" => !clauses(condition).iter().any(|clause| matches(doc, clause)),
        path => field_matches(doc.get_path(path), condition),
    })
}

fn clauses(condition: &Value) -> Vec<Document> {
    match condition {
        Value::Array(items) => items.iter().filter_map(|item| item.as_document().cloned()).collect(),
        _ => Vec::new(),
    }
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> bool {
    match condition {
        Value::Document(operators) if is_operator_document(condition) => operators
            .iter()
            .all(|(operator, operand)| operator_matches(actual, operator, operand)),
        expected => equals(actual, expected),
    }
}

fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
        Some(value) => value == expected,
        None => expected.is_null(),
    }
}

fn operator_matches(actual: Option<&Value>, operator: &str, operand: &Value) -> bool {
    match operator {
        "$eq" => equals(actual, operand),
        "$ne" => !equals(actual, operand),
        "$gt" => compare(actual, operand) == Some(Ordering::Greater),
        "$gte" => matches!(compare(actual, operand), Some(Ordering::Greater | Ordering::Equal)),
        "$lt" => compare(actual, operand) == Some(Ordering::Less),
        "$lte" => matches!(compare(actual, operand), Some(Ordering::Less | Ordering::Equal)),
        "$in" => clauses_values(operand).iter().any(|value| equals(actual, value)),
        "$nin" => !clauses_values(operand).iter().any(|value| equals(actual, value)),
        "$exists" => actual.is_some() == matches!(operand, Value::Bool(true)),
        "$not" => !field_matches(actual, operand),
        other => {
            log::warn!("MemoryDriver does not evaluate {}", other);
            false
        }
    }
}

fn clauses_values(operand: &Value) -> Vec<Value> {
    match operand {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::I32(v) => Some(f64::from(*v)),
        Value::I64(v) => Some(*v as f64),
        Value::F64(v) => Some(*v),
        _ => None,
    }
}

fn compare(actual: Option<&Value>, operand: &Value) -> Option<Ordering> {
    let actual = actual?;
    if let (Some(a), Some(b)) = (number(actual), number(operand)) {
        return a.partial_cmp(&b);
    }
    match (actual, operand) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn sort_documents(documents: &mut [Document], sort: &Document) {
    documents.sort_by(|a, b| {
        for (field, direction) in sort.iter() {
            let ordering = compare(a.get_path(field), b.get_path(field).unwrap_or(&Value::Null))
                .unwrap_or(Ordering::Equal);
            let ordering = if direction.as_integer() == Some(-1) {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn project(doc: &Document, projection: &Document) -> Document {
    let include_id = projection.get("_id").and_then(Value::as_integer) != Some(0);
    let inclusions: Vec<&String> = projection
        .iter()
        .filter(|(key, value)| key.as_str() != "_id" && value.as_integer() == Some(1))
        .map(|(key, _)| key)
        .collect();

    if inclusions.is_empty() {
        let mut projected = doc.clone();
        for (key, value) in projection.iter() {
            if value.as_integer() == Some(0) {
                projected.remove(key);
            }
        }
        return projected;
    }

    let mut projected = Document::new();
    if include_id {
        if let Some(id) = doc.get("_id") {
            projected.put("_id", id.clone());
        }
    }
    for key in inclusions {
        if let Some(value) = doc.get_path(key) {
            projected.put(key.clone(), value.clone());
        }
    }
    projected
}

/// Applies a keyword update or an update pipeline to a copy of `doc`.
pub fn apply_update(doc: &Document, update: &WireUpdate) -> Document {
    let mut updated = doc.clone();
    match update {
        WireUpdate::Document(operators) => {
            for (operator, fields) in operators.iter() {
                let Some(fields) = fields.as_document() else {
                    continue;
                };
                for (path, value) in fields.iter() {
                    match operator.as_str() {
                        "$set" => set_path(&mut updated, path, value.clone()),
                        "$unset" => remove_path(&mut updated, path),
                        "$inc" => {
                            let current = updated.get_path(path).and_then(number).unwrap_or(0.0);
                            let sum = current + number(value).unwrap_or(0.0);
                            let sum = if sum.fract() == 0.0 {
                                Value::I64(sum as i64)
                            } else {
                                Value::F64(sum)
                            };
                            set_path(&mut updated, path, sum);
                        }
                        "$push" => {
                            let mut items = match updated.get_path(path) {
                                Some(Value::Array(items)) => items.clone(),
                                _ => Vec::new(),
                            };
                            items.push(value.clone());
                            set_path(&mut updated, path, Value::Array(items));
                        }
                        other => log::warn!("MemoryDriver ignores update operator {}", other),
                    }
                }
            }
        }
        WireUpdate::Pipeline(stages) => {
            for stage in stages {
                let Some((keyword, spec)) = stage.first() else {
                    continue;
                };
                match (keyword.as_str(), spec) {
                    ("$set" | "$addFields", Value::Document(fields)) => {
                        let source = updated.clone();
                        for (path, value) in fields.iter() {
                            set_path(&mut updated, path, evaluate(&source, value));
                        }
                    }
                    ("$unset", Value::Array(paths)) => {
                        for path in paths.iter().filter_map(Value::as_string) {
                            remove_path(&mut updated, path);
                        }
                    }
                    ("$unset", Value::String(path)) => remove_path(&mut updated, path),
                    (other, _) => log::warn!("MemoryDriver ignores update stage {}", other),
                }
            }
        }
    }
    updated
}

// field references and $literal only
fn evaluate(doc: &Document, value: &Value) -> Value {
    match value {
        Value::String(s) if s.starts_with('$') && !s.starts_with("$$") => {
            doc.get_path(&s[1..]).cloned().unwrap_or_default()
        }
        Value::Document(inner) if inner.len() == 1 && inner.contains_key("$literal") => {
            inner.get("$literal").cloned().unwrap_or_default()
        }
        other => other.clone(),
    }
}

fn set_path(doc: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            doc.put(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Value::Document(_))) {
                doc.put(head, Document::new());
            }
            if let Some(Value::Document(inner)) = doc.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
    }
}

fn remove_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Document(inner)) = doc.get_mut(head) {
                remove_path(inner, rest);
            }
        }
    }
}
