use super::Target;
use crate::common::{Document, Value};
use crate::driver::{AggregateOptions, CountOptions, DistinctOptions, Driver, FindOptions};
use crate::expression::{resolve_document, resolve_plain_document, Expr};
use crate::pipeline::Pipeline;

fn find_options<D>(target: &Target<D>) -> FindOptions {
    FindOptions {
        comment: target.comment(),
        max_time_ms: target.config.max_time_ms(),
        allow_disk_use: target.config.allow_disk_use(),
        ..FindOptions::default()
    }
}

/// A deferred `find`.
///
/// The filter is resolved once, when the descriptor is built; triggering the same
/// descriptor repeatedly sends the same filter.
pub struct FindOperation<D> {
    target: Target<D>,
    filter: Document,
    options: FindOptions,
}

impl<D: Driver> FindOperation<D> {
    pub(crate) fn new(target: Target<D>, filter: impl Into<Expr>) -> Self {
        let filter = resolve_document(&filter.into());
        let options = find_options(&target);
        FindOperation {
            target,
            filter,
            options,
        }
    }

    option_setters!(sort, skip, limit, projection, hint, collation, comment, max_time_ms, batch_size, allow_disk_use);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    /// Runs the query and collects every matching document.
    pub async fn to_list(&self) -> Result<Vec<Document>, D::Error> {
        self.target.log("find", &self.filter);
        self.target
            .client
            .find(&self.target.collection, self.filter.clone(), self.options.clone())
            .await
    }

    /// Same as [`FindOperation::to_list`].
    pub async fn execute(&self) -> Result<Vec<Document>, D::Error> {
        self.to_list().await
    }

    /// Runs the query as a `find_one`, returning the first match.
    pub async fn to_one(&self) -> Result<Option<Document>, D::Error> {
        self.target.log("find_one", &self.filter);
        self.target
            .client
            .find_one(&self.target.collection, self.filter.clone(), self.options.clone())
            .await
    }
}

/// A deferred `find_one`.
pub struct FindOneOperation<D> {
    target: Target<D>,
    filter: Document,
    options: FindOptions,
}

impl<D: Driver> FindOneOperation<D> {
    pub(crate) fn new(target: Target<D>, filter: impl Into<Expr>) -> Self {
        let filter = resolve_document(&filter.into());
        let options = find_options(&target);
        FindOneOperation {
            target,
            filter,
            options,
        }
    }

    option_setters!(sort, skip, projection, hint, collation, comment, max_time_ms, allow_disk_use);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    /// Returns the first matching document, if any.
    pub async fn execute(&self) -> Result<Option<Document>, D::Error> {
        self.target.log("find_one", &self.filter);
        self.target
            .client
            .find_one(&self.target.collection, self.filter.clone(), self.options.clone())
            .await
    }

    /// Returns the match as a list of zero or one document.
    pub async fn to_list(&self) -> Result<Vec<Document>, D::Error> {
        Ok(self.execute().await?.into_iter().collect())
    }
}

/// A deferred `count_documents`.
pub struct CountOperation<D> {
    target: Target<D>,
    filter: Document,
    options: CountOptions,
}

impl<D: Driver> CountOperation<D> {
    pub(crate) fn new(target: Target<D>, filter: impl Into<Expr>) -> Self {
        let filter = resolve_document(&filter.into());
        let options = CountOptions {
            comment: target.comment(),
            max_time_ms: target.config.max_time_ms(),
            ..CountOptions::default()
        };
        CountOperation {
            target,
            filter,
            options,
        }
    }

    option_setters!(skip, limit, hint, collation, comment, max_time_ms);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn options(&self) -> &CountOptions {
        &self.options
    }

    pub async fn execute(&self) -> Result<u64, D::Error> {
        self.target.log("count_documents", &self.filter);
        self.target
            .client
            .count_documents(&self.target.collection, self.filter.clone(), self.options.clone())
            .await
    }
}

/// A deferred `distinct`.
pub struct DistinctOperation<D> {
    target: Target<D>,
    field_name: String,
    filter: Document,
    options: DistinctOptions,
}

impl<D: Driver> DistinctOperation<D> {
    pub(crate) fn new(target: Target<D>, field_name: &str, filter: impl Into<Expr>) -> Self {
        let filter = resolve_document(&filter.into());
        let options = DistinctOptions {
            comment: target.comment(),
            max_time_ms: target.config.max_time_ms(),
            ..DistinctOptions::default()
        };
        DistinctOperation {
            target,
            field_name: field_name.to_string(),
            filter,
            options,
        }
    }

    option_setters!(collation, comment, max_time_ms);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn options(&self) -> &DistinctOptions {
        &self.options
    }

    pub async fn execute(&self) -> Result<Vec<Value>, D::Error> {
        self.target.log("distinct", &self.filter);
        self.target
            .client
            .distinct(
                &self.target.collection,
                &self.field_name,
                self.filter.clone(),
                self.options.clone(),
            )
            .await
    }
}

/// A deferred `aggregate`.
///
/// The stage list is materialised when the descriptor is built.
pub struct AggregateOperation<D> {
    target: Target<D>,
    pipeline: Vec<Document>,
    options: AggregateOptions,
}

impl<D: Driver> AggregateOperation<D> {
    pub(crate) fn new(target: Target<D>, pipeline: &Pipeline) -> Self {
        let options = AggregateOptions {
            comment: target.comment(),
            max_time_ms: target.config.max_time_ms(),
            allow_disk_use: target.config.allow_disk_use(),
            ..AggregateOptions::default()
        };
        AggregateOperation {
            target,
            pipeline: pipeline.stages(),
            options,
        }
    }

    option_setters!(hint, collation, comment, max_time_ms, batch_size, allow_disk_use);

    /// Variables the pipeline can reference as `$$name` (the `let` option).
    pub fn variables(mut self, variables: impl Into<Expr>) -> Self {
        self.options.variables = Some(resolve_plain_document(&variables.into(), "let"));
        self
    }

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn pipeline(&self) -> &[Document] {
        &self.pipeline
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    pub async fn to_list(&self) -> Result<Vec<Document>, D::Error> {
        self.target
            .log("aggregate", format!("{} stage(s)", self.pipeline.len()));
        self.target
            .client
            .aggregate(&self.target.collection, self.pipeline.clone(), self.options.clone())
            .await
    }

    /// Same as [`AggregateOperation::to_list`].
    pub async fn execute(&self) -> Result<Vec<Document>, D::Error> {
        self.to_list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{SortFields, SortOrder};
    use crate::config::QuarryConfig;
    use crate::doc;
    use crate::filter::field;
    use crate::operation::test_driver::RecordingDriver;
    use crate::pipeline::{limit, pipeline};
    use crate::record;
    use futures::executor::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn target(driver: &Arc<RecordingDriver>) -> Target<RecordingDriver> {
        Target::new(driver.clone(), "orders", QuarryConfig::new())
    }

    #[test]
    fn test_find_resolves_filter_and_options() {
        let driver = Arc::new(RecordingDriver::default());
        let op = FindOperation::new(target(&driver), field("qty").gt(5))
            .sort(SortFields::new().by("qty", SortOrder::Descending))
            .skip(10)
            .limit(5)
            .projection(record! { _id: 0 })
            .hint("qty_1")
            .batch_size(100);

        assert_eq!(op.collection(), "orders");
        assert_eq!(op.filter(), &doc! { qty: { "$gt": 5 } });
        assert_eq!(op.options().sort, Some(doc! { qty: (-1) }));
        assert_eq!(op.options().skip, Some(10));
        assert_eq!(op.options().limit, Some(5));
        assert_eq!(op.options().projection, Some(doc! { _id: 0 }));
        assert_eq!(op.options().hint, Some(Value::from("qty_1")));
        assert_eq!(op.options().batch_size, Some(100));
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_find_filter_callback_runs_once() {
        let driver = Arc::new(RecordingDriver::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let op = FindOperation::new(
            target(&driver),
            Expr::callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                record! { status: "A" }
            }),
        );

        block_on(op.to_list()).unwrap();
        block_on(op.to_list()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(driver.calls().len(), 2);
    }

    #[test]
    fn test_find_triggers() {
        let driver = Arc::new(RecordingDriver::default());
        let op = FindOperation::new(target(&driver), field("a").eq(1));
        assert_eq!(block_on(op.execute()).unwrap(), vec![doc! { a: 1 }]);
        assert_eq!(block_on(op.to_one()).unwrap(), Some(doc! { a: 1 }));
        assert_eq!(
            driver.calls(),
            vec![r#"find orders {"a":1}"#.to_string(), r#"find_one orders {"a":1}"#.to_string()]
        );
    }

    #[test]
    fn test_find_one_to_list() {
        let driver = Arc::new(RecordingDriver::default());
        let op = FindOneOperation::new(target(&driver), ());
        assert_eq!(block_on(op.execute()).unwrap(), Some(doc! {}));
        assert_eq!(block_on(op.to_list()).unwrap(), vec![doc! {}]);
    }

    #[test]
    fn test_count_and_distinct() {
        let driver = Arc::new(RecordingDriver::default());
        let count = CountOperation::new(target(&driver), ()).limit(100);
        assert_eq!(count.options().limit, Some(100));
        assert_eq!(block_on(count.execute()).unwrap(), 7);

        let distinct = DistinctOperation::new(target(&driver), "status", field("x").exists(true));
        assert_eq!(distinct.field_name(), "status");
        assert_eq!(block_on(distinct.execute()).unwrap(), vec![Value::from("a")]);
    }

    #[test]
    fn test_aggregate_materialises_pipeline() {
        let driver = Arc::new(RecordingDriver::default());
        let op = AggregateOperation::new(target(&driver), &pipeline([limit(3)]))
            .allow_disk_use(true)
            .variables(record! { cutoff: 10 });
        assert_eq!(op.pipeline(), &[doc! { "$limit": 3i64 }]);
        assert_eq!(op.options().allow_disk_use, Some(true));
        assert_eq!(op.options().variables, Some(doc! { cutoff: 10 }));
        assert_eq!(block_on(op.to_list()).unwrap(), vec![doc! { "$limit": 3i64 }]);
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let driver = Arc::new(RecordingDriver::default());
        let config = QuarryConfig::new().with_max_time_ms(500).with_comment("report");
        let target = Target::new(driver, "orders", config);

        let defaulted = FindOperation::new(target.clone(), ());
        assert_eq!(defaulted.options().max_time_ms, Some(500));
        assert_eq!(defaulted.options().comment, Some(Value::from("report")));

        let overridden = FindOperation::new(target, ()).max_time_ms(50).comment("adhoc");
        assert_eq!(overridden.options().max_time_ms, Some(50));
        assert_eq!(overridden.options().comment, Some(Value::from("adhoc")));
    }

    #[test]
    fn test_driver_error_is_returned_unchanged() {
        let driver = Arc::new(RecordingDriver::failing());
        let op = FindOperation::new(target(&driver), ());
        assert_eq!(block_on(op.to_list()), Err("connection refused".to_string()));
    }
}
