use crate::bindings::Schema;
use crate::config::QuarryConfig;
use crate::driver::Driver;
use crate::expression::Expr;
use crate::operation::*;
use crate::pipeline::Pipeline;
use crate::update::UpdateSpec;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// A handle on one collection, typed by its schema marker `T`.
///
/// Every verb returns a deferred operation descriptor; nothing reaches the driver
/// until the descriptor is triggered. The handle itself is cheap to clone and can be
/// used anywhere a collection name is expected in a stage (`lookup`, `union_with`,
/// `graph_lookup`, `out`, `merge`): it resolves to its name.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::filter::field;
/// use quarry::pipeline::{lookup, match_};
///
/// let orders = bindings.collection::<Order>()?;
/// let customers = bindings.collection::<Customer>()?;
///
/// let open = orders.find(field("status").eq("open")).limit(20).to_list().await?;
///
/// let joined = orders
///     .pipeline()
///     .pipe(&match_(field("total").gt(100)))
///     .pipe(&lookup(&customers, "customerId", "_id", "customer"));
/// let rows = orders.aggregate(&joined).to_list().await?;
/// ```
pub struct Collection<T, D> {
    name: String,
    client: Arc<D>,
    config: QuarryConfig,
    _schema: PhantomData<fn() -> T>,
}

impl<T: Schema, D: Driver> Collection<T, D> {
    /// Creates a handle with the default configuration.
    pub fn new(client: Arc<D>, name: impl Into<String>) -> Self {
        Self::with_config(client, name, QuarryConfig::new())
    }

    pub(crate) fn with_config(client: Arc<D>, name: impl Into<String>, config: QuarryConfig) -> Self {
        Collection {
            name: name.into(),
            client,
            config,
            _schema: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &QuarryConfig {
        &self.config
    }

    /// An empty pipeline targeting this collection.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::for_collection(self.name.clone())
    }

    fn target(&self) -> Target<D> {
        Target::new(self.client.clone(), self.name.clone(), self.config.clone())
    }

    pub fn find(&self, filter: impl Into<Expr>) -> FindOperation<D> {
        FindOperation::new(self.target(), filter)
    }

    pub fn find_one(&self, filter: impl Into<Expr>) -> FindOneOperation<D> {
        FindOneOperation::new(self.target(), filter)
    }

    pub fn count_documents(&self, filter: impl Into<Expr>) -> CountOperation<D> {
        CountOperation::new(self.target(), filter)
    }

    pub fn distinct(&self, field_name: &str, filter: impl Into<Expr>) -> DistinctOperation<D> {
        DistinctOperation::new(self.target(), field_name, filter)
    }

    /// Runs `pipeline` against this collection. The collection recorded in the
    /// pipeline, if any, is not consulted.
    pub fn aggregate(&self, pipeline: &Pipeline) -> AggregateOperation<D> {
        AggregateOperation::new(self.target(), pipeline)
    }

    pub fn insert_one(&self, document: impl Into<Expr>) -> InsertOneOperation<D> {
        InsertOneOperation::new(self.target(), document)
    }

    pub fn insert_many<I, E>(&self, documents: I) -> InsertManyOperation<D>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        InsertManyOperation::new(self.target(), documents)
    }

    pub fn update_one(&self, filter: impl Into<Expr>, update: impl Into<UpdateSpec>) -> UpdateOperation<D> {
        UpdateOperation::new(self.target(), false, filter, update)
    }

    pub fn update_many(&self, filter: impl Into<Expr>, update: impl Into<UpdateSpec>) -> UpdateOperation<D> {
        UpdateOperation::new(self.target(), true, filter, update)
    }

    pub fn replace_one(&self, filter: impl Into<Expr>, replacement: impl Into<Expr>) -> ReplaceOneOperation<D> {
        ReplaceOneOperation::new(self.target(), filter, replacement)
    }

    pub fn delete_one(&self, filter: impl Into<Expr>) -> DeleteOperation<D> {
        DeleteOperation::new(self.target(), false, filter)
    }

    pub fn delete_many(&self, filter: impl Into<Expr>) -> DeleteOperation<D> {
        DeleteOperation::new(self.target(), true, filter)
    }

    pub fn find_one_and_update(
        &self,
        filter: impl Into<Expr>,
        update: impl Into<UpdateSpec>,
    ) -> FindOneAndUpdateOperation<D> {
        FindOneAndUpdateOperation::new(self.target(), filter, update)
    }

    pub fn find_one_and_replace(
        &self,
        filter: impl Into<Expr>,
        replacement: impl Into<Expr>,
    ) -> FindOneAndReplaceOperation<D> {
        FindOneAndReplaceOperation::new(self.target(), filter, replacement)
    }

    pub fn find_one_and_delete(&self, filter: impl Into<Expr>) -> FindOneAndDeleteOperation<D> {
        FindOneAndDeleteOperation::new(self.target(), filter)
    }
}

impl<T, D> Clone for Collection<T, D> {
    fn clone(&self) -> Self {
        Collection {
            name: self.name.clone(),
            client: self.client.clone(),
            config: self.config.clone(),
            _schema: PhantomData,
        }
    }
}

impl<T, D> Debug for Collection<T, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Collection({})", self.name)
    }
}

impl<T, D> From<&Collection<T, D>> for Expr {
    fn from(collection: &Collection<T, D>) -> Self {
        Expr::Collection(collection.name.clone())
    }
}

impl<T, D> From<Collection<T, D>> for Expr {
    fn from(collection: Collection<T, D>) -> Self {
        Expr::Collection(collection.name)
    }
}
