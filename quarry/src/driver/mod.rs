//! The seam to the database driver.
//!
//! quarry only builds commands. Executing them is the job of a [`Driver`]
//! implementation supplied by the caller, which receives fully resolved documents and
//! options. Errors are the driver's own: triggers return them unchanged.

mod options;
mod results;

use crate::common::{Document, Value};
use crate::update::WireUpdate;
use async_trait::async_trait;
use std::fmt::{Debug, Display};

pub use options::*;
pub use results::*;

/// Executes finished commands against a database.
///
/// Every method takes the target collection name and already resolved inputs, and
/// performs exactly one round trip. Implementations decide how commands map to the
/// wire; quarry makes no assumption beyond the argument shapes.
///
/// ```rust,ignore
/// struct MongoDriver { db: mongodb::Database }
///
/// #[async_trait::async_trait]
/// impl Driver for MongoDriver {
///     type Error = mongodb::error::Error;
///
///     async fn find(&self, collection: &str, filter: Document, options: FindOptions)
///         -> Result<Vec<Document>, Self::Error> {
///         // convert and forward
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait Driver: Send + Sync {
    /// The driver's error type, returned unchanged by every trigger.
    type Error: Debug + Display + Send + Sync + 'static;

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, Self::Error>;

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Option<Document>, Self::Error>;

    async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
        options: CountOptions,
    ) -> Result<u64, Self::Error>;

    async fn distinct(
        &self,
        collection: &str,
        field_name: &str,
        filter: Document,
        options: DistinctOptions,
    ) -> Result<Vec<Value>, Self::Error>;

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
        options: AggregateOptions,
    ) -> Result<Vec<Document>, Self::Error>;

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: InsertOptions,
    ) -> Result<InsertOneResult, Self::Error>;

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: InsertOptions,
    ) -> Result<InsertManyResult, Self::Error>;

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: WireUpdate,
        options: UpdateOptions,
    ) -> Result<UpdateResult, Self::Error>;

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: WireUpdate,
        options: UpdateOptions,
    ) -> Result<UpdateResult, Self::Error>;

    async fn replace_one(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: ReplaceOptions,
    ) -> Result<UpdateResult, Self::Error>;

    async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
        options: DeleteOptions,
    ) -> Result<DeleteResult, Self::Error>;

    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
        options: DeleteOptions,
    ) -> Result<DeleteResult, Self::Error>;

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: WireUpdate,
        options: FindOneAndModifyOptions,
    ) -> Result<Option<Document>, Self::Error>;

    async fn find_one_and_replace(
        &self,
        collection: &str,
        filter: Document,
        replacement: Document,
        options: FindOneAndModifyOptions,
    ) -> Result<Option<Document>, Self::Error>;

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: FindOneAndModifyOptions,
    ) -> Result<Option<Document>, Self::Error>;
}
