use super::{resolve_documents, Target};
use crate::common::Document;
use crate::driver::{
    DeleteOptions, DeleteResult, Driver, InsertManyResult, InsertOneResult, InsertOptions, ReplaceOptions,
    UpdateOptions, UpdateResult,
};
use crate::expression::{resolve_document, resolve_plain_document, Expr};
use crate::update::{translate, UpdateSpec, WireUpdate};

/// A deferred `insert_one`.
pub struct InsertOneOperation<D> {
    target: Target<D>,
    document: Document,
    options: InsertOptions,
}

impl<D: Driver> InsertOneOperation<D> {
    pub(crate) fn new(target: Target<D>, document: impl Into<Expr>) -> Self {
        let document = resolve_plain_document(&document.into(), "document");
        let options = InsertOptions {
            comment: target.comment(),
            ..InsertOptions::default()
        };
        InsertOneOperation {
            target,
            document,
            options,
        }
    }

    option_setters!(bypass_document_validation, comment);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn options(&self) -> &InsertOptions {
        &self.options
    }

    pub async fn execute(&self) -> Result<InsertOneResult, D::Error> {
        self.target.log("insert_one", &self.document);
        self.target
            .client
            .insert_one(&self.target.collection, self.document.clone(), self.options.clone())
            .await
    }
}

/// A deferred `insert_many`.
pub struct InsertManyOperation<D> {
    target: Target<D>,
    documents: Vec<Document>,
    options: InsertOptions,
}

impl<D: Driver> InsertManyOperation<D> {
    pub(crate) fn new<I, E>(target: Target<D>, documents: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        let documents = resolve_documents(documents);
        let options = InsertOptions {
            comment: target.comment(),
            ..InsertOptions::default()
        };
        InsertManyOperation {
            target,
            documents,
            options,
        }
    }

    option_setters!(ordered, bypass_document_validation, comment);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn options(&self) -> &InsertOptions {
        &self.options
    }

    pub async fn execute(&self) -> Result<InsertManyResult, D::Error> {
        self.target
            .log("insert_many", format!("{} document(s)", self.documents.len()));
        self.target
            .client
            .insert_many(&self.target.collection, self.documents.clone(), self.options.clone())
            .await
    }
}

/// A deferred `update_one` or `update_many`.
///
/// The update is translated when the descriptor is built. Array filters set on a
/// pipeline update are dropped with a warning.
pub struct UpdateOperation<D> {
    target: Target<D>,
    many: bool,
    filter: Document,
    update: WireUpdate,
    options: UpdateOptions,
}

impl<D: Driver> UpdateOperation<D> {
    pub(crate) fn new(
        target: Target<D>,
        many: bool,
        filter: impl Into<Expr>,
        update: impl Into<UpdateSpec>,
    ) -> Self {
        let filter = resolve_document(&filter.into());
        let update = translate(&update.into(), None).update;
        let options = UpdateOptions {
            comment: target.comment(),
            ..UpdateOptions::default()
        };
        UpdateOperation {
            target,
            many,
            filter,
            update,
            options,
        }
    }

    option_setters!(upsert, array_filters, hint, collation, comment);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    /// Whether this updates every match rather than the first.
    pub fn is_many(&self) -> bool {
        self.many
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn update(&self) -> &WireUpdate {
        &self.update
    }

    pub fn options(&self) -> &UpdateOptions {
        &self.options
    }

    pub async fn execute(&self) -> Result<UpdateResult, D::Error> {
        let client = &self.target.client;
        let collection = &self.target.collection;
        if self.many {
            self.target.log("update_many", &self.filter);
            client
                .update_many(collection, self.filter.clone(), self.update.clone(), self.options.clone())
                .await
        } else {
            self.target.log("update_one", &self.filter);
            client
                .update_one(collection, self.filter.clone(), self.update.clone(), self.options.clone())
                .await
        }
    }
}

/// A deferred `replace_one`.
pub struct ReplaceOneOperation<D> {
    target: Target<D>,
    filter: Document,
    replacement: Document,
    options: ReplaceOptions,
}

impl<D: Driver> ReplaceOneOperation<D> {
    pub(crate) fn new(target: Target<D>, filter: impl Into<Expr>, replacement: impl Into<Expr>) -> Self {
        let filter = resolve_document(&filter.into());
        let replacement = resolve_plain_document(&replacement.into(), "replacement");
        let options = ReplaceOptions {
            comment: target.comment(),
            ..ReplaceOptions::default()
        };
        ReplaceOneOperation {
            target,
            filter,
            replacement,
            options,
        }
    }

    option_setters!(upsert, hint, collation, comment);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn replacement(&self) -> &Document {
        &self.replacement
    }

    pub fn options(&self) -> &ReplaceOptions {
        &self.options
    }

    pub async fn execute(&self) -> Result<UpdateResult, D::Error> {
        self.target.log("replace_one", &self.filter);
        self.target
            .client
            .replace_one(
                &self.target.collection,
                self.filter.clone(),
                self.replacement.clone(),
                self.options.clone(),
            )
            .await
    }
}

/// A deferred `delete_one` or `delete_many`.
pub struct DeleteOperation<D> {
    target: Target<D>,
    many: bool,
    filter: Document,
    options: DeleteOptions,
}

impl<D: Driver> DeleteOperation<D> {
    pub(crate) fn new(target: Target<D>, many: bool, filter: impl Into<Expr>) -> Self {
        let filter = resolve_document(&filter.into());
        let options = DeleteOptions {
            comment: target.comment(),
            ..DeleteOptions::default()
        };
        DeleteOperation {
            target,
            many,
            filter,
            options,
        }
    }

    option_setters!(hint, collation, comment);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn is_many(&self) -> bool {
        self.many
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn options(&self) -> &DeleteOptions {
        &self.options
    }

    pub async fn execute(&self) -> Result<DeleteResult, D::Error> {
        let client = &self.target.client;
        let collection = &self.target.collection;
        if self.many {
            self.target.log("delete_many", &self.filter);
            client
                .delete_many(collection, self.filter.clone(), self.options.clone())
                .await
        } else {
            self.target.log("delete_one", &self.filter);
            client
                .delete_one(collection, self.filter.clone(), self.options.clone())
                .await
        }
    }
}
