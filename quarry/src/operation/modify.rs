use super::Target;
use crate::common::Document;
use crate::driver::{Driver, FindOneAndModifyOptions};
use crate::expression::{resolve_document, resolve_plain_document, Expr};
use crate::update::{translate, UpdateSpec, WireUpdate};

fn modify_options<D>(target: &Target<D>) -> FindOneAndModifyOptions {
    FindOneAndModifyOptions {
        comment: target.comment(),
        max_time_ms: target.config.max_time_ms(),
        ..FindOneAndModifyOptions::default()
    }
}

/// A deferred `find_one_and_update`.
pub struct FindOneAndUpdateOperation<D> {
    target: Target<D>,
    filter: Document,
    update: WireUpdate,
    options: FindOneAndModifyOptions,
}

impl<D: Driver> FindOneAndUpdateOperation<D> {
    pub(crate) fn new(target: Target<D>, filter: impl Into<Expr>, update: impl Into<UpdateSpec>) -> Self {
        let filter = resolve_document(&filter.into());
        let update = translate(&update.into(), None).update;
        let options = modify_options(&target);
        FindOneAndUpdateOperation {
            target,
            filter,
            update,
            options,
        }
    }

    option_setters!(
        sort,
        projection,
        upsert,
        return_document,
        array_filters,
        hint,
        collation,
        comment,
        max_time_ms
    );

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn update(&self) -> &WireUpdate {
        &self.update
    }

    pub fn options(&self) -> &FindOneAndModifyOptions {
        &self.options
    }

    /// Returns the matched document, before or after the update depending on
    /// `return_document`.
    pub async fn execute(&self) -> Result<Option<Document>, D::Error> {
        self.target.log("find_one_and_update", &self.filter);
        self.target
            .client
            .find_one_and_update(
                &self.target.collection,
                self.filter.clone(),
                self.update.clone(),
                self.options.clone(),
            )
            .await
    }
}

/// A deferred `find_one_and_replace`.
pub struct FindOneAndReplaceOperation<D> {
    target: Target<D>,
    filter: Document,
    replacement: Document,
    options: FindOneAndModifyOptions,
}

impl<D: Driver> FindOneAndReplaceOperation<D> {
    pub(crate) fn new(target: Target<D>, filter: impl Into<Expr>, replacement: impl Into<Expr>) -> Self {
        let filter = resolve_document(&filter.into());
        let replacement = resolve_plain_document(&replacement.into(), "replacement");
        let options = modify_options(&target);
        FindOneAndReplaceOperation {
            target,
            filter,
            replacement,
            options,
        }
    }

    option_setters!(sort, projection, upsert, return_document, hint, collation, comment, max_time_ms);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn replacement(&self) -> &Document {
        &self.replacement
    }

    pub fn options(&self) -> &FindOneAndModifyOptions {
        &self.options
    }

    pub async fn execute(&self) -> Result<Option<Document>, D::Error> {
        self.target.log("find_one_and_replace", &self.filter);
        self.target
            .client
            .find_one_and_replace(
                &self.target.collection,
                self.filter.clone(),
                self.replacement.clone(),
                self.options.clone(),
            )
            .await
    }
}

/// A deferred `find_one_and_delete`.
pub struct FindOneAndDeleteOperation<D> {
    target: Target<D>,
    filter: Document,
    options: FindOneAndModifyOptions,
}

impl<D: Driver> FindOneAndDeleteOperation<D> {
    pub(crate) fn new(target: Target<D>, filter: impl Into<Expr>) -> Self {
        let filter = resolve_document(&filter.into());
        let options = modify_options(&target);
        FindOneAndDeleteOperation {
            target,
            filter,
            options,
        }
    }

    option_setters!(sort, projection, hint, collation, comment, max_time_ms);

    pub fn collection(&self) -> &str {
        &self.target.collection
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn options(&self) -> &FindOneAndModifyOptions {
        &self.options
    }

    /// Returns the deleted document, if one matched.
    pub async fn execute(&self) -> Result<Option<Document>, D::Error> {
        self.target.log("find_one_and_delete", &self.filter);
        self.target
            .client
            .find_one_and_delete(&self.target.collection, self.filter.clone(), self.options.clone())
            .await
    }
}
