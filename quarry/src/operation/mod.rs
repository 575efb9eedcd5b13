//! Deferred CRUD operations.
//!
//! A descriptor captures everything one driver call needs: the client, the
//! collection name, and the resolved filter, update and options. Inputs are resolved
//! when the descriptor is built (the filter) or when a setter is called (options),
//! never again. Nothing reaches the driver until a trigger (`execute`, `to_list`,
//! `to_one`) is awaited, and each trigger call makes exactly one driver call.
//!
//! Driver errors are returned unchanged.

use crate::common::{Document, Value};
use crate::config::QuarryConfig;
use crate::expression::Expr;
use std::fmt::Display;
use std::sync::Arc;

// Option setters shared by the descriptors. Each descriptor stores its driver options
// in `self.options`; the setters resolve their input immediately.
macro_rules! option_setters {
    ($($option:ident),* $(,)?) => {
        $( option_setters!(@setter $option); )*
    };

    (@setter sort) => {
        /// Sort specification: a record or [`crate::common::SortFields`].
        pub fn sort(mut self, sort: impl Into<$crate::expression::Expr>) -> Self {
            self.options.sort = Some($crate::expression::resolve_plain_document(&sort.into(), "sort"));
            self
        }
    };

    (@setter projection) => {
        /// Projection of the returned documents.
        pub fn projection(mut self, projection: impl Into<$crate::expression::Expr>) -> Self {
            self.options.projection =
                Some($crate::expression::resolve_plain_document(&projection.into(), "projection"));
            self
        }
    };

    (@setter collation) => {
        /// Collation document (`{ locale: "fr", strength: 1 }`).
        pub fn collation(mut self, collation: impl Into<$crate::expression::Expr>) -> Self {
            self.options.collation =
                Some($crate::expression::resolve_plain_document(&collation.into(), "collation"));
            self
        }
    };

    (@setter hint) => {
        /// Index to use, by name or by key pattern.
        pub fn hint(mut self, hint: impl Into<$crate::expression::Expr>) -> Self {
            self.options.hint = Some($crate::expression::resolve(&hint.into()));
            self
        }
    };

    (@setter comment) => {
        /// Comment attached to the command. Overrides the configured default.
        pub fn comment(mut self, comment: impl Into<$crate::expression::Expr>) -> Self {
            self.options.comment = Some($crate::expression::resolve(&comment.into()));
            self
        }
    };

    (@setter skip) => {
        pub fn skip(mut self, skip: u64) -> Self {
            self.options.skip = Some(skip);
            self
        }
    };

    (@setter limit) => {
        pub fn limit(mut self, limit: u64) -> Self {
            self.options.limit = Some(limit);
            self
        }
    };

    (@setter max_time_ms) => {
        /// Server-side time limit in milliseconds. Overrides the configured default.
        pub fn max_time_ms(mut self, max_time_ms: u64) -> Self {
            self.options.max_time_ms = Some(max_time_ms);
            self
        }
    };

    (@setter batch_size) => {
        pub fn batch_size(mut self, batch_size: u32) -> Self {
            self.options.batch_size = Some(batch_size);
            self
        }
    };

    (@setter allow_disk_use) => {
        /// Overrides the configured default.
        pub fn allow_disk_use(mut self, allow_disk_use: bool) -> Self {
            self.options.allow_disk_use = Some(allow_disk_use);
            self
        }
    };

    (@setter upsert) => {
        /// Inserts a document when nothing matches the filter.
        pub fn upsert(mut self, upsert: bool) -> Self {
            self.options.upsert = Some(upsert);
            self
        }
    };

    (@setter return_document) => {
        pub fn return_document(mut self, return_document: $crate::driver::ReturnDocument) -> Self {
            self.options.return_document = Some(return_document);
            self
        }
    };

    (@setter array_filters) => {
        /// Filters for `$[identifier]` path segments.
        ///
        /// Dropped with a warning when the update is a pipeline.
        pub fn array_filters(mut self, filters: &$crate::update::ArrayFilters) -> Self {
            self.options.array_filters = $crate::update::forward_array_filters(&self.update, filters);
            self
        }
    };

    (@setter ordered) => {
        /// Whether an insert stops at the first error.
        pub fn ordered(mut self, ordered: bool) -> Self {
            self.options.ordered = Some(ordered);
            self
        }
    };

    (@setter bypass_document_validation) => {
        pub fn bypass_document_validation(mut self, bypass: bool) -> Self {
            self.options.bypass_document_validation = Some(bypass);
            self
        }
    };
}

mod modify;
mod read;
mod write;

pub use modify::*;
pub use read::*;
pub use write::*;

/// Where a descriptor sends its command: the client, the collection and the defaults
/// of the bindings it came from.
pub(crate) struct Target<D> {
    pub(crate) client: Arc<D>,
    pub(crate) collection: String,
    pub(crate) config: QuarryConfig,
}

impl<D> Target<D> {
    pub(crate) fn new(client: Arc<D>, collection: impl Into<String>, config: QuarryConfig) -> Self {
        Target {
            client,
            collection: collection.into(),
            config,
        }
    }

    pub(crate) fn comment(&self) -> Option<Value> {
        self.config.comment().map(Value::from)
    }

    pub(crate) fn log(&self, command: &str, payload: impl Display) {
        if self.config.log_commands() {
            log::info!("{} on {}: {}", command, self.collection, payload);
        } else {
            log::debug!("{} on {}: {}", command, self.collection, payload);
        }
    }
}

impl<D> Clone for Target<D> {
    fn clone(&self) -> Self {
        Target {
            client: self.client.clone(),
            collection: self.collection.clone(),
            config: self.config.clone(),
        }
    }
}

pub(crate) fn resolve_documents<I, E>(documents: I) -> Vec<Document>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    documents
        .into_iter()
        .map(|document| crate::expression::resolve_plain_document(&document.into(), "document"))
        .collect()
}
