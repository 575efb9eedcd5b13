use crate::common::{Document, Value};

/// Which version of the document `find_one_and_update` / `find_one_and_replace`
/// return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnDocument {
    /// The document as it was before the modification.
    #[default]
    Before,
    /// The document after the modification.
    After,
}

/// Options of `find` and `find_one`.
///
/// Every field is already resolved; `None` leaves the server default in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub projection: Option<Document>,
    pub hint: Option<Value>,
    pub collation: Option<Document>,
    pub comment: Option<Value>,
    pub max_time_ms: Option<u64>,
    pub batch_size: Option<u32>,
    pub allow_disk_use: Option<bool>,
}

/// Options of `count_documents`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountOptions {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub hint: Option<Value>,
    pub collation: Option<Document>,
    pub comment: Option<Value>,
    pub max_time_ms: Option<u64>,
}

/// Options of `distinct`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistinctOptions {
    pub collation: Option<Document>,
    pub comment: Option<Value>,
    pub max_time_ms: Option<u64>,
}

/// Options of `aggregate`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOptions {
    pub allow_disk_use: Option<bool>,
    pub batch_size: Option<u32>,
    pub hint: Option<Value>,
    pub collation: Option<Document>,
    pub comment: Option<Value>,
    pub max_time_ms: Option<u64>,
    /// Variables available to the whole pipeline as `$$name` (the `let` option).
    pub variables: Option<Document>,
}

/// Options of `insert_one` and `insert_many`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOptions {
    pub ordered: Option<bool>,
    pub bypass_document_validation: Option<bool>,
    pub comment: Option<Value>,
}

/// Options of `update_one` and `update_many`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    pub upsert: Option<bool>,
    pub array_filters: Option<Vec<Document>>,
    pub hint: Option<Value>,
    pub collation: Option<Document>,
    pub comment: Option<Value>,
}

/// Options of `replace_one`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaceOptions {
    pub upsert: Option<bool>,
    pub hint: Option<Value>,
    pub collation: Option<Document>,
    pub comment: Option<Value>,
}

/// Options of `delete_one` and `delete_many`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOptions {
    pub hint: Option<Value>,
    pub collation: Option<Document>,
    pub comment: Option<Value>,
}

/// Options of `find_one_and_update`, `find_one_and_replace` and
/// `find_one_and_delete`.
///
/// `upsert`, `return_document` and `array_filters` do not apply to
/// `find_one_and_delete`; drivers ignore them there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOneAndModifyOptions {
    pub sort: Option<Document>,
    pub projection: Option<Document>,
    pub upsert: Option<bool>,
    pub return_document: Option<ReturnDocument>,
    pub array_filters: Option<Vec<Document>>,
    pub hint: Option<Value>,
    pub collation: Option<Document>,
    pub comment: Option<Value>,
    pub max_time_ms: Option<u64>,
}
