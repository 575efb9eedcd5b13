use crate::common::Value;

/// The outcome of `insert_one`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    /// The `_id` of the inserted document.
    pub inserted_id: Value,
}

/// The outcome of `insert_many`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertManyResult {
    /// The `_id` of every inserted document, in input order.
    pub inserted_ids: Vec<Value>,
}

/// The outcome of `update_one`, `update_many` and `replace_one`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
    /// Set when an upsert inserted a new document.
    pub upserted_id: Option<Value>,
}

/// The outcome of `delete_one` and `delete_many`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}
