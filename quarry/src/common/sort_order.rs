use crate::common::{Document, Value};

/// Specifies the direction for sorting documents.
///
/// # Variants
/// - `Ascending`: smallest to largest, rendered as `1` on the wire
/// - `Descending`: largest to smallest, rendered as `-1` on the wire
///
/// # Usage
/// ```text
/// let spec = SortFields::new()
///     .by("age", SortOrder::Descending)
///     .by("name", SortOrder::Ascending);
/// let stage = sort(spec);   // { "$sort": { "age": -1, "name": 1 } }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z, oldest to newest)
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A, newest to oldest)
    Descending,
}

impl SortOrder {
    /// The wire representation, `1` or `-1`.
    pub fn direction(&self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

impl From<SortOrder> for Value {
    fn from(value: SortOrder) -> Self {
        Value::I32(value.direction())
    }
}

/// An ordered sort specification.
///
/// Used by the `$sort` stage, the `sort` option of find operations, the `$sort`
/// modifier of `$push` and `$sortArray`. Field order is significant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortFields {
    sorting_order: Vec<(String, Value)>,
}

impl SortFields {
    pub fn new() -> SortFields {
        SortFields {
            sorting_order: Vec::new(),
        }
    }

    /// Appends a field with a direction.
    pub fn by(mut self, field_name: impl Into<String>, sort_order: SortOrder) -> SortFields {
        self.sorting_order
            .push((field_name.into(), Value::from(sort_order)));
        self
    }

    /// Appends a field sorted by text-search relevance (`{ $meta: "textScore" }`).
    pub fn by_text_score(mut self, field_name: impl Into<String>) -> SortFields {
        self.sorting_order.push((
            field_name.into(),
            Value::Document(Document::single("$meta", "textScore")),
        ));
        self
    }

    pub fn field_names(&self) -> Vec<String> {
        self.sorting_order.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sorting_order.is_empty()
    }
}

/// Creates a sort specification with a single field.
pub fn order_by(field_name: impl Into<String>, sort_order: SortOrder) -> SortFields {
    SortFields::new().by(field_name, sort_order)
}

impl From<SortFields> for Document {
    fn from(value: SortFields) -> Self {
        value.sorting_order.into_iter().collect()
    }
}

impl From<SortFields> for Value {
    fn from(value: SortFields) -> Self {
        Value::Document(value.into())
    }
}
