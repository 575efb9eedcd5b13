use crate::common::{Document, Value};
use crate::expression::{resolve, resolve_plain_document, Expr};
use crate::pipeline::pipeline;
use crate::update::{Update, UpdateStage};
use serde::{Serialize, Serializer};

/// What an update operation applies to the matched documents.
#[derive(Clone, Debug)]
pub enum UpdateSpec {
    /// A keyword map, `{ $set: {...}, $inc: {...} }`, usually built with [`Update`].
    Traditional(Expr),
    /// An aggregation pipeline restricted to [`UpdateStage`]s.
    Pipeline(Vec<UpdateStage>),
}

impl UpdateSpec {
    pub fn traditional(update: impl Into<Expr>) -> Self {
        UpdateSpec::Traditional(update.into())
    }

    pub fn pipeline<I>(stages: I) -> Self
    where
        I: IntoIterator<Item = UpdateStage>,
    {
        UpdateSpec::Pipeline(stages.into_iter().collect())
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self, UpdateSpec::Pipeline(_))
    }
}

impl From<Update> for UpdateSpec {
    fn from(value: Update) -> Self {
        UpdateSpec::Traditional(value.into())
    }
}

impl From<Expr> for UpdateSpec {
    fn from(value: Expr) -> Self {
        UpdateSpec::Traditional(value)
    }
}

impl From<Document> for UpdateSpec {
    fn from(value: Document) -> Self {
        UpdateSpec::Traditional(value.into())
    }
}

impl From<Vec<UpdateStage>> for UpdateSpec {
    fn from(value: Vec<UpdateStage>) -> Self {
        UpdateSpec::Pipeline(value)
    }
}

impl<const N: usize> From<[UpdateStage; N]> for UpdateSpec {
    fn from(value: [UpdateStage; N]) -> Self {
        UpdateSpec::Pipeline(value.into_iter().collect())
    }
}

/// Conditions selecting the array elements that `$[identifier]` path segments update.
///
/// ```rust
/// use quarry::doc;
/// use quarry::filter::field;
/// use quarry::update::ArrayFilters;
///
/// let filters = ArrayFilters::new().identifier("elem", field("grade").gte(85));
/// assert_eq!(filters.resolve(), vec![doc! { "elem.grade": { "$gte": 85 } }]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ArrayFilters {
    filters: Vec<ArrayFilter>,
}

#[derive(Clone, Debug)]
enum ArrayFilter {
    Raw(Expr),
    Identifier(String, Expr),
}

impl ArrayFilters {
    pub fn new() -> Self {
        ArrayFilters {
            filters: Vec::new(),
        }
    }

    /// Adds a filter document written with its identifier prefixes:
    /// `record! { "elem.grade": { "$gte": 85 } }`.
    pub fn filter(mut self, filter: impl Into<Expr>) -> Self {
        self.filters.push(ArrayFilter::Raw(filter.into()));
        self
    }

    /// Adds a filter written relative to the element; its top-level field names are
    /// prefixed with `identifier` when resolved. A filter on the element itself
    /// (`{ $gte: 85 }`) becomes `{ identifier: { $gte: 85 } }`.
    pub fn identifier(mut self, identifier: &str, filter: impl Into<Expr>) -> Self {
        self.filters
            .push(ArrayFilter::Identifier(identifier.to_string(), filter.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Resolves every filter, in order.
    pub fn resolve(&self) -> Vec<Document> {
        self.filters.iter().map(ArrayFilter::resolve).collect()
    }
}

impl ArrayFilter {
    fn resolve(&self) -> Document {
        match self {
            ArrayFilter::Raw(filter) => resolve_plain_document(filter, "array filter"),
            ArrayFilter::Identifier(identifier, filter) => {
                prefix_condition(identifier, resolve_plain_document(filter, "array filter"))
            }
        }
    }
}

const LOGICAL_OPERATORS: [&str; 3] = ["$and", "$or", "$nor"];

fn prefix_condition(identifier: &str, condition: Document) -> Document {
    let on_element = !condition.is_empty()
        && condition
            .keys()
            .all(|key| key.starts_with('$') && !LOGICAL_OPERATORS.contains(&key.as_str()));
    if on_element {
        return Document::single(identifier, condition);
    }

    condition
        .into_iter()
        .map(|(key, value)| {
            if LOGICAL_OPERATORS.contains(&key.as_str()) {
                let clauses = match value {
                    Value::Array(clauses) => Value::Array(
                        clauses
                            .into_iter()
                            .map(|clause| match clause {
                                Value::Document(doc) => Value::Document(prefix_condition(identifier, doc)),
                                other => other,
                            })
                            .collect(),
                    ),
                    other => other,
                };
                (key, clauses)
            } else if key.starts_with('$') {
                (key, value)
            } else {
                (format!("{}.{}", identifier, key), value)
            }
        })
        .collect()
}

/// The wire form of an update.
#[derive(Clone, Debug, PartialEq)]
pub enum WireUpdate {
    Document(Document),
    Pipeline(Vec<Document>),
}

impl WireUpdate {
    pub fn is_pipeline(&self) -> bool {
        matches!(self, WireUpdate::Pipeline(_))
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            WireUpdate::Document(doc) => Some(doc),
            WireUpdate::Pipeline(_) => None,
        }
    }

    pub fn as_pipeline(&self) -> Option<&[Document]> {
        match self {
            WireUpdate::Pipeline(stages) => Some(stages),
            WireUpdate::Document(_) => None,
        }
    }
}

impl From<WireUpdate> for Value {
    fn from(value: WireUpdate) -> Self {
        match value {
            WireUpdate::Document(doc) => Value::Document(doc),
            WireUpdate::Pipeline(stages) => Value::Array(stages.into_iter().map(Value::Document).collect()),
        }
    }
}

impl Serialize for WireUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WireUpdate::Document(doc) => doc.serialize(serializer),
            WireUpdate::Pipeline(stages) => serializer.collect_seq(stages.iter()),
        }
    }
}

/// A translated update: the wire update plus the array filters to send with it.
#[derive(Clone, Debug, PartialEq)]
pub struct TranslatedUpdate {
    pub update: WireUpdate,
    pub array_filters: Option<Vec<Document>>,
}

/// Translates an update specification into its wire form.
///
/// Traditional updates resolve to a document. An expression resolving to an array of
/// documents is taken as a raw update pipeline. Pipeline updates are reduced through
/// their stages from an empty pipeline.
///
/// Array filters are forwarded verbatim for traditional updates. Pipeline updates
/// cannot use them: they are dropped with a warning.
pub fn translate(spec: &UpdateSpec, array_filters: Option<&ArrayFilters>) -> TranslatedUpdate {
    let update = match spec {
        UpdateSpec::Traditional(update) => traditional(update),
        UpdateSpec::Pipeline(stages) => {
            WireUpdate::Pipeline(pipeline(stages.iter().map(UpdateStage::stage)).into_stages())
        }
    };
    let array_filters = array_filters.and_then(|filters| forward_array_filters(&update, filters));
    TranslatedUpdate {
        update,
        array_filters,
    }
}

/// Resolves `filters` for sending with `update`, or drops them with a warning when
/// `update` is a pipeline.
pub fn forward_array_filters(update: &WireUpdate, filters: &ArrayFilters) -> Option<Vec<Document>> {
    if update.is_pipeline() {
        log::warn!(
            "Dropping {} array filter(s): pipeline updates do not support them",
            filters.len()
        );
        return None;
    }
    Some(filters.resolve())
}

fn traditional(update: &Expr) -> WireUpdate {
    match resolve(update) {
        Value::Document(doc) => WireUpdate::Document(doc),
        Value::Null => WireUpdate::Document(Document::new()),
        Value::Array(items) => WireUpdate::Pipeline(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Document(doc) => Some(doc),
                    other => {
                        log::warn!("Ignoring non-document update pipeline stage {}", other);
                        None
                    }
                })
                .collect(),
        ),
        other => {
            log::warn!("Ignoring non-document update {}", other);
            WireUpdate::Document(Document::new())
        }
    }
}
