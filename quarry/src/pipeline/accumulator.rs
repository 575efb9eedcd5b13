use crate::common::{Document, Value};
use crate::errors::QuarryResult;
use crate::expression::Expr;
use crate::pipeline::Stage;
use im::Vector;
use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt::{Debug, Display};

/// An ordered, immutable list of stage documents.
///
/// This struct uses `im::Vector` (a persistent vector) so that every composition step
/// returns a new pipeline sharing structure with its input. The input is never
/// modified, which makes a partial pipeline safe to reuse as the base of several
/// downstream pipelines:
///
/// ```rust
/// use quarry::pipeline::{limit, match_, sort, Pipeline};
/// use quarry::record;
///
/// let base = Pipeline::new().pipe(&match_(record! { status: "A" }));
/// let newest = base.pipe(&sort(record! { at: (-1) })).pipe(&limit(10));
/// let oldest = base.pipe(&sort(record! { at: 1 })).pipe(&limit(10));
///
/// assert_eq!(base.len(), 1);
/// assert_eq!(newest.len(), 3);
/// assert_ne!(newest, oldest);
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vector<Document>,
    collection: Option<String>,
}

impl Pipeline {
    /// Creates an empty pipeline, the starting point of every reduction.
    pub fn new() -> Self {
        Pipeline {
            stages: Vector::new(),
            collection: None,
        }
    }

    /// Creates an empty pipeline that remembers the collection it will run against.
    pub fn for_collection(name: impl Into<String>) -> Self {
        Pipeline {
            stages: Vector::new(),
            collection: Some(name.into()),
        }
    }

    /// The target collection, if one was recorded.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Applies `stage` and returns the extended pipeline.
    pub fn pipe(&self, stage: &Stage) -> Pipeline {
        stage.apply(self)
    }

    /// Applies `stages` left to right.
    pub fn pipe_all<I, S>(&self, stages: I) -> Pipeline
    where
        I: IntoIterator<Item = S>,
        S: Borrow<Stage>,
    {
        stages
            .into_iter()
            .fold(self.clone(), |pipeline, stage| stage.borrow().apply(&pipeline))
    }

    /// Returns a copy with `document` appended. The receiver is unchanged.
    pub fn push(&self, document: Document) -> Pipeline {
        let mut stages = self.stages.clone();
        stages.push_back(document);
        Pipeline {
            stages,
            collection: self.collection.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Iterates over the stage documents in order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.stages.iter()
    }

    /// The stage documents, in order.
    pub fn stages(&self) -> Vec<Document> {
        self.stages.iter().cloned().collect()
    }

    /// Consumes the pipeline, returning its stage documents.
    pub fn into_stages(self) -> Vec<Document> {
        self.stages.into_iter().collect()
    }

    /// The stage list as compact relaxed extended JSON.
    pub fn to_json(&self) -> QuarryResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The stage list as indented relaxed extended JSON.
    pub fn to_json_pretty(&self) -> QuarryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// Sub-pipelines are embedded as the bare stage array.
impl From<Pipeline> for Expr {
    fn from(value: Pipeline) -> Self {
        Expr::Value(Value::from(value))
    }
}

impl From<&Pipeline> for Expr {
    fn from(value: &Pipeline) -> Self {
        Expr::Value(Value::from(value.clone()))
    }
}

impl From<Pipeline> for Value {
    fn from(value: Pipeline) -> Self {
        Value::Array(value.stages.into_iter().map(Value::Document).collect())
    }
}

impl Serialize for Pipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.stages.iter())
    }
}

impl Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Pipeline");
        if let Some(collection) = &self.collection {
            debug.field("collection", collection);
        }
        debug.field("stages", &self.stages).finish()
    }
}

impl Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}
