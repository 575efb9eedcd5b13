use crate::common::Document;
use crate::expression::{resolve, Expr};
use crate::pipeline::Pipeline;
use itertools::Itertools;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::sync::Arc;

type ApplyFn = dyn Fn(&Pipeline) -> Pipeline + Send + Sync;

/// One pipeline step: a function from a pipeline to the pipeline extended by one
/// stage document.
///
/// Stages hold their options unresolved. Resolution happens each time the stage is
/// applied, so a stage whose options contain callbacks can be reused across
/// pipelines and is rebuilt from scratch every time.
///
/// Stage values are usually obtained from the catalog functions in
/// [`crate::pipeline`] (`match_`, `group`, `lookup`, ...); [`Stage::raw`] covers any
/// keyword the catalog lacks.
#[derive(Clone)]
pub struct Stage {
    name: String,
    apply: Arc<ApplyFn>,
}

impl Stage {
    /// Creates a stage from an arbitrary pipeline transformation.
    ///
    /// `apply` must return a new pipeline; [`Pipeline::push`] already does.
    pub fn new<F>(name: impl Into<String>, apply: F) -> Stage
    where
        F: Fn(&Pipeline) -> Pipeline + Send + Sync + 'static,
    {
        Stage {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    /// A stage `{ keyword: options }` with `options` resolved on application.
    ///
    /// ```rust
    /// use quarry::doc;
    /// use quarry::pipeline::{pipeline, Stage};
    /// use quarry::record;
    ///
    /// let stage = Stage::raw("$indexStats", record! {});
    /// assert_eq!(pipeline([stage]).stages(), vec![doc! { "$indexStats": {} }]);
    /// ```
    pub fn raw(keyword: &str, options: impl Into<Expr>) -> Stage {
        let keyword = stage_keyword(keyword);
        let options = options.into();
        Stage::new(keyword.clone(), move |pipeline| {
            pipeline.push(Document::single(keyword.as_str(), resolve(&options)))
        })
    }

    /// A stage appending an already built stage document verbatim.
    pub fn document(document: Document) -> Stage {
        let name = document
            .first()
            .map(|(key, _)| key.to_string())
            .unwrap_or_default();
        Stage::new(name, move |pipeline| pipeline.push(document.clone()))
    }

    /// The stage keyword, or a description for composed stages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the stage, returning the extended pipeline.
    pub fn apply(&self, pipeline: &Pipeline) -> Pipeline {
        log::debug!(
            "Applying stage {} to a pipeline of {} stage(s)",
            self.name,
            pipeline.len()
        );
        (self.apply)(pipeline)
    }

    /// A stage applying `self`, then `next`.
    pub fn then(&self, next: Stage) -> Stage {
        compose([self.clone(), next])
    }
}

impl Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stage({})", self.name)
    }
}

/// Groups `stages` into a single stage applying them left to right.
///
/// Reduction is associative: `pipeline([a, b, c])`, `pipeline([compose([a, b]), c])`
/// and `pipeline([a, compose([b, c])])` produce the same stage list.
pub fn compose<I, S>(stages: I) -> Stage
where
    I: IntoIterator<Item = S>,
    S: Borrow<Stage>,
{
    let stages: Vec<Stage> = stages.into_iter().map(|stage| stage.borrow().clone()).collect();
    let name = format!("[{}]", stages.iter().map(Stage::name).join(", "));
    Stage::new(name, move |pipeline| pipeline.pipe_all(&stages))
}

/// Reduces an empty pipeline through `stages`.
pub fn pipeline<I, S>(stages: I) -> Pipeline
where
    I: IntoIterator<Item = S>,
    S: Borrow<Stage>,
{
    Pipeline::new().pipe_all(stages)
}

fn stage_keyword(keyword: &str) -> String {
    if keyword.starts_with('$') {
        keyword.to_string()
    } else {
        format!("${}", keyword)
    }
}
