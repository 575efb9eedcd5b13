use crate::expression::Expr;
use crate::pipeline::{self, Stage};
use std::fmt::Debug;

/// A stage allowed in an update pipeline.
///
/// Update pipelines accept only `$set`/`$addFields`, `$unset`, `$project`,
/// `$replaceRoot` and `$replaceWith`, so these are the only constructors. The fields
/// they touch are not checked against any schema: an update pipeline may add or
/// remove arbitrary fields, exactly as the server allows.
#[derive(Clone)]
pub struct UpdateStage {
    stage: Stage,
}

impl UpdateStage {
    pub fn set(spec: impl Into<Expr>) -> Self {
        UpdateStage {
            stage: pipeline::set(spec),
        }
    }

    pub fn add_fields(spec: impl Into<Expr>) -> Self {
        UpdateStage {
            stage: pipeline::add_fields(spec),
        }
    }

    pub fn unset<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UpdateStage {
            stage: pipeline::unset(fields),
        }
    }

    pub fn project(spec: impl Into<Expr>) -> Self {
        UpdateStage {
            stage: pipeline::project(spec),
        }
    }

    pub fn replace_root(new_root: impl Into<Expr>) -> Self {
        UpdateStage {
            stage: pipeline::replace_root(new_root),
        }
    }

    pub fn replace_with(replacement: impl Into<Expr>) -> Self {
        UpdateStage {
            stage: pipeline::replace_with(replacement),
        }
    }

    /// The underlying pipeline stage.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }
}

impl Debug for UpdateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UpdateStage({})", self.stage.name())
    }
}

impl From<UpdateStage> for Stage {
    fn from(value: UpdateStage) -> Self {
        value.stage
    }
}
