use crate::expression::Expr;
use indexmap::IndexMap;
use std::fmt::Debug;

/// A keyword-map update document: `{ $set: { ... }, $inc: { ... }, ... }`.
///
/// Each method adds one `path -> value` entry under its update operator, creating the
/// operator entry on first use. Operators appear in the order they were first used;
/// paths keep their insertion order within an operator.
///
/// Paths are opaque: positional placeholders (`items.$`, `items.$[]`,
/// `items.$[elem].qty`) are written as part of the path and passed through unchanged.
///
/// ```rust
/// use quarry::doc;
/// use quarry::common::Value;
/// use quarry::expression::Expr;
/// use quarry::update::Update;
///
/// let update = Update::new().set("status", "shipped").inc("attempts", 1);
/// assert_eq!(
///     Expr::from(update).resolve(),
///     Value::from(doc! { "$set": { status: "shipped" }, "$inc": { attempts: 1 } })
/// );
/// ```
#[derive(Clone, Default)]
pub struct Update {
    operators: IndexMap<String, IndexMap<String, Expr>>,
}

impl Update {
    pub fn new() -> Self {
        Update {
            operators: IndexMap::new(),
        }
    }

    /// Adds `path -> value` under an arbitrary update operator.
    pub fn operator(mut self, keyword: &str, path: &str, value: impl Into<Expr>) -> Self {
        let keyword = if keyword.starts_with('$') {
            keyword.to_string()
        } else {
            format!("${}", keyword)
        };
        self.operators
            .entry(keyword)
            .or_default()
            .insert(path.to_string(), value.into());
        self
    }

    /// `$set`: replaces the value of a field.
    pub fn set(self, path: &str, value: impl Into<Expr>) -> Self {
        self.operator("$set", path, value)
    }

    /// `$unset`: removes a field.
    pub fn unset(self, path: &str) -> Self {
        self.operator("$unset", path, "")
    }

    /// `$inc`: increments a field by `amount`.
    pub fn inc(self, path: &str, amount: impl Into<Expr>) -> Self {
        self.operator("$inc", path, amount)
    }

    /// `$mul`: multiplies a field by `factor`.
    pub fn mul(self, path: &str, factor: impl Into<Expr>) -> Self {
        self.operator("$mul", path, factor)
    }

    /// `$min`: updates the field only if `value` is smaller.
    pub fn min(self, path: &str, value: impl Into<Expr>) -> Self {
        self.operator("$min", path, value)
    }

    /// `$max`: updates the field only if `value` is larger.
    pub fn max(self, path: &str, value: impl Into<Expr>) -> Self {
        self.operator("$max", path, value)
    }

    /// `$rename`: renames a field.
    pub fn rename(self, path: &str, new_name: &str) -> Self {
        self.operator("$rename", path, new_name)
    }

    /// `$currentDate`: sets a field to the current date.
    pub fn current_date(self, path: &str) -> Self {
        self.operator("$currentDate", path, true)
    }

    /// `$currentDate` with an explicit type, `"date"` or `"timestamp"`.
    pub fn current_date_as(self, path: &str, date_type: &str) -> Self {
        self.operator("$currentDate", path, Expr::record().with("$type", date_type))
    }

    /// `$setOnInsert`: sets a field only when an upsert inserts a document.
    pub fn set_on_insert(self, path: &str, value: impl Into<Expr>) -> Self {
        self.operator("$setOnInsert", path, value)
    }

    /// `$push`: appends a value, or several values with a [`Modifier`].
    pub fn push(self, path: &str, value: impl Into<Expr>) -> Self {
        self.operator("$push", path, value)
    }

    /// `$addToSet`: appends values not already present.
    pub fn add_to_set(self, path: &str, value: impl Into<Expr>) -> Self {
        self.operator("$addToSet", path, value)
    }

    /// `$pull`: removes elements equal to `condition` or matching it.
    pub fn pull(self, path: &str, condition: impl Into<Expr>) -> Self {
        self.operator("$pull", path, condition)
    }

    /// `$pullAll`: removes every listed value.
    pub fn pull_all<T: Into<Expr>>(self, path: &str, values: Vec<T>) -> Self {
        self.operator("$pullAll", path, values)
    }

    /// `$pop` with `-1`: removes the first element.
    pub fn pop_first(self, path: &str) -> Self {
        self.operator("$pop", path, -1)
    }

    /// `$pop` with `1`: removes the last element.
    pub fn pop_last(self, path: &str) -> Self {
        self.operator("$pop", path, 1)
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl Debug for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.operators.iter()).finish()
    }
}

impl From<Update> for Expr {
    fn from(value: Update) -> Self {
        value
            .operators
            .into_iter()
            .map(|(keyword, fields)| (keyword, Expr::Record(fields)))
            .collect()
    }
}

/// The `$each` form of `$push` and `$addToSet`, with its optional modifiers.
///
/// ```rust,ignore
/// let update = Update::new().push(
///     "scores",
///     Modifier::each([89, 92]).sort(SortOrder::Descending).slice(3),
/// );
/// // { $push: { scores: { $each: [89, 92], $sort: -1, $slice: 3 } } }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Modifier {
    each: Vec<Expr>,
    position: Option<i64>,
    sort: Option<Expr>,
    slice: Option<i64>,
}

impl Modifier {
    /// Values to add.
    pub fn each<I, E>(values: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Modifier {
            each: values.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// `$position`: insertion index; negative values count from the end.
    pub fn position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    /// `$sort`: a direction for scalar arrays or a sort document for embedded
    /// documents.
    pub fn sort(mut self, sort: impl Into<Expr>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// `$slice`: keeps the first `n` (or, when negative, the last `n`) elements.
    pub fn slice(mut self, slice: i64) -> Self {
        self.slice = Some(slice);
        self
    }
}

impl From<Modifier> for Expr {
    fn from(value: Modifier) -> Self {
        Expr::record()
            .with("$each", value.each)
            .with_opt("$position", value.position)
            .with_opt("$sort", value.sort)
            .with_opt("$slice", value.slice)
    }
}
