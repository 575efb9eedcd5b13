use crate::common::Value;
use crate::expression::Expr;
use std::fmt::{Debug, Display};

/// A query predicate document.
///
/// `Filter` wraps the query-language form of a predicate (`{ age: { $gt: 30 } }`),
/// not an aggregation expression. Filters are accepted wherever a filter [`Expr`] is:
/// the `match_` stage, `find`, `update_one`, array filters, and so on.
///
/// # Filter Composition
///
/// Filters can be composed using logical operators:
/// - `and(other)` - combines with another filter using `$and`
/// - `or(other)` - combines with another filter using `$or`
/// - `not()` - negates the filter
///
/// Values inside a filter may be any [`Expr`], including callbacks; they are resolved
/// with the rest of the command.
#[derive(Clone)]
pub struct Filter {
    inner: Expr,
}

impl Filter {
    /// Creates a filter from a raw query document expression.
    ///
    /// # Arguments
    ///
    /// * `inner` - The query document, e.g. `record! { status: "A" }`
    ///
    /// # Returns
    ///
    /// A new `Filter` wrapping the document
    pub fn new(inner: impl Into<Expr>) -> Self {
        Filter { inner: inner.into() }
    }

    /// Combines this filter with another using logical AND.
    ///
    /// When `self` is already an `$and`, `filter` is appended to it instead of
    /// nesting another level.
    ///
    /// # Arguments
    ///
    /// * `filter` - The other filter to combine
    ///
    /// # Returns
    ///
    /// A new `Filter` representing `self AND filter`
    pub fn and(&self, filter: Filter) -> Self {
        self.combine("$and", filter)
    }

    /// Combines this filter with another using logical OR.
    ///
    /// # Arguments
    ///
    /// * `filter` - The other filter to combine
    ///
    /// # Returns
    ///
    /// A new `Filter` representing `self OR filter`
    pub fn or(&self, filter: Filter) -> Self {
        self.combine("$or", filter)
    }

    /// Negates this filter.
    ///
    /// A single-field operator predicate is negated in place with `$not`
    /// (`{ age: { $not: { $gt: 30 } } }`); anything else becomes `{ $nor: [self] }`.
    ///
    /// # Returns
    ///
    /// A new `Filter` representing `NOT self`
    pub fn not(&self) -> Self {
        if let Some(fields) = self.inner.as_record() {
            if fields.len() == 1 {
                if let Some((name, condition)) = fields.first() {
                    if !name.starts_with('$') && is_operator_record(condition) {
                        return Filter::new(
                            Expr::record().with(name.clone(), Expr::record().with("$not", condition.clone())),
                        );
                    }
                }
            }
        }
        nor(vec![self.clone()])
    }

    /// Returns the wrapped query document expression.
    pub fn expr(&self) -> &Expr {
        &self.inner
    }

    /// Resolves the filter into its wire value.
    pub fn resolve(&self) -> Value {
        self.inner.resolve()
    }

    fn combine(&self, keyword: &str, filter: Filter) -> Self {
        if let Some(Expr::Array(existing)) = self.single_entry(keyword) {
            let mut filters = existing.clone();
            filters.push(filter.inner);
            return Filter::new(Expr::record().with(keyword, Expr::Array(filters)));
        }
        Filter::new(Expr::record().with(keyword, vec![self.inner.clone(), filter.inner]))
    }

    fn single_entry(&self, keyword: &str) -> Option<&Expr> {
        let fields = self.inner.as_record()?;
        if fields.len() == 1 {
            fields.get(keyword)
        } else {
            None
        }
    }
}

fn is_operator_record(expr: &Expr) -> bool {
    expr.as_record()
        .map(|fields| !fields.is_empty() && fields.keys().all(|key| key.starts_with('$')))
        .unwrap_or(false)
}

impl Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter({:?})", self.inner)
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

impl From<Filter> for Expr {
    fn from(value: Filter) -> Self {
        value.inner
    }
}

impl From<&Filter> for Expr {
    fn from(value: &Filter) -> Self {
        value.inner.clone()
    }
}

/// Creates a filter that matches all documents: `{}`.
pub fn all() -> Filter {
    Filter::new(Expr::record())
}

/// Creates a filter that matches a document by its `_id`.
///
/// # Arguments
///
/// * `id` - The identifier to match, usually an [`crate::common::ObjectId`]
///
/// # Returns
///
/// A `Filter` of the form `{ _id: id }`
pub fn by_id(id: impl Into<Expr>) -> Filter {
    Filter::new(Expr::record().with(crate::DOC_ID, id))
}

/// Combines multiple filters using logical AND.
///
/// # Arguments
///
/// * `filters` - A vector of filters to combine
///
/// # Returns
///
/// A `Filter` of the form `{ $and: [...] }`
pub fn and(filters: Vec<Filter>) -> Filter {
    logical("$and", filters)
}

/// Combines multiple filters using logical OR.
///
/// # Arguments
///
/// * `filters` - A vector of filters to combine
///
/// # Returns
///
/// A `Filter` of the form `{ $or: [...] }`
pub fn or(filters: Vec<Filter>) -> Filter {
    logical("$or", filters)
}

/// Matches documents that fail every one of `filters`.
pub fn nor(filters: Vec<Filter>) -> Filter {
    logical("$nor", filters)
}

/// Negates a filter. See [`Filter::not`].
pub fn not(filter: Filter) -> Filter {
    filter.not()
}

/// Embeds an aggregation expression in a query: `{ $expr: expr }`.
///
/// ```rust,ignore
/// use quarry::filter::expr;
/// use quarry::operator::gt;
///
/// let over_budget = expr(gt("$spent", "$budget"));
/// ```
pub fn expr(expression: impl Into<Expr>) -> Filter {
    Filter::new(Expr::record().with("$expr", expression))
}

/// A text-index search: `{ $text: { $search: search } }`.
pub fn text(search: &str) -> Filter {
    Filter::new(Expr::record().with("$text", Expr::record().with("$search", search)))
}

fn logical(keyword: &str, filters: Vec<Filter>) -> Filter {
    let clauses: Vec<Expr> = filters.into_iter().map(Expr::from).collect();
    Filter::new(Expr::record().with(keyword, clauses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ObjectId;
    use crate::filter::field;
    use crate::operator::gt;
    use crate::{doc, record};

    #[test]
    fn test_all_matches_everything() {
        assert_eq!(all().resolve(), Value::from(doc! {}));
    }

    #[test]
    fn test_by_id() {
        let id = ObjectId::new();
        assert_eq!(by_id(id).resolve(), Value::from(doc! { _id: (id) }));
    }

    #[test]
    fn test_and_or_nor() {
        let a = field("a").eq(1);
        let b = field("b").gt(2);
        assert_eq!(
            and(vec![a.clone(), b.clone()]).resolve(),
            Value::from(doc! { "$and": [{ a: 1 }, { b: { "$gt": 2 } }] })
        );
        assert_eq!(
            or(vec![a.clone(), b.clone()]).resolve(),
            Value::from(doc! { "$or": [{ a: 1 }, { b: { "$gt": 2 } }] })
        );
        assert_eq!(
            nor(vec![a, b]).resolve(),
            Value::from(doc! { "$nor": [{ a: 1 }, { b: { "$gt": 2 } }] })
        );
    }

    #[test]
    fn test_chained_and_flattens() {
        let filter = field("a").eq(1).and(field("b").eq(2)).and(field("c").eq(3));
        assert_eq!(
            filter.resolve(),
            Value::from(doc! { "$and": [{ a: 1 }, { b: 2 }, { c: 3 }] })
        );
    }

    #[test]
    fn test_not_on_field_predicate() {
        let filter = field("age").gt(30).not();
        assert_eq!(
            filter.resolve(),
            Value::from(doc! { age: { "$not": { "$gt": 30 } } })
        );
    }

    #[test]
    fn test_not_on_compound_filter() {
        let filter = not(field("a").eq(1));
        assert_eq!(filter.resolve(), Value::from(doc! { "$nor": [{ a: 1 }] }));
    }

    #[test]
    fn test_expr() {
        let filter = expr(gt("$spent", "$budget"));
        assert_eq!(
            filter.resolve(),
            Value::from(doc! { "$expr": { "$gt": ["$spent", "$budget"] } })
        );
    }

    #[test]
    fn test_text() {
        assert_eq!(
            text("coffee").resolve(),
            Value::from(doc! { "$text": { "$search": "coffee" } })
        );
    }

    #[test]
    fn test_raw_filter_and_display() {
        let filter = Filter::new(record! { status: "A" });
        assert_eq!(filter.to_string(), r#"{"status":"A"}"#);
    }
}
