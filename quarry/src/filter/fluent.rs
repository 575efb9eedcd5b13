use super::Filter;
use crate::common::Pattern;
use crate::expression::Expr;

/// Creates a fluent filter builder for the specified field path.
///
/// # Arguments
///
/// * `field_name` - The field to filter on; dotted paths and positional
///   segments are passed through as written
///
/// # Returns
///
/// A `FluentFilter` builder for constructing field-specific filters
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for predicates on a single field.
///
/// Each method returns a [`Filter`] of the form `{ field: condition }`. Arguments are
/// expressions, so they can hold dates, object ids or callbacks as well as plain
/// values.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches documents where the field equals `value`: `{ field: value }`.
    #[inline]
    pub fn eq<T: Into<Expr>>(self, value: T) -> Filter {
        Filter::new(Expr::record().with(self.field_name, value))
    }

    /// Matches documents where the field differs from `value`.
    #[inline]
    pub fn ne<T: Into<Expr>>(self, value: T) -> Filter {
        self.condition("$ne", value)
    }

    /// Matches documents where the field is greater than `value`.
    #[inline]
    pub fn gt<T: Into<Expr>>(self, value: T) -> Filter {
        self.condition("$gt", value)
    }

    #[inline]
    pub fn gte<T: Into<Expr>>(self, value: T) -> Filter {
        self.condition("$gte", value)
    }

    #[inline]
    pub fn lt<T: Into<Expr>>(self, value: T) -> Filter {
        self.condition("$lt", value)
    }

    #[inline]
    pub fn lte<T: Into<Expr>>(self, value: T) -> Filter {
        self.condition("$lte", value)
    }

    /// Matches documents where the field lies between two bounds.
    ///
    /// # Arguments
    ///
    /// * `lower_bound` - The lower boundary of the range
    /// * `upper_bound` - The upper boundary of the range
    /// * `lower_inclusive` - `$gte` if true, `$gt` otherwise
    /// * `upper_inclusive` - `$lte` if true, `$lt` otherwise
    ///
    /// # Returns
    ///
    /// A `Filter` of the form `{ field: { $gte: lower, $lt: upper } }`
    pub fn between<T: Into<Expr>>(
        self,
        lower_bound: T,
        upper_bound: T,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Filter {
        let lower = if lower_inclusive { "$gte" } else { "$gt" };
        let upper = if upper_inclusive { "$lte" } else { "$lt" };
        let condition = Expr::record()
            .with(lower, lower_bound)
            .with(upper, upper_bound);
        Filter::new(Expr::record().with(self.field_name, condition))
    }

    /// Matches documents where the field equals one of `values`.
    pub fn in_array<T: Into<Expr>>(self, values: Vec<T>) -> Filter {
        self.condition("$in", values)
    }

    /// Matches documents where the field equals none of `values`.
    pub fn not_in_array<T: Into<Expr>>(self, values: Vec<T>) -> Filter {
        self.condition("$nin", values)
    }

    /// Matches documents where the array field contains every one of `values`.
    pub fn all<T: Into<Expr>>(self, values: Vec<T>) -> Filter {
        self.condition("$all", values)
    }

    /// Matches documents that have (or, with `false`, lack) the field.
    #[inline]
    pub fn exists(self, exists: bool) -> Filter {
        self.condition("$exists", exists)
    }

    /// Matches documents whose field has the given BSON type alias (`"string"`,
    /// `"double"`, ...) or numeric type code.
    #[inline]
    pub fn has_type<T: Into<Expr>>(self, bson_type: T) -> Filter {
        self.condition("$type", bson_type)
    }

    /// Matches documents where the array field has exactly `size` elements.
    #[inline]
    pub fn size(self, size: usize) -> Filter {
        self.condition("$size", size)
    }

    /// Matches documents where the field modulo `divisor` equals `remainder`.
    pub fn modulo(self, divisor: i64, remainder: i64) -> Filter {
        self.condition("$mod", vec![divisor, remainder])
    }

    /// Matches documents where the field matches the regular expression `pattern`.
    #[inline]
    pub fn regex(self, pattern: &str) -> Filter {
        self.condition("$regex", Pattern::new(pattern, ""))
    }

    /// Like [`FluentFilter::regex`], with regex options such as `"i"` or `"m"`.
    #[inline]
    pub fn regex_with_options(self, pattern: &str, options: &str) -> Filter {
        self.condition("$regex", Pattern::new(pattern, options))
    }

    /// Matches documents where at least one array element satisfies `filter`.
    ///
    /// # Arguments
    ///
    /// * `filter` - The condition each element is tested against; field names in it
    ///   are relative to the element
    ///
    /// # Returns
    ///
    /// A `Filter` of the form `{ field: { $elemMatch: filter } }`
    #[inline]
    pub fn elem_match(self, filter: Filter) -> Filter {
        self.condition("$elemMatch", filter)
    }

    fn condition(self, keyword: &str, value: impl Into<Expr>) -> Filter {
        Filter::new(Expr::record().with(self.field_name, Expr::record().with(keyword, value)))
    }
}
