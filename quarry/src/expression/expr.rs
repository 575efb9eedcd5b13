use crate::common::{Document, ObjectId, Pattern, SortFields, SortOrder, Timestamp, Value};
use crate::expression::{resolve, ExprBuilder};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::Debug;
use std::sync::Arc;

type BuildFn = dyn Fn(&ExprBuilder) -> Expr + Send + Sync;

/// A closure producing an expression from a fresh [`ExprBuilder`].
///
/// The callback is invoked by the resolver, never at construction. `bindings` names
/// the variables the callback's body may reference (`$$name`); the builder it
/// receives has them in scope.
#[derive(Clone)]
pub struct Callback {
    bindings: Vec<String>,
    build: Arc<BuildFn>,
}

impl Callback {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
    {
        Callback {
            bindings: Vec::new(),
            build: Arc::new(build),
        }
    }

    /// Creates a callback whose builder has `bindings` in scope.
    pub fn scoped<I, S, F>(bindings: I, build: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
    {
        Callback {
            bindings: bindings.into_iter().map(Into::into).collect(),
            build: Arc::new(build),
        }
    }

    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    pub(crate) fn invoke(&self, builder: &ExprBuilder) -> Expr {
        (self.build)(builder)
    }
}

impl Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<callback [{}]>", self.bindings.iter().join(", "))
    }
}

/// Builder output: an expression tree awaiting resolution.
///
/// `Expr` is what every operator, predicate and stage option accepts. Trees are built
/// bottom-up from owned values, so they cannot contain cycles. Resolution
/// ([`crate::expression::resolve`]) turns an `Expr` into a canonical [`Value`].
///
/// # Variants
///
/// * `Node` marks a payload as an already-built expression (operators return nodes).
///   Nodes may wrap other nodes; resolution unwraps all of them.
/// * `Callback` defers construction to resolution time, handing the closure a fresh
///   builder bound to the current scope.
/// * `Value` is a resolved value: primitives, opaque leaves, or already canonical
///   documents and arrays.
/// * `Array` and `Record` are containers whose elements still need resolving.
/// * `Collection` references a bound collection handle; it resolves to the bare name.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::expression::{Expr, resolve};
/// use quarry::operator::size;
///
/// let tags = size("$tags");
/// let projected = record! { count: (tags), label: "x" };
/// let value = resolve(&projected);
/// ```
#[derive(Clone)]
pub enum Expr {
    Node(Box<Expr>),
    Callback(Callback),
    Value(Value),
    Array(Vec<Expr>),
    Record(IndexMap<String, Expr>),
    Collection(String),
}

impl Expr {
    /// Wraps `inner` as an already-built expression.
    pub fn node(inner: impl Into<Expr>) -> Expr {
        Expr::Node(Box::new(inner.into()))
    }

    /// Defers construction to resolution time.
    pub fn callback<F>(build: F) -> Expr
    where
        F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
    {
        Expr::Callback(Callback::new(build))
    }

    /// Defers construction to resolution time, with `bindings` in scope.
    pub fn scoped<I, S, F>(bindings: I, build: F) -> Expr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&ExprBuilder) -> Expr + Send + Sync + 'static,
    {
        Expr::Callback(Callback::scoped(bindings, build))
    }

    /// An empty record.
    pub fn record() -> Expr {
        Expr::Record(IndexMap::new())
    }

    /// A field path reference: `Expr::field("a.b")` is `"$a.b"`.
    pub fn field(path: &str) -> Expr {
        Expr::Value(Value::String(field_path(path)))
    }

    /// A variable reference: `Expr::var("item")` is `"$$item"`.
    pub fn var(name: &str) -> Expr {
        Expr::Value(Value::String(variable(name)))
    }

    /// Adds (or replaces) an entry of a record, looking through node wrappers.
    ///
    /// A document value becomes a record first. A callback is wrapped so the entry
    /// is added to whatever it builds. Other expressions are returned unchanged.
    pub fn with(self, key: impl Into<String>, value: impl Into<Expr>) -> Expr {
        match self {
            Expr::Record(mut fields) => {
                fields.insert(key.into(), value.into());
                Expr::Record(fields)
            }
            Expr::Node(inner) => Expr::Node(Box::new(inner.with(key, value))),
            Expr::Value(Value::Document(doc)) => {
                let fields: IndexMap<String, Expr> = doc
                    .into_iter()
                    .map(|(name, value)| (name, Expr::Value(value)))
                    .collect();
                Expr::Record(fields).with(key, value)
            }
            Expr::Callback(callback) => {
                let key = key.into();
                let value = value.into();
                let bindings = callback.bindings().to_vec();
                Expr::scoped(bindings, move |builder| {
                    callback.invoke(builder).with(key.clone(), value.clone())
                })
            }
            other => {
                log::warn!("Cannot add a field to non-record expression {:?}", other);
                other
            }
        }
    }

    /// Adds an entry only when `value` is `Some`.
    pub fn with_opt<V: Into<Expr>>(self, key: impl Into<String>, value: Option<V>) -> Expr {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Expr::Node(_))
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, Expr::Callback(_))
    }

    /// Returns the record fields, looking through node wrappers.
    pub fn as_record(&self) -> Option<&IndexMap<String, Expr>> {
        match self {
            Expr::Record(fields) => Some(fields),
            Expr::Node(inner) => inner.as_record(),
            _ => None,
        }
    }

    /// Resolves this expression in a fresh scope.
    pub fn resolve(&self) -> Value {
        resolve(self)
    }
}

pub(crate) fn field_path(path: &str) -> String {
    if path.starts_with('$') {
        path.to_string()
    } else {
        format!("${}", path)
    }
}

pub(crate) fn variable(name: &str) -> String {
    format!("$${}", name.trim_start_matches('$'))
}

impl Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Node(inner) => write!(f, "Node({:?})", inner),
            Expr::Callback(callback) => write!(f, "{:?}", callback),
            Expr::Value(value) => write!(f, "{:?}", value),
            Expr::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Expr::Record(fields) => f.debug_map().entries(fields.iter()).finish(),
            Expr::Collection(name) => write!(f, "Collection({})", name),
        }
    }
}

impl Default for Expr {
    fn default() -> Self {
        Expr::Value(Value::Null)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

impl From<Document> for Expr {
    fn from(value: Document) -> Self {
        Expr::Value(Value::Document(value))
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Value(Value::from(value))
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Value(Value::String(value))
    }
}

impl From<&String> for Expr {
    fn from(value: &String) -> Self {
        Expr::Value(Value::String(value.clone()))
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Value(Value::Bool(value))
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Value(Value::I32(value))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Value(Value::I64(value))
    }
}

impl From<u32> for Expr {
    fn from(value: u32) -> Self {
        Expr::Value(Value::from(value))
    }
}

impl From<usize> for Expr {
    fn from(value: usize) -> Self {
        Expr::Value(Value::from(value))
    }
}

impl From<f32> for Expr {
    fn from(value: f32) -> Self {
        Expr::Value(Value::from(value))
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Value(Value::F64(value))
    }
}

impl From<DateTime<Utc>> for Expr {
    fn from(value: DateTime<Utc>) -> Self {
        Expr::Value(Value::DateTime(value))
    }
}

impl From<ObjectId> for Expr {
    fn from(value: ObjectId) -> Self {
        Expr::Value(Value::ObjectId(value))
    }
}

impl From<Pattern> for Expr {
    fn from(value: Pattern) -> Self {
        Expr::Value(Value::Regex(value))
    }
}

impl From<Timestamp> for Expr {
    fn from(value: Timestamp) -> Self {
        Expr::Value(Value::Timestamp(value))
    }
}

impl From<SortOrder> for Expr {
    fn from(value: SortOrder) -> Self {
        Expr::Value(Value::from(value))
    }
}

impl From<SortFields> for Expr {
    fn from(value: SortFields) -> Self {
        Expr::Value(Value::from(value))
    }
}

impl From<Callback> for Expr {
    fn from(value: Callback) -> Self {
        Expr::Callback(value)
    }
}

impl From<IndexMap<String, Expr>> for Expr {
    fn from(value: IndexMap<String, Expr>) -> Self {
        Expr::Record(value)
    }
}

impl From<()> for Expr {
    fn from(_: ()) -> Self {
        Expr::Value(Value::Null)
    }
}

impl<T: Into<Expr>> From<Option<T>> for Expr {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Expr::Value(Value::Null),
        }
    }
}

impl<T: Into<Expr>> From<Vec<T>> for Expr {
    fn from(value: Vec<T>) -> Self {
        Expr::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Expr>, const N: usize> From<[T; N]> for Expr {
    fn from(value: [T; N]) -> Self {
        Expr::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Expr>> FromIterator<(K, V)> for Expr {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Expr::Record(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Creates a record [Expr] with JSON-like syntax.
///
/// Works like [`crate::doc!`], but values are converted with `Expr::from`, so operator
/// results, callbacks and collection handles can sit anywhere in the tree.
///
/// ```rust
/// use quarry::record;
/// use quarry::operator::size;
///
/// let spec = record! {
///     name: 1,
///     "tagCount": (size("$tags")),
///     nested: { flag: true }
/// };
/// assert!(spec.as_record().is_some());
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::expression::Expr::record()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_mut)]
            let mut record = $crate::expression::Expr::record();
            $(
                record = record.with($crate::common::normalize(stringify!($key)), $crate::record_value!($value));
            )*
            record
        }
    };
}

/// Helper macro converting values for the [`record!`] macro.
#[macro_export]
macro_rules! record_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::record!{ $($key : $value),* }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::expression::Expr::Array(vec![$($crate::record_value!($value)),*])
    };

    ($value:expr) => {
        $crate::expression::Expr::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::record;

    #[test]
    fn test_field_and_var() {
        assert_eq!(Expr::field("a.b").resolve(), Value::from("$a.b"));
        assert_eq!(Expr::field("$a").resolve(), Value::from("$a"));
        assert_eq!(Expr::var("item").resolve(), Value::from("$$item"));
        assert_eq!(Expr::var("$$item").resolve(), Value::from("$$item"));
    }

    #[test]
    fn test_record_macro() {
        let value = record! { a: 1, "$b": "x", nested: { c: [1, 2] } }.resolve();
        assert_eq!(value, Value::from(doc! { a: 1, "$b": "x", nested: { c: [1, 2] } }));
    }

    #[test]
    fn test_empty_record_macro() {
        assert_eq!(record! {}.resolve(), Value::from(doc! {}));
    }

    #[test]
    fn test_with_looks_through_nodes() {
        let expr = Expr::node(record! { a: 1 }).with("b", 2);
        assert!(expr.is_node());
        assert_eq!(expr.resolve(), Value::from(doc! { a: 1, b: 2 }));
    }

    #[test]
    fn test_with_on_document_value() {
        let expr = Expr::from(doc! { a: 1, c: { d: 2 } }).with("b", Expr::field("x"));
        assert!(expr.as_record().is_some());
        assert_eq!(expr.resolve(), Value::from(doc! { a: 1, c: { d: 2 }, b: "$x" }));
    }

    #[test]
    fn test_with_on_callback_is_deferred() {
        let expr = Expr::scoped(["item"], |b| record! { name: (b.var("item")) }).with("b", 2);
        assert!(expr.is_callback());
        assert_eq!(format!("{:?}", expr), "<callback [item]>");
        assert_eq!(expr.resolve(), Value::from(doc! { name: "$$item", b: 2 }));
    }

    #[test]
    fn test_with_on_non_record_is_noop() {
        let expr = Expr::from(5).with("b", 2);
        assert_eq!(expr.resolve(), Value::I32(5));
    }

    #[test]
    fn test_with_opt() {
        let expr = Expr::record()
            .with_opt("a", Some(1))
            .with_opt("b", None::<i32>);
        assert_eq!(expr.resolve(), Value::from(doc! { a: 1 }));
    }

    #[test]
    fn test_from_iterator_builds_record() {
        let expr: Expr = vec![("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(expr.resolve(), Value::from(doc! { x: 1, y: 2 }));
    }

    #[test]
    fn test_debug_callback() {
        let expr = Expr::scoped(["this", "value"], |b| b.var("this"));
        assert_eq!(format!("{:?}", expr), "<callback [this, value]>");
    }
}
