use crate::common::{Document, Value};
use crate::expression::{Expr, ExprBuilder};

/// Resolves a builder tree into its canonical wire value, starting from an empty scope.
///
/// See [`resolve_in`] for the rules.
pub fn resolve(expr: &Expr) -> Value {
    resolve_in(expr, &ExprBuilder::new())
}

/// Resolves a builder tree within `scope`.
///
/// The checks run in this order, and the order matters:
///
/// 1. Node wrappers are peeled off, however many there are.
/// 2. Callbacks are invoked with a fresh builder (the current scope plus the
///    callback's own bindings) and their result is resolved in that scope.
/// 3. Opaque leaves (dates, object ids, regular expressions, timestamps) come back
///    unchanged. They are checked before container recursion.
/// 4. Arrays resolve elementwise, keeping positions.
/// 5. Records resolve each value, keeping keys and key order.
/// 6. Anything else is returned as is. A collection reference becomes its name.
///
/// Trees are owned and acyclic, so resolution terminates. Nothing is cached: the same
/// tree resolves from scratch every time, re-running its callbacks.
pub fn resolve_in(expr: &Expr, scope: &ExprBuilder) -> Value {
    match expr {
        Expr::Node(inner) => resolve_in(inner, scope),
        Expr::Callback(callback) => {
            let builder = scope.child(callback.bindings());
            let produced = callback.invoke(&builder);
            resolve_in(&produced, &builder)
        }
        Expr::Value(value) if value.is_opaque_leaf() => value.clone(),
        Expr::Array(items) => Value::Array(items.iter().map(|item| resolve_in(item, scope)).collect()),
        Expr::Record(fields) => Value::Document(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), resolve_in(value, scope)))
                .collect(),
        ),
        Expr::Collection(name) => Value::String(name.clone()),
        Expr::Value(value) => value.clone(),
    }
}

/// Resolves an expression that must end up as a document, such as a query filter.
///
/// * a document is returned as is;
/// * `null` (for example `()` as a filter) becomes the empty document, which
///   matches everything;
/// * any other value is an aggregation expression and is wrapped as `{ $expr: value }`.
pub fn resolve_document(expr: &Expr) -> Document {
    match resolve(expr) {
        Value::Document(doc) => doc,
        Value::Null => Document::new(),
        other => {
            log::debug!("Wrapping non-document filter {} in $expr", other);
            Document::single("$expr", other)
        }
    }
}

/// Resolves an expression that must be a plain document, such as a sort or projection.
///
/// `null` gives the empty document. Any other non-document value is logged and
/// replaced by the empty document; `what` names the input in the log line.
pub(crate) fn resolve_plain_document(expr: &Expr, what: &str) -> Document {
    match resolve(expr) {
        Value::Document(doc) => doc,
        Value::Null => Document::new(),
        other => {
            log::warn!("Ignoring non-document {} {}", what, other);
            Document::new()
        }
    }
}
