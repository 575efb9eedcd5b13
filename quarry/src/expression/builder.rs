use crate::expression::expr::{field_path, variable};
use crate::expression::Expr;

/// System variables recognised by the server in every scope.
pub const SYSTEM_VARIABLES: [&str; 10] = [
    "ROOT",
    "CURRENT",
    "NOW",
    "CLUSTER_TIME",
    "REMOVE",
    "DESCEND",
    "PRUNE",
    "KEEP",
    "SEARCH_META",
    "USER_ROLES",
];

/// The builder handed to expression callbacks.
///
/// A builder carries the names bound by the enclosing scoped operators (`$map`,
/// `$filter`, `$reduce`, `$let`, ...). Scope is bookkeeping only: `var` always yields
/// the `$$name` reference string and the server does the actual binding when the
/// command runs. Nothing is substituted at build time.
///
/// ```rust,ignore
/// use quarry::operator::{map, multiply};
///
/// let doubled = map("$scores", "s", |b| multiply([b.var("s"), 2.into()]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExprBuilder {
    scope: Vec<String>,
}

impl ExprBuilder {
    /// Creates a builder with an empty scope.
    pub fn new() -> Self {
        ExprBuilder { scope: Vec::new() }
    }

    /// Creates a nested builder whose scope adds `names` to this one.
    pub fn child<I, S>(&self, names: I) -> ExprBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scope = self.scope.clone();
        for name in names {
            let name = name.as_ref();
            if !scope.iter().any(|bound| bound == name) {
                scope.push(name.to_string());
            }
        }
        ExprBuilder { scope }
    }

    /// A field path of the current document: `b.field("qty")` is `"$qty"`.
    pub fn field(&self, path: &str) -> Expr {
        Expr::Value(field_path(path).into())
    }

    /// A variable reference: `b.var("item")` is `"$$item"`.
    ///
    /// Unbound names are allowed; the server reports them when the command runs.
    pub fn var(&self, name: &str) -> Expr {
        Expr::Value(variable(name).into())
    }

    /// A field path below a variable: `b.var_field("item", "price")` is
    /// `"$$item.price"`.
    pub fn var_field(&self, name: &str, path: &str) -> Expr {
        Expr::Value(format!("{}.{}", variable(name), path).into())
    }

    pub fn root(&self) -> Expr {
        self.var("ROOT")
    }

    pub fn current(&self) -> Expr {
        self.var("CURRENT")
    }

    pub fn now(&self) -> Expr {
        self.var("NOW")
    }

    pub fn cluster_time(&self) -> Expr {
        self.var("CLUSTER_TIME")
    }

    pub fn remove(&self) -> Expr {
        self.var("REMOVE")
    }

    pub fn descend(&self) -> Expr {
        self.var("DESCEND")
    }

    pub fn prune(&self) -> Expr {
        self.var("PRUNE")
    }

    pub fn keep(&self) -> Expr {
        self.var("KEEP")
    }

    /// `{ $literal: value }`, for values the server must not parse as expressions
    /// (strings starting with `$`, for instance).
    pub fn literal(&self, value: impl Into<Expr>) -> Expr {
        crate::operator::literal(value)
    }

    /// Names bound by enclosing scoped operators, outermost first.
    pub fn bound(&self) -> &[String] {
        &self.scope
    }

    /// Checks whether `name` is bound in this scope or is a system variable.
    pub fn is_bound(&self, name: &str) -> bool {
        let name = name.trim_start_matches('$');
        SYSTEM_VARIABLES.contains(&name) || self.scope.iter().any(|bound| bound == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;

    #[test]
    fn test_child_extends_scope() {
        let root = ExprBuilder::new();
        let outer = root.child(["item"]);
        let inner = outer.child(["value", "this", "item"]);
        assert!(root.bound().is_empty());
        assert_eq!(outer.bound(), ["item".to_string()]);
        assert_eq!(
            inner.bound(),
            ["item".to_string(), "value".to_string(), "this".to_string()]
        );
    }

    #[test]
    fn test_is_bound() {
        let builder = ExprBuilder::new().child(["item"]);
        assert!(builder.is_bound("item"));
        assert!(builder.is_bound("$$item"));
        assert!(builder.is_bound("ROOT"));
        assert!(!builder.is_bound("other"));
    }

    #[test]
    fn test_references_are_plain_strings() {
        let builder = ExprBuilder::new();
        assert_eq!(builder.field("qty").resolve(), Value::from("$qty"));
        assert_eq!(builder.var("x").resolve(), Value::from("$$x"));
        assert_eq!(builder.var_field("item", "price").resolve(), Value::from("$$item.price"));
        assert_eq!(builder.root().resolve(), Value::from("$$ROOT"));
        assert_eq!(builder.now().resolve(), Value::from("$$NOW"));
        assert_eq!(builder.remove().resolve(), Value::from("$$REMOVE"));
    }

    #[test]
    fn test_literal() {
        let builder = ExprBuilder::new();
        assert_eq!(
            builder.literal("$notAField").resolve(),
            Value::from(crate::doc! { "$literal": "$notAField" })
        );
    }

    #[test]
    fn test_unbound_var_passes_through() {
        let builder = ExprBuilder::new();
        assert!(!builder.is_bound("later"));
        assert_eq!(builder.var("later").resolve(), Value::from("$$later"));
    }
}
