use crate::common::Value;
use crate::expression::Expr;
use std::fmt::Display;

/// One end of a `$setWindowFields` window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Unbounded,
    Current,
    /// Documents (or range units) relative to the current document.
    Offset(i64),
}

impl From<Bound> for Expr {
    fn from(value: Bound) -> Self {
        match value {
            Bound::Unbounded => Expr::from("unbounded"),
            Bound::Current => Expr::from("current"),
            Bound::Offset(offset) => Expr::from(offset),
        }
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Bound::Offset(value)
    }
}

impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Bound::Offset(value as i64)
    }
}

/// A window specification for the output fields of `$setWindowFields`.
///
/// ```rust,ignore
/// use quarry::operator::{sum, windowed, Bound, Window};
///
/// let running = windowed(sum(["$qty"]), Window::documents(Bound::Unbounded, Bound::Current));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    kind: WindowKind,
    lower: Bound,
    upper: Bound,
    unit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum WindowKind {
    Documents,
    Range,
}

impl Window {
    /// A window counted in documents around the current one.
    pub fn documents(lower: impl Into<Bound>, upper: impl Into<Bound>) -> Self {
        Window {
            kind: WindowKind::Documents,
            lower: lower.into(),
            upper: upper.into(),
            unit: None,
        }
    }

    /// A window over the values of the `sortBy` field.
    pub fn range(lower: impl Into<Bound>, upper: impl Into<Bound>) -> Self {
        Window {
            kind: WindowKind::Range,
            lower: lower.into(),
            upper: upper.into(),
            unit: None,
        }
    }

    /// Time unit of a range window over dates (`"day"`, `"hour"`, ...).
    pub fn unit(mut self, unit: impl Display) -> Self {
        self.unit = Some(unit.to_string());
        self
    }
}

impl From<Window> for Expr {
    fn from(value: Window) -> Self {
        let key = match value.kind {
            WindowKind::Documents => "documents",
            WindowKind::Range => "range",
        };
        Expr::record()
            .with(key, vec![Expr::from(value.lower), Expr::from(value.upper)])
            .with_opt("unit", value.unit)
    }
}

/// Attaches a window to an accumulator or window operator: `{ $op: ..., window }`.
pub fn windowed(expr: Expr, window: impl Into<Expr>) -> Expr {
    expr.with("window", window)
}

// Moves `window` out of the first entry's options and next to the operator. Options
// built by a callback are hoisted once the callback has run.
pub(crate) fn hoist_window(built: Expr) -> Expr {
    let Expr::Record(mut fields) = built else {
        return built;
    };

    let deferred = match fields.first() {
        Some((_, Expr::Callback(callback))) => Some(callback.clone()),
        _ => None,
    };
    if let Some(callback) = deferred {
        let bindings = callback.bindings().to_vec();
        return Expr::scoped(bindings, move |builder| {
            let mut fields = fields.clone();
            if let Some((_, options)) = fields.first_mut() {
                *options = callback.invoke(builder);
            }
            hoist_window(Expr::Record(fields))
        });
    }

    let window = fields.first_mut().and_then(|(_, options)| take_window(options));
    if let Some(window) = window {
        fields.insert("window".to_string(), window);
    }
    Expr::Record(fields)
}

fn take_window(options: &mut Expr) -> Option<Expr> {
    match options {
        Expr::Record(fields) => fields.shift_remove("window"),
        Expr::Node(inner) => take_window(inner),
        Expr::Value(Value::Document(doc)) => doc.remove("window").map(Expr::Value),
        _ => None,
    }
}
