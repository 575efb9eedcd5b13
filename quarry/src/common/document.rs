use crate::common::Value;
use crate::errors::QuarryResult;
use crate::FIELD_SEPARATOR;
use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt::{Debug, Display};

type PathVec<'a> = SmallVec<[&'a str; 8]>;

/// An ordered wire document.
///
/// A document is a map from [String] keys to [Value]s that remembers insertion order.
/// Order is part of the wire format: a sort specification `{a: 1, b: -1}` is not the
/// same command as `{b: -1, a: 1}`, and a stage document is recognised by its first
/// (and only) key.
///
/// Keys are stored verbatim. A key containing the field separator (`.`) is a single
/// key here; [`Document::get_path`] walks embedded documents and arrays for reads.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    /// Creates a document holding a single entry. Stage documents have this shape.
    pub fn single(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut doc = Document::new();
        doc.put(key, value);
        doc
    }

    /// Checks if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of top-level entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Associates `value` with `key`, keeping the original position if the key
    /// already exists. Returns the previous value, if any.
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Alice");
    /// doc.put("age", 30);
    /// assert_eq!(doc.len(), 2);
    /// ```
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Returns the value stored under the exact top-level `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Returns the value at a dotted path such as `"location.address.zip"` or
    /// `"items.0"`. Numeric segments index into arrays.
    ///
    /// ```ignore
    /// let doc = doc!{ location: { city: "New York" }, items: [1, 2, 3] };
    /// assert_eq!(doc.get_path("location.city"), Some(&Value::from("New York")));
    /// assert_eq!(doc.get_path("items.1"), Some(&Value::I32(2)));
    /// ```
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.data.get(path) {
            return Some(value);
        }

        let segments: PathVec = path.split(FIELD_SEPARATOR).collect();
        let (first, rest) = segments.split_first()?;
        let mut current = self.data.get(*first)?;
        for segment in rest {
            current = match current {
                Value::Document(doc) => doc.get(segment)?,
                Value::Array(items) => {
                    let index = segment.parse::<usize>().ok()?;
                    items.get(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the first entry. For a stage document this is the stage keyword and
    /// its options.
    pub fn first(&self) -> Option<(&String, &Value)> {
        self.data.first()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.data.values()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.data.iter()
    }

    /// Merges `other` into this document; keys present in both take `other`'s value.
    pub fn merge(&mut self, other: Document) {
        for (key, value) in other {
            self.data.insert(key, value);
        }
    }

    /// Renders the document as relaxed extended JSON.
    pub fn to_json(&self) -> QuarryResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.data.iter())
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Document {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Strips the quotes `stringify!` leaves around string-literal keys.
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// Keys are identifiers or string literals (use literals for `$`-keywords and dotted
/// paths). Values are literals, nested `{ ... }` documents, `[ ... ]` arrays, or any
/// expression in parentheses.
///
/// # Examples
///
/// ```rust
/// use quarry::doc;
///
/// let empty = doc!{};
///
/// let base = 100;
/// let stage = doc!{
///     "$match": {
///         status: "active",
///         "score.total": (base * 2),
///         tags: ["a", "b"]
///     }
/// };
/// assert_eq!(stage.len(), 1);
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::common::Document::new()
    };

    () => {
        $crate::common::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            let mut doc = $crate::common::Document::new();
            $(
                doc.put($crate::common::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Helper macro converting values for the [`doc!`] macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
