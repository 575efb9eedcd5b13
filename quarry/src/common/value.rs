use crate::common::{Document, ObjectId, Pattern, Timestamp};
use crate::errors::QuarryResult;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};

/// Compare two floats for equality with proper NaN handling.
#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Represents a resolved wire value. It can be a simple value like [Value::I32], [Value::String]
/// or a complex value like [Value::Document] or [Value::Array].
///
/// # Purpose
/// `Value` is the canonical output of expression resolution: every builder tree, once
/// resolved, is made only of these variants. It is also what the [`crate::driver::Driver`]
/// receives and returns.
///
/// # Variants
/// - Null, Bool, I32, I64, F64, String: primitives
/// - Document, Array: containers
/// - DateTime, ObjectId, Regex, Timestamp: opaque leaves. They are never traversed as
///   field maps, even though their JSON rendering is an object.
///
/// # Usage
/// ```text
/// let v1: Value = 42.into();
/// let v2 = Value::from("hello");
/// let doc = doc! { age: 42, name: "Alice" };
/// ```
#[derive(Clone, Default)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 32-bit integer value.
    I32(i32),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a string value. Field paths (`$a.b`) and variables (`$$x`) are strings too.
    String(String),
    /// Represents an embedded document.
    Document(Document),
    /// Represents an array value.
    Array(Vec<Value>),
    /// Represents a UTC timestamp with millisecond precision on the wire.
    DateTime(DateTime<Utc>),
    /// Represents a 12-byte object identifier.
    ObjectId(ObjectId),
    /// Represents a regular expression literal.
    Regex(Pattern),
    /// Represents an internal replication timestamp.
    Timestamp(Timestamp),
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}i32", v),
            Value::I64(v) => write!(f, "{}i64", v),
            Value::F64(v) => write!(f, "{:?}f64", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::Document(v) => write!(f, "{:?}", v),
            Value::Array(v) => f.debug_list().entries(v.iter()).finish(),
            Value::DateTime(v) => write!(f, "DateTime({})", v.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::ObjectId(v) => write!(f, "{:?}", v),
            Value::Regex(v) => write!(f, "{:?}", v),
            Value::Timestamp(v) => write!(f, "{:?}", v),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            // integers compare across widths
            (Value::I32(a), Value::I64(b)) | (Value::I64(b), Value::I32(a)) => i64::from(*a) == *b,
            (Value::F64(a), Value::F64(b)) => num_eq_float(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::ObjectId(a), Value::ObjectId(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Converts an optional value, mapping `None` to [Value::Null].
    pub fn from_option<T: Into<Value>>(value: Option<T>) -> Value {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }

    /// Converts a vector of convertible items into a [Value::Array].
    pub fn from_vec<T: Into<Value>>(values: Vec<T>) -> Value {
        Value::Array(values.into_iter().map(Into::into).collect())
    }

    pub fn as_bool(&self) -> Option<&bool> {
        match self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&i32> {
        match self {
            Value::I32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<&i64> {
        match self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&f64> {
        match self {
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns any integer variant widened to `i64`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::DateTime(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Value::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::I32(_) | Value::I64(_) | Value::F64(_))
    }

    /// Returns `true` for the leaf kinds that must never be traversed as field maps:
    /// dates, object ids, regular expressions and timestamps.
    pub fn is_opaque_leaf(&self) -> bool {
        matches!(
            self,
            Value::DateTime(_) | Value::ObjectId(_) | Value::Regex(_) | Value::Timestamp(_)
        )
    }

    /// Takes the value out, leaving [Value::Null] in its place.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }

    /// Renders the value as relaxed extended JSON.
    pub fn to_json(&self) -> QuarryResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::F64(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::F64(v) => {
                // JSON has no literal for these
                let text = if v.is_nan() {
                    "NaN"
                } else if v.is_sign_positive() {
                    "Infinity"
                } else {
                    "-Infinity"
                };
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$numberDouble", text)?;
                map.end()
            }
            Value::String(v) => serializer.serialize_str(v),
            Value::Document(v) => v.serialize(serializer),
            Value::Array(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for item in v {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::DateTime(v) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$date", &v.to_rfc3339_opts(SecondsFormat::Millis, true))?;
                map.end()
            }
            Value::ObjectId(v) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$oid", &v.to_hex())?;
                map.end()
            }
            Value::Regex(v) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$regularExpression", v)?;
                map.end()
            }
            Value::Timestamp(v) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$timestamp", v)?;
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<u32> for Value {
    #[inline]
    fn from(value: u32) -> Self {
        Value::I64(i64::from(value))
    }
}

impl From<usize> for Value {
    #[inline]
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(v) => Value::I64(v),
            Err(_) => Value::F64(value as f64),
        }
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::F64(f64::from(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::ObjectId(value)
    }
}

impl From<Pattern> for Value {
    fn from(value: Pattern) -> Self {
        Value::Regex(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        Value::from_option(value)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::from_vec(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// Converts plain or extended JSON into a [Value].
///
/// Single-key objects using the `$oid`, `$date`, `$regularExpression` and `$timestamp`
/// wrappers become the matching leaf; a wrapper whose payload does not parse stays a
/// plain document.
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => Value::I32(small),
                        Err(_) => Value::I64(i),
                    }
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(leaf) = extended_json_leaf(&map) {
                        return leaf;
                    }
                }
                Value::Document(
                    map.into_iter()
                        .map(|(k, v)| (k, Value::from(v)))
                        .collect(),
                )
            }
        }
    }
}

fn extended_json_leaf(map: &serde_json::Map<String, serde_json::Value>) -> Option<Value> {
    let (key, payload) = map.iter().next()?;
    match key.as_str() {
        "$oid" => payload
            .as_str()
            .and_then(|hex| ObjectId::parse_str(hex).ok())
            .map(Value::ObjectId),
        "$date" => payload
            .as_str()
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc))),
        "$regularExpression" => {
            let pattern = payload.get("pattern")?.as_str()?;
            let options = payload.get("options").and_then(|o| o.as_str()).unwrap_or("");
            Some(Value::Regex(Pattern::new(pattern, options)))
        }
        "$timestamp" => {
            let time = u32::try_from(payload.get("t")?.as_u64()?).ok()?;
            let increment = u32::try_from(payload.get("i")?.as_u64()?).ok()?;
            Some(Value::Timestamp(Timestamp::new(time, increment)))
        }
        "$numberDouble" => match payload.as_str()? {
            "NaN" => Some(Value::F64(f64::NAN)),
            "Infinity" => Some(Value::F64(f64::INFINITY)),
            "-Infinity" => Some(Value::F64(f64::NEG_INFINITY)),
            _ => None,
        },
        _ => None,
    }
}
