//! Query predicates.
//!
//! Filters are query documents, the language of `find`, `$match` and update filters.
//! They are built with the fluent API:
//! - `field("age").gt(30)` - comparison operators
//! - `field("name").eq("Alice")` - equality checks
//! - `all()` - match all documents
//! - `by_id(id)` - match by `_id`
//! - `field("age").gt(30).and(field("status").eq("active"))` - logical AND
//! - `expr(...)` - an aggregation expression used as a predicate
//!
//! ```rust
//! use quarry::doc;
//! use quarry::common::Value;
//! use quarry::filter::field;
//!
//! let filter = field("age").gt(30).and(field("status").eq("active"));
//! assert_eq!(
//!     filter.resolve(),
//!     Value::from(doc! { "$and": [{ age: { "$gt": 30 } }, { status: "active" }] })
//! );
//! ```

mod filter;
mod fluent;

pub use filter::*;
pub use fluent::*;
