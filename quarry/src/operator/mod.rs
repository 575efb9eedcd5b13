//! Aggregation expression operators.
//!
//! Everything is built from five call shapes ([`Shape`]); the catalog functions only
//! bind keywords to them. Operators return [`crate::expression::Expr`] nodes and
//! accept anything convertible into one, so they nest freely:
//!
//! ```rust
//! use quarry::doc;
//! use quarry::common::Value;
//! use quarry::operator::{add, cond, gte};
//!
//! let price = cond(gte("$qty", 100), add(["$price", "$discount"]), "$price");
//! assert_eq!(
//!     price.resolve(),
//!     Value::from(doc! {
//!         "$cond": {
//!             "if": { "$gte": ["$qty", 100] },
//!             "then": { "$add": ["$price", "$discount"] },
//!             "else": "$price"
//!         }
//!     })
//! );
//! ```

mod catalog;
mod combinator;
mod scoped;
mod window;

pub use catalog::*;
pub use combinator::*;
pub use scoped::*;
pub use window::{windowed, Bound, Window};
