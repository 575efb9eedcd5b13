//! Aggregation pipelines.
//!
//! A [`Stage`] is a function from a [`Pipeline`] to a new pipeline with one more stage
//! document. Pipelines are built by reducing an empty pipeline through a list of
//! stages, left to right:
//!
//! ```rust
//! use quarry::doc;
//! use quarry::filter::field;
//! use quarry::operator::sum;
//! use quarry::pipeline::{group, match_, pipeline, sort};
//! use quarry::record;
//!
//! let totals = pipeline([
//!     match_(field("status").eq("A")),
//!     group("$cust_id", record! { total: (sum(["$amount"])) }),
//!     sort(record! { total: (-1) }),
//! ]);
//!
//! assert_eq!(
//!     totals.stages(),
//!     vec![
//!         doc! { "$match": { status: "A" } },
//!         doc! { "$group": { _id: "$cust_id", total: { "$sum": "$amount" } } },
//!         doc! { "$sort": { total: (-1) } },
//!     ]
//! );
//! ```
//!
//! Stages that embed sub-pipelines (`lookup_pipeline`, `facet`,
//! `union_with_pipeline`) take a stage list and reduce it the same way.

mod accumulator;
mod stage;
mod stages;

pub use accumulator::Pipeline;
pub use stage::{compose, pipeline, Stage};
pub use stages::*;
