//! # quarry - document database command builders
//!
//! quarry builds the commands a document database understands (query filters,
//! aggregation pipelines, update specifications and CRUD calls) out of small,
//! composable Rust values, and hands the finished commands to a driver.
//!
//! ## Key Features
//!
//! - **Expressions**: builder trees of records, arrays, values and callbacks that
//!   resolve to canonical wire values
//! - **Operators**: the aggregation expression operators (`$add`, `$map`, `$sum`, ...)
//!   as plain functions over five combinator shapes
//! - **Pipelines**: stages are functions over an immutable accumulator; composition
//!   is associative and sub-pipelines embed as bare arrays
//! - **Updates**: keyword-map updates and update pipelines translated to one wire
//!   form, with array filters
//! - **Operations**: deferred CRUD descriptors whose triggers make exactly one driver
//!   call
//! - **Bindings**: an explicit, immutable map of collection names to schema markers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quarry::bindings::bind;
//! use quarry::filter::field;
//! use quarry::operator::sum;
//! use quarry::pipeline::{group, match_, sort};
//! use quarry::record;
//!
//! let bindings = bind(driver).collection::<Order>("orders").build()?;
//! let orders = bindings.collection::<Order>()?;
//!
//! // a deferred find, triggered by `to_list`
//! let open = orders.find(field("status").eq("open")).limit(10).to_list().await?;
//!
//! // an aggregation
//! let totals = orders.pipeline().pipe_all([
//!     match_(field("status").eq("paid")),
//!     group("$customerId", record! { total: (sum(["$amount"])) }),
//!     sort(record! { total: (-1) }),
//! ]);
//! let rows = orders.aggregate(&totals).to_list().await?;
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Wire values, ordered documents and opaque leaves
//! - [`errors`] - Error types and result definitions
//! - [`expression`] - Expression trees and their resolution
//! - [`operator`] - Aggregation expression operators
//! - [`filter`] - Query filters
//! - [`pipeline`] - Stages and pipelines
//! - [`update`] - Update specifications and their translation
//! - [`driver`] - The driver seam, its options and results
//! - [`operation`] - Deferred CRUD operations
//! - [`collection`] - Collection handles
//! - [`bindings`] - Collection bindings
//! - [`config`] - Operation defaults

pub mod bindings;
pub mod collection;
pub mod common;
pub mod config;
pub mod driver;
pub mod errors;
pub mod expression;
pub mod filter;
pub mod operation;
pub mod operator;
pub mod pipeline;
pub mod update;

/// Separator between the segments of a dotted field path.
pub const FIELD_SEPARATOR: &str = ".";

/// The identifier field of every document.
pub const DOC_ID: &str = "_id";

#[cfg(test)]
mod tests {
    // Setup only one time throughout the crate's tests.
    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    #[test]
    fn test_constants() {
        assert_eq!(super::FIELD_SEPARATOR, ".");
        assert_eq!(super::DOC_ID, "_id");
    }
}
