//! Wire values shared by every layer of the crate.
//!
//! Everything the builders produce resolves down to these types: [`Value`],
//! the ordered [`Document`], and the opaque leaves [`ObjectId`], [`Pattern`]
//! and [`Timestamp`] (dates use `chrono::DateTime<Utc>` directly).

mod document;
mod leaf;
mod object_id;
mod sort_order;
mod value;

pub use document::*;
pub use leaf::*;
pub use object_id::ObjectId;
pub use sort_order::*;
pub use value::*;
