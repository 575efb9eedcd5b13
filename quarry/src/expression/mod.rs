//! Expression trees and their resolution.
//!
//! Builders produce [`Expr`] trees; [`resolve`] turns them into canonical
//! [`crate::common::Value`]s. Callbacks inside a tree receive an [`ExprBuilder`]
//! carrying the variables bound by enclosing scoped operators.

mod builder;
mod expr;
mod resolver;

pub use builder::*;
pub use expr::{Callback, Expr};
pub use resolver::*;
