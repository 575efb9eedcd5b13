//! Update specifications.
//!
//! An update is either a keyword map ([`Update`], or any record expression) or an
//! update pipeline of [`UpdateStage`]s. [`translate`] turns either into the
//! [`WireUpdate`] sent to the driver, together with any array filters.

mod stage;
mod traditional;
mod translate;

pub use stage::UpdateStage;
pub use traditional::{Modifier, Update};
pub use translate::*;
