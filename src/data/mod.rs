//! Element-set data: parsing and retrieval

mod element_set;
mod loader;

pub use element_set::*;
pub use loader::*;

#[cfg(test)]
pub(crate) use element_set::fixtures;
