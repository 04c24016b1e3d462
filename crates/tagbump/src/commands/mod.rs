//! Command implementations

pub mod current;
pub mod sync;
