//! Data source implementations

pub mod in_memory;

pub use in_memory::{IdStrategy, Identified, InMemorySource};
