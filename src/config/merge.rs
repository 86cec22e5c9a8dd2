//! Merge policy for layered configuration sources.

pub mod merge_policy;

pub use merge_policy::builder_with_defaults;
