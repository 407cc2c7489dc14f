//! Repository layer: entity-scoped database operations.
//!
//! Free functions over `&Connection`; callers own the connection lifetime.
//! All public functions are re-exported here.

mod article;
mod report;

pub use article::*;
pub use report::*;
