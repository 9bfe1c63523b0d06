//! Route handlers, one module per resource.

pub mod clips;
pub mod content;
pub mod github;
pub mod health;
pub mod validate;
