//! Command handlers, one module per primitive.

pub mod person;
