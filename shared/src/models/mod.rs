//! Domain models for the inventory core

mod product;

pub use product::*;
