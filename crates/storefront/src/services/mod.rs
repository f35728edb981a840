//! Application services.

pub mod cart;

pub use cart::{CartSnapshot, CartStore};
