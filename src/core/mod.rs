// src/core/mod.rs

pub mod html;
pub mod net;
pub mod numeric;
pub mod sanitize;

pub use numeric::Numeric;
