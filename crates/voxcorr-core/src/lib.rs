//! Core data structures and error types for voxcorr (pure Rust)

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod coord;
pub mod density;
pub mod error;
pub mod field;

pub use coord::{Coord, Dims};
pub use density::DensityMap;
pub use error::FieldError;
pub use field::Field;
