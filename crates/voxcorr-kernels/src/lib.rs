//! Spatial correlation and density kernels for voxel fields (pure Rust, SIMD/parallel)
//!
//! Every parallel entry point takes an optional worker count and runs on its
//! own rayon pool; see [`parallel::resolve_workers`] for how `None` resolves.

pub mod corr;
pub mod density;
pub mod flood;
pub mod mass_map;
pub mod neighborhood;
pub mod parallel;
pub mod reference;

pub use corr::{correlation, pearson};
pub use density::{density_estimate, Kernel};
pub use flood::{flood_fill, FloodFillParams};
pub use neighborhood::{
    neighborhood_correlation_map, neighborhood_correlation_tensor, neighborhood_len,
    neighborhood_offsets,
};
pub use reference::reference_correlation_map;
