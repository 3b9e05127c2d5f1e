//! quadseg-test - Regression test framework for quadseg
//!
//! This crate provides the shared harness for the `*_reg.rs` regression
//! tests of the workspace:
//!
//! - **RegParams**: indexed comparisons that collect every failure
//! - **Synthetic fields**: deterministic inputs for segmentation tests
//!
//! # Usage
//!
//! ```
//! use quadseg_test::{quadrant_field, RegParams};
//!
//! let field = quadrant_field(4, 4, [1.0, 2.0, 3.0, 4.0]);
//! let mut rp = RegParams::new("usage");
//! rp.compare_values(4.0, field.get_sample(3, 3, 0).unwrap() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod fields;
mod params;

pub use fields::{
    checkerboard_field, gradient_field, noise_field, quadrant_field, tiles_exactly, uniform_field,
};
pub use params::{RegParams, RegTestMode};
