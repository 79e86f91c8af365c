//! # Frontier
//!
//! $$
//! \min_{\mathbf{w}}\ \mathbf{w}^\top\Sigma\mathbf{w}
//! \quad\text{s.t.}\quad
//! \mathbf{1}^\top\mathbf{w}=1,\ \mu^\top\mathbf{w}\ge r,\ 0\le w_i\le c
//! $$
//!
//! Fund return analysis and mean-variance efficient frontier construction.

pub mod frontier;
pub mod report;
pub mod series;
pub mod stats;
pub mod visualization;
#[cfg(feature = "yahoo")]
pub mod yahoo;
