//! # Frontier
//!
//! $$
//! \sigma^\*(r) = \min_{\mathbf{w}\in\mathcal{W}(r)} \sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}
//! $$
//!
//! Constrained minimum-variance solves and the efficient-frontier sweep
//! built on top of them.

pub mod solver;
pub mod sweep;

pub use solver::solve_min_variance;
pub use solver::QpSolve;
pub use solver::SolverSettings;
pub use solver::SolveStatus;
pub use sweep::compute_frontier;
pub use sweep::optimize_for_target;
pub use sweep::FrontierConfig;
pub use sweep::FrontierPoint;
pub use sweep::FrontierSweep;
pub use sweep::SkippedPoint;
pub use sweep::TargetPortfolio;
