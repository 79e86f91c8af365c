//! # Minimum-Variance Solver
//!
//! $$
//! \min_{\mathbf{w}} \mathbf{w}^\top\Sigma\mathbf{w}
//! \quad\text{s.t.}\quad
//! \mathbf{1}^\top\mathbf{w}=1,\ \mu^\top\mathbf{w}\ge r,\ 0\le w_i\le c
//! $$
//!
//! Stuffs the capped minimum-variance program into Clarabel's conic form
//! and maps its termination status back to a caller-facing outcome. The
//! solver is treated as an opaque convex-QP black box: feasible problems
//! yield the global optimum, everything else is reported as a status,
//! never swallowed.

use anyhow::bail;
use anyhow::Result;
use clarabel::algebra::CscMatrix;
use clarabel::solver::DefaultSettingsBuilder;
use clarabel::solver::DefaultSolver;
use clarabel::solver::IPSolver;
use clarabel::solver::SolverStatus;
use clarabel::solver::SupportedConeT;
use ndarray::Array1;
use ndarray::Array2;

/// Caller-facing solve status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
  /// Optimal solution found.
  Optimal,
  /// No weight vector satisfies the constraints.
  Infeasible,
  /// Problem is unbounded below.
  Unbounded,
  /// Iteration or time limit reached before convergence.
  MaxIterations,
  /// Numerical difficulties.
  NumericalError,
  /// Unknown status.
  Unknown,
}

impl From<SolverStatus> for SolveStatus {
  fn from(status: SolverStatus) -> Self {
    match status {
      SolverStatus::Solved => SolveStatus::Optimal,
      SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
        SolveStatus::Infeasible
      }
      SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => SolveStatus::Unbounded,
      SolverStatus::MaxIterations | SolverStatus::MaxTime => SolveStatus::MaxIterations,
      SolverStatus::NumericalError | SolverStatus::InsufficientProgress => {
        SolveStatus::NumericalError
      }
      _ => SolveStatus::Unknown,
    }
  }
}

/// Solver settings.
#[derive(Clone, Debug)]
pub struct SolverSettings {
  /// Print solver output.
  pub verbose: bool,
  /// Maximum interior-point iterations.
  pub max_iter: u32,
  /// Per-solve time limit in seconds. A non-converging solve blocks only
  /// its own grid point, never the whole sweep.
  pub time_limit: f64,
  /// Absolute duality-gap tolerance.
  pub tol_gap_abs: f64,
  /// Relative duality-gap tolerance.
  pub tol_gap_rel: f64,
}

impl Default for SolverSettings {
  fn default() -> Self {
    Self {
      verbose: false,
      max_iter: 200,
      time_limit: 10.0,
      tol_gap_abs: 1e-8,
      tol_gap_rel: 1e-8,
    }
  }
}

/// Outcome of one minimum-variance solve.
///
/// `weights` and `objective` are populated only when `status` is
/// [`SolveStatus::Optimal`]; an infeasible grid point is an ordinary
/// outcome here, not an error.
#[derive(Clone, Debug)]
pub struct QpSolve {
  /// Termination status.
  pub status: SolveStatus,
  /// Optimal weights, one per asset.
  pub weights: Option<Vec<f64>>,
  /// Portfolio variance `wᵀΣw` at the optimum.
  pub objective: Option<f64>,
  /// Solve time in seconds.
  pub solve_time: f64,
  /// Interior-point iterations used.
  pub iterations: u32,
}

/// Solve for the minimum-variance weights achieving expected return at
/// least `target_return`, with `sum(w) = 1` and `0 <= w_i <= max_allocation`.
///
/// Malformed inputs are errors; infeasibility is a [`QpSolve`] status.
pub fn solve_min_variance(
  mu: &Array1<f64>,
  cov: &Array2<f64>,
  target_return: f64,
  max_allocation: f64,
  settings: &SolverSettings,
) -> Result<QpSolve> {
  let n = mu.len();
  if n == 0 {
    bail!("mean return vector is empty");
  }
  if cov.nrows() != n || cov.ncols() != n {
    bail!(
      "covariance matrix is {}x{} but {} assets were supplied",
      cov.nrows(),
      cov.ncols(),
      n
    );
  }
  if !max_allocation.is_finite() || max_allocation <= 0.0 {
    bail!("max_allocation must be positive, got {max_allocation}");
  }
  if !target_return.is_finite() {
    bail!("target_return must be finite, got {target_return}");
  }

  // Clarabel minimizes (1/2) wᵀPw + qᵀw, so P = 2Σ (upper triangle).
  let p = upper_triangular_csc(cov, 2.0);
  let q = vec![0.0; n];
  let (a, b) = stuff_constraints(mu, target_return, max_allocation);
  let cones = [
    SupportedConeT::ZeroConeT(1),
    SupportedConeT::NonnegativeConeT(2 * n + 1),
  ];

  let clarabel_settings = DefaultSettingsBuilder::default()
    .verbose(settings.verbose)
    .max_iter(settings.max_iter)
    .time_limit(settings.time_limit)
    .tol_gap_abs(settings.tol_gap_abs)
    .tol_gap_rel(settings.tol_gap_rel)
    .build()
    .expect("solver settings must build");

  let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, clarabel_settings);
  solver.solve();

  let status: SolveStatus = solver.solution.status.into();
  let solve_time = solver.solution.solve_time;
  let iterations = solver.info.iterations;

  if status == SolveStatus::Optimal {
    let w = Array1::from_iter(solver.solution.x.iter().copied());
    let objective = w.dot(&cov.dot(&w));

    Ok(QpSolve {
      status,
      weights: Some(solver.solution.x.clone()),
      objective: Some(objective),
      solve_time,
      iterations,
    })
  } else {
    Ok(QpSolve {
      status,
      weights: None,
      objective: None,
      solve_time,
      iterations,
    })
  }
}

/// Upper triangle of `scale * m` in compressed sparse column form.
fn upper_triangular_csc(m: &Array2<f64>, scale: f64) -> CscMatrix<f64> {
  let n = m.ncols();
  let mut colptr = Vec::with_capacity(n + 1);
  let mut rowval = Vec::new();
  let mut nzval = Vec::new();

  colptr.push(0);
  for j in 0..n {
    for i in 0..=j {
      let v = scale * m[[i, j]];
      if v != 0.0 {
        rowval.push(i);
        nzval.push(v);
      }
    }
    colptr.push(rowval.len());
  }

  CscMatrix::new(n, n, colptr, rowval, nzval)
}

/// Constraint matrix and right-hand side in `Aw + s = b` form.
///
/// Row 0 (zero cone): `1ᵀw = 1`. Nonnegative-cone rows: `-μᵀw <= -r`,
/// `-w <= 0`, `w <= cap`.
fn stuff_constraints(
  mu: &Array1<f64>,
  target_return: f64,
  max_allocation: f64,
) -> (CscMatrix<f64>, Vec<f64>) {
  let n = mu.len();
  let n_rows = 2 * n + 2;

  let mut colptr = Vec::with_capacity(n + 1);
  let mut rowval = Vec::with_capacity(4 * n);
  let mut nzval = Vec::with_capacity(4 * n);

  colptr.push(0);
  for j in 0..n {
    rowval.push(0);
    nzval.push(1.0);
    rowval.push(1);
    nzval.push(-mu[j]);
    rowval.push(2 + j);
    nzval.push(-1.0);
    rowval.push(2 + n + j);
    nzval.push(1.0);
    colptr.push(rowval.len());
  }

  let mut b = vec![0.0; n_rows];
  b[0] = 1.0;
  b[1] = -target_return;
  for i in 0..n {
    b[2 + n + i] = max_allocation;
  }

  (CscMatrix::new(n_rows, n, colptr, rowval, nzval), b)
}
