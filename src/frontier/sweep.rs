//! # Frontier Sweep
//!
//! $$
//! r_k = \frac{k}{K-1}\max_i \mu_i,\qquad k = 0,\dots,K-1
//! $$
//!
//! Traces the efficient frontier by solving one capped minimum-variance
//! program per target return on an evenly spaced grid. The sweep is
//! best-effort: infeasible grid points contribute no portfolio, but they
//! are reported back as explicit gaps instead of silently vanishing.

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use tracing::debug;

use super::solver::solve_min_variance;
use super::solver::SolverSettings;
use super::solver::SolveStatus;
use crate::series::ReturnTable;
use crate::stats;
use crate::stats::SamplePeriod;

/// Runtime configuration for the frontier sweep.
#[derive(Clone, Debug)]
pub struct FrontierConfig {
  /// Maximum allocation per asset (diversification cap).
  pub max_allocation: f64,
  /// Number of target-return grid points.
  pub num_points: usize,
  /// Annual risk-free rate used in Sharpe computations.
  pub risk_free: f64,
  /// Sampling period of the return table.
  pub period: SamplePeriod,
  /// Settings forwarded to every solve.
  pub solver: SolverSettings,
}

impl Default for FrontierConfig {
  fn default() -> Self {
    Self {
      max_allocation: 0.3,
      num_points: 50,
      risk_free: 0.0,
      period: SamplePeriod::Monthly,
      solver: SolverSettings::default(),
    }
  }
}

/// One successfully solved point on the efficient frontier.
#[derive(Clone, Debug)]
pub struct FrontierPoint {
  /// Target expected return of the grid point.
  pub target_return: f64,
  /// Optimal weights, one per asset in return-table column order.
  pub weights: Vec<f64>,
  /// Realized expected return `μᵀw`.
  pub expected_return: f64,
  /// Realized risk `sqrt(wᵀΣw)`.
  pub risk: f64,
  /// Annualized Sharpe ratio of the realized weighted-return series.
  pub sharpe: f64,
}

/// A grid point that produced no portfolio, with the solver status that
/// dropped it.
#[derive(Clone, Copy, Debug)]
pub struct SkippedPoint {
  /// Target expected return of the grid point.
  pub target_return: f64,
  /// Why the point was dropped.
  pub status: SolveStatus,
}

/// Frontier sweep output: solved points in ascending grid order plus the
/// gaps left by infeasible or failed grid points.
#[derive(Clone, Debug, Default)]
pub struct FrontierSweep {
  /// Solved frontier points.
  pub points: Vec<FrontierPoint>,
  /// Grid points dropped from the frontier.
  pub skipped: Vec<SkippedPoint>,
}

impl FrontierSweep {
  /// Number of solved points.
  pub fn len(&self) -> usize {
    self.points.len()
  }

  /// Whether no grid point solved.
  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// The solved point with the highest Sharpe ratio.
  pub fn max_sharpe(&self) -> Option<&FrontierPoint> {
    self
      .points
      .iter()
      .max_by(|a, b| a.sharpe.total_cmp(&b.sharpe))
  }

  /// Realized risks of the solved points.
  pub fn risks(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.risk).collect()
  }

  /// Realized expected returns of the solved points.
  pub fn expected_returns(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.expected_return).collect()
  }

  /// Sharpe ratios of the solved points.
  pub fn sharpes(&self) -> Vec<f64> {
    self.points.iter().map(|p| p.sharpe).collect()
  }
}

/// Single-target convenience solve outcome.
#[derive(Clone, Debug)]
pub struct TargetPortfolio {
  /// Termination status of the underlying solve.
  pub status: SolveStatus,
  /// The optimal portfolio, when the target is achievable.
  pub portfolio: Option<FrontierPoint>,
}

fn validate(table: &ReturnTable, config: &FrontierConfig) -> Result<()> {
  if table.n_periods() < 2 {
    bail!(
      "need at least two return periods to estimate risk, got {}",
      table.n_periods()
    );
  }
  if config.num_points == 0 {
    bail!("num_points must be at least 1");
  }
  if !config.max_allocation.is_finite() || config.max_allocation <= 0.0 {
    bail!("max_allocation must be positive, got {}", config.max_allocation);
  }
  if (table.n_assets() as f64) * config.max_allocation < 1.0 - 1e-12 {
    bail!(
      "max_allocation {} over {} assets cannot sum to a full allocation",
      config.max_allocation,
      table.n_assets()
    );
  }

  Ok(())
}

fn solved_point(
  table: &ReturnTable,
  config: &FrontierConfig,
  mu: &Array1<f64>,
  target_return: f64,
  weights: Vec<f64>,
  variance: f64,
) -> Result<FrontierPoint> {
  let expected_return = weights.iter().zip(mu.iter()).map(|(w, m)| w * m).sum();
  let risk = variance.max(0.0).sqrt();
  let sharpe = stats::portfolio_sharpe(table, &weights, config.period, config.risk_free)?;

  Ok(FrontierPoint {
    target_return,
    weights,
    expected_return,
    risk,
    sharpe,
  })
}

/// Trace the efficient frontier over `num_points` evenly spaced target
/// returns from zero to the best per-asset mean return.
///
/// Each grid point is an independent minimum-variance solve; feasible
/// optima become [`FrontierPoint`]s, everything else is recorded in
/// [`FrontierSweep::skipped`]. Output preserves ascending grid order.
pub fn compute_frontier(table: &ReturnTable, config: &FrontierConfig) -> Result<FrontierSweep> {
  validate(table, config)?;

  let mu = stats::mean_returns(table);
  let cov = stats::covariance(table);
  let max_return = *mu.max().context("mean return vector is empty")?;
  let grid = Array1::linspace(0.0, max_return, config.num_points);

  let mut sweep = FrontierSweep::default();
  for (idx, &target_return) in grid.iter().enumerate() {
    let solve = solve_min_variance(
      &mu,
      &cov,
      target_return,
      config.max_allocation,
      &config.solver,
    )?;

    match (solve.status, solve.weights, solve.objective) {
      (SolveStatus::Optimal, Some(weights), Some(variance)) => {
        let point = solved_point(table, config, &mu, target_return, weights, variance)?;
        debug!(
          "frontier point {idx}: target {:.6}, risk {:.6}, sharpe {:.4}",
          target_return, point.risk, point.sharpe
        );
        sweep.points.push(point);
      }
      (status, _, _) => {
        debug!("skipping frontier point {idx}: target {target_return:.6} ({status:?})");
        sweep.skipped.push(SkippedPoint {
          target_return,
          status,
        });
      }
    }
  }

  Ok(sweep)
}

/// Solve for the minimum-variance portfolio achieving one explicit
/// target return, without sweeping a grid.
pub fn optimize_for_target(
  table: &ReturnTable,
  target_return: f64,
  config: &FrontierConfig,
) -> Result<TargetPortfolio> {
  validate(table, config)?;

  let mu = stats::mean_returns(table);
  let cov = stats::covariance(table);
  let solve = solve_min_variance(
    &mu,
    &cov,
    target_return,
    config.max_allocation,
    &config.solver,
  )?;

  match (solve.status, solve.weights, solve.objective) {
    (SolveStatus::Optimal, Some(weights), Some(variance)) => Ok(TargetPortfolio {
      status: SolveStatus::Optimal,
      portfolio: Some(solved_point(
        table,
        config,
        &mu,
        target_return,
        weights,
        variance,
      )?),
    }),
    (status, _, _) => Ok(TargetPortfolio {
      status,
      portfolio: None,
    }),
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;
  use ndarray::Array2;
  use rand::rngs::StdRng;
  use rand::Rng;
  use rand::SeedableRng;
  use rand_distr::Normal;

  use super::*;
  use crate::series::ReturnTable;

  fn table(values: Array2<f64>) -> ReturnTable {
    let dates: Vec<NaiveDate> = (0..values.nrows() as u32)
      .map(|i| {
        NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid test date")
          + chrono::Days::new(u64::from(i))
      })
      .collect();
    let tickers: Vec<String> = (0..values.ncols()).map(|i| format!("T{i}")).collect();
    ReturnTable::new(dates, tickers, values).expect("valid test table")
  }

  fn synthetic_table(n_assets: usize, n_periods: usize) -> ReturnTable {
    let mut rng = StdRng::seed_from_u64(7);
    let mut values = Array2::zeros((n_periods, n_assets));
    for i in 0..n_assets {
      let drift = 0.004 + 0.004 * i as f64;
      let vol = 0.02 + 0.01 * i as f64;
      let dist = Normal::new(drift, vol).expect("valid normal");
      for t in 0..n_periods {
        values[[t, i]] = rng.sample(dist);
      }
    }
    table(values)
  }

  #[test]
  fn sweep_weights_stay_within_bounds_and_sum_to_one() {
    let t = synthetic_table(5, 60);
    let config = FrontierConfig {
      num_points: 20,
      ..FrontierConfig::default()
    };
    let sweep = compute_frontier(&t, &config).expect("valid input");
    assert!(!sweep.is_empty());

    for point in &sweep.points {
      let sum: f64 = point.weights.iter().sum();
      assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
      for &w in &point.weights {
        assert!(w >= -1e-6, "weight {w} below zero");
        assert!(w <= config.max_allocation + 1e-6, "weight {w} above cap");
      }
    }
  }

  #[test]
  fn realized_risk_is_monotone_in_target_return() {
    let t = synthetic_table(4, 80);
    let config = FrontierConfig {
      num_points: 25,
      max_allocation: 0.5,
      ..FrontierConfig::default()
    };
    let sweep = compute_frontier(&t, &config).expect("valid input");
    assert!(sweep.len() >= 2);

    for pair in sweep.points.windows(2) {
      assert!(
        pair[1].risk >= pair[0].risk - 1e-6,
        "risk decreased along the frontier: {} then {}",
        pair[0].risk,
        pair[1].risk
      );
    }
  }

  #[test]
  fn zero_target_grid_point_is_always_feasible() {
    let t = synthetic_table(3, 40);
    let config = FrontierConfig {
      num_points: 10,
      max_allocation: 0.5,
      ..FrontierConfig::default()
    };
    let sweep = compute_frontier(&t, &config).expect("valid input");

    let first = sweep.points.first().expect("zero target solves");
    assert_abs_diff_eq!(first.target_return, 0.0, epsilon = 1e-12);
    assert!(sweep
      .skipped
      .iter()
      .all(|s| s.target_return > 0.0));
  }

  #[test]
  fn tight_cap_reports_unreachable_targets_as_gaps() {
    // Cap 0.4 over three assets: the top of the grid (the best single
    // asset's mean) is unreachable, so the sweep must report gaps.
    let t = table(ndarray::array![
      [0.012, 0.021, 0.035],
      [0.008, 0.018, 0.024],
      [0.011, 0.022, 0.031],
      [0.009, 0.019, 0.028],
      [0.012, 0.020, 0.033],
      [0.010, 0.021, 0.029]
    ]);
    let config = FrontierConfig {
      num_points: 30,
      max_allocation: 0.4,
      ..FrontierConfig::default()
    };
    let sweep = compute_frontier(&t, &config).expect("valid input");

    assert!(!sweep.points.is_empty());
    assert!(!sweep.skipped.is_empty());
    for skipped in &sweep.skipped {
      assert_eq!(skipped.status, SolveStatus::Infeasible);
    }
    assert_eq!(
      sweep.points.len() + sweep.skipped.len(),
      config.num_points
    );
  }

  #[test]
  fn single_asset_portfolio_reproduces_asset_moments() {
    let t = table(ndarray::array![[0.01], [0.03], [0.05], [0.02], [0.04]]);
    let config = FrontierConfig {
      max_allocation: 1.0,
      ..FrontierConfig::default()
    };
    let solve = optimize_for_target(&t, 0.02, &config).expect("valid input");

    assert_eq!(solve.status, SolveStatus::Optimal);
    let point = solve.portfolio.expect("feasible target");
    assert_abs_diff_eq!(point.weights[0], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(point.expected_return, 0.03, epsilon = 1e-6);

    let expected_std = crate::stats::std_devs(&t)[0];
    assert_abs_diff_eq!(point.risk, expected_std, epsilon = 1e-6);
  }

  #[test]
  fn unreachable_single_target_reports_status() {
    let t = table(ndarray::array![[0.01, 0.02], [0.02, 0.01], [0.015, 0.03]]);
    let config = FrontierConfig {
      max_allocation: 1.0,
      ..FrontierConfig::default()
    };
    let solve = optimize_for_target(&t, 0.5, &config).expect("valid input");

    assert_eq!(solve.status, SolveStatus::Infeasible);
    assert!(solve.portfolio.is_none());
  }

  #[test]
  fn cap_too_small_for_full_allocation_is_an_error() {
    let t = synthetic_table(3, 20);
    let config = FrontierConfig {
      max_allocation: 0.2,
      ..FrontierConfig::default()
    };
    assert!(compute_frontier(&t, &config).is_err());
  }

  #[test]
  fn max_sharpe_picks_the_best_point() {
    let t = synthetic_table(4, 60);
    let config = FrontierConfig {
      num_points: 15,
      max_allocation: 0.5,
      ..FrontierConfig::default()
    };
    let sweep = compute_frontier(&t, &config).expect("valid input");

    let best = sweep.max_sharpe().expect("non-empty sweep");
    for point in &sweep.points {
      assert!(point.sharpe <= best.sharpe + 1e-12);
    }
  }
}
