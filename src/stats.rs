//! # Stats
//!
//! $$
//! \hat\Sigma_{ij} = \frac{1}{T-1}\sum_{t=1}^{T}(r_{t,i}-\bar r_i)(r_{t,j}-\bar r_j)
//! $$
//!
//! Descriptive statistics over return tables and Sharpe-ratio
//! annualization.

use anyhow::bail;
use anyhow::Result;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

use crate::series::ReturnTable;

/// Declared sampling period of a return table.
///
/// Drives the Sharpe-ratio annualization coefficient and the risk-free
/// rate rescaling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplePeriod {
  #[default]
  Monthly,
  Weekly,
  Daily,
}

impl SamplePeriod {
  /// Parse a period label.
  ///
  /// Unrecognized labels are an error rather than a silent monthly
  /// fallback, so a caller typo cannot skew every annualized figure.
  pub fn parse(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "m" | "monthly" | "month" => Ok(Self::Monthly),
      "w" | "weekly" | "week" => Ok(Self::Weekly),
      "d" | "daily" | "day" => Ok(Self::Daily),
      other => bail!("unrecognized sampling period: {other:?} (expected M, W or D)"),
    }
  }

  /// Sampling periods per year: 12, 52 or 252.
  pub fn periods_per_year(&self) -> f64 {
    match self {
      Self::Monthly => 12.0,
      Self::Weekly => 52.0,
      Self::Daily => 252.0,
    }
  }

  /// Annualization coefficient `sqrt(periods_per_year)`.
  pub fn annualization(&self) -> f64 {
    self.periods_per_year().sqrt()
  }
}

/// Per-asset mean return.
pub fn mean_returns(table: &ReturnTable) -> Array1<f64> {
  table
    .values()
    .mean_axis(Axis(0))
    .unwrap_or_else(|| Array1::zeros(table.n_assets()))
}

/// Per-asset unbiased sample variance.
pub fn variances(table: &ReturnTable) -> Array1<f64> {
  let n = table.n_periods();
  if n < 2 {
    return Array1::zeros(table.n_assets());
  }

  let mean = mean_returns(table);
  let centered = table.values() - &mean;
  centered.mapv(|d| d * d).sum_axis(Axis(0)) / (n - 1) as f64
}

/// Per-asset standard deviation (risk).
pub fn std_devs(table: &ReturnTable) -> Array1<f64> {
  variances(table).mapv(f64::sqrt)
}

/// Unbiased sample covariance matrix, symmetric and positive
/// semi-definite by construction.
pub fn covariance(table: &ReturnTable) -> Array2<f64> {
  let n = table.n_periods();
  let n_assets = table.n_assets();
  if n < 2 {
    return Array2::zeros((n_assets, n_assets));
  }

  let mean = mean_returns(table);
  let centered = table.values() - &mean;
  centered.t().dot(&centered) / (n - 1) as f64
}

/// Per-asset annualized Sharpe ratio.
///
/// `risk_free` is an annual rate; it is rescaled to the sampling period
/// before the excess return is taken.
pub fn sharpe_ratios(table: &ReturnTable, period: SamplePeriod, risk_free: f64) -> Array1<f64> {
  let coef = period.annualization();
  let rf_period = risk_free / period.periods_per_year();
  let mean = mean_returns(table);
  let std = std_devs(table);

  Array1::from_iter(mean.iter().zip(std.iter()).map(|(&m, &s)| {
    if s > 1e-15 {
      coef * (m - rf_period) / s
    } else {
      0.0
    }
  }))
}

/// Realized portfolio return series: the per-period weighted sum of
/// asset returns.
pub fn portfolio_return_series(table: &ReturnTable, weights: &[f64]) -> Result<Array1<f64>> {
  if weights.len() != table.n_assets() {
    bail!(
      "weight vector has {} entries but the return table has {} assets",
      weights.len(),
      table.n_assets()
    );
  }

  let w = Array1::from_iter(weights.iter().copied());
  Ok(table.values().dot(&w))
}

/// Annualized Sharpe ratio of a weighted portfolio, computed from the
/// realized weighted-return series rather than from per-asset moments.
pub fn portfolio_sharpe(
  table: &ReturnTable,
  weights: &[f64],
  period: SamplePeriod,
  risk_free: f64,
) -> Result<f64> {
  let series = portfolio_return_series(table, weights)?;
  let n = series.len();
  if n < 2 {
    return Ok(0.0);
  }

  let mean = series.sum() / n as f64;
  let var = series.mapv(|r| (r - mean) * (r - mean)).sum() / (n - 1) as f64;
  let std = var.sqrt();
  if std <= 1e-15 {
    return Ok(0.0);
  }

  let rf_period = risk_free / period.periods_per_year();
  Ok(period.annualization() * (mean - rf_period) / std)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::NaiveDate;
  use ndarray::array;
  use ndarray::Array2;

  use super::*;

  fn table(values: Array2<f64>) -> ReturnTable {
    let dates: Vec<NaiveDate> = (0..values.nrows() as u32)
      .map(|i| {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid test date")
          + chrono::Days::new(u64::from(i))
      })
      .collect();
    let tickers: Vec<String> = (0..values.ncols()).map(|i| format!("T{i}")).collect();
    ReturnTable::new(dates, tickers, values).expect("valid test table")
  }

  #[test]
  fn mean_and_variance_use_unbiased_estimators() {
    let t = table(array![[0.01], [0.03], [0.05]]);
    let mean = mean_returns(&t);
    let var = variances(&t);

    assert_abs_diff_eq!(mean[0], 0.03, epsilon = 1e-12);
    assert_abs_diff_eq!(var[0], 0.0004, epsilon = 1e-12);
    assert_abs_diff_eq!(std_devs(&t)[0], 0.02, epsilon = 1e-12);
  }

  #[test]
  fn covariance_matrix_is_symmetric_with_variance_diagonal() {
    let t = table(array![
      [0.01, -0.02],
      [0.03, 0.01],
      [-0.01, 0.04],
      [0.02, -0.03]
    ]);
    let cov = covariance(&t);
    let var = variances(&t);

    assert_abs_diff_eq!(cov[[0, 1]], cov[[1, 0]], epsilon = 1e-15);
    assert_abs_diff_eq!(cov[[0, 0]], var[0], epsilon = 1e-15);
    assert_abs_diff_eq!(cov[[1, 1]], var[1], epsilon = 1e-15);
  }

  #[test]
  fn sharpe_uses_monthly_annualization() {
    let t = table(array![[0.01], [0.03], [0.05]]);
    let sharpe = sharpe_ratios(&t, SamplePeriod::Monthly, 0.0);
    assert_abs_diff_eq!(sharpe[0], 12f64.sqrt() * 0.03 / 0.02, epsilon = 1e-12);
  }

  #[test]
  fn sharpe_rescales_annual_risk_free_rate() {
    let t = table(array![[0.01], [0.03], [0.05]]);
    let sharpe = sharpe_ratios(&t, SamplePeriod::Monthly, 0.12);
    assert_abs_diff_eq!(
      sharpe[0],
      12f64.sqrt() * (0.03 - 0.01) / 0.02,
      epsilon = 1e-12
    );
  }

  #[test]
  fn parse_accepts_known_labels_and_rejects_others() {
    assert_eq!(
      SamplePeriod::parse("M").expect("monthly"),
      SamplePeriod::Monthly
    );
    assert_eq!(
      SamplePeriod::parse("weekly").expect("weekly"),
      SamplePeriod::Weekly
    );
    assert_eq!(SamplePeriod::parse("d").expect("daily"), SamplePeriod::Daily);
    assert!(SamplePeriod::parse("quarterly").is_err());
  }

  #[test]
  fn portfolio_series_is_weighted_sum() {
    let t = table(array![[0.01, 0.03], [0.02, -0.01]]);
    let series = portfolio_return_series(&t, &[0.25, 0.75]).expect("matching width");
    assert_abs_diff_eq!(series[0], 0.25 * 0.01 + 0.75 * 0.03, epsilon = 1e-12);
    assert_abs_diff_eq!(series[1], 0.25 * 0.02 - 0.75 * 0.01, epsilon = 1e-12);
  }

  #[test]
  fn single_asset_portfolio_sharpe_matches_per_asset_sharpe() {
    let t = table(array![[0.01], [0.03], [0.05], [0.02]]);
    let per_asset = sharpe_ratios(&t, SamplePeriod::Monthly, 0.0);
    let portfolio =
      portfolio_sharpe(&t, &[1.0], SamplePeriod::Monthly, 0.0).expect("matching width");
    assert_abs_diff_eq!(portfolio, per_asset[0], epsilon = 1e-12);
  }

  #[test]
  fn portfolio_sharpe_rejects_wrong_width() {
    let t = table(array![[0.01, 0.02]]);
    assert!(portfolio_sharpe(&t, &[1.0], SamplePeriod::Monthly, 0.0).is_err());
  }
}
