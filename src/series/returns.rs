//! # Return Table
//!
//! $$
//! R \in \mathbb{R}^{T \times N}
//! $$
//!
//! Periodic fractional returns, one row per sampled period, one column
//! per asset.

use anyhow::bail;
use anyhow::Result;
use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

/// Fractional returns per period and asset, in the column order of the
/// price table they were derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnTable {
  dates: Vec<NaiveDate>,
  tickers: Vec<String>,
  values: Array2<f64>,
}

impl ReturnTable {
  /// Build a return table, validating shape invariants.
  pub fn new(dates: Vec<NaiveDate>, tickers: Vec<String>, values: Array2<f64>) -> Result<Self> {
    if tickers.is_empty() {
      bail!("return table requires at least one ticker");
    }
    if values.nrows() != dates.len() {
      bail!(
        "return table has {} rows but {} dates",
        values.nrows(),
        dates.len()
      );
    }
    if values.ncols() != tickers.len() {
      bail!(
        "return table has {} columns but {} tickers",
        values.ncols(),
        tickers.len()
      );
    }
    if values.iter().any(|v| !v.is_finite()) {
      bail!("return table contains non-finite values");
    }

    Ok(Self {
      dates,
      tickers,
      values,
    })
  }

  /// Period-end dates, ascending.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Ticker per column.
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  /// Number of sampled periods (rows).
  pub fn n_periods(&self) -> usize {
    self.values.nrows()
  }

  /// Number of assets (columns).
  pub fn n_assets(&self) -> usize {
    self.values.ncols()
  }

  /// The full periods-by-assets return matrix.
  pub fn values(&self) -> &Array2<f64> {
    &self.values
  }

  /// Return series of a single asset.
  pub fn column(&self, asset: usize) -> Array1<f64> {
    self.values.index_axis(Axis(1), asset).to_owned()
  }
}
