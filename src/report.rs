//! # Report
//!
//! $$
//! w_i \mapsto 100\,w_i\ \%
//! $$
//!
//! Plain-text tables for allocations, per-asset statistics and frontier
//! sweeps. Values are rounded to four decimals for display only; the
//! underlying results keep full precision.

use anyhow::bail;
use anyhow::Result;
use prettytable::row;
use prettytable::Table;

use crate::frontier::FrontierSweep;
use crate::series::ReturnTable;
use crate::stats;
use crate::stats::SamplePeriod;

/// Ticker-to-percentage allocation table.
///
/// Rows with a weight at or below `min_weight` are omitted, so a
/// portfolio that touches only a few names prints only those names.
pub fn allocation_table(tickers: &[String], weights: &[f64], min_weight: f64) -> Result<Table> {
  if tickers.len() != weights.len() {
    bail!(
      "allocation table got {} tickers but {} weights",
      tickers.len(),
      weights.len()
    );
  }

  let mut table = Table::new();
  table.set_titles(row!["Ticker", "Allocation %"]);
  for (ticker, &w) in tickers.iter().zip(weights.iter()) {
    if w > min_weight {
      table.add_row(row![ticker, format!("{:.4}", 100.0 * w)]);
    }
  }

  Ok(table)
}

/// Per-asset mean return, risk and annualized Sharpe ratio.
pub fn asset_table(returns: &ReturnTable, period: SamplePeriod, risk_free: f64) -> Table {
  let mean = stats::mean_returns(returns);
  let std = stats::std_devs(returns);
  let sharpe = stats::sharpe_ratios(returns, period, risk_free);

  let mut table = Table::new();
  table.set_titles(row!["Ticker", "Mean Return", "Risk (std)", "Sharpe"]);
  for (i, ticker) in returns.tickers().iter().enumerate() {
    table.add_row(row![
      ticker,
      format!("{:.4}", mean[i]),
      format!("{:.4}", std[i]),
      format!("{:.4}", sharpe[i])
    ]);
  }

  table
}

/// One row per solved frontier point: target, realized return, risk and
/// Sharpe ratio.
pub fn frontier_table(sweep: &FrontierSweep) -> Table {
  let mut table = Table::new();
  table.set_titles(row!["Target", "Exp Return", "Risk", "Sharpe"]);
  for point in &sweep.points {
    table.add_row(row![
      format!("{:.4}", point.target_return),
      format!("{:.4}", point.expected_return),
      format!("{:.4}", point.risk),
      format!("{:.4}", point.sharpe)
    ]);
  }

  table
}
