//! # Price Table
//!
//! $$
//! P_{t,i} \in \mathbb{R}_{>0} \cup \{\text{missing}\}
//! $$
//!
//! Adjusted-close price observations on a shared trading calendar, with
//! gap filling and calendar-period resampling.

use anyhow::bail;
use anyhow::Result;
use chrono::Datelike;
use chrono::NaiveDate;
use ndarray::Array2;

use super::returns::ReturnTable;
use crate::stats::SamplePeriod;

/// Adjusted-close prices, one row per trading date, one column per ticker.
///
/// Missing observations (an asset not yet listed, a data gap) are `None`
/// until [`PriceTable::fill_missing`] is applied. Dates are strictly
/// ascending and tickers unique.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceTable {
  dates: Vec<NaiveDate>,
  tickers: Vec<String>,
  prices: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
  /// Build a price table, validating shape and ordering invariants.
  pub fn new(
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    prices: Vec<Vec<Option<f64>>>,
  ) -> Result<Self> {
    if tickers.is_empty() {
      bail!("price table requires at least one ticker");
    }
    for pair in dates.windows(2) {
      if pair[1] <= pair[0] {
        bail!("price table dates must be strictly ascending: {} then {}", pair[0], pair[1]);
      }
    }
    for (i, t) in tickers.iter().enumerate() {
      if tickers[..i].contains(t) {
        bail!("duplicate ticker in price table: {t}");
      }
    }
    if prices.len() != dates.len() {
      bail!(
        "price table has {} rows but {} dates",
        prices.len(),
        dates.len()
      );
    }
    for (row, date) in prices.iter().zip(dates.iter()) {
      if row.len() != tickers.len() {
        bail!(
          "price row for {date} has {} cells but {} tickers",
          row.len(),
          tickers.len()
        );
      }
      for (cell, ticker) in row.iter().zip(tickers.iter()) {
        if let Some(p) = cell {
          if !p.is_finite() || *p <= 0.0 {
            bail!("non-positive price {p} for {ticker} on {date}");
          }
        }
      }
    }

    Ok(Self {
      dates,
      tickers,
      prices,
    })
  }

  /// Trading dates, ascending.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Ticker per column.
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  /// Number of dates (rows).
  pub fn n_dates(&self) -> usize {
    self.dates.len()
  }

  /// Number of assets (columns).
  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  /// Cell accessor; `None` when the observation is missing.
  pub fn get(&self, row: usize, col: usize) -> Option<f64> {
    self.prices[row][col]
  }

  /// Whether every cell holds an observation.
  pub fn is_complete(&self) -> bool {
    self.prices.iter().all(|row| row.iter().all(Option::is_some))
  }

  /// Replace each missing cell with the most recent prior observation of
  /// the same asset. Leading gaps are left untouched.
  pub fn forward_fill(&self) -> Self {
    let mut prices = self.prices.clone();
    for col in 0..self.n_assets() {
      let mut last = None;
      for row in prices.iter_mut() {
        match row[col] {
          Some(p) => last = Some(p),
          None => row[col] = last,
        }
      }
    }

    Self {
      dates: self.dates.clone(),
      tickers: self.tickers.clone(),
      prices,
    }
  }

  /// Replace each missing cell with the next later observation of the
  /// same asset. Trailing gaps are left untouched.
  pub fn back_fill(&self) -> Self {
    let mut prices = self.prices.clone();
    for col in 0..self.n_assets() {
      let mut next = None;
      for row in prices.iter_mut().rev() {
        match row[col] {
          Some(p) => next = Some(p),
          None => row[col] = next,
        }
      }
    }

    Self {
      dates: self.dates.clone(),
      tickers: self.tickers.clone(),
      prices,
    }
  }

  /// Forward-fill, then back-fill any still-missing leading cells.
  ///
  /// The fill order gives forward-fill precedence: a mid-series gap takes
  /// the prior value, never the next one. Values fabricated for genuinely
  /// absent history are a documented approximation of this pipeline.
  /// Errors when a ticker has no observation at all.
  pub fn fill_missing(&self) -> Result<Self> {
    let filled = self.forward_fill().back_fill();
    for (col, ticker) in filled.tickers.iter().enumerate() {
      if filled.prices.iter().all(|row| row[col].is_none()) {
        bail!("no price observations for {ticker}; cannot gap-fill");
      }
    }

    Ok(filled)
  }

  /// Resample to one row per calendar period, keeping the last known
  /// observation in each period, then forward-fill across periods to
  /// close resampling gaps. Rows are labeled with the last in-period
  /// trading date.
  pub fn resample(&self, period: SamplePeriod) -> Self {
    let mut dates = Vec::new();
    let mut prices: Vec<Vec<Option<f64>>> = Vec::new();
    let mut current_key: Option<(i32, u32)> = None;

    for (row_idx, date) in self.dates.iter().enumerate() {
      let key = period_key(*date, period);
      if current_key != Some(key) {
        current_key = Some(key);
        dates.push(*date);
        prices.push(vec![None; self.n_assets()]);
      }
      let out = prices.last_mut().expect("a period row was just pushed");
      *dates.last_mut().expect("a period row was just pushed") = *date;
      for col in 0..self.n_assets() {
        if let Some(p) = self.prices[row_idx][col] {
          out[col] = Some(p);
        }
      }
    }

    let resampled = Self {
      dates,
      tickers: self.tickers.clone(),
      prices,
    };
    resampled.forward_fill()
  }

  /// Periodic fractional returns, `P_t / P_{t-1} - 1` per asset.
  ///
  /// The first period is dropped (no antecedent). Requires a complete
  /// table; gap-fill first.
  pub fn returns(&self) -> Result<ReturnTable> {
    if !self.is_complete() {
      bail!("price table has missing observations; gap-fill before computing returns");
    }
    if self.n_dates() < 2 {
      bail!(
        "need at least two periods to compute returns, got {}",
        self.n_dates()
      );
    }

    let n_periods = self.n_dates() - 1;
    let n_assets = self.n_assets();
    let mut values = Array2::zeros((n_periods, n_assets));
    for t in 0..n_periods {
      for i in 0..n_assets {
        let prev = self.prices[t][i].expect("table verified complete");
        let curr = self.prices[t + 1][i].expect("table verified complete");
        values[[t, i]] = curr / prev - 1.0;
      }
    }

    ReturnTable::new(self.dates[1..].to_vec(), self.tickers.clone(), values)
  }

  /// Gap-fill, resample to `period` and compute periodic returns in one
  /// pass. This is the standard pipeline from raw adjusted closes to a
  /// return table.
  pub fn periodic_returns(&self, period: SamplePeriod) -> Result<ReturnTable> {
    self.fill_missing()?.resample(period).returns()
  }

  /// Cumulative return from each purchase date until the final date,
  /// `P_last / P_t - 1`. The final row is dropped (zero by construction).
  /// Requires a complete table.
  pub fn total_return_by_day(&self) -> Result<ReturnTable> {
    if !self.is_complete() {
      bail!("price table has missing observations; gap-fill before computing returns");
    }
    if self.n_dates() < 2 {
      bail!(
        "need at least two periods to compute returns, got {}",
        self.n_dates()
      );
    }

    let n_periods = self.n_dates() - 1;
    let n_assets = self.n_assets();
    let last_row = self.n_dates() - 1;
    let mut values = Array2::zeros((n_periods, n_assets));
    for t in 0..n_periods {
      for i in 0..n_assets {
        let last = self.prices[last_row][i].expect("table verified complete");
        let here = self.prices[t][i].expect("table verified complete");
        values[[t, i]] = last / here - 1.0;
      }
    }

    ReturnTable::new(
      self.dates[..last_row].to_vec(),
      self.tickers.clone(),
      values,
    )
  }
}

fn period_key(date: NaiveDate, period: SamplePeriod) -> (i32, u32) {
  match period {
    SamplePeriod::Monthly => (date.year(), date.month()),
    SamplePeriod::Weekly => {
      let week = date.iso_week();
      (week.year(), week.week())
    }
    SamplePeriod::Daily => (date.year(), date.ordinal()),
  }
}
