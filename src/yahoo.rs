//! # Yahoo
//!
//! $$
//! (\text{tickers}, \text{range}) \mapsto P_{t,i}
//! $$
//!
//! Adjusted-close price fetch from Yahoo Finance. The fetch is all or
//! nothing: any per-ticker failure aborts the whole request, so the rest
//! of the pipeline never sees a partially loaded table. Retry policy is
//! left to the data source.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use chrono::NaiveDate;
use time::OffsetDateTime;
use yahoo_finance_api::YahooConnector;

use crate::series::PriceTable;

/// Fetch adjusted closes for `tickers` over a Yahoo lookback range
/// (`"1mo"`, `"1y"`, `"5y"`, `"max"`, ...), merged on the union of
/// trading dates. Dates an asset did not trade are left missing for the
/// gap-fill stage downstream.
pub fn fetch_price_table(tickers: &[&str], range: &str) -> Result<PriceTable> {
  if tickers.is_empty() {
    bail!("ticker list is empty");
  }

  let provider = YahooConnector::new().context("failed to build Yahoo Finance client")?;

  let mut series: Vec<BTreeMap<NaiveDate, f64>> = Vec::with_capacity(tickers.len());
  for ticker in tickers {
    let response = provider
      .get_quote_range(ticker, "1d", range)
      .with_context(|| format!("failed to fetch quotes for {ticker}"))?;
    let quotes = response
      .quotes()
      .with_context(|| format!("malformed quote response for {ticker}"))?;

    let mut by_date = BTreeMap::new();
    for quote in quotes {
      if quote.adjclose.is_finite() && quote.adjclose > 0.0 {
        by_date.insert(to_trading_date(quote.timestamp)?, quote.adjclose);
      }
    }
    if by_date.is_empty() {
      bail!("no usable quotes for {ticker} in range {range}");
    }
    series.push(by_date);
  }

  let dates: BTreeSet<NaiveDate> = series.iter().flat_map(|s| s.keys().copied()).collect();
  let dates: Vec<NaiveDate> = dates.into_iter().collect();
  let prices: Vec<Vec<Option<f64>>> = dates
    .iter()
    .map(|date| series.iter().map(|s| s.get(date).copied()).collect())
    .collect();

  PriceTable::new(
    dates,
    tickers.iter().map(|t| t.to_string()).collect(),
    prices,
  )
}

fn to_trading_date(timestamp: u64) -> Result<NaiveDate> {
  let dt = OffsetDateTime::from_unix_timestamp(timestamp as i64)
    .context("quote timestamp out of range")?;
  NaiveDate::from_ymd_opt(dt.year(), u32::from(u8::from(dt.month())), u32::from(dt.day()))
    .context("quote timestamp is not a calendar date")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unix_timestamps_map_to_trading_dates() {
    // 2021-03-01 14:30:00 UTC
    let date = to_trading_date(1_614_609_000).expect("valid timestamp");
    assert_eq!(
      date,
      NaiveDate::from_ymd_opt(2021, 3, 1).expect("valid date")
    );
  }

  #[test]
  fn empty_ticker_list_is_rejected() {
    assert!(fetch_price_table(&[], "1mo").is_err());
  }
}
