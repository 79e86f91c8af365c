use std::error::Error;

use chrono::Months;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Normal;

use frontier_rs::frontier::compute_frontier;
use frontier_rs::frontier::optimize_for_target;
use frontier_rs::frontier::FrontierConfig;
use frontier_rs::report;
use frontier_rs::series::PriceTable;
use frontier_rs::stats::SamplePeriod;
use frontier_rs::visualization::FrontierChart;

fn main() -> Result<(), Box<dyn Error>> {
  let tickers = ["MMM", "AXP", "AAPL", "BA", "CAT", "CVX"];
  let prices = synthetic_prices(&tickers, 60)?;
  let returns = prices.periodic_returns(SamplePeriod::Monthly)?;

  println!("Per-asset statistics (monthly)");
  report::asset_table(&returns, SamplePeriod::Monthly, 0.0).printstd();

  let config = FrontierConfig::default();
  let req_return = 0.015;
  let target = optimize_for_target(&returns, req_return, &config)?;
  match target.portfolio {
    Some(point) => {
      println!("\nOptimal portfolio for a {:.1}% monthly target", 100.0 * req_return);
      report::allocation_table(returns.tickers(), &point.weights, 1e-4)?.printstd();
      println!("Exp return = {:.4}%", 100.0 * point.expected_return);
      println!("risk       = {:.4}", point.risk);
    }
    None => println!(
      "\nTarget return {:.4} is not achievable: {:?}",
      req_return, target.status
    ),
  }

  let sweep = compute_frontier(&returns, &config)?;
  println!(
    "\nEfficient frontier: {} points solved, {} skipped",
    sweep.len(),
    sweep.skipped.len()
  );
  report::frontier_table(&sweep).printstd();

  if let Some(best) = sweep.max_sharpe() {
    println!("\nBest portfolio by Sharpe ratio ({:.4})", best.sharpe);
    report::allocation_table(returns.tickers(), &best.weights, 1e-4)?.printstd();
  }

  let plot = FrontierChart::new(&sweep)
    .title("Efficient Frontier")
    .with_assets(&returns)
    .plot();
  plot.write_html("target/efficient_frontier.html");
  println!("\nWrote target/efficient_frontier.html");

  Ok(())
}

/// Random-walk adjusted closes with per-asset drift and volatility.
fn synthetic_prices(tickers: &[&str], n_months: usize) -> Result<PriceTable, Box<dyn Error>> {
  let mut rng = StdRng::seed_from_u64(42);
  let start = NaiveDate::from_ymd_opt(2020, 1, 31).ok_or("invalid start date")?;
  let dates: Vec<NaiveDate> = (0..n_months as u32)
    .map(|i| start + Months::new(i))
    .collect();

  let mut prices = vec![vec![None; tickers.len()]; n_months];
  for (col, _) in tickers.iter().enumerate() {
    let drift = 0.002 + 0.004 * col as f64;
    let vol = 0.03 + 0.004 * col as f64;
    let dist = Normal::new(drift, vol)?;

    let mut level: f64 = 100.0;
    for row in prices.iter_mut() {
      // Clamp a single period's loss so the level stays positive.
      let step: f64 = rng.sample(dist);
      level *= 1.0 + step.max(-0.5);
      row[col] = Some(level);
    }
  }

  Ok(PriceTable::new(
    dates,
    tickers.iter().map(|t| t.to_string()).collect(),
    prices,
  )?)
}
