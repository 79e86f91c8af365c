//! # Visualization
//!
//! $$
//! (\sigma^\*(r), r) \mapsto \text{frontier chart}
//! $$
//!
//! Plotly rendering of an efficient-frontier sweep: the frontier line
//! with per-point markers, individual assets as risk/return diamonds and
//! portfolio Sharpe ratios on a secondary axis.

use plotly::common::color::NamedColor;
use plotly::common::AxisSide;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::MarkerSymbol;
use plotly::common::Mode;
use plotly::layout::Axis;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;

use crate::frontier::FrontierSweep;
use crate::series::ReturnTable;
use crate::stats;

/// Builder for the efficient-frontier chart.
pub struct FrontierChart<'a> {
  sweep: &'a FrontierSweep,
  title: String,
  line_width: f64,
  assets: Option<AssetMarkers>,
  sharpe_axis: bool,
}

struct AssetMarkers {
  labels: Vec<String>,
  risks: Vec<f64>,
  means: Vec<f64>,
}

impl<'a> FrontierChart<'a> {
  pub fn new(sweep: &'a FrontierSweep) -> Self {
    Self {
      sweep,
      title: "Efficient Frontier".to_string(),
      line_width: 2.0,
      assets: None,
      sharpe_axis: true,
    }
  }

  pub fn title(mut self, title: &str) -> Self {
    self.title = title.into();
    self
  }

  pub fn line_width(mut self, w: f64) -> Self {
    self.line_width = w;
    self
  }

  /// Overlay each asset of `returns` as a risk/return diamond.
  pub fn with_assets(mut self, returns: &ReturnTable) -> Self {
    self.assets = Some(AssetMarkers {
      labels: returns.tickers().to_vec(),
      risks: stats::std_devs(returns).to_vec(),
      means: stats::mean_returns(returns).to_vec(),
    });
    self
  }

  /// Toggle the secondary Sharpe-ratio axis.
  pub fn sharpe_axis(mut self, show: bool) -> Self {
    self.sharpe_axis = show;
    self
  }

  pub fn plot(self) -> Plot {
    let risks = self.sweep.risks();
    let returns = self.sweep.expected_returns();

    let mut plot = Plot::new();
    plot.set_layout(
      Layout::new()
        .title(self.title.as_str())
        .x_axis(Axis::new().title("Standard Deviation"))
        .y_axis(Axis::new().title("Expected Return"))
        .y_axis2(
          Axis::new()
            .title("Sharpe Ratio")
            .overlaying("y")
            .side(AxisSide::Right),
        ),
    );

    plot.add_trace(
      Scatter::new(risks.clone(), returns.clone())
        .mode(Mode::Lines)
        .line(Line::new().width(self.line_width))
        .name("Optimized Portfolio"),
    );
    plot.add_trace(
      Scatter::new(risks.clone(), returns)
        .mode(Mode::Markers)
        .marker(Marker::new().size(5))
        .name("Frontier Points")
        .show_legend(false),
    );

    if let Some(assets) = &self.assets {
      plot.add_trace(
        Scatter::new(assets.risks.clone(), assets.means.clone())
          .mode(Mode::Markers)
          .marker(
            Marker::new()
              .symbol(MarkerSymbol::Diamond)
              .size(6)
              .color(NamedColor::Red),
          )
          .text_array(assets.labels.clone())
          .name("Individual Assets"),
      );
    }

    if self.sharpe_axis {
      plot.add_trace(
        Scatter::new(risks, self.sweep.sharpes())
          .mode(Mode::Markers)
          .marker(
            Marker::new()
              .symbol(MarkerSymbol::TriangleUp)
              .size(5)
              .color(NamedColor::Orange),
          )
          .name("Sharpe Ratio")
          .y_axis("y2"),
      );
    }

    plot
  }

  pub fn show(self) {
    self.plot().show();
  }
}
