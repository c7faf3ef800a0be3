//! Standalone SVG report implementing `ReportPort`.
//!
//! Two stacked panels: portfolio values with EWMA and bands (plus benchmark,
//! comparators and policy variants when present), then the strategy's PnL
//! curve with entry/exit markers. The legend lists the target weights and
//! the trade count.

pub mod chart_svg;

use std::fs;
use std::path::Path;

use crate::domain::error::BandtraderError;
use crate::domain::orchestrator::{AnalysisReport, PortfolioReport};
use crate::ports::report_port::ReportPort;
use chart_svg::{ChartFrame, HEIGHT, LEGEND_WIDTH, PADDING, WIDTH};

const SERIES_COLORS: [&str; 6] = ["purple", "brown", "teal", "olive", "navy", "crimson"];

pub struct SvgReportAdapter;

impl SvgReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SvgReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for SvgReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), BandtraderError> {
        let svg = render(report);

        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(BandtraderError::Io)?;
        }
        fs::write(path, svg).map_err(BandtraderError::Io)?;
        tracing::info!(path = %output_path, "svg report written");
        Ok(())
    }
}

fn values_of(portfolio: &PortfolioReport) -> Vec<Option<f64>> {
    portfolio.values.iter().map(|p| Some(p.value)).collect()
}

/// Full SVG document for one analysis.
pub fn render(report: &AnalysisReport) -> String {
    let target = &report.target.portfolio;
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
        w = WIDTH,
        h = 2.0 * HEIGHT
    );
    out.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

    if target.values.is_empty() {
        out.push_str("<text x=\"60\" y=\"60\">No data</text>\n</svg>\n");
        return out;
    }

    out.push_str(&value_panel(report));
    out.push_str(&format!("<g transform=\"translate(0,{:.0})\">\n", HEIGHT));
    out.push_str(&pnl_panel(report));
    out.push_str("</g>\n");
    out.push_str("</svg>\n");
    out
}

fn date_labels(target: &PortfolioReport) -> (String, String) {
    let first = target.values.first().map(|p| p.date.to_string()).unwrap_or_default();
    let last = target.values.last().map(|p| p.date.to_string()).unwrap_or_default();
    (first, last)
}

fn value_panel(report: &AnalysisReport) -> String {
    let target = &report.target.portfolio;
    let values = values_of(target);
    let ewma: Vec<Option<f64>> = target.bands.iter().map(|b| Some(b.ewma)).collect();
    let upper: Vec<Option<f64>> = target.bands.iter().map(|b| b.upper).collect();
    let lower: Vec<Option<f64>> = target.bands.iter().map(|b| b.lower).collect();

    let others: Vec<(&PortfolioReport, Vec<Option<f64>>)> = report
        .benchmark
        .iter()
        .chain(&report.comparators)
        .chain(&report.variants)
        .map(|p| (p, values_of(p)))
        .collect();

    let mut all: Vec<&[Option<f64>]> = vec![
        values.as_slice(),
        ewma.as_slice(),
        upper.as_slice(),
        lower.as_slice(),
    ];
    all.extend(others.iter().map(|(_, v)| v.as_slice()));
    let frame = ChartFrame::fit(values.len(), all);

    let (first, last) = date_labels(target);
    let mut out = title(&format!(
        "{}: Value with Bollinger Bands ({}, halflife {} days)",
        target.title, target.policy, report.settings.halflife_days
    ));
    out.push_str(&chart_svg::axes(&frame, &first, &last));
    out.push_str(&chart_svg::band_fill(&frame, &upper, &lower));
    out.push_str(&chart_svg::polyline(&frame, &upper, "green", Some("2 3")));
    out.push_str(&chart_svg::polyline(&frame, &lower, "red", Some("2 3")));
    out.push_str(&chart_svg::polyline(&frame, &ewma, "orange", Some("6 3")));

    let mut legend: Vec<(String, &str)> = vec![
        (target.title.clone(), "blue"),
        ("EWMA".into(), "orange"),
        ("Upper band".into(), "green"),
        ("Lower band".into(), "red"),
    ];
    for (i, (portfolio, series)) in others.iter().enumerate() {
        // benchmark, when present, is first in the chain
        let color = if i == 0 && report.benchmark.is_some() {
            "black"
        } else {
            SERIES_COLORS[i % SERIES_COLORS.len()]
        };
        out.push_str(&chart_svg::polyline(&frame, series, color, None));
        legend.push((portfolio.title.clone(), color));
    }
    out.push_str(&chart_svg::polyline(&frame, &values, "blue", None));

    out.push_str(&series_legend(&legend));
    out
}

fn pnl_panel(report: &AnalysisReport) -> String {
    let target = &report.target.portfolio;
    let sim = &report.target.simulation;
    let pnl: Vec<Option<f64>> = sim.trades.iter().map(|t| Some(t.pnl_snapshot)).collect();
    let frame = ChartFrame::fit(pnl.len(), [pnl.as_slice()]);

    let (first, last) = date_labels(target);
    let mut out = title("Cumulative PnL with Trades");
    out.push_str(&chart_svg::axes(&frame, &first, &last));
    out.push_str(&chart_svg::polyline(&frame, &pnl, "gray", None));
    out.push_str(&chart_svg::trade_markers(&frame, &sim.trades));
    out.push_str(&weights_legend(report));
    out
}

fn title(text: &str) -> String {
    format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"16\" font-weight=\"bold\">{}</text>\n",
        PADDING,
        PADDING / 2.0,
        chart_svg::escape(text)
    )
}

fn legend_x() -> f64 {
    WIDTH - LEGEND_WIDTH - PADDING / 2.0
}

fn series_legend(entries: &[(String, &str)]) -> String {
    let x = legend_x();
    let mut out = String::new();
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = PADDING + 18.0 * i as f64;
        out.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            x,
            y - 4.0,
            x + 16.0,
            y - 4.0,
            color
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
            x + 22.0,
            y,
            chart_svg::escape(label)
        ));
    }
    out
}

fn weights_legend(report: &AnalysisReport) -> String {
    let target = &report.target.portfolio;
    let sim = &report.target.simulation;

    let mut lines: Vec<String> = target
        .weights
        .iter()
        .map(|(id, w)| {
            if target.excluded.contains(id) {
                format!("{}: {:.2}% (no data)", id, w * 100.0)
            } else {
                format!("{}: {:.2}%", id, w * 100.0)
            }
        })
        .collect();
    lines.push(format!("Total Trades: {}", sim.trades_tally));
    if let Some(side) = sim.open_position {
        lines.push(format!("Open {} position", side));
    }

    let x = legend_x();
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
            x,
            PADDING + 16.0 * i as f64,
            chart_svg::escape(line)
        ));
    }
    for (i, (label, color)) in [
        ("Long entry", "blue"),
        ("Long exit", "orange"),
        ("Short entry", "green"),
        ("Short exit", "red"),
    ]
    .iter()
    .enumerate()
    {
        let y = HEIGHT - PADDING - 16.0 * (4 - i) as f64;
        out.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{}\"/>\n<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
            x + 4.0,
            y - 4.0,
            color,
            x + 14.0,
            y,
            label
        ));
    }
    out
}
