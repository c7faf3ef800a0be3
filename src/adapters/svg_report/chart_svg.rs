//! SVG primitives for the analysis chart.
//!
//! All series of one chart share a [`ChartFrame`]: a fixed-size plot area
//! whose y-range is fitted to every value drawn on it.

use crate::domain::simulation::{TradeEvent, TradeRecord};

pub const WIDTH: f64 = 1200.0;
pub const HEIGHT: f64 = 700.0;
pub const PADDING: f64 = 60.0;
/// Space on the right for the weights legend.
pub const LEGEND_WIDTH: f64 = 220.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub points: usize,
    pub min: f64,
    pub max: f64,
}

impl ChartFrame {
    /// Fit the frame to every finite value of every series.
    pub fn fit<'a>(points: usize, series: impl IntoIterator<Item = &'a [Option<f64>]>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for values in series {
            for v in values.iter().flatten().filter(|v| v.is_finite()) {
                min = min.min(*v);
                max = max.max(*v);
            }
        }
        if !min.is_finite() || !max.is_finite() {
            min = 0.0;
            max = 1.0;
        }
        ChartFrame { points, min, max }
    }

    fn plot_width(&self) -> f64 {
        WIDTH - 2.0 * PADDING - LEGEND_WIDTH
    }

    fn plot_height(&self) -> f64 {
        HEIGHT - 2.0 * PADDING
    }

    pub fn x(&self, index: usize) -> f64 {
        let scale_x = if self.points > 1 {
            self.plot_width() / (self.points - 1) as f64
        } else {
            0.0
        };
        PADDING + index as f64 * scale_x
    }

    pub fn y(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        let scale_y = if range > 0.0 {
            self.plot_height() / range
        } else {
            1.0
        };
        HEIGHT - PADDING - (value - self.min) * scale_y
    }
}

/// Polyline through the defined values. Undefined values split the line
/// into separate segments.
pub fn polyline(frame: &ChartFrame, values: &[Option<f64>], stroke: &str, dash: Option<&str>) -> String {
    let dash_attr = dash
        .map(|d| format!(r#" stroke-dasharray="{}""#, d))
        .unwrap_or_default();

    let mut out = String::new();
    let mut segment: Vec<String> = Vec::new();
    let flush = |segment: &mut Vec<String>, out: &mut String| {
        if segment.len() > 1 {
            out.push_str(&format!(
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5"{} points="{}"/>"#,
                stroke,
                dash_attr,
                segment.join(" ")
            ));
            out.push('\n');
        }
        segment.clear();
    };

    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => {
                segment.push(format!("{:.1},{:.1}", frame.x(i), frame.y(*v)));
            }
            _ => flush(&mut segment, &mut out),
        }
    }
    flush(&mut segment, &mut out);
    out
}

/// Shaded area between an upper and a lower series, over the dates where
/// both are defined.
pub fn band_fill(frame: &ChartFrame, upper: &[Option<f64>], lower: &[Option<f64>]) -> String {
    let defined: Vec<(usize, f64, f64)> = upper
        .iter()
        .zip(lower)
        .enumerate()
        .filter_map(|(i, (u, l))| Some((i, (*u)?, (*l)?)))
        .collect();
    if defined.len() < 2 {
        return String::new();
    }

    let top = defined
        .iter()
        .map(|(i, u, _)| format!("{:.1},{:.1}", frame.x(*i), frame.y(*u)));
    let bottom = defined
        .iter()
        .rev()
        .map(|(i, _, l)| format!("{:.1},{:.1}", frame.x(*i), frame.y(*l)));
    let points: Vec<String> = top.chain(bottom).collect();

    format!(
        "<polygon fill=\"gray\" fill-opacity=\"0.2\" stroke=\"none\" points=\"{}\"/>\n",
        points.join(" ")
    )
}

/// Colour and direction of the marker drawn for a trade event.
pub fn marker_style(event: TradeEvent) -> Option<(&'static str, bool)> {
    match event {
        TradeEvent::None => None,
        TradeEvent::LongEntry => Some(("blue", true)),
        TradeEvent::LongExit => Some(("orange", false)),
        TradeEvent::ShortEntry => Some(("green", true)),
        TradeEvent::ShortExit => Some(("red", false)),
    }
}

/// Triangles on the PnL curve: up for entries, down for exits.
pub fn trade_markers(frame: &ChartFrame, trades: &[TradeRecord]) -> String {
    let mut out = String::new();
    for (i, trade) in trades.iter().enumerate() {
        let Some((color, up)) = marker_style(trade.event) else {
            continue;
        };
        let x = frame.x(i);
        let y = frame.y(trade.pnl_snapshot);
        let points = if up {
            format!("{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}", x, y - 6.0, x - 5.0, y + 4.0, x + 5.0, y + 4.0)
        } else {
            format!("{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}", x, y + 6.0, x - 5.0, y - 4.0, x + 5.0, y - 4.0)
        };
        out.push_str(&format!(
            "<polygon fill=\"{}\" fill-opacity=\"0.8\" points=\"{}\"><title>{} {} @ {:.2}</title></polygon>\n",
            color, points, trade.date, trade.event, trade.reference_price
        ));
    }
    out
}

/// Plot frame, axes and min/max labels.
pub fn axes(frame: &ChartFrame, first_label: &str, last_label: &str) -> String {
    let left = PADDING;
    let right = WIDTH - PADDING - LEGEND_WIDTH;
    let top = PADDING;
    let bottom = HEIGHT - PADDING;
    format!(
        concat!(
            "<line x1=\"{l:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\" stroke=\"black\"/>\n",
            "<line x1=\"{l:.1}\" y1=\"{t:.1}\" x2=\"{l:.1}\" y2=\"{b:.1}\" stroke=\"black\"/>\n",
            "<text x=\"{l:.1}\" y=\"{lb:.1}\" font-size=\"11\">{first}</text>\n",
            "<text x=\"{r:.1}\" y=\"{lb:.1}\" font-size=\"11\" text-anchor=\"end\">{last}</text>\n",
            "<text x=\"{ll:.1}\" y=\"{t:.1}\" font-size=\"11\" text-anchor=\"end\">{max:.0}</text>\n",
            "<text x=\"{ll:.1}\" y=\"{b:.1}\" font-size=\"11\" text-anchor=\"end\">{min:.0}</text>\n",
        ),
        l = left,
        r = right,
        t = top,
        b = bottom,
        lb = bottom + 18.0,
        ll = left - 6.0,
        first = first_label,
        last = last_label,
        max = frame.max,
        min = frame.min,
    )
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame() -> ChartFrame {
        ChartFrame {
            points: 3,
            min: 0.0,
            max: 100.0,
        }
    }

    #[test]
    fn fit_ignores_undefined() {
        let a = [Some(5.0), None, Some(15.0)];
        let b = [None, Some(-3.0)];
        let f = ChartFrame::fit(3, [&a[..], &b[..]]);
        assert_eq!(f.min, -3.0);
        assert_eq!(f.max, 15.0);
    }

    #[test]
    fn fit_without_data_uses_unit_range() {
        let empty: [Option<f64>; 0] = [];
        let f = ChartFrame::fit(0, [&empty[..]]);
        assert_eq!((f.min, f.max), (0.0, 1.0));
    }

    #[test]
    fn y_axis_is_inverted() {
        let f = frame();
        assert!(f.y(100.0) < f.y(0.0));
        assert_eq!(f.y(0.0), HEIGHT - PADDING);
        assert_eq!(f.y(100.0), PADDING);
    }

    #[test]
    fn polyline_splits_on_gaps() {
        let values = [Some(1.0), Some(2.0), None];
        let svg = polyline(&frame(), &values, "blue", None);
        assert_eq!(svg.matches("<polyline").count(), 1);

        let values = [Some(1.0), None, Some(2.0)];
        let svg = polyline(&frame(), &values, "blue", Some("4 2"));
        // single-point segments are not drawn
        assert!(svg.is_empty());
    }

    #[test]
    fn band_fill_needs_two_points() {
        let upper = [None, Some(60.0), Some(70.0)];
        let lower = [None, Some(40.0), Some(30.0)];
        assert!(band_fill(&frame(), &upper, &lower).contains("<polygon"));
        assert!(band_fill(&frame(), &upper[..2], &lower[..2]).is_empty());
    }

    #[test]
    fn markers_only_for_events() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let trades = [
            TradeRecord {
                date,
                reference_price: 50.0,
                event: TradeEvent::None,
                pnl_snapshot: 50.0,
            },
            TradeRecord {
                date,
                reference_price: 60.0,
                event: TradeEvent::ShortEntry,
                pnl_snapshot: 50.0,
            },
        ];
        let svg = trade_markers(&frame(), &trades);
        assert_eq!(svg.matches("<polygon").count(), 1);
        assert!(svg.contains("green"));
        assert!(svg.contains("short_entry"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("A&B <x>"), "A&amp;B &lt;x&gt;");
    }
}
