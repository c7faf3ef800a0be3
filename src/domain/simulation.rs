//! Mean-reversion trade simulation against EWMA/Bollinger bands.
//!
//! One pass over the value series, in date order, carrying a single
//! [`Position`]:
//!
//! - Flat → Short when the value closes above the upper band
//! - Flat → Long when the value closes below the lower band
//! - Short → Flat when the value closes below the EWMA
//! - Long → Flat when the value closes above the EWMA
//!
//! Every date gets exactly one [`TradeRecord`]. Dates without bands (window
//! still filling) never trigger a transition. An open position at the end is
//! reported, not closed.

use crate::domain::error::BandtraderError;
use crate::domain::indicator::BandPoint;
use crate::domain::position::{ClosedTrade, Position, PositionState, Side};
use crate::domain::valuation::ValuePoint;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeEvent {
    None,
    LongEntry,
    LongExit,
    ShortEntry,
    ShortExit,
}

impl TradeEvent {
    pub fn is_entry(&self) -> bool {
        matches!(self, TradeEvent::LongEntry | TradeEvent::ShortEntry)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, TradeEvent::LongExit | TradeEvent::ShortExit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeEvent::None => "none",
            TradeEvent::LongEntry => "long_entry",
            TradeEvent::LongExit => "long_exit",
            TradeEvent::ShortEntry => "short_entry",
            TradeEvent::ShortExit => "short_exit",
        }
    }
}

impl fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub reference_price: f64,
    pub event: TradeEvent,
    /// Realized balance plus unrealized PnL of any open position.
    pub pnl_snapshot: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub trades: Vec<TradeRecord>,
    /// Completed round trips (exits only).
    pub trades_tally: usize,
    pub closed_trades: Vec<ClosedTrade>,
    pub realized_balance: f64,
    /// `Some` when the run ended with a position still open.
    pub open_position: Option<Side>,
}

impl SimulationResult {
    pub fn has_open_position(&self) -> bool {
        self.open_position.is_some()
    }

    pub fn final_snapshot(&self) -> f64 {
        self.trades
            .last()
            .map(|t| t.pnl_snapshot)
            .unwrap_or(self.realized_balance)
    }
}

pub fn simulate(
    values: &[ValuePoint],
    bands: &[BandPoint],
    initial_investment: f64,
) -> Result<SimulationResult, BandtraderError> {
    check_inputs(values, bands, initial_investment)?;

    let mut position = Position::new(initial_investment);
    let mut trades = Vec::with_capacity(values.len());
    let mut closed_trades = Vec::new();
    let mut trades_tally = 0usize;

    trades.push(TradeRecord {
        date: values[0].date,
        reference_price: values[0].value,
        event: TradeEvent::None,
        pnl_snapshot: initial_investment,
    });

    for (point, band) in values.iter().zip(bands).skip(1) {
        let price = point.value;
        let date = point.date;
        let unrealized = position.unrealized_pnl(price);

        let Some((upper, lower)) = band.bands() else {
            trades.push(TradeRecord {
                date,
                reference_price: price,
                event: TradeEvent::None,
                pnl_snapshot: position.realized_balance + unrealized,
            });
            continue;
        };

        let event = match position.state {
            PositionState::Flat if price > upper => {
                position.open(Side::Short, price, date);
                TradeEvent::ShortEntry
            }
            PositionState::Flat if price < lower => {
                position.open(Side::Long, price, date);
                TradeEvent::LongEntry
            }
            PositionState::Short if price < band.ewma => TradeEvent::ShortExit,
            PositionState::Long if price > band.ewma => TradeEvent::LongExit,
            _ => TradeEvent::None,
        };

        if event.is_exit() {
            if let Some(trade) = position.close(price, date) {
                trades_tally += 1;
                closed_trades.push(trade);
            }
        }

        match event {
            TradeEvent::None => {}
            TradeEvent::LongEntry | TradeEvent::ShortEntry => {
                tracing::debug!(%date, price, %event, units = position.units_traded, "position entered");
            }
            TradeEvent::LongExit | TradeEvent::ShortExit => {
                tracing::debug!(%date, price, %event, balance = position.realized_balance, "position exited");
            }
        }

        let pnl_snapshot = if event == TradeEvent::None {
            position.realized_balance + unrealized
        } else {
            position.realized_balance
        };

        trades.push(TradeRecord {
            date,
            reference_price: price,
            event,
            pnl_snapshot,
        });
    }

    let open_position = position.side();
    tracing::info!(
        trades_tally,
        realized_balance = position.realized_balance,
        "simulation complete"
    );
    if let Some(side) = open_position {
        tracing::warn!(%side, entry_price = position.entry_price, "simulation ended with an open position");
    }

    Ok(SimulationResult {
        trades,
        trades_tally,
        closed_trades,
        realized_balance: position.realized_balance,
        open_position,
    })
}

fn check_inputs(
    values: &[ValuePoint],
    bands: &[BandPoint],
    initial_investment: f64,
) -> Result<(), BandtraderError> {
    if !(initial_investment > 0.0 && initial_investment.is_finite()) {
        return Err(BandtraderError::ConfigInvalid {
            section: "analysis".into(),
            key: "initial_investment".into(),
            reason: format!("must be positive, got {}", initial_investment),
        });
    }
    if values.is_empty() {
        return Err(BandtraderError::InsufficientData { have: 0, need: 1 });
    }
    if values.len() != bands.len() {
        return Err(BandtraderError::SeriesMismatch {
            reason: format!("{} values but {} band points", values.len(), bands.len()),
        });
    }
    if let Some((v, b)) = values.iter().zip(bands).find(|(v, b)| v.date != b.date) {
        return Err(BandtraderError::SeriesMismatch {
            reason: format!("value dated {} aligned with band dated {}", v.date, b.date),
        });
    }
    Ok(())
}
