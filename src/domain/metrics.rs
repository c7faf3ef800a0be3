//! Summary statistics for a simulation run and for value series.

use super::position::Side;
use super::simulation::{SimulationResult, TradeRecord};
use super::valuation::ValuePoint;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub initial_investment: f64,
    pub final_realized_balance: f64,
    /// Realized balance plus unrealized PnL on the last date.
    pub final_snapshot: f64,
    pub total_return: f64,
    pub trades_tally: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_trade_duration: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub open_position: Option<Side>,
}

impl Summary {
    pub fn compute(result: &SimulationResult, initial_investment: f64) -> Self {
        let final_snapshot = result.final_snapshot();
        let total_return = if initial_investment > 0.0 {
            (final_snapshot - initial_investment) / initial_investment
        } else {
            0.0
        };

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_duration_days = 0i64;

        for trade in &result.closed_trades {
            let pnl = trade.pnl;
            if pnl > 0.0 {
                trades_won += 1;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
            total_duration_days += (trade.exit_date - trade.entry_date).num_days();
        }

        let closed = result.closed_trades.len();
        let win_rate = if closed > 0 {
            trades_won as f64 / closed as f64
        } else {
            0.0
        };
        let avg_trade_duration = if closed > 0 {
            total_duration_days as f64 / closed as f64
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&result.trades);

        Summary {
            initial_investment,
            final_realized_balance: result.realized_balance,
            final_snapshot,
            total_return,
            trades_tally: result.trades_tally,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            largest_win,
            largest_loss,
            avg_trade_duration,
            max_drawdown,
            max_drawdown_duration,
            open_position: result.open_position,
        }
    }
}

/// Fractional change from the first to the last value of a series.
pub fn series_return(values: &[ValuePoint]) -> f64 {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) if first.value > 0.0 => (last.value - first.value) / first.value,
        _ => 0.0,
    }
}

/// Largest peak-to-trough decline of the PnL snapshot curve, as a fraction
/// of the peak, and the longest run of records spent below a peak.
fn compute_drawdown(trades: &[TradeRecord]) -> (f64, i64) {
    let Some(first) = trades.first() else {
        return (0.0, 0);
    };

    let mut peak = first.pnl_snapshot;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for record in trades {
        let equity = record.pnl_snapshot;
        if equity >= peak {
            peak = equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - equity) / peak);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}
