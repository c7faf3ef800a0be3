//! Single-position state for the mean-reversion simulation.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Long,
    Short,
}

impl From<Side> for PositionState {
    fn from(side: Side) -> Self {
        match side {
            Side::Long => PositionState::Long,
            Side::Short => PositionState::Short,
        }
    }
}

/// Mutable simulation state. At most one position is open at a time and
/// every entry commits the whole realized balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub state: PositionState,
    pub entry_price: f64,
    pub entry_date: Option<NaiveDate>,
    pub units_traded: f64,
    pub realized_balance: f64,
}

impl Position {
    pub fn new(initial_investment: f64) -> Self {
        Position {
            state: PositionState::Flat,
            entry_price: 0.0,
            entry_date: None,
            units_traded: 0.0,
            realized_balance: initial_investment,
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self.state {
            PositionState::Flat => None,
            PositionState::Long => Some(Side::Long),
            PositionState::Short => Some(Side::Short),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state != PositionState::Flat
    }

    /// Notional PnL of the open position at `price`; zero when flat.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.state {
            PositionState::Flat => 0.0,
            PositionState::Long => {
                self.realized_balance * (price - self.entry_price) / self.entry_price
            }
            PositionState::Short => {
                self.realized_balance * (self.entry_price - price) / self.entry_price
            }
        }
    }

    /// Open an all-in position. Only valid when flat.
    pub fn open(&mut self, side: Side, price: f64, date: NaiveDate) {
        debug_assert!(!self.is_open(), "position already open");
        self.state = side.into();
        self.entry_price = price;
        self.entry_date = Some(date);
        self.units_traded = self.realized_balance / price;
    }

    /// Close the open position at `price`, booking the PnL into the realized
    /// balance. Returns `None` when flat.
    pub fn close(&mut self, price: f64, date: NaiveDate) -> Option<ClosedTrade> {
        let side = self.side()?;
        let pnl = match side {
            Side::Long => self.units_traded * (price - self.entry_price),
            Side::Short => self.units_traded * (self.entry_price - price),
        };
        self.realized_balance += pnl;

        let trade = ClosedTrade {
            side,
            entry_date: self.entry_date.unwrap_or(date),
            exit_date: date,
            entry_price: self.entry_price,
            exit_price: price,
            units: self.units_traded,
            pnl,
        };

        self.state = PositionState::Flat;
        self.entry_price = 0.0;
        self.entry_date = None;
        self.units_traded = 0.0;
        Some(trade)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub side: Side,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub units: f64,
    pub pnl: f64,
}
