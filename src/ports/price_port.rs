//! Price data access port trait.

use crate::domain::error::BandtraderError;
use crate::domain::prices::PriceSeries;
use chrono::NaiveDate;

pub trait PricePort {
    /// Load closing prices for every instrument the source carries, limited
    /// to the inclusive date range when bounds are given.
    fn load_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, BandtraderError>;

    fn list_instruments(&self) -> Result<Vec<String>, BandtraderError>;

    /// First date, last date and record count, or `None` when empty.
    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BandtraderError>;
}
