//! # Series
//!
//! $$
//! r_t = \frac{P_t}{P_{t-1}} - 1
//! $$
//!
//! Price tables and the return series derived from them.

pub mod price;
pub mod returns;

pub use price::PriceTable;
pub use returns::ReturnTable;
