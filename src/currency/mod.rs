//! Currency display utilities.
//!
//! Pure conversion of UBX amounts into display currencies from a static
//! table. Unsupported codes fall back to USD instead of failing.

pub mod format;
pub mod rates;

pub use format::{convert, convert_ubx_to_local_currency, format, format_with};
pub use rates::{CurrencyInfo, RateTable, CURRENCIES, DEFAULT_CURRENCY};
