//! Static display-currency table.

use serde::Serialize;
use std::collections::BTreeMap;

/// Code used when a requested currency is not supported.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Display metadata and conversion rate for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrencyInfo {
    /// ISO 4217 code.
    pub code: &'static str,
    /// Prefix symbol used when formatting.
    pub symbol: &'static str,
    /// Fraction digits shown.
    pub decimals: usize,
    /// Units of this currency per UBX.
    pub per_ubx: f64,
}

/// Built-in rates. The first entry is the fallback.
pub const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", symbol: "$", decimals: 2, per_ubx: 0.10 },
    CurrencyInfo { code: "EUR", symbol: "€", decimals: 2, per_ubx: 0.092 },
    CurrencyInfo { code: "GBP", symbol: "£", decimals: 2, per_ubx: 0.079 },
    CurrencyInfo { code: "JPY", symbol: "¥", decimals: 0, per_ubx: 15.0 },
    CurrencyInfo { code: "CAD", symbol: "CA$", decimals: 2, per_ubx: 0.137 },
    CurrencyInfo { code: "AUD", symbol: "A$", decimals: 2, per_ubx: 0.152 },
    CurrencyInfo { code: "CHF", symbol: "CHF ", decimals: 2, per_ubx: 0.088 },
    CurrencyInfo { code: "INR", symbol: "₹", decimals: 2, per_ubx: 8.35 },
    CurrencyInfo { code: "BRL", symbol: "R$", decimals: 2, per_ubx: 0.50 },
    CurrencyInfo { code: "MXN", symbol: "MX$", decimals: 2, per_ubx: 1.72 },
    CurrencyInfo { code: "KRW", symbol: "₩", decimals: 0, per_ubx: 134.0 },
];

/// Look up a built-in currency; codes are trimmed and case-insensitive.
pub fn find(code: &str) -> Option<&'static CurrencyInfo> {
    let code = code.trim();
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// The fallback currency.
pub fn default_currency() -> &'static CurrencyInfo {
    &CURRENCIES[0]
}

/// Currency table with per-UBX overrides applied from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    overrides: BTreeMap<&'static str, f64>,
}

impl RateTable {
    /// Build a table from `code -> per_ubx` overrides.
    ///
    /// Unknown codes and non-positive rates are skipped; config validation
    /// reports them before they reach here.
    pub fn with_overrides(overrides: &BTreeMap<String, f64>) -> Self {
        let mut table = BTreeMap::new();
        for (code, rate) in overrides {
            match find(code) {
                Some(c) if rate.is_finite() && *rate > 0.0 => {
                    table.insert(c.code, *rate);
                }
                _ => tracing::warn!(code = %code, rate = rate, "Ignoring currency override"),
            }
        }
        Self { overrides: table }
    }

    /// Resolve `code`, falling back to USD when unsupported.
    pub fn resolve(&self, code: &str) -> CurrencyInfo {
        let base = match find(code) {
            Some(c) => c,
            None => {
                tracing::debug!(code = %code, fallback = DEFAULT_CURRENCY, "Unsupported currency");
                crate::observability::metrics::record_currency_fallback();
                default_currency()
            }
        };
        let mut resolved = *base;
        if let Some(rate) = self.overrides.get(base.code) {
            resolved.per_ubx = *rate;
        }
        resolved
    }

    /// Whether `code` is supported without fallback.
    pub fn supports(&self, code: &str) -> bool {
        find(code).is_some()
    }

    /// All currencies with overrides applied.
    pub fn all(&self) -> Vec<CurrencyInfo> {
        CURRENCIES.iter().map(|c| self.resolve(c.code)).collect()
    }
}
