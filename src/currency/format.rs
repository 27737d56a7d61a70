//! Conversion and display formatting.

use crate::currency::rates::{CurrencyInfo, RateTable};

/// Convert a UBX amount into `code` using the built-in table.
pub fn convert(ubx_amount: f64, code: &str) -> f64 {
    RateTable::default().convert(ubx_amount, code)
}

/// Format an amount already expressed in `code`.
pub fn format(amount: f64, code: &str) -> String {
    RateTable::default().format(amount, code)
}

/// Convert a UBX amount and format it for display.
pub fn convert_ubx_to_local_currency(ubx_amount: f64, code: &str) -> String {
    RateTable::default().display(ubx_amount, code)
}

impl RateTable {
    pub fn convert(&self, ubx_amount: f64, code: &str) -> f64 {
        ubx_amount * self.resolve(code).per_ubx
    }

    pub fn format(&self, amount: f64, code: &str) -> String {
        format_with(&self.resolve(code), amount)
    }

    /// Convert and format with a single lookup of `code`.
    pub fn display(&self, ubx_amount: f64, code: &str) -> String {
        let currency = self.resolve(code);
        format_with(&currency, ubx_amount * currency.per_ubx)
    }
}

/// Render `amount` with the currency's symbol, grouping and decimals.
pub fn format_with(currency: &CurrencyInfo, amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let rendered = format!("{:.*}", currency.decimals, amount.abs());

    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rendered.as_str(), None),
    };

    let grouped = group_thousands(int_part);
    // Rounding can turn a tiny negative into "0.00"; drop the sign then.
    let is_zero = rendered.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

    match frac_part {
        Some(f) => format!("{}{}{}.{}", sign, currency.symbol, grouped, f),
        None => format!("{}{}{}", sign, currency.symbol, grouped),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_jpy_has_no_decimals() {
        assert_eq!(format(1000.0, "JPY"), "¥1,000");
        assert_eq!(format(1234.6, "JPY"), "¥1,235");
    }

    #[test]
    fn test_usd_has_two_decimals() {
        assert_eq!(format(1000.0, "USD"), "$1,000.00");
        assert_eq!(format(0.5, "usd"), "$0.50");
        assert_eq!(format(1234567.891, "USD"), "$1,234,567.89");
    }

    #[test]
    fn test_unsupported_falls_back_to_usd() {
        assert_eq!(format(1000.0, "ZZZ"), "$1,000.00");
        assert_eq!(convert(100.0, "ZZZ"), convert(100.0, "USD"));
    }

    #[test]
    fn test_negative_and_non_finite() {
        assert_eq!(format(-1500.0, "EUR"), "-€1,500.00");
        assert_eq!(format(-0.001, "USD"), "$0.00");
        assert_eq!(format(f64::NAN, "USD"), "$0.00");
        assert_eq!(format(f64::INFINITY, "JPY"), "¥0");
    }

    #[test]
    fn test_convert_uses_table() {
        assert!((convert(100.0, "USD") - 10.0).abs() < 1e-9);
        assert!((convert(100.0, "JPY") - 1500.0).abs() < 1e-9);
        assert_eq!(convert_ubx_to_local_currency(100.0, "JPY"), "¥1,500");
        assert_eq!(convert_ubx_to_local_currency(100.0, "GBP"), "£7.90");
    }

    #[test]
    fn test_unsupported_code_resolved_once() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let shown = tracing::subscriber::with_default(subscriber, || {
            convert_ubx_to_local_currency(100.0, "ZZZ")
        });

        assert_eq!(shown, "$10.00");
        let logs = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("Unsupported currency").count(), 1);
    }

    #[test]
    fn test_overridden_table() {
        let mut overrides = BTreeMap::new();
        overrides.insert("USD".to_string(), 1.0);
        let table = RateTable::with_overrides(&overrides);
        assert_eq!(table.format(table.convert(1000.0, "USD"), "USD"), "$1,000.00");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
