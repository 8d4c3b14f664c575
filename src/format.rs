//! Currency and date formatting for the dashboards.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Display settings (currency symbol, date pattern)
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFormat {
    pub currency_symbol: String,
    /// chrono strftime pattern
    pub date_format: String,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
            date_format: "%d %b %Y".to_string(),
        }
    }
}

impl DisplayFormat {
    /// `€1,234.50`, `-€12.00`
    pub fn money(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
        format!(
            "{sign}{}{}.{cents}",
            self.currency_symbol,
            group_thousands(whole)
        )
    }

    pub fn date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }

    pub fn timestamp(&self, ts: DateTime<Utc>) -> String {
        format!("{} {}", self.date(ts.date_naive()), ts.format("%H:%M"))
    }

    /// `2 × Large tray`
    pub fn quantity(&self, quantity: u32, unit: Option<&str>) -> String {
        match unit {
            Some(unit) if !unit.is_empty() => format!("{quantity} {unit}"),
            _ => quantity.to_string(),
        }
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

/// `0.8734` → `87%`
pub fn percent(ratio: f64) -> String {
    format!("{:.0}%", (ratio * 100.0).clamp(0.0, 100.0))
}
