//! Amount composition: preset toggles, the custom decimal input and energy conversion.

use std::collections::BTreeSet;

use alloy_primitives::U256;
use shared::domain::ENERGY_PRICE_PER_KWH;

/// Matches `^\d*\.?\d{0,2}$`: optional digits, at most one dot, at most two fraction digits.
pub fn is_valid_custom_amount(text: &str) -> bool {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match text.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction) && fraction.len() <= 2,
        None => all_digits(text),
    }
}

/// Lenient numeric reading of an amount; anything unparsable counts as zero.
pub fn parse_amount(text: &str) -> f64 {
    let value = text.trim().parse::<f64>().unwrap_or(0.0);
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// kWh purchasable for `amount_text`, rounded to two decimals for display.
pub fn compute_energy(amount_text: &str) -> f64 {
    round_cents(parse_amount(amount_text) / ENERGY_PRICE_PER_KWH)
}

pub fn format_energy(kwh: f64) -> String {
    format!("{kwh:.2} kWh")
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole-unit amount for the contract call. Fractions other than zeros are refused.
pub fn integer_amount(text: &str) -> Option<U256> {
    let text = text.trim();
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if !fraction.bytes().all(|b| b == b'0') || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if whole.is_empty() {
        return Some(U256::ZERO);
    }
    U256::from_str_radix(whole, 10).ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountSelection {
    selected: BTreeSet<u64>,
    custom: String,
}

impl AmountSelection {
    pub fn with_custom(custom: &str) -> Self {
        let mut selection = Self::default();
        selection.set_custom(custom);
        selection
    }

    pub fn selected(&self) -> &BTreeSet<u64> {
        &self.selected
    }

    pub fn is_selected(&self, value: u64) -> bool {
        self.selected.contains(&value)
    }

    pub fn custom(&self) -> &str {
        &self.custom
    }

    pub fn selected_sum(&self) -> u64 {
        self.selected
            .iter()
            .fold(0u64, |sum, value| sum.saturating_add(*value))
    }

    /// Returns whether `value` is selected afterwards.
    ///
    /// The custom amount is only overwritten once two or more presets are active;
    /// a single preset leaves whatever the user typed.
    pub fn toggle(&mut self, value: u64) -> bool {
        let now_selected = if self.selected.remove(&value) {
            false
        } else {
            self.selected.insert(value);
            true
        };

        if self.selected.len() > 1 {
            self.custom = self.selected_sum().to_string();
        }
        now_selected
    }

    /// Rejected input keeps the previous value.
    pub fn set_custom(&mut self, text: &str) -> bool {
        if !is_valid_custom_amount(text) {
            return false;
        }
        self.custom = text.to_string();
        true
    }

    pub fn custom_value(&self) -> f64 {
        parse_amount(&self.custom)
    }

    pub fn is_positive(&self) -> bool {
        self.custom_value() > 0.0
    }
}

#[cfg(test)]
#[path = "tests/amount_tests.rs"]
mod tests;
