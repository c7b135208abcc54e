use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Quick-select amounts offered on the payment screen, in whole currency units.
pub const PRESET_AMOUNTS: [u64; 7] = [1, 2, 5, 10, 20, 50, 100];

/// Currency units charged per kWh of delivered energy.
pub const ENERGY_PRICE_PER_KWH: f64 = 0.06;

/// Storage key under which the last used token id is persisted.
pub const LAST_TOKEN_ID_KEY: &str = "lastTokenId";

/// Digits-only device token id as typed or seeded. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Keeps only ASCII digits from `raw`.
    pub fn sanitize(raw: &str) -> Self {
        Self(raw.chars().filter(char::is_ascii_digit).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Integer value for on-chain use; `None` when empty.
    pub fn to_u256(&self) -> Option<U256> {
        if self.0.is_empty() {
            return None;
        }
        U256::from_str_radix(&self.0, 10).ok()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Identify,
    Pay,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Identify => 1,
            Step::Pay => 2,
        }
    }
}

/// Finalized (token id, amount) pair ready for the `pay` contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub token_id: U256,
    pub amount: U256,
}

impl PaymentIntent {
    /// For ids and amounts that fit in a `u64`.
    pub fn new(token_id: u64, amount: u64) -> Self {
        Self {
            token_id: U256::from(token_id),
            amount: U256::from(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_only_digits() {
        assert_eq!(TokenId::sanitize("m3-ter #0042x").as_str(), "30042");
        assert!(TokenId::sanitize("abc").is_empty());
        assert!(TokenId::sanitize("").is_empty());
    }

    #[test]
    fn sanitize_drops_non_ascii_digits() {
        assert_eq!(TokenId::sanitize("١٢3").as_str(), "3");
    }

    #[test]
    fn token_id_converts_to_integer() {
        assert_eq!(TokenId::sanitize("42").to_u256(), Some(U256::from(42u64)));
        assert_eq!(TokenId::default().to_u256(), None);
    }

    #[test]
    fn payment_intent_widens_u64_values() {
        let intent = PaymentIntent::new(42, 10);
        assert_eq!(intent.token_id, U256::from(42u64));
        assert_eq!(intent.amount, U256::from(10u64));
    }

    #[test]
    fn step_numbers_match_screens() {
        assert_eq!(Step::default().number(), 1);
        assert_eq!(Step::Pay.number(), 2);
    }
}
