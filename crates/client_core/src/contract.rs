//! Energy payment contract interface and call encoding.

use std::str::FromStr;

use alloy_primitives::{address, Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::{domain::PaymentIntent, protocol::TransactionRequest};

/// Base mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 8453;
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("16008fd81f1fff5b5fb52a279778d187d69276fd");

sol! {
    interface EnergyPayments {
        function pay(uint256 tokenId, uint256 amount) external;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub address: Address,
    pub chain_id: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS,
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

impl ContractConfig {
    pub fn new(address: &str, chain_id: u64) -> Result<Self> {
        let address = Address::from_str(address.trim())
            .with_context(|| format!("invalid contract address '{address}'"))?;
        Ok(Self { address, chain_id })
    }

    pub fn transaction_request(&self, intent: &PaymentIntent) -> TransactionRequest {
        TransactionRequest {
            to: self.address,
            data: encode_pay_call(intent),
        }
    }
}

pub fn pay_signature() -> &'static str {
    EnergyPayments::payCall::SIGNATURE
}

pub fn pay_selector() -> [u8; 4] {
    EnergyPayments::payCall::SELECTOR
}

/// ABI-encoded `pay(tokenId, amount)` call data.
pub fn encode_pay_call(intent: &PaymentIntent) -> Bytes {
    EnergyPayments::payCall {
        tokenId: intent.token_id,
        amount: intent.amount,
    }
    .abi_encode()
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{keccak256, U256};

    #[test]
    fn selector_matches_keccak_of_signature() {
        assert_eq!(pay_signature(), "pay(uint256,uint256)");
        let hash = keccak256(pay_signature().as_bytes());
        assert_eq!(pay_selector(), hash[..4]);
    }

    #[test]
    fn encodes_selector_followed_by_two_words() {
        let intent = PaymentIntent::new(42u64, 10u64);
        let data = encode_pay_call(&intent);

        assert_eq!(data.len(), 4 + 32 * 2);
        assert_eq!(data[..4], pay_selector());
        assert_eq!(data[4..36], U256::from(42u64).to_be_bytes::<32>());
        assert_eq!(data[36..68], U256::from(10u64).to_be_bytes::<32>());
    }

    #[test]
    fn transaction_request_targets_configured_contract() {
        let config = ContractConfig::default();
        let request = config.transaction_request(&PaymentIntent::new(1u64, 2u64));
        assert_eq!(request.to, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(request.data, encode_pay_call(&PaymentIntent::new(1u64, 2u64)));
    }

    #[test]
    fn parses_checksummed_contract_address() {
        let config = ContractConfig::new("0x16008fD81f1FFf5B5Fb52A279778d187d69276fd", 8453)
            .expect("address");
        assert_eq!(config, ContractConfig::default());
        assert!(ContractConfig::new("0x1234", 1).is_err());
    }
}
