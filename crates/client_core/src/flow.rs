//! Payment flow orchestration: session controller + token persistence + wallet.

use std::{sync::Arc, time::Duration};

use alloy_primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::TokenId,
    error::PaymentError,
    protocol::{TransactionRequest, TransactionStatus, TxHash},
};
use storage::Storage;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    contract::ContractConfig,
    launch::LaunchParams,
    session::SessionController,
    wallet::{self, Wallet},
};

#[async_trait]
pub trait LastTokenStore: Send + Sync {
    async fn load_last_token_id(&self) -> Result<Option<TokenId>>;
    async fn save_last_token_id(&self, token_id: &TokenId) -> Result<()>;
}

#[async_trait]
impl LastTokenStore for Storage {
    async fn load_last_token_id(&self) -> Result<Option<TokenId>> {
        self.last_token_id().await
    }

    async fn save_last_token_id(&self, token_id: &TokenId) -> Result<()> {
        self.set_last_token_id(token_id).await
    }
}

/// Process-local store for runs without a database.
#[derive(Default)]
pub struct MemoryTokenStore {
    value: Mutex<Option<TokenId>>,
}

#[async_trait]
impl LastTokenStore for MemoryTokenStore {
    async fn load_last_token_id(&self) -> Result<Option<TokenId>> {
        Ok(self.value.lock().await.clone())
    }

    async fn save_last_token_id(&self, token_id: &TokenId) -> Result<()> {
        if !token_id.is_empty() {
            *self.value.lock().await = Some(token_id.clone());
        }
        Ok(())
    }
}

pub struct PaymentFlow {
    session: SessionController,
    contract: ContractConfig,
    wallet: Arc<dyn Wallet>,
    store: Arc<dyn LastTokenStore>,
    status: TransactionStatus,
}

impl PaymentFlow {
    pub fn new(
        contract: ContractConfig,
        wallet: Arc<dyn Wallet>,
        store: Arc<dyn LastTokenStore>,
    ) -> Self {
        Self {
            session: SessionController::new(),
            contract,
            wallet,
            store,
            status: TransactionStatus::Idle,
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn contract(&self) -> &ContractConfig {
        &self.contract
    }

    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    fn set_status(&mut self, status: TransactionStatus) {
        if self.status != status {
            debug!(?status, "transaction status changed");
            self.status = status;
        }
    }

    async fn persist_token_id(&self) {
        let token_id = self.session.token_id();
        if token_id.is_empty() {
            return;
        }
        if let Err(err) = self.store.save_last_token_id(token_id).await {
            warn!(token_id = %token_id, "failed to persist last token id: {err:#}");
        }
    }

    /// Restores the persisted token id, then applies launch parameters on top.
    /// A URL id replaces the restored one but keeps the step it restored to.
    pub async fn load(&mut self, launch: &LaunchParams) {
        let last = match self.store.load_last_token_id().await {
            Ok(last) => last,
            Err(err) => {
                warn!("failed to read last token id: {err:#}");
                None
            }
        };

        if self.session.load(last.as_ref(), launch) {
            self.persist_token_id().await;
        }
        info!(
            step = self.session.step().number(),
            token_id = %self.session.token_id(),
            "payment flow loaded"
        );
    }

    pub async fn set_token_id(&mut self, raw: &str) -> TokenId {
        let token_id = self.session.set_token_id(raw).clone();
        self.persist_token_id().await;
        token_id
    }

    pub fn advance(&mut self) -> bool {
        self.session.advance()
    }

    pub fn retreat(&mut self) {
        self.session.retreat();
    }

    pub fn toggle_amount(&mut self, value: u64) -> bool {
        self.session.toggle_amount(value)
    }

    pub fn set_custom_amount(&mut self, text: &str) -> bool {
        self.session.set_custom_amount(text)
    }

    pub fn open_slides(&mut self) {
        self.session.open_slides();
    }

    pub fn close_slides(&mut self) {
        self.session.close_slides();
    }

    pub async fn is_connected(&self) -> bool {
        self.wallet.account().await.is_some()
    }

    pub async fn connect(&self) -> Result<Address> {
        match self.wallet.connect().await {
            Ok(account) => {
                info!(%account, "wallet connected");
                Ok(account)
            }
            Err(err) => {
                let error = PaymentError::external(format!("wallet connection failed: {err:#}"));
                warn!("{}", error.message);
                Err(error.into())
            }
        }
    }

    pub fn can_submit(&self) -> bool {
        self.session.can_submit(&self.status)
    }

    /// Builds the outbound request without submitting it.
    pub fn prepare(&self) -> Result<TransactionRequest, PaymentError> {
        let intent = self.session.build_payment_intent().ok_or_else(|| {
            PaymentError::precondition("a token id and a positive whole amount are required")
        })?;
        Ok(self.contract.transaction_request(&intent))
    }

    pub async fn submit(&mut self) -> Result<TxHash> {
        if self.status.is_pending() {
            return Err(PaymentError::precondition("a payment is already pending").into());
        }
        if !self.is_connected().await {
            return Err(PaymentError::precondition("wallet is not connected").into());
        }
        let request = self.prepare()?;

        match self.wallet.send_transaction(&request).await {
            Ok(hash) => {
                info!(%hash, token_id = %self.session.token_id(), "payment submitted");
                self.set_status(TransactionStatus::Pending(hash));
                Ok(hash)
            }
            Err(err) => {
                let error = PaymentError::external(format!("payment submission failed: {err:#}"));
                warn!("{}", error.message);
                self.set_status(TransactionStatus::Failed(error.message.clone()));
                Err(error.into())
            }
        }
    }

    pub async fn refresh_status(&mut self) -> Result<TransactionStatus> {
        let Some(hash) = self.status.hash().filter(|_| self.status.is_pending()) else {
            return Ok(self.status.clone());
        };
        let status = self.wallet.transaction_status(hash).await?;
        self.set_status(status.clone());
        Ok(status)
    }

    pub async fn wait_for_confirmation(
        &mut self,
        poll_interval: Duration,
        attempts: usize,
    ) -> Result<TransactionStatus> {
        let Some(hash) = self.status.hash().filter(|_| self.status.is_pending()) else {
            return Ok(self.status.clone());
        };
        let status =
            wallet::wait_for_confirmation(self.wallet.as_ref(), hash, poll_interval, attempts)
                .await?;
        self.set_status(status.clone());
        Ok(status)
    }
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
