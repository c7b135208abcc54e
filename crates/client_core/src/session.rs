//! Session state controller for the two-screen payment flow.
//!
//! The controller is the single writer of session state. Views read it through
//! the accessors and mutate it only through the named operations below.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{PaymentIntent, Step, TokenId},
    protocol::TransactionStatus,
};
use tracing::debug;

use crate::{
    amount::{self, AmountSelection},
    launch::LaunchParams,
};

#[derive(Debug, Clone, Default)]
pub struct SessionController {
    step: Step,
    token_id: TokenId,
    avatar_transitioned: bool,
    slide_open: bool,
    amounts: AmountSelection,
}

/// Read-only copy of the session, suitable for rendering or logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub step: u8,
    pub token_id: String,
    pub avatar_transitioned: bool,
    pub slide_open: bool,
    pub selected_amounts: Vec<u64>,
    pub custom_amount: String,
    pub energy_kwh: f64,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn token_id(&self) -> &TokenId {
        &self.token_id
    }

    pub fn avatar_transitioned(&self) -> bool {
        self.avatar_transitioned
    }

    pub fn slide_open(&self) -> bool {
        self.slide_open
    }

    pub fn amounts(&self) -> &AmountSelection {
        &self.amounts
    }

    pub fn custom_amount(&self) -> &str {
        self.amounts.custom()
    }

    pub fn set_token_id(&mut self, raw: &str) -> &TokenId {
        self.token_id = TokenId::sanitize(raw);
        &self.token_id
    }

    pub fn can_advance(&self) -> bool {
        self.step == Step::Identify && !self.token_id.is_empty()
    }

    /// Moves to the payment screen. Returns `false` when no token id is set.
    pub fn advance(&mut self) -> bool {
        if self.token_id.is_empty() {
            debug!("advance ignored without token id");
            return false;
        }
        self.step = Step::Pay;
        self.avatar_transitioned = true;
        debug!(token_id = %self.token_id, "advanced to payment step");
        true
    }

    pub fn retreat(&mut self) {
        self.step = Step::Identify;
        self.avatar_transitioned = false;
        debug!("returned to identify step");
    }

    /// Seeds the session from a persisted token id, landing directly on step 2.
    pub fn restore(&mut self, last_token_id: &TokenId) -> bool {
        let token_id = TokenId::sanitize(last_token_id.as_str());
        if token_id.is_empty() {
            return false;
        }
        self.token_id = token_id;
        self.step = Step::Pay;
        self.avatar_transitioned = true;
        debug!(token_id = %self.token_id, "restored last token id");
        true
    }

    /// Applies URL parameters. An id without digits and an amount that fails
    /// validation are both dropped. Returns `true` when the id replaced the token.
    pub fn seed(&mut self, launch: &LaunchParams) -> bool {
        let mut id_applied = false;
        if let Some(id) = launch.id.as_deref() {
            let token_id = TokenId::sanitize(id);
            if token_id.is_empty() {
                debug!(id, "ignored launch id without digits");
            } else {
                self.token_id = token_id;
                id_applied = true;
            }
        }
        if let Some(amount) = launch.amount.as_deref() {
            if !self.amounts.set_custom(amount) {
                debug!(amount, "ignored invalid launch amount");
            }
        }
        id_applied
    }

    /// Startup ordering: restore the persisted id, then let launch parameters
    /// override it. Returns `true` when a launch id should be persisted.
    pub fn load(&mut self, last_token_id: Option<&TokenId>, launch: &LaunchParams) -> bool {
        if let Some(last) = last_token_id {
            self.restore(last);
        }
        self.seed(launch)
    }

    pub fn toggle_amount(&mut self, value: u64) -> bool {
        self.amounts.toggle(value)
    }

    pub fn set_custom_amount(&mut self, text: &str) -> bool {
        self.amounts.set_custom(text)
    }

    pub fn open_slides(&mut self) {
        self.slide_open = true;
    }

    pub fn close_slides(&mut self) {
        self.slide_open = false;
    }

    /// The header avatar doubles as the back button once step 2 has been reached.
    pub fn shows_nav_avatar(&self) -> bool {
        !self.token_id.is_empty() && self.avatar_transitioned
    }

    pub fn compute_energy(amount_text: &str) -> f64 {
        amount::compute_energy(amount_text)
    }

    pub fn energy(&self) -> f64 {
        amount::compute_energy(self.amounts.custom())
    }

    pub fn energy_label(&self) -> Option<String> {
        self.amounts
            .is_positive()
            .then(|| amount::format_energy(self.energy()))
    }

    pub fn can_submit(&self, status: &TransactionStatus) -> bool {
        !status.is_pending() && self.amounts.is_positive()
    }

    pub fn build_payment_intent(&self) -> Option<PaymentIntent> {
        let token_id = self.token_id.to_u256()?;
        if !self.amounts.is_positive() {
            return None;
        }
        let amount = amount::integer_amount(self.amounts.custom())?;
        Some(PaymentIntent { token_id, amount })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            step: self.step.number(),
            token_id: self.token_id.to_string(),
            avatar_transitioned: self.avatar_transitioned,
            slide_open: self.slide_open,
            selected_amounts: self.amounts.selected().iter().copied().collect(),
            custom_amount: self.amounts.custom().to_string(),
            energy_kwh: self.energy(),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
