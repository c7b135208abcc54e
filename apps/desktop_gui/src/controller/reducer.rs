//! Reducer-style transitions for the payment screens.
//!
//! Widgets emit [`UiAction`]s and the backend emits [`UiEvent`]s. Both are folded
//! into [`PaymentUiState`], and each transition may yield backend commands for the
//! caller to dispatch. Nothing here touches egui, so the whole flow is testable.

use alloy_primitives::Address;
use client_core::{ContractConfig, LaunchParams, SessionController};
use shared::protocol::TransactionStatus;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiAction, UiError, UiErrorContext, UiEvent};

#[derive(Debug)]
pub struct PaymentUiState {
    pub session: SessionController,
    pub contract: ContractConfig,
    /// Echo of the sanitized token id, bound to the text field.
    pub token_input: String,
    pub amount_input: String,
    pub account: Option<Address>,
    pub tx_status: TransactionStatus,
    pub status: String,
    pub last_error: Option<UiError>,
    pending_launch: Option<LaunchParams>,
    connecting: bool,
    submitting: bool,
    /// A `PollStatus` command is queued or running.
    polling: bool,
}

impl PaymentUiState {
    /// Launch parameters are held back until the persisted token id has been read,
    /// so the URL id can override it.
    pub fn new(contract: ContractConfig, launch: LaunchParams) -> Self {
        Self {
            session: SessionController::new(),
            contract,
            token_input: String::new(),
            amount_input: String::new(),
            account: None,
            tx_status: TransactionStatus::Idle,
            status: "Loading last session...".to_string(),
            last_error: None,
            pending_launch: Some(launch),
            connecting: false,
            submitting: false,
            polling: false,
        }
    }

    pub fn startup_commands(&self) -> Vec<BackendCommand> {
        vec![BackendCommand::LoadLastTokenId]
    }

    pub fn is_loading(&self) -> bool {
        self.pending_launch.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn is_busy(&self) -> bool {
        self.submitting || self.tx_status.is_pending()
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn can_submit(&self) -> bool {
        self.is_connected() && !self.submitting && self.session.can_submit(&self.tx_status)
    }

    pub fn apply_action(&mut self, action: UiAction) -> Vec<BackendCommand> {
        match action {
            UiAction::TokenInputChanged(raw) => {
                let token_id = self.session.set_token_id(&raw).clone();
                self.token_input = token_id.to_string();
                if token_id.is_empty() {
                    Vec::new()
                } else {
                    vec![BackendCommand::PersistTokenId(token_id)]
                }
            }
            UiAction::Advance => {
                if !self.session.advance() {
                    self.status = "Enter a device token id first".to_string();
                }
                Vec::new()
            }
            UiAction::Retreat => {
                self.session.retreat();
                Vec::new()
            }
            UiAction::TogglePreset(value) => {
                self.session.toggle_amount(value);
                self.sync_amount_input();
                Vec::new()
            }
            UiAction::AmountInputChanged(text) => {
                // Rejected keystrokes snap the field back to the last valid amount.
                self.session.set_custom_amount(&text);
                self.sync_amount_input();
                Vec::new()
            }
            UiAction::ConnectWallet => {
                if self.connecting {
                    return Vec::new();
                }
                self.connecting = true;
                self.status = "Connecting wallet...".to_string();
                vec![BackendCommand::ConnectWallet]
            }
            UiAction::Submit => self.submit(),
            UiAction::OpenSlides => {
                self.session.open_slides();
                Vec::new()
            }
            UiAction::CloseSlides => {
                self.session.close_slides();
                Vec::new()
            }
            UiAction::PollTick => match &self.tx_status {
                TransactionStatus::Pending(hash) if !self.polling => {
                    self.polling = true;
                    vec![BackendCommand::PollStatus(*hash)]
                }
                _ => Vec::new(),
            },
            UiAction::DismissError => {
                self.last_error = None;
                Vec::new()
            }
        }
    }

    pub fn apply_event(&mut self, event: UiEvent) -> Vec<BackendCommand> {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
                Vec::new()
            }
            UiEvent::LastTokenIdLoaded(last) => {
                // Only the first load counts; later ones would clobber user edits.
                let Some(launch) = self.pending_launch.take() else {
                    return Vec::new();
                };
                let mut commands = Vec::new();
                if self.session.load(last.as_ref(), &launch) {
                    commands.push(BackendCommand::PersistTokenId(
                        self.session.token_id().clone(),
                    ));
                }
                self.token_input = self.session.token_id().to_string();
                self.sync_amount_input();
                self.status = "Ready".to_string();
                commands
            }
            UiEvent::WalletConnected(account) => {
                self.account = Some(account);
                self.connecting = false;
                self.status = format!("Connected {account}");
                Vec::new()
            }
            UiEvent::TransactionSubmitted(hash) => {
                self.submitting = false;
                self.polling = false;
                self.tx_status = TransactionStatus::Pending(hash);
                self.status = format!("Submitted {hash}");
                Vec::new()
            }
            UiEvent::TransactionStatusChanged(status) => {
                self.status = match &status {
                    TransactionStatus::Idle => self.status.clone(),
                    TransactionStatus::Pending(_) => "Waiting for confirmation...".to_string(),
                    TransactionStatus::Confirmed(hash) => format!("Payment confirmed {hash}"),
                    TransactionStatus::Failed(reason) => format!("Payment failed: {reason}"),
                };
                self.polling = false;
                self.tx_status = status;
                Vec::new()
            }
            UiEvent::Error(err) => {
                match err.context() {
                    UiErrorContext::Connect => self.connecting = false,
                    UiErrorContext::Submit => {
                        self.submitting = false;
                        self.tx_status = TransactionStatus::Failed(err.message().to_string());
                    }
                    UiErrorContext::Storage => {
                        // Persistence is best effort; a failed read still releases the launch.
                        if self.pending_launch.is_some() {
                            let commands = self.apply_event(UiEvent::LastTokenIdLoaded(None));
                            self.status = format!("{}: {}", err.label(), err.message());
                            self.last_error = Some(err);
                            return commands;
                        }
                    }
                    UiErrorContext::Status => self.polling = false,
                    UiErrorContext::BackendStartup => {}
                }
                self.status = format!("{}: {}", err.label(), err.message());
                self.last_error = Some(err);
                Vec::new()
            }
        }
    }

    fn submit(&mut self) -> Vec<BackendCommand> {
        if !self.is_connected() {
            self.last_error = Some(UiError::from_message(
                UiErrorContext::Submit,
                "wallet is not connected",
            ));
            return Vec::new();
        }
        if !self.can_submit() {
            return Vec::new();
        }
        let Some(intent) = self.session.build_payment_intent() else {
            self.last_error = Some(UiError::from_message(
                UiErrorContext::Submit,
                "invalid amount: payments need a positive whole number",
            ));
            return Vec::new();
        };

        self.submitting = true;
        self.last_error = None;
        self.tx_status = TransactionStatus::Idle;
        self.status = "Confirm the payment in your wallet".to_string();
        vec![BackendCommand::Submit(
            self.contract.transaction_request(&intent),
        )]
    }

    fn sync_amount_input(&mut self) {
        self.amount_input = self.session.custom_amount().to_string();
    }
}
