//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use alloy_primitives::Address;
use client_core::{
    normalize_database_url, JsonRpcWallet, LastTokenStore, MissingWallet, Settings, Wallet,
};
use crossbeam_channel::{Receiver, Sender};
use storage::Storage;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let store = match open_store(&settings).await {
                Ok(store) => Some(store),
                Err(err) => {
                    tracing::error!("client storage unavailable: {err:#}");
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::Storage,
                        format!("client storage unavailable: {err:#}"),
                    )));
                    None
                }
            };
            let wallet: Arc<dyn Wallet> = match build_wallet(&settings) {
                Ok(wallet) => wallet,
                Err(err) => {
                    tracing::warn!("wallet disabled: {err:#}");
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("wallet disabled: {err:#}"),
                    )));
                    Arc::new(MissingWallet)
                }
            };

            while let Ok(cmd) = cmd_rx.recv() {
                handle_command(cmd, store.as_ref(), wallet.as_ref(), &ui_tx).await;
            }
            tracing::info!("ui command queue closed; backend worker exiting");
        });
    });
}

async fn open_store(settings: &Settings) -> anyhow::Result<Storage> {
    let database_url = normalize_database_url(&settings.database_url);
    Storage::new(&database_url).await
}

fn build_wallet(settings: &Settings) -> anyhow::Result<Arc<dyn Wallet>> {
    let Some(rpc_url) = settings.rpc_url.as_deref() else {
        return Ok(Arc::new(MissingWallet));
    };
    let mut wallet = JsonRpcWallet::new(rpc_url, settings.chain_id);
    if let Some(account) = settings.wallet_account.as_deref() {
        let account: Address = account
            .trim()
            .parse()
            .map_err(|err| anyhow::anyhow!("invalid wallet_account '{account}': {err}"))?;
        wallet = wallet.with_account(account);
    }
    Ok(Arc::new(wallet))
}

async fn handle_command(
    cmd: BackendCommand,
    store: Option<&Storage>,
    wallet: &dyn Wallet,
    ui_tx: &Sender<UiEvent>,
) {
    let event = match cmd {
        BackendCommand::LoadLastTokenId => match store {
            Some(store) => match store.load_last_token_id().await {
                Ok(last) => UiEvent::LastTokenIdLoaded(last),
                Err(err) => storage_error("failed to read last token id", err),
            },
            None => UiEvent::LastTokenIdLoaded(None),
        },
        BackendCommand::PersistTokenId(token_id) => {
            let Some(store) = store else {
                return;
            };
            match store.save_last_token_id(&token_id).await {
                Ok(()) => return,
                Err(err) => storage_error("failed to persist token id", err),
            }
        }
        BackendCommand::ConnectWallet => match wallet.connect().await {
            Ok(account) => {
                tracing::info!(%account, "wallet connected");
                UiEvent::WalletConnected(account)
            }
            Err(err) => UiEvent::Error(UiError::from_message(
                UiErrorContext::Connect,
                format!("{err:#}"),
            )),
        },
        BackendCommand::Submit(request) => match wallet.send_transaction(&request).await {
            Ok(hash) => {
                tracing::info!(%hash, to = %request.to, "payment submitted");
                UiEvent::TransactionSubmitted(hash)
            }
            Err(err) => {
                tracing::warn!("payment submission failed: {err:#}");
                UiEvent::Error(UiError::from_message(
                    UiErrorContext::Submit,
                    format!("{err:#}"),
                ))
            }
        },
        BackendCommand::PollStatus(hash) => match wallet.transaction_status(hash).await {
            Ok(status) => UiEvent::TransactionStatusChanged(status),
            Err(err) => UiEvent::Error(UiError::from_message(
                UiErrorContext::Status,
                format!("failed to read receipt for {hash}: {err:#}"),
            )),
        },
    };

    if ui_tx.try_send(event).is_err() {
        tracing::warn!("backend->ui event queue unavailable; dropping event");
    }
}

fn storage_error(what: &str, err: anyhow::Error) -> UiEvent {
    tracing::warn!("{what}: {err:#}");
    UiEvent::Error(UiError::from_message(
        UiErrorContext::Storage,
        format!("{what}: {err:#}"),
    ))
}
