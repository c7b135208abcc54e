use std::{path::PathBuf, sync::Arc};

use alloy_primitives::{hex, Address};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_settings, normalize_database_url, AvatarProvider, JsonRpcWallet, LaunchParams,
    MissingWallet, PaymentFlow, SeededAvatar, SessionSnapshot, Settings, Wallet,
};
use serde::Serialize;
use shared::{domain::PRESET_AMOUNTS, protocol::TransactionStatus};
use storage::Storage;

#[derive(Parser, Debug)]
#[command(name = "watt", about = "Compose and submit energy payments for a device token")]
struct Cli {
    /// Settings file; defaults to ./watt.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the payment intent and call data without touching a wallet
    Quote(ComposeArgs),
    /// Connect the configured wallet and submit the payment
    Pay {
        #[command(flatten)]
        compose: ComposeArgs,
        /// Poll for the receipt until confirmed or failed
        #[arg(long)]
        wait: bool,
    },
    /// Show the persisted last token id
    Last,
    /// Remove the persisted last token id
    Forget,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Frame launch URL carrying `id` and `amount` query parameters
    #[arg(long)]
    launch_url: Option<String>,
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    /// Toggle a preset amount; repeat to combine presets
    #[arg(long = "preset", value_name = "AMOUNT")]
    presets: Vec<u64>,
}

#[derive(Debug, Serialize)]
struct QuoteReport {
    session: SessionSnapshot,
    alias: Option<String>,
    energy: Option<String>,
    token_id: Option<String>,
    amount: Option<String>,
    to: Address,
    data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<TransactionStatus>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref());

    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open client storage at '{database_url}'"))?;

    match cli.command {
        Command::Quote(compose) => {
            let mut flow = build_flow(&settings, Arc::new(MissingWallet), storage)?;
            compose_session(&mut flow, compose).await?;
            print_report(&quote_report(&flow, None), cli.json)?;
        }
        Command::Pay { compose, wait } => {
            let wallet = build_wallet(&settings)?;
            let mut flow = build_flow(&settings, wallet, storage)?;
            compose_session(&mut flow, compose).await?;

            let account = flow.connect().await?;
            tracing::info!(%account, "wallet connected");
            flow.submit().await?;

            if wait {
                flow.wait_for_confirmation(
                    settings.confirmation_poll_interval(),
                    settings.confirmation_attempts,
                )
                .await?;
            }

            let status = flow.status().clone();
            print_report(&quote_report(&flow, Some(status.clone())), cli.json)?;
            if let TransactionStatus::Failed(reason) = status {
                bail!("payment failed: {reason}");
            }
        }
        Command::Last => {
            let last = storage.last_token_id().await?;
            match (last, cli.json) {
                (last, true) => println!("{}", serde_json::to_string(&last)?),
                (Some(token_id), false) => println!("{token_id}"),
                (None, false) => println!("no token id has been used yet"),
            }
        }
        Command::Forget => {
            let removed = storage.clear_last_token_id().await?;
            if cli.json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else if removed {
                println!("forgot last token id");
            } else {
                println!("nothing to forget");
            }
        }
    }

    Ok(())
}

fn build_wallet(settings: &Settings) -> Result<Arc<dyn Wallet>> {
    let Some(rpc_url) = settings.rpc_url.as_deref() else {
        bail!("no wallet rpc_url configured; set it in watt.toml or APP__RPC_URL");
    };

    let mut wallet = JsonRpcWallet::new(rpc_url, settings.chain_id);
    if let Some(account) = settings.wallet_account.as_deref() {
        let account: Address = account
            .trim()
            .parse()
            .with_context(|| format!("invalid wallet_account '{account}'"))?;
        wallet = wallet.with_account(account);
    }
    Ok(Arc::new(wallet))
}

fn build_flow(
    settings: &Settings,
    wallet: Arc<dyn Wallet>,
    storage: Storage,
) -> Result<PaymentFlow> {
    Ok(PaymentFlow::new(settings.contract()?, wallet, Arc::new(storage)))
}

async fn compose_session(flow: &mut PaymentFlow, args: ComposeArgs) -> Result<()> {
    let mut launch = LaunchParams::new(args.id, args.amount);
    if let Some(url) = args.launch_url.as_deref() {
        launch = launch.or(LaunchParams::from_url(url)?);
    }
    flow.load(&launch).await;

    if let Some(amount) = launch.amount.as_deref() {
        if flow.session().custom_amount() != amount {
            bail!("amount '{amount}' must be a number with at most two decimal places");
        }
    }

    for preset in args.presets {
        if !PRESET_AMOUNTS.contains(&preset) {
            tracing::warn!(preset, "amount is not one of the preset buttons");
        }
        flow.toggle_amount(preset);
    }

    if !flow.advance() {
        bail!("a device token id is required (use --id, --launch-url, or a previous session)");
    }
    Ok(())
}

fn quote_report(flow: &PaymentFlow, status: Option<TransactionStatus>) -> QuoteReport {
    let session = flow.session();
    let intent = session.build_payment_intent();
    let request = flow.prepare().ok();

    QuoteReport {
        session: session.snapshot(),
        alias: SeededAvatar
            .avatar(session.token_id(), 100)
            .map(|avatar| avatar.alias),
        energy: session.energy_label(),
        token_id: intent.map(|intent| intent.token_id.to_string()),
        amount: intent.map(|intent| intent.amount.to_string()),
        to: flow.contract().address,
        data: request.map(|request| hex::encode_prefixed(&request.data)),
        status,
    }
}

fn print_report(report: &QuoteReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let token = &report.session.token_id;
    match &report.alias {
        Some(alias) => println!("Device:   {token} ({alias})"),
        None => println!("Device:   {token}"),
    }
    println!("Amount:   {}", display_or_dash(&report.session.custom_amount));
    if let Some(energy) = &report.energy {
        println!("Energy:   {energy}");
    }
    println!("Contract: {}", report.to);
    match &report.data {
        Some(data) => println!("Calldata: {data}"),
        None => println!("Calldata: - (needs a positive whole amount)"),
    }
    match &report.status {
        Some(TransactionStatus::Pending(hash)) => println!("Status:   pending {hash}"),
        Some(TransactionStatus::Confirmed(hash)) => println!("Status:   confirmed {hash}"),
        Some(TransactionStatus::Failed(reason)) => println!("Status:   failed ({reason})"),
        Some(TransactionStatus::Idle) | None => {}
    }
    Ok(())
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
