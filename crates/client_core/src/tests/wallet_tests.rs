use super::*;
use std::{collections::VecDeque, sync::Arc};

use alloy_primitives::{address, b256, bytes};
use axum::{extract::State, routing::post, Json, Router};
use tokio::{net::TcpListener, sync::Mutex};

const ACCOUNT: Address = address!("00000000000000000000000000000000000000aa");
const HASH: TxHash = b256!("1111111111111111111111111111111111111111111111111111111111111111");

#[derive(Clone, Default)]
struct RpcStubState {
    requests: Arc<Mutex<Vec<Value>>>,
    receipts: Arc<Mutex<VecDeque<Value>>>,
    reject_request_accounts: bool,
    reject_send: bool,
}

async fn handle_rpc(State(state): State<RpcStubState>, Json(body): Json<Value>) -> Json<Value> {
    state.requests.lock().await.push(body.clone());
    let id = body["id"].clone();
    let method = body["method"].as_str().unwrap_or_default().to_string();

    let outcome = match method.as_str() {
        "eth_requestAccounts" if state.reject_request_accounts => {
            Err((4001, "User rejected the request."))
        }
        "eth_requestAccounts" | "eth_accounts" => Ok(json!([ACCOUNT])),
        "eth_sendTransaction" if state.reject_send => Err((-32000, "execution reverted")),
        "eth_sendTransaction" => Ok(json!(HASH)),
        "eth_getTransactionReceipt" => Ok(state
            .receipts
            .lock()
            .await
            .pop_front()
            .unwrap_or(Value::Null)),
        _ => Err((-32601, "method not found")),
    };

    Json(match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => {
            json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
        }
    })
}

async fn spawn_rpc_stub(state: RpcStubState) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new().route("/", post(handle_rpc)).with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/"))
}

fn sample_request() -> TransactionRequest {
    TransactionRequest {
        to: address!("16008fd81f1fff5b5fb52a279778d187d69276fd"),
        data: bytes!("deadbeef"),
    }
}

#[tokio::test]
async fn connect_requests_accounts_and_remembers_first() {
    let state = RpcStubState::default();
    let url = spawn_rpc_stub(state.clone()).await.expect("spawn stub");
    let wallet = JsonRpcWallet::new(url, 8453);

    assert_eq!(wallet.account().await, None);
    assert_eq!(wallet.connect().await.expect("connect"), ACCOUNT);
    assert_eq!(wallet.account().await, Some(ACCOUNT));

    // second connect is served from the cached account
    wallet.connect().await.expect("reconnect");
    assert_eq!(state.requests.lock().await.len(), 1);
}

#[tokio::test]
async fn connect_falls_back_to_eth_accounts_when_request_is_rejected() {
    let state = RpcStubState {
        reject_request_accounts: true,
        ..RpcStubState::default()
    };
    let url = spawn_rpc_stub(state.clone()).await.expect("spawn stub");
    let wallet = JsonRpcWallet::new(url, 8453);

    assert_eq!(wallet.connect().await.expect("connect"), ACCOUNT);
    let methods: Vec<String> = state
        .requests
        .lock()
        .await
        .iter()
        .map(|req| req["method"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(methods, vec!["eth_requestAccounts", "eth_accounts"]);
}

#[tokio::test]
async fn send_transaction_requires_connection() {
    let url = spawn_rpc_stub(RpcStubState::default())
        .await
        .expect("spawn stub");
    let wallet = JsonRpcWallet::new(url, 8453);

    let err = wallet
        .send_transaction(&sample_request())
        .await
        .expect_err("not connected");
    assert!(matches!(
        err.downcast_ref::<WalletError>(),
        Some(WalletError::NotConnected)
    ));
}

#[tokio::test]
async fn send_transaction_posts_to_and_data() {
    let state = RpcStubState::default();
    let url = spawn_rpc_stub(state.clone()).await.expect("spawn stub");
    let wallet = JsonRpcWallet::new(url, 8453).with_account(ACCOUNT);

    let hash = wallet
        .send_transaction(&sample_request())
        .await
        .expect("send");
    assert_eq!(hash, HASH);

    let requests = state.requests.lock().await;
    let sent = &requests[0];
    assert_eq!(sent["method"], "eth_sendTransaction");
    let params = &sent["params"][0];
    assert_eq!(
        serde_json::from_value::<Address>(params["to"].clone()).expect("to"),
        sample_request().to
    );
    assert_eq!(params["data"], "0xdeadbeef");
    assert_eq!(params["chainId"], "0x2105");
    assert_eq!(params["from"], json!(ACCOUNT));
}

#[tokio::test]
async fn rpc_error_surfaces_as_wallet_error() {
    let state = RpcStubState {
        reject_send: true,
        ..RpcStubState::default()
    };
    let url = spawn_rpc_stub(state).await.expect("spawn stub");
    let wallet = JsonRpcWallet::new(url, 8453).with_account(ACCOUNT);

    let err = wallet
        .send_transaction(&sample_request())
        .await
        .expect_err("reverted");
    match err.downcast_ref::<WalletError>() {
        Some(WalletError::Rpc { code, message }) => {
            assert_eq!(*code, -32000);
            assert_eq!(message, "execution reverted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn receipt_status_maps_to_transaction_status() {
    let state = RpcStubState::default();
    {
        let mut receipts = state.receipts.lock().await;
        receipts.push_back(Value::Null);
        receipts.push_back(json!({ "status": "0x1" }));
        receipts.push_back(json!({ "status": "0x0" }));
    }
    let url = spawn_rpc_stub(state).await.expect("spawn stub");
    let wallet = JsonRpcWallet::new(url, 8453);

    assert_eq!(
        wallet.transaction_status(HASH).await.expect("pending"),
        TransactionStatus::Pending(HASH)
    );
    assert_eq!(
        wallet.transaction_status(HASH).await.expect("confirmed"),
        TransactionStatus::Confirmed(HASH)
    );
    assert!(matches!(
        wallet.transaction_status(HASH).await.expect("failed"),
        TransactionStatus::Failed(_)
    ));
}

#[tokio::test]
async fn wait_for_confirmation_polls_until_terminal() {
    let state = RpcStubState::default();
    {
        let mut receipts = state.receipts.lock().await;
        receipts.push_back(Value::Null);
        receipts.push_back(Value::Null);
        receipts.push_back(json!({ "status": "0x1" }));
    }
    let url = spawn_rpc_stub(state.clone()).await.expect("spawn stub");
    let wallet = JsonRpcWallet::new(url, 8453);

    let status = wait_for_confirmation(&wallet, HASH, Duration::from_millis(5), 10)
        .await
        .expect("wait");
    assert_eq!(status, TransactionStatus::Confirmed(HASH));
    assert_eq!(state.requests.lock().await.len(), 3);
}

#[tokio::test]
async fn wait_for_confirmation_gives_up_as_pending() {
    let url = spawn_rpc_stub(RpcStubState::default())
        .await
        .expect("spawn stub");
    let wallet = JsonRpcWallet::new(url, 8453);

    let status = wait_for_confirmation(&wallet, HASH, Duration::from_millis(1), 2)
        .await
        .expect("wait");
    assert_eq!(status, TransactionStatus::Pending(HASH));
}

#[tokio::test]
async fn missing_wallet_always_fails() {
    let wallet = MissingWallet;
    assert!(wallet.connect().await.is_err());
    assert!(wallet.account().await.is_none());
    assert!(wallet.send_transaction(&sample_request()).await.is_err());
    assert!(wallet.transaction_status(HASH).await.is_err());
}
