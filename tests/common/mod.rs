//! Shared fixtures for integration tests: per-fork consensus headers and a
//! scriptable JSON-RPC node.

use alloy::consensus::Header;
use alloy::primitives::{Address, Bloom, Bytes, B256, B64, U256};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A header from before any fork extension (proof of work).
#[allow(dead_code)]
pub fn frontier_header() -> Header {
    Header {
        parent_hash: B256::repeat_byte(0x01),
        ommers_hash: B256::repeat_byte(0x02),
        beneficiary: Address::repeat_byte(0x03),
        state_root: B256::repeat_byte(0x04),
        transactions_root: B256::repeat_byte(0x05),
        receipts_root: B256::repeat_byte(0x06),
        logs_bloom: Bloom::repeat_byte(0x07),
        difficulty: U256::from(17_171_480_576u64),
        number: 46_147,
        gas_limit: 21_000,
        gas_used: 21_000,
        timestamp: 1_438_918_233,
        extra_data: Bytes::from_static(b"Geth/LVIVO/v1.0.0"),
        mix_hash: B256::repeat_byte(0x08),
        nonce: B64::from(0x00fa_12b3_0000_0042u64),
        ..Default::default()
    }
}

/// London: base fee only.
#[allow(dead_code)]
pub fn london_header() -> Header {
    Header {
        difficulty: U256::from(12_000_000_000_000_000u64),
        number: 12_965_000,
        gas_limit: 30_000_000,
        gas_used: 15_000_000,
        base_fee_per_gas: Some(1_000_000_000),
        ..frontier_header()
    }
}

/// Shanghai: proof of stake, withdrawals root appended.
#[allow(dead_code)]
pub fn shanghai_header() -> Header {
    Header {
        difficulty: U256::ZERO,
        nonce: B64::ZERO,
        number: 17_034_870,
        withdrawals_root: Some(B256::repeat_byte(0x09)),
        ..london_header()
    }
}

/// Cancun: blob gas fields and parent beacon block root.
#[allow(dead_code)]
pub fn cancun_header() -> Header {
    Header {
        number: 19_426_587,
        blob_gas_used: Some(393_216),
        excess_blob_gas: Some(0),
        parent_beacon_block_root: Some(B256::repeat_byte(0x0a)),
        ..shanghai_header()
    }
}

/// Prague: requests hash on top of everything else.
#[allow(dead_code)]
pub fn prague_header() -> Header {
    Header {
        number: 22_431_084,
        requests_hash: Some(B256::repeat_byte(0x0b)),
        ..cancun_header()
    }
}

/// Anvil's first dev account.
#[allow(dead_code)]
pub const PLAYER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// A local JSON-RPC node answering from a handler; records every method
/// it was asked for.
#[allow(dead_code)]
pub struct MockNode {
    pub url: String,
    calls: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockNode {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, method: &str) -> bool {
        self.calls().iter().any(|m| m == method)
    }
}

/// Start a node whose `handler(method, params)` returns the JSON-RPC
/// `result`, or an error message.
#[allow(dead_code)]
pub async fn start_rpc_node<F>(handler: F) -> MockNode
where
    F: Fn(&str, &Value) -> Result<Value, String> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let calls = Arc::new(Mutex::new(Vec::new()));

    let recorded = calls.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, handler.as_ref(), &recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockNode {
        url: format!("http://{}", addr),
        calls,
    }
}

/// Start a node that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_node() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(socket);
            });
        }
    });

    format!("http://{}", addr)
}

async fn serve<F>(mut socket: TcpStream, handler: &F, calls: &Mutex<Vec<String>>) -> std::io::Result<()>
where
    F: Fn(&str, &Value) -> Result<Value, String>,
{
    let body = read_http_body(&mut socket).await?;
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let response = match &request {
        Value::Array(batch) => Value::Array(batch.iter().map(|r| answer(r, handler, calls)).collect()),
        single => answer(single, handler, calls),
    };
    let payload = response.to_string();

    let http = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    socket.write_all(http.as_bytes()).await?;
    socket.shutdown().await
}

fn answer<F>(request: &Value, handler: &F, calls: &Mutex<Vec<String>>) -> Value
where
    F: Fn(&str, &Value) -> Result<Value, String>,
{
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or(Value::Null);
    calls.lock().unwrap().push(method.to_string());

    match handler(method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": message },
        }),
    }
}

async fn read_http_body(socket: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf[header_end..].to_vec())
}

/// ABI-encoded `bool` as returned by `eth_call`.
#[allow(dead_code)]
pub fn abi_bool(value: bool) -> Value {
    json!(format!("0x{:064x}", value as u8))
}

/// A receipt for `tx_hash` mined in `block` with the given status.
#[allow(dead_code)]
pub fn receipt(tx_hash: &Value, block: u64, success: bool) -> Value {
    json!({
        "type": "0x0",
        "status": if success { "0x1" } else { "0x0" },
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0x11).to_string(),
        "blockNumber": format!("{:#x}", block),
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        "to": Address::repeat_byte(0x22).to_string(),
        "contractAddress": null,
    })
}
