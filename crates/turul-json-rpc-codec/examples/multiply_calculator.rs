//! Multiply Calculator JSON-RPC Example
//!
//! Registers a `Service1.Multiply` method with typed params and an error
//! mapper, then feeds it single, batch and malformed payloads.
//!
//! Run with `RUST_LOG=debug` to see the codec's tracing output.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::json;
use turul_json_rpc_codec::prelude::*;

#[derive(Debug, Default, Serialize, JsonRpcParams)]
#[serde(rename_all = "UPPERCASE")]
struct MultiplyArgs {
    a: i64,
    b: i64,
}

#[derive(Debug)]
struct Overflow;

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product does not fit in i64")
    }
}

impl std::error::Error for Overflow {}

async fn multiply(_ctx: CallContext, args: MultiplyArgs) -> Result<i64, HandlerError> {
    if args.a == 0 && args.b == 0 {
        return Ok(9999);
    }
    args.a.checked_mul(args.b).ok_or_else(|| Overflow.into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Multiply Calculator JSON-RPC Example");
    println!("====================================");

    let codec = JsonRpcCodec::builder()
        .max_batch_size(16)
        .error_mapper(|_ctx: &CallContext, err: HandlerError| -> HandlerError {
            if err.is::<Overflow>() {
                Box::new(JsonRpcErrorObject::custom(100, err.to_string()))
            } else {
                err
            }
        })
        .build();

    let mut server = JsonRpcServer::builder().codec(codec).build();
    server.register("Service1.Multiply", multiply);

    let client_request = encode_client_request("Service1.Multiply", &MultiplyArgs { a: 6, b: 7 })?;

    let payloads: Vec<Vec<u8>> = vec![
        br#"{"jsonrpc":"2.0","method":"Service1.Multiply","params":{"A":4,"B":2},"id":1}"#.to_vec(),
        br#"{"jsonrpc":"2.0","method":"Service1.Multiply","id":2}"#.to_vec(),
        br#"[
            {"jsonrpc":"2.0","method":"Service1.Multiply","params":[3,5],"id":"a"},
            {"jsonrpc":"2.0","method":"Service1.Multiply","params":[1]},
            {"jsonrpc":"2.0","method":"Service1.Multiply","params":[9223372036854775807,2],"id":"b"},
            {"jsonrpc":"2.0","method":"Service1.Divide","params":[1,2],"id":"c"}
        ]"#
        .to_vec(),
        json!({"jsonrpc": "2.0", "method": "Service1.Multiply", "params": [1, 2, 3], "id": 3})
            .to_string()
            .into_bytes(),
        b"not even a json".to_vec(),
        client_request,
    ];

    for (i, payload) in payloads.iter().enumerate() {
        println!("\n--- Test {} ---", i + 1);
        println!("Request: {}", String::from_utf8_lossy(payload));

        match server.handle_bytes(payload, HashMap::new()).await {
            Some(bytes) => println!("Response: {}", String::from_utf8_lossy(&bytes)),
            None => println!("(no response: notifications only)"),
        }
    }

    Ok(())
}
