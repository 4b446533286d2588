//! Client encoding against server decoding, and the codec used without the
//! server glue.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use turul_json_rpc_codec::client::{encode_client_batch, encode_client_request_with_id};
use turul_json_rpc_codec::prelude::*;
use turul_json_rpc_codec::{JsonRpcRequest, decode_request, encode_client_notification};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonRpcParams)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    query: String,
    max_results: u32,
    include_archived: bool,
}

#[test]
fn test_client_request_round_trip() {
    let args = SearchArgs {
        query: "rust".to_string(),
        max_results: 5,
        include_archived: true,
    };
    let raw = encode_client_request("search", &args).unwrap();

    let decoded = decode_request(&raw, None).unwrap();
    assert!(!decoded.is_batch);
    let record = decoded.records.into_iter().next().unwrap();
    assert!(record.is_valid());
    assert_eq!(record.method, "search");
    assert!(matches!(record.id, Some(RequestId::Number(_))));

    let codec = JsonRpcCodec::new();
    let bound: SearchArgs = codec.bind_params(record.params).unwrap();
    assert_eq!(bound, args);
}

#[test]
fn test_client_ids_vary() {
    let first: Value =
        serde_json::from_slice(&encode_client_request("ping", &()).unwrap()).unwrap();
    let second: Value =
        serde_json::from_slice(&encode_client_request("ping", &()).unwrap()).unwrap();
    assert!(first["id"].is_u64());
    assert!(second["id"].is_u64());
    assert_ne!(first["id"], second["id"]);
}

#[test]
fn test_codec_without_server() {
    let codec = JsonRpcCodec::new();
    let decoded = codec
        .decode_request(br#"{"jsonrpc":"2.0","method":"search","params":["x",2,false],"id":"q"}"#)
        .unwrap();
    let record = &decoded.records[0];

    let args: SearchArgs = codec.bind_params(record.params.clone()).unwrap();
    assert_eq!(args.max_results, 2);

    let response = codec.encode_success(record.id.clone().unwrap(), json!(["hit"]));
    let body = ResponseBody::assemble(decoded.is_batch, vec![Some(response)]);
    let bytes = codec.encode_body(&body).unwrap().unwrap();

    let replies = decode_client_response(&bytes).unwrap();
    let hits: Vec<String> = replies.into_iter().next().unwrap().into_result().unwrap();
    assert_eq!(hits, vec!["hit".to_string()]);
}

#[test]
fn test_codec_error_keeps_protocol_code() {
    let codec = JsonRpcCodec::builder()
        .error_mapper(|_ctx: &CallContext, _err: HandlerError| -> HandlerError {
            Box::new(JsonRpcErrorObject::custom(100, "everything is mapped"))
        })
        .build();
    let ctx = CallContext::new("search", Some(RequestId::Number(1)));

    let err: HandlerError = Box::new(CodecError::MethodNotFound("search".to_string()));
    let response = codec.encode_error(&ctx, ctx.id.clone(), err);
    assert_eq!(response.error_object().unwrap().code, METHOD_NOT_FOUND);

    let err: HandlerError = "plain failure".into();
    let response = codec.encode_error(&ctx, ctx.id.clone(), err);
    assert_eq!(response.error_object().unwrap().code, 100);
}

#[tokio::test]
async fn test_batch_round_trip_through_server() {
    let mut server = JsonRpcServer::new();
    server.register("search", |_ctx: CallContext, args: SearchArgs| async move {
        Ok::<_, HandlerError>(format!("{}:{}", args.query, args.max_results))
    });

    let requests = vec![
        JsonRpcRequest::new(
            RequestId::from("a"),
            "search".to_string(),
            Some(json!({"query": "one", "maxResults": 1})),
        ),
        JsonRpcRequest::new(
            RequestId::Number(2),
            "search".to_string(),
            Some(json!(["two", 2, false])),
        ),
        JsonRpcRequest::new_no_params(RequestId::Number(3), "missing".to_string()),
    ];
    let raw = encode_client_batch(&requests).unwrap();

    let bytes = server.handle_bytes(&raw, HashMap::new()).await.unwrap();
    let replies = decode_client_response(&bytes).unwrap();
    assert_eq!(replies.len(), 3);

    let ids: Vec<_> = replies.iter().map(|r| r.id().cloned()).collect();
    assert_eq!(
        ids,
        vec![
            Some(RequestId::from("a")),
            Some(RequestId::Number(2)),
            Some(RequestId::Number(3))
        ]
    );

    let mut replies = replies.into_iter();
    assert_eq!(replies.next().unwrap().into_result::<String>().unwrap(), "one:1");
    assert_eq!(replies.next().unwrap().into_result::<String>().unwrap(), "two:2");
    match replies.next().unwrap().into_result::<String>() {
        Err(ClientError::Rpc(error)) => assert_eq!(error.code, METHOD_NOT_FOUND),
        other => panic!("expected method not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_notification_round_trip_has_no_reply() {
    let mut server = JsonRpcServer::new();
    server.register("search", |_ctx: CallContext, _args: SearchArgs| async {
        Ok::<_, HandlerError>(())
    });

    let raw = encode_client_notification("search", &json!({"query": "quiet"})).unwrap();
    assert!(server.handle_bytes(&raw, HashMap::new()).await.is_none());

    let raw = encode_client_request_with_id(RequestId::Number(0), "search", &()).unwrap();
    let bytes = server.handle_bytes(&raw, HashMap::new()).await.unwrap();
    let reply: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(reply, json!({"jsonrpc": "2.0", "result": null, "id": 0}));
}
