//! End-to-end dispatch tests against an in-memory transport
//!
//! These tests verify that:
//! 1. Arguments are validated and CBOR-encoded in declared order
//! 2. Invalid calls never reach the transport
//! 3. Responses are decoded and unwrapped per the declared returns
//! 4. Transport errors come back unchanged

use std::sync::Arc;

use actor_client::infrastructure::abi::codec;
use actor_client::{
    AbiError, AbiRegistry, AbiValue, Account, CallArgs, CallOutput, Client, Context, NodeConfig,
    SubmitRequest, Transport,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::sync::Mutex;

const HELLO_WORLD_ABI: &str = r#"{
    "functions": [
        { "name": "new", "index": 1, "args": [], "return": [] },
        { "name": "say_hello", "index": 2, "args": [], "return": [{ "type": "string" }] }
    ]
}"#;

const CUSTOM_ABI: &str = r#"{
    "functions": [
        { "name": "new", "index": 1, "args": [], "return": [] },
        {
            "name": "say_hello",
            "index": 2,
            "args": [
                { "name": "data1", "type": "Array<u64>" },
                { "name": "data2", "type": "Array<string>" },
                { "name": "data3", "type": "Map<string, u64>" },
                { "name": "data4", "type": "CustomArgument" }
            ],
            "return": [{ "type": "string" }]
        }
    ],
    "types": [
        {
            "name": "CustomArgument",
            "type": "object",
            "fields": [
                { "name": "field1", "type": "u64" },
                { "name": "field2", "type": "u16" },
                { "name": "field3", "type": "string" },
                { "name": "field4", "type": "CustomArgument2" }
            ]
        },
        {
            "name": "CustomArgument2",
            "type": "object",
            "fields": [
                { "name": "field1", "type": "u64" },
                { "name": "field2", "type": "u16" },
                { "name": "field3", "type": "string" }
            ]
        }
    ]
}"#;

const ERC20_ABI: &str = r#"{
    "functions": [
        { "name": "GetSymbol", "index": 4, "args": [], "return": [{ "type": "string" }] },
        {
            "name": "Approval",
            "index": 9,
            "args": [
                { "name": "spenderAddr", "type": "string" },
                { "name": "newAllowance", "type": "u64" }
            ],
            "return": []
        },
        { "name": "Transfer", "index": 10, "args": [], "return": [] }
    ]
}"#;

/// A submission captured by the test transport
#[derive(Debug, Clone)]
struct Recorded {
    node_url: String,
    address: String,
    method_index: u64,
    value: String,
    params: Vec<u8>,
}

/// Transport that records submissions and replies with a fixed result
struct RecordingTransport {
    reply: Option<String>,
    submissions: Mutex<Vec<Recorded>>,
}

impl RecordingTransport {
    fn replying(reply: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            submissions: Mutex::new(Vec::new()),
        })
    }

    async fn submissions(&self) -> Vec<Recorded> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn submit(&self, request: SubmitRequest<'_>) -> anyhow::Result<Option<String>> {
        self.submissions.lock().await.push(Recorded {
            node_url: request.node.url.clone(),
            address: request.address.to_string(),
            method_index: request.method_index,
            value: request.value.to_string(),
            params: request.params.to_vec(),
        });
        Ok(self.reply.clone())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("node unreachable")]
struct NodeDown;

/// Transport that always fails
struct FailingTransport;

#[async_trait::async_trait]
impl Transport for FailingTransport {
    async fn submit(&self, _request: SubmitRequest<'_>) -> anyhow::Result<Option<String>> {
        Err(NodeDown.into())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn reply(values: Vec<AbiValue>) -> Option<String> {
    Some(STANDARD.encode(codec::encode_params(&values).unwrap()))
}

fn account() -> Account {
    Account::new("f1sender", "cHJpdmF0ZQ==")
}

fn client(transport: Arc<dyn Transport>) -> Client {
    Client::new(
        Context::new(NodeConfig::new("http://127.0.0.1:1234/rpc/v0", None)),
        transport,
    )
}

fn registry(abi: &str) -> Arc<AbiRegistry> {
    Arc::new(AbiRegistry::from_json_str(abi).unwrap())
}

#[tokio::test]
async fn test_say_hello_returns_bare_string() {
    init_tracing();
    let transport = RecordingTransport::replying(reply(vec![AbiValue::text("Hello world 5")]));
    let contract = client(transport.clone()).bind("f01001", registry(HELLO_WORLD_ABI));

    let out = contract
        .call("say_hello", &account(), "0", CallArgs::none())
        .await
        .unwrap();
    assert_eq!(out, CallOutput::Single(AbiValue::text("Hello world 5")));

    let submissions = transport.submissions().await;
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].node_url, "http://127.0.0.1:1234/rpc/v0");
    assert_eq!(submissions[0].address, "f01001");
    assert_eq!(submissions[0].method_index, 2);
    assert_eq!(submissions[0].value, "0");
    // empty argument list
    assert_eq!(submissions[0].params, vec![0x80]);
}

#[tokio::test]
async fn test_approval_serializes_ordered_pair() {
    init_tracing();
    let transport = RecordingTransport::replying(None);
    let contract = client(transport.clone()).bind("f01002", registry(ERC20_ABI));

    let args = CallArgs::named([
        ("newAllowance", AbiValue::big(1000)),
        ("spenderAddr", AbiValue::text("1001")),
    ]);
    let out = contract.call("Approval", &account(), "0", args).await.unwrap();
    assert!(out.is_none());

    let submissions = transport.submissions().await;
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].method_index, 9);
    assert_eq!(
        codec::decode(&submissions[0].params).unwrap(),
        AbiValue::Array(vec![AbiValue::text("1001"), AbiValue::big(1000)])
    );
}

#[tokio::test]
async fn test_missing_argument_never_submits() {
    let transport = RecordingTransport::replying(None);
    let contract = client(transport.clone()).bind("f01002", registry(ERC20_ABI));

    let args = CallArgs::named([("spenderAddr", AbiValue::text("1001"))]);
    let err = contract.call("Approval", &account(), "0", args).await.unwrap_err();

    assert!(matches!(err, AbiError::ArgumentMissing { ref name } if name == "newAllowance"));
    assert!(transport.submissions().await.is_empty());
}

#[tokio::test]
async fn test_invalid_argument_never_submits() {
    let transport = RecordingTransport::replying(None);
    let contract = client(transport.clone()).bind("f01002", registry(ERC20_ABI));

    // 64-bit values must be big integers
    let args = CallArgs::positional([AbiValue::text("1001"), AbiValue::Int(1000)]);
    let err = contract.call("Approval", &account(), "0", args).await.unwrap_err();

    assert!(matches!(err, AbiError::TypeMismatch { .. }));
    assert!(transport.submissions().await.is_empty());
}

#[tokio::test]
async fn test_void_method() {
    let transport = RecordingTransport::replying(None);
    let contract = client(transport).bind("f01002", registry(ERC20_ABI));
    let out = contract
        .call("Transfer", &account(), "0", CallArgs::none())
        .await
        .unwrap();
    assert!(out.is_none());

    let transport = RecordingTransport::replying(reply(vec![]));
    let contract = client(transport).bind("f01002", registry(ERC20_ABI));
    let err = contract
        .call("Transfer", &account(), "0", CallArgs::none())
        .await
        .unwrap_err();
    assert!(matches!(err, AbiError::ResponseArity(_)));
}

#[tokio::test]
async fn test_expected_response_missing() {
    let transport = RecordingTransport::replying(None);
    let contract = client(transport).bind("f01002", registry(ERC20_ABI));
    let err = contract
        .call("GetSymbol", &account(), "0", CallArgs::none())
        .await
        .unwrap_err();
    assert!(matches!(err, AbiError::ResponseArity(_)));
}

#[tokio::test]
async fn test_nested_custom_arguments() {
    init_tracing();
    let transport = RecordingTransport::replying(reply(vec![AbiValue::text("Hello world 6")]));
    let contract = client(transport.clone()).bind("f01001", registry(CUSTOM_ABI));

    let inner = AbiValue::object([
        ("field1", AbiValue::big(100)),
        ("field2", AbiValue::Int(111)),
        ("field3", AbiValue::text("asdasd")),
    ]);
    let args = CallArgs::positional([
        AbiValue::Array(vec![AbiValue::big(1000), AbiValue::big(1000)]),
        AbiValue::Array(vec![AbiValue::text("data"), AbiValue::text("test")]),
        AbiValue::object([("test", AbiValue::big(1000))]),
        AbiValue::object([
            ("field1", AbiValue::big(100)),
            ("field2", AbiValue::Int(111)),
            ("field3", AbiValue::text("asdasd")),
            ("field4", inner),
        ]),
    ]);

    let out = contract.call("say_hello", &account(), "0", args).await.unwrap();
    assert_eq!(out.into_single(), Some(AbiValue::text("Hello world 6")));

    let submissions = transport.submissions().await;
    let sent = codec::decode(&submissions[0].params).unwrap();
    let AbiValue::Array(sent) = sent else {
        panic!("params should be an array");
    };
    assert_eq!(sent.len(), 4);
    assert_eq!(
        sent[3],
        AbiValue::Array(vec![
            AbiValue::big(100),
            AbiValue::Int(111),
            AbiValue::text("asdasd"),
            AbiValue::Array(vec![AbiValue::big(100), AbiValue::Int(111), AbiValue::text("asdasd")]),
        ])
    );
}

#[tokio::test]
async fn test_nested_field_error_path() {
    let transport = RecordingTransport::replying(None);
    let contract = client(transport.clone()).bind("f01001", registry(CUSTOM_ABI));

    let inner = AbiValue::object([
        ("field1", AbiValue::big(100)),
        ("field2", AbiValue::Int(70_000)),
        ("field3", AbiValue::text("asdasd")),
    ]);
    let args = CallArgs::positional([
        AbiValue::Array(vec![]),
        AbiValue::Array(vec![]),
        AbiValue::Map(vec![]),
        AbiValue::object([
            ("field1", AbiValue::big(100)),
            ("field2", AbiValue::Int(111)),
            ("field3", AbiValue::text("asdasd")),
            ("field4", inner),
        ]),
    ]);

    let err = contract.call("say_hello", &account(), "0", args).await.unwrap_err();
    match err {
        AbiError::TypeMismatch { path, .. } => assert_eq!(path, "data4.field4.field2"),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(transport.submissions().await.is_empty());
}

#[tokio::test]
async fn test_transport_error_passes_through() {
    let contract = client(Arc::new(FailingTransport)).bind("f01002", registry(ERC20_ABI));
    let err = contract
        .call("GetSymbol", &account(), "0", CallArgs::none())
        .await
        .unwrap_err();

    match err {
        AbiError::Transport(inner) => assert!(inner.downcast_ref::<NodeDown>().is_some()),
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_method() {
    let transport = RecordingTransport::replying(None);
    let contract = client(transport.clone()).bind("f01002", registry(ERC20_ABI));
    let err = contract
        .call("Mint", &account(), "0", CallArgs::none())
        .await
        .unwrap_err();
    assert!(matches!(err, AbiError::UnknownMethod(_)));
    assert!(transport.submissions().await.is_empty());
}

#[tokio::test]
async fn test_concurrent_calls_share_binding() {
    let transport = RecordingTransport::replying(reply(vec![AbiValue::text("ZDX")]));
    let contract = client(transport.clone()).bind("f01002", registry(ERC20_ABI));
    let sender = account();

    let calls = (0..8).map(|_| contract.call("GetSymbol", &sender, "0", CallArgs::none()));
    let results = futures::future::join_all(calls).await;

    for result in results {
        assert_eq!(result.unwrap(), CallOutput::Single(AbiValue::text("ZDX")));
    }
    assert_eq!(transport.submissions().await.len(), 8);
}

#[tokio::test]
async fn test_independent_clients() {
    let first = RecordingTransport::replying(reply(vec![AbiValue::text("A")]));
    let second = RecordingTransport::replying(reply(vec![AbiValue::text("B")]));

    let abi = registry(ERC20_ABI);
    let a = Client::new(Context::new(NodeConfig::new("http://a", None)), first.clone())
        .bind("f0a", Arc::clone(&abi));
    let b = Client::new(Context::new(NodeConfig::new("http://b", None)), second.clone())
        .bind("f0b", abi);

    let out_a = a.call("GetSymbol", &account(), "0", CallArgs::none()).await.unwrap();
    let out_b = b.call("GetSymbol", &account(), "0", CallArgs::none()).await.unwrap();

    assert_eq!(out_a.into_single(), Some(AbiValue::text("A")));
    assert_eq!(out_b.into_single(), Some(AbiValue::text("B")));
    assert_eq!(first.submissions().await[0].node_url, "http://a");
    assert_eq!(second.submissions().await[0].node_url, "http://b");
}
