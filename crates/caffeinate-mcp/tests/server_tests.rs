//! End-to-end tests driving the server through its JSON-RPC surface.

use caffeinate_mcp::process::MockInvoker;
use caffeinate_mcp::protocol::{JsonRpcRequest, JsonRpcResponse, codes, mcp_codes};
use caffeinate_mcp::transport::{MockTransport, StdioTransport};
use caffeinate_mcp::{CaffeinateMcpServer, ServerConfig};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

fn server() -> (CaffeinateMcpServer, MockInvoker) {
    let invoker = MockInvoker::new();
    let config = ServerConfig::builder()
        .shutdown_grace(Duration::from_millis(500))
        .build();
    let server = CaffeinateMcpServer::with_invoker(config, Arc::new(invoker.clone())).unwrap();
    (server, invoker)
}

fn tool_call(id: i64, name: &str, arguments: Value) -> JsonRpcRequest {
    JsonRpcRequest::new(
        Some(json!(id)),
        "tools/call",
        Some(json!({"name": name, "arguments": arguments})),
    )
}

/// Text and error flag of a `tools/call` response.
fn tool_output(response: &JsonRpcResponse) -> (String, bool) {
    let result = response.result.as_ref().expect("tool call should succeed at the RPC level");
    let text = result["content"][0]["text"].as_str().unwrap_or_default().to_string();
    (text, result["isError"].as_bool().unwrap_or(false))
}

async fn call(server: &CaffeinateMcpServer, id: i64, name: &str, arguments: Value) -> (String, bool) {
    let response = server
        .handle_request(tool_call(id, name, arguments))
        .await
        .expect("requests with an id are answered");
    tool_output(&response)
}

fn id_from_start(text: &str) -> String {
    text.strip_prefix("Started caffeinate with ID: ")
        .and_then(|rest| rest.split(' ').next())
        .expect("start message carries the id")
        .to_string()
}

#[tokio::test]
async fn test_start_with_timeout_idle_display() {
    let (server, invoker) = server();

    let (text, is_error) = call(
        &server,
        1,
        "caffeinate_start",
        json!({"timeout": 300, "idle": true, "display": true}),
    )
    .await;

    assert!(!is_error);
    assert!(text.ends_with("\nFlags: -d -i -t 300"));
    assert_eq!(invoker.spawned()[0].args, vec!["-d", "-i", "-t", "300"]);
    for absent in ["-m", "-s", "-u"] {
        assert!(!text.contains(absent));
    }
}

#[tokio::test]
async fn test_start_without_arguments() {
    let (server, invoker) = server();

    let (text, is_error) = call(&server, 1, "caffeinate_start", json!({})).await;

    assert!(!is_error);
    assert!(text.ends_with("\nFlags: "));
    assert!(invoker.spawned()[0].args.is_empty());
}

#[tokio::test]
async fn test_start_spawn_failure() {
    let (server, invoker) = server();
    invoker.fail_spawns(std::io::ErrorKind::NotFound);

    let (text, is_error) = call(&server, 1, "caffeinate_start", json!({"idle": true})).await;

    assert!(is_error);
    assert!(text.starts_with("Failed to start caffeinate: "));
    let (listing, _) = call(&server, 2, "caffeinate_list", json!({})).await;
    assert_eq!(listing, "No active caffeinate processes");
}

#[tokio::test]
async fn test_start_stop_list_cycle() {
    let (server, invoker) = server();

    let (started, _) = call(&server, 1, "caffeinate_start", json!({"system": true})).await;
    let id = id_from_start(&started);
    let pid = invoker.spawned()[0].pid;
    assert!(started.contains(&format!("(PID: {})", pid)));

    let (listing, _) = call(&server, 2, "caffeinate_list", json!({})).await;
    assert!(listing.starts_with("Active caffeinate processes:\n"));
    assert_eq!(listing.matches(&format!("- ID: {},", id)).count(), 1);
    assert!(listing.contains("Flags: -s"));

    let (stopped, is_error) = call(&server, 3, "caffeinate_stop", json!({"id": id})).await;
    assert!(!is_error);
    assert_eq!(stopped, format!("Stopped caffeinate process with ID: {}", id));
    assert_eq!(invoker.killed(), vec![pid]);

    let (listing, _) = call(&server, 4, "caffeinate_list", json!({})).await;
    assert_eq!(listing, "No active caffeinate processes");
}

#[tokio::test]
async fn test_stop_errors() {
    let (server, _) = server();

    let (text, is_error) = call(&server, 1, "caffeinate_stop", json!({})).await;
    assert!(is_error);
    assert_eq!(text, "ID is required");

    let (text, is_error) = call(&server, 2, "caffeinate_stop", json!({"id": "non-existent-id"})).await;
    assert!(is_error);
    assert_eq!(text, "No caffeinate process found with ID: non-existent-id");
}

#[tokio::test]
async fn test_stop_kill_failure_keeps_process_listed() {
    let (server, invoker) = server();
    let (started, _) = call(&server, 1, "caffeinate_start", json!({})).await;
    let id = id_from_start(&started);
    invoker.fail_kills(std::io::ErrorKind::PermissionDenied);

    let (text, is_error) = call(&server, 2, "caffeinate_stop", json!({"id": id})).await;

    assert!(is_error);
    assert!(text.starts_with("Failed to stop caffeinate: "));
    let (listing, _) = call(&server, 3, "caffeinate_list", json!({})).await;
    assert!(listing.contains(&id));
}

#[tokio::test]
async fn test_protocol_errors() {
    let (server, _) = server();

    let unknown_tool = server
        .handle_request(tool_call(1, "caffeinate_forever", json!({})))
        .await
        .unwrap();
    assert_eq!(unknown_tool.error.unwrap().code, mcp_codes::TOOL_NOT_FOUND);

    let unknown_method = server
        .handle_request(JsonRpcRequest::new(Some(json!(2)), "prompts/list", None))
        .await
        .unwrap();
    assert_eq!(unknown_method.error.unwrap().code, codes::METHOD_NOT_FOUND);

    let bad_params = server
        .handle_request(JsonRpcRequest::new(
            Some(json!(3)),
            "tools/call",
            Some(json!({"arguments": {}})),
        ))
        .await
        .unwrap();
    assert_eq!(bad_params.error.unwrap().code, codes::INVALID_PARAMS);
}

#[tokio::test]
async fn test_serve_session_over_mock_transport() {
    let (server, invoker) = server();
    let transport = MockTransport::new();
    transport.push_request(JsonRpcRequest::new(
        Some(json!(1)),
        "initialize",
        Some(json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "integration", "version": "1.0.0"}
        })),
    ));
    transport.push_request(JsonRpcRequest::notification("notifications/initialized", None));
    transport.push_request(JsonRpcRequest::new(Some(json!(2)), "tools/list", None));
    transport.push_request(tool_call(3, "caffeinate_start", json!({"user": true})));

    server.serve(transport.clone()).await.unwrap();

    let responses = transport.responses();
    assert_eq!(responses.len(), 3);
    assert_eq!(
        responses[0].result.as_ref().unwrap()["serverInfo"]["name"],
        "caffeinate-mcp"
    );
    assert_eq!(
        responses[1].result.as_ref().unwrap()["tools"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
    assert!(!tool_output(&responses[2]).1);

    // Closing the transport terminates whatever is still running.
    assert_eq!(invoker.killed(), vec![invoker.spawned()[0].pid]);
    assert!(server.coordinator().list().is_empty());
}

#[tokio::test]
async fn test_serve_over_line_delimited_streams() {
    let (server, _) = server();
    let (client_in, server_in) = tokio::io::duplex(8192);
    let (server_out, client_out) = tokio::io::duplex(8192);

    let serving = tokio::spawn(async move {
        server
            .serve(StdioTransport::with_streams(server_in, server_out))
            .await
    });

    let mut writer = client_in;
    writer
        .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
        .await
        .unwrap();
    writer.write_all(b"garbage\n").await.unwrap();
    writer
        .write_all(
            b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/call\",\"params\":{\"name\":\"caffeinate_list\"}}\n",
        )
        .await
        .unwrap();
    drop(writer);

    let mut lines = BufReader::new(client_out).lines();
    let first: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    let garbage: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    let second: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();

    assert_eq!(first["id"], 1);
    assert_eq!(first["result"], json!({}));
    assert!(garbage["id"].is_null());
    assert_eq!(garbage["error"]["code"], codes::PARSE_ERROR);
    assert_eq!(second["id"], 2);
    assert_eq!(
        second["result"]["content"][0]["text"],
        "No active caffeinate processes"
    );

    serving.await.unwrap().unwrap();
}
