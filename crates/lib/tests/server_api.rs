//! Integration tests: start the web server on a free port with an unreachable
//! Ollama backend and exercise the JSON API over HTTP. Does not require a real
//! Ollama instance. Server tasks are left running when the tests end.

use lib::config::Config;
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Spawn the server pointed at a port nothing listens on; returns the app port.
fn start_server_with_dead_backend() -> u16 {
    let app_port = free_port();
    let mut config = Config::default();
    config.server.port = app_port;
    config.server.bind = "127.0.0.1".to_string();
    config.ollama.base_url = Some(format!("http://127.0.0.1:{}", free_port()));
    config.chat.poll_interval_secs = 1;
    tokio::spawn(async move {
        let _ = lib::web::run_server(config).await;
    });
    app_port
}

async fn wait_for_health(client: &reqwest::Client, port: u16) {
    let url = format!("http://127.0.0.1:{}/api/health", port);
    for _ in 0..100 {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("GET {} did not return 200 within 5s", url);
}

#[tokio::test]
async fn health_responds_with_running() {
    let port = start_server_with_dead_backend();
    let client = reqwest::Client::new();
    wait_for_health(&client, port).await;

    let json: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/health", port))
        .send()
        .await
        .expect("health request")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(json.get("runtime").and_then(|v| v.as_str()), Some("running"));
    assert_eq!(json.get("port").and_then(|v| v.as_u64()), Some(port as u64));
}

#[tokio::test]
async fn send_while_backend_unreachable_sets_error_and_appends_nothing() {
    let port = start_server_with_dead_backend();
    let client = reqwest::Client::new();
    wait_for_health(&client, port).await;

    let state: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/state", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["messages"].as_array().unwrap().len(), 0);

    let state: serde_json::Value = client
        .post(format!("http://127.0.0.1:{}/api/messages", port))
        .json(&serde_json::json!({ "content": "Hi" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["messages"].as_array().unwrap().len(), 0);
    assert!(!state["error"].as_str().unwrap_or_default().is_empty());
    assert_eq!(state["isLoading"], serde_json::json!(false));
}

#[tokio::test]
async fn blank_message_is_a_bad_request() {
    let port = start_server_with_dead_backend();
    let client = reqwest::Client::new();
    wait_for_health(&client, port).await;

    let resp = client
        .post(format!("http://127.0.0.1:{}/api/messages", port))
        .json(&serde_json::json!({ "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn config_update_is_clamped_and_visible_in_status() {
    let port = start_server_with_dead_backend();
    let client = reqwest::Client::new();
    wait_for_health(&client, port).await;

    let stored: serde_json::Value = client
        .put(format!("http://127.0.0.1:{}/api/config", port))
        .json(&serde_json::json!({
            "modelName": " llama3.2:1b ",
            "temperature": 5.0,
            "maxTokens": 999999
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["modelName"], "llama3.2:1b");
    assert_eq!(stored["temperature"], 1.0);
    assert_eq!(stored["maxTokens"], 4096);

    let status: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/status", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["isAvailable"], serde_json::json!(false));
    assert_eq!(status["config"]["maxTokens"], 4096);
}

#[tokio::test]
async fn clear_returns_empty_state() {
    let port = start_server_with_dead_backend();
    let client = reqwest::Client::new();
    wait_for_health(&client, port).await;

    // Leave an error behind first, then clear.
    let _ = client
        .post(format!("http://127.0.0.1:{}/api/messages", port))
        .json(&serde_json::json!({ "content": "Hi" }))
        .send()
        .await
        .unwrap();

    let state: serde_json::Value = client
        .post(format!("http://127.0.0.1:{}/api/clear", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["messages"].as_array().unwrap().len(), 0);
    assert_eq!(state["isLoading"], serde_json::json!(false));
    assert_eq!(state["error"], serde_json::Value::Null);
}
