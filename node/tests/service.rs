//! End-to-end startup tests: real socket, real backend, graceful stop.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::task::JoinHandle;

use kyc_node::{Backend, KycNode, NodeError, ServiceConfig};
use kyc_types::ProtocolMetadata;

struct Running {
    node: Arc<KycNode>,
    base: String,
    server: JoinHandle<Result<(), NodeError>>,
}

impl Running {
    async fn start(config: ServiceConfig) -> Self {
        let node = Arc::new(KycNode::new(config).unwrap());
        let listener = node.bind().await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = {
            let node = Arc::clone(&node);
            tokio::spawn(async move { node.serve(listener).await })
        };
        Self {
            node,
            base: format!("http://127.0.0.1:{port}"),
            server,
        }
    }

    async fn post(&self, path: &str, body: Value) -> (reqwest::StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn stop(self) {
        self.node.stop();
        tokio::time::timeout(Duration::from_secs(5), self.server)
            .await
            .expect("server should stop")
            .unwrap()
            .unwrap();
    }
}

fn memory_config() -> ServiceConfig {
    ServiceConfig {
        backend: Backend::Memory,
        rpc_port: 0,
        ..ServiceConfig::default()
    }
}

#[tokio::test]
async fn memory_node_serves_and_stops() {
    let running = Running::start(memory_config()).await;

    let response = reqwest::get(format!("{}/", running.base)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "hello");

    running.stop().await;
}

#[tokio::test]
async fn stop_before_serving_still_shuts_down() {
    let node = KycNode::new(memory_config()).unwrap();
    let listener = node.bind().await.unwrap();
    node.stop();
    tokio::time::timeout(Duration::from_secs(5), node.serve(listener))
        .await
        .expect("early stop must not be lost")
        .unwrap();
}

#[tokio::test]
async fn node_serves_only_once() {
    let node = KycNode::new(memory_config()).unwrap();
    node.stop();
    node.serve(node.bind().await.unwrap()).await.unwrap();
    let err = node.serve(node.bind().await.unwrap()).await.unwrap_err();
    assert!(matches!(err, NodeError::AlreadyServing));
}

#[tokio::test]
async fn lmdb_node_keeps_records_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        data_dir: dir.path().to_path_buf(),
        rpc_port: 0,
        lmdb_map_size: 16 * 1024 * 1024,
        metadata: ProtocolMetadata::new(["onfido"], ["email"]),
        ..ServiceConfig::default()
    };

    let running = Running::start(config.clone()).await;
    let (status, created) = running
        .post("/hooks/create", json!({ "kycProfile": { "id": "ext1" } }))
        .await;
    assert_eq!(status, reqwest::StatusCode::OK);
    running.stop().await;

    let running = Running::start(config).await;
    let (status, found) = running.post("/hooks/find", json!({ "id": "ext1" })).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(found, created);
    assert_eq!(found["identities"]["email"]["status"], "missing");
    running.stop().await;
}

#[test]
fn invalid_config_is_rejected_before_opening_storage() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        data_dir: dir.path().join("never"),
        log_format: "yaml".into(),
        ..ServiceConfig::default()
    };
    assert!(KycNode::new(config).is_err());
    assert!(!dir.path().join("never").exists());
}
