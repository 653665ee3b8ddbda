#![allow(dead_code)]

use range_config::Config;
use range_server::{serve, AppState};
use report_sink::ReportSink;
use std::net::SocketAddr;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A server on an ephemeral port with its own report directory.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    _dir: TempDir,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, query: &str) -> String {
        format!("ws://{}/ws/relay?{}", self.addr, query)
    }
}

/// Start a server whose scanners are `echo` unless `configure` says otherwise.
pub async fn spawn_server(configure: impl FnOnce(&mut Config)) -> TestServer {
    let dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.tools.sqlmap = "echo".to_string();
    config.tools.nmap = "echo".to_string();
    configure(&mut config);

    let reports = ReportSink::open(dir.path().join("reports")).unwrap();
    let state = AppState::new(config, reports);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(serve(listener, state.clone(), async move {
        let _ = shutdown_rx.await;
    }));

    TestServer {
        addr,
        state,
        _dir: dir,
        _shutdown: shutdown_tx,
    }
}
