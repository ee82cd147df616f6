use std::{io, net::SocketAddr};

use driver_locator::{server, AppState};
use tokio::{net::TcpListener, task::JoinHandle};

/// 実ポートで起動したテスト用ロケーターサーバー
#[allow(dead_code)]
pub struct TestServer {
    addr: SocketAddr,
    state: AppState,
    handle: JoinHandle<Result<(), io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    /// サーバーがバインドしているアドレスを返す
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// エンドポイントのURLを組み立てる
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// サーバーが使用しているアプリケーション状態
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// シャットダウンを要求し、サーバータスクの終了を待つ
    pub async fn stop(self) -> Result<(), io::Error> {
        self.state.shutdown.request_shutdown();
        self.handle.await.expect("server task panicked")
    }
}

/// `server::serve` を 127.0.0.1 の空きポートで起動する
#[allow(dead_code)]
pub async fn spawn_locator(state: AppState) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(server::serve(state.clone(), listener));

    TestServer {
        addr,
        state,
        handle,
    }
}
