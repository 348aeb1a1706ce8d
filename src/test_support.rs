//! In-process HTTP server used by the unit tests.

use std::net::SocketAddr;

use axum::http::{header, StatusCode};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

/// Client that never routes local test traffic through a configured proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Settings pointing the content client at `server`'s `/api` prefix.
pub fn config_for(server: &TestServer) -> crate::config::Config {
    crate::config::Config {
        api_base: server.url("api"),
        no_proxy: true,
        ..crate::config::Config::default()
    }
}

pub struct TestServer {
    addr: SocketAddr,
}

/// A bound listener whose routes are not known yet, for documents that
/// must embed the server's own address.
pub struct PendingServer {
    listener: tokio::net::TcpListener,
    addr: SocketAddr,
}

impl PendingServer {
    pub fn url(&self, path: &str) -> String {
        url_for(self.addr, path)
    }

    pub fn serve(self, router: Router) -> TestServer {
        let listener = self.listener;
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        TestServer { addr: self.addr }
    }
}

impl TestServer {
    pub async fn bind() -> PendingServer {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        PendingServer { listener, addr }
    }

    /// Serve `router` on an ephemeral local port until the runtime shuts down.
    pub async fn start(router: Router) -> Self {
        Self::bind().await.serve(router)
    }

    pub fn url(&self, path: &str) -> String {
        url_for(self.addr, path)
    }
}

fn url_for(addr: SocketAddr, path: &str) -> String {
    format!("http://{}/{}", addr, path.trim_start_matches('/'))
}

pub fn json_route(path: &str, body: &str) -> Router {
    let body = body.to_string();
    Router::new().route(
        path,
        get(move || async move { ([(header::CONTENT_TYPE, "application/json")], body) }),
    )
}

pub fn image_route(path: &str, bytes: &[u8]) -> Router {
    let bytes = bytes.to_vec();
    Router::new().route(
        path,
        get(move || async move { ([(header::CONTENT_TYPE, "image/png")], bytes) }),
    )
}

pub fn status_route(path: &str, status: StatusCode) -> Router {
    Router::new().route(path, get(move || async move { status }))
}

pub fn redirect_route(path: &str, target: &str) -> Router {
    let target = target.to_string();
    Router::new().route(
        path,
        get(move || async move { Redirect::temporary(&target) }),
    )
}

/// URL on a local port with nothing listening behind it.
pub fn closed_port_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    url_for(addr, path)
}
