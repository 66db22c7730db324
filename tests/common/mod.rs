//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use setlist::catalog::{self, Argon2Hasher, CatalogRepository, InMemoryCatalog, NewSong, Song};
use setlist::config::AppConfig;
use setlist::http::{Handler, HttpServer};
use setlist::lifecycle::Shutdown;
use setlist::routing::Router;
use setlist::session::SessionStore;
use tokio::net::TcpListener;

/// A running server on an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub sessions: Arc<SessionStore>,
    pub catalog: Arc<InMemoryCatalog>,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn add_song(&self, title: &str, artist: &str, year: i32) -> Song {
        self.catalog
            .create_song(NewSong::new(title, artist, year))
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Boot the full application with an empty catalog.
#[allow(dead_code)]
pub async fn start_app() -> TestServer {
    start_app_with(AppConfig::default()).await
}

#[allow(dead_code)]
pub async fn start_app_with(config: AppConfig) -> TestServer {
    let catalog = Arc::new(InMemoryCatalog::new());
    let routes = catalog::build_routes(
        Arc::clone(&catalog) as Arc<dyn CatalogRepository>,
        Arc::new(Argon2Hasher::new(1024, 1, 1)),
    )
    .unwrap();
    start_with_routes(config, routes, catalog).await
}

/// Boot the server over an arbitrary route table.
pub async fn start_with_routes(
    config: AppConfig,
    routes: Router<Handler>,
    catalog: Arc<InMemoryCatalog>,
) -> TestServer {
    let sessions = Arc::new(SessionStore::from_config(&config.session));
    let server = HttpServer::new(config, routes, Arc::clone(&sessions)).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, stop).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        sessions,
        catalog,
        shutdown,
    }
}

/// A client that keeps cookies between requests, like a browser.
#[allow(dead_code)]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// A client that never sends cookies on its own.
#[allow(dead_code)]
pub fn bare_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
