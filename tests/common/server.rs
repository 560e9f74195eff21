//! Test server lifecycle management
//!
//! Each test gets an isolated server on a random port with its own SQLite
//! database and media directory. Dropping the server shuts it down and
//! removes the temp resources.

use super::constants::*;
use super::fixtures::seed_users;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use vidhub_server::blob::LocalBlobStore;
use vidhub_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use vidhub_server::store::{FullStore, SqliteStore};

/// Test server instance with an isolated database and media directory.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store handle for direct database access in tests
    pub store: Arc<dyn FullStore>,

    /// Id of the seeded uploader user
    pub uploader_id: usize,

    /// Id of the seeded viewer user
    pub viewer_id: usize,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with two seeded users.
    ///
    /// # Panics
    ///
    /// Panics if database creation, port binding, or server startup fails,
    /// or if the server does not become ready within the timeout.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let db_path = temp_dir.path().join("vidhub.db");
        let sqlite_store = SqliteStore::new(&db_path).expect("Failed to open store");
        let (uploader_id, viewer_id) =
            seed_users(&sqlite_store).expect("Failed to seed test users");
        let store: Arc<dyn FullStore> = Arc::new(sqlite_store);

        let media_dir = temp_dir.path().join("media");
        let blobs =
            Arc::new(LocalBlobStore::new(&media_dir).expect("Failed to create blob store"));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            media_dir,
        };

        let app =
            make_app(config, store.clone(), blobs).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            uploader_id,
            viewer_id,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        while start.elapsed() < timeout {
            if let Ok(response) = client.get(&self.base_url).send().await {
                if response.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        panic!("Server did not become ready within {:?}", timeout);
    }
}
