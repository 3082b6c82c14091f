/*!
 * Common test utilities for the ytsubs test suite
 */

use anyhow::Result;
use axum::Router;
use tempfile::TempDir;
use tokio::net::TcpListener;

use ytsubs::captions::{RawCaptionItem, RetrievalResult, normalize};

/// Route log output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    format!("http://{}", addr)
}

/// Base URL where nothing listens
pub fn unreachable_url() -> String {
    // Port 9 (discard) is closed on test machines
    "http://127.0.0.1:9".to_string()
}

/// A small normalized result
pub fn sample_result(title: &str) -> RetrievalResult {
    RetrievalResult::new(
        title,
        normalize(vec![
            RawCaptionItem::new("hi", 65.7, 2.0),
            RawCaptionItem::new("there", 68.0, 1.5),
        ]),
    )
}
