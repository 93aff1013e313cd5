//! Shared test utilities

#![allow(dead_code)]

use std::path::PathBuf;

use nova_assistant::api::ApiServerBuilder;
use nova_assistant::{DbPool, db};
use tokio::net::TcpListener;

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Build the full backend router (no language model key)
pub fn build_test_router(db: DbPool) -> axum::Router {
    ApiServerBuilder::new(db).build().router()
}

/// Build the backend router serving static files from `dir`
pub fn build_static_router(db: DbPool, dir: PathBuf) -> axum::Router {
    ApiServerBuilder::new(db)
        .static_dir(Some(dir))
        .build()
        .router()
}

/// Serve a fresh backend on a loopback port, returning its base URL
pub async fn spawn_backend(db: DbPool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind loopback listener");
    let addr = listener.local_addr().expect("listener has no address");

    let server = ApiServerBuilder::new(db).build();
    tokio::spawn(server.serve(listener));

    format!("http://{addr}")
}

/// Serve an arbitrary router on a loopback port, returning its base URL
pub async fn spawn_router(router: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind loopback listener");
    let addr = listener.local_addr().expect("listener has no address");

    tokio::spawn(async move { axum::serve(listener, router).await });

    format!("http://{addr}")
}
