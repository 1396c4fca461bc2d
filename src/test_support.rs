// src/test_support.rs
//! In-process API server for client tests

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::core::{ApiClient, Session, SessionStore};

/// Serve `router` on an ephemeral port and return its base URL
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{}", addr)
}

pub fn test_client(base_url: &str, session: Option<Session>) -> Arc<ApiClient> {
    let config = ClientConfig::for_base_url(base_url);
    let store = Arc::new(SessionStore::in_memory(session));
    Arc::new(ApiClient::new(&config, store).expect("client"))
}

pub fn signed_in_client(base_url: &str) -> Arc<ApiClient> {
    test_client(
        base_url,
        Some(Session::new("test-token".to_string(), Some("test-refresh".to_string()))),
    )
}
