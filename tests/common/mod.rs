//! Shared utilities for the HTTP integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use comment_server::{CommentStore, HttpServer, ServerConfig};
use serde_json::Value;
use tower::ServiceExt;

pub const TOKEN: &str = "test-token";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        admin_token: TOKEN.to_string(),
        ..ServerConfig::default()
    }
}

/// A server over a fresh in-memory store, plus a router that fakes the peer address.
pub async fn test_app(config: ServerConfig) -> (Router, HttpServer) {
    let store = CommentStore::connect_in_memory().await.unwrap();
    let server = HttpServer::new(config, store);
    let peer: SocketAddr = "198.51.100.10:40000".parse().unwrap();
    let router = server.router().layer(MockConnectInfo(peer));
    (router, server)
}

/// The same server seen from a different peer address.
pub fn as_peer(server: &HttpServer, peer: &str) -> Router {
    let peer: SocketAddr = peer.parse().unwrap();
    server.router().layer(MockConnectInfo(peer))
}

/// Send a request and decode the JSON response body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn post_comment(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/comments")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_comment_from(ip: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/comments")
        .header("content-type", "application/json")
        .header("x-forwarded-for", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_raw(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(body.into())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn admin_get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn admin_post(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {}", TOKEN)
}
