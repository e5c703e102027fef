//! Shared helpers for tunebox-server integration tests
//!
//! Each `TestApp` gets its own temp root folder (database + song directory)
//! and drives the router in-process with `oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;
use tunebox_server::{build_router, AppState, ServerConfig};

const BOUNDARY: &str = "tunebox-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    _root: TempDir,
}

/// Response with the body already collected
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).expect("Should parse JSON")
    }

    /// `name=value` pair from Set-Cookie, ready to send back as Cookie
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|pair| pair.to_string())
    }
}

/// One multipart form part
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut ServerConfig)) -> Self {
        let root = TempDir::new().expect("Failed to create temp root");
        let mut config = ServerConfig::with_root(root.path());
        customize(&mut config);

        std::fs::create_dir_all(&config.song_directory).unwrap();
        let db = tunebox_common::db::init_database(&config.database_path)
            .await
            .expect("Failed to initialize database");

        let router = build_router(AppState::new(db, config.clone()));
        Self {
            router,
            config,
            _root: root,
        }
    }

    pub fn song_dir(&self) -> PathBuf {
        self.config.song_directory.clone()
    }

    pub fn blob_count(&self) -> usize {
        std::fs::read_dir(self.song_dir()).unwrap().count()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Should read body")
            .to_bytes()
            .to_vec();
        TestResponse { status, headers, bytes }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, cookie).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request("DELETE", uri, cookie).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(
            request("POST", uri, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn register(&self, username: &str, password: &str) -> TestResponse {
        self.post_json("/register", None, json!({"username": username, "password": password}))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.post_json("/login", None, json!({"username": username, "password": password}))
            .await
    }

    /// Register + login, returning the cookie to send back
    pub async fn signed_in(&self, username: &str, password: &str) -> String {
        assert_eq!(self.register(username, password).await.status, StatusCode::CREATED);
        let response = self.login(username, password).await;
        assert_eq!(response.status, StatusCode::OK);
        response.session_cookie().expect("login should set a cookie")
    }

    pub async fn upload(&self, cookie: Option<&str>, parts: &[Part<'_>]) -> TestResponse {
        self.send(
            request("POST", "/upload", cookie)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }

    /// Upload with all four fields set
    pub async fn upload_song(
        &self,
        cookie: &str,
        file_name: &str,
        bytes: &[u8],
        duration: &str,
    ) -> TestResponse {
        self.upload(
            Some(cookie),
            &[
                Part::Text("title", "T"),
                Part::Text("author", "A"),
                Part::Text("duration", duration),
                Part::File("file", file_name, bytes),
            ],
        )
        .await
    }
}

fn request(method: &str, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
