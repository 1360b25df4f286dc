#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use contextron::config::ConfigV1;
use contextron::models::Identity;
use contextron::providers::google_provider::GoogleProviderConfig;
use contextron::providers::ProviderConfig;
use contextron::routes::create_router;
use contextron::sessions::Session;
use contextron::startup::build_state;
use contextron::state::AppState;
use serde_json::Value;

pub const COOKIE_NAME: &str = "contextron.sid";
const BOUNDARY: &str = "contextron-test-boundary";

/// Test config whose provider endpoints point at `provider_url`.
pub fn test_config(provider_url: &str) -> ConfigV1 {
    let mut config = ConfigV1::default();
    config.provider = ProviderConfig::Google(GoogleProviderConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        public_url: "http://localhost:3000".to_string(),
        auth_uri: format!("{}/authorize", provider_url),
        token_uri: format!("{}/token", provider_url),
        userinfo_uri: format!("{}/userinfo", provider_url),
        ..Default::default()
    });
    config
}

pub fn build_app(config: ConfigV1) -> (Router, AppState) {
    let state = build_state(Arc::new(config));
    (create_router(state.clone()), state)
}

/// Creates an authenticated session and returns the `Cookie` header value for it.
pub async fn login_as(state: &AppState, identity: Identity) -> String {
    let id = state
        .sessions
        .create(Session::authenticated(identity, 3600))
        .await;
    format!("{}={}", COOKIE_NAME, id)
}

pub fn request(method: Method, path: &str, cookie: Option<&str>) -> Request<Body> {
    with_connect_info(base_request(method, path, cookie).body(Body::empty()).unwrap())
}

/// Builds a `multipart/form-data` POST with text fields and an optional `docx` file.
pub fn multipart_request(
    path: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"docx\"; filename=\"{}\"\r\nContent-Type: application/vnd.openxmlformats-officedocument.wordprocessingml.document\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let request = base_request(Method::POST, path, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    with_connect_info(request)
}

fn base_request(method: Method, path: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(path);
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

fn with_connect_info(mut request: Request<Body>) -> Request<Body> {
    request.extensions_mut().insert(ConnectInfo(SocketAddr::new(
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        0,
    )));
    request
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Returns `name=value` from the response's `Set-Cookie` header.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header missing")
        .to_str()
        .expect("Location header not valid UTF-8")
        .to_string()
}

/// Minimal `.docx` archive containing one paragraph per entry of `paragraphs`.
pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::{Cursor, Write};

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
