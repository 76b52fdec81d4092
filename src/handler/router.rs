//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: CORS preflight, route matching,
//! method validation, dispatch and access logging.

use crate::config::AppState;
use crate::handler::send_files;
use crate::handler::static_files::{self, MediaCategory};
use crate::http::{self, cors};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const SEND_FILES_PATH: &str = "/send-files";
const HEALTH_PATH: &str = "/healthz";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Percent-decoded request path
    pub path: &'a str,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = percent_decode_str(req.uri().path())
        .decode_utf8_lossy()
        .into_owned();
    let origin = cors::request_origin(req.headers());
    let preflight = cors::is_preflight(&method, req.headers())
        .then(|| cors::build_preflight_response(req.headers()));
    let access_entry = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(remote_addr, &req));

    let ctx = RequestContext {
        path: &path,
        if_none_match: req
            .headers()
            .get("if-none-match")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };
    drop(req);

    // 1. CORS preflight applies to every path
    let mut response = match preflight {
        Some(response) => response,
        None => route_request(&method, &ctx, &state).await,
    };

    // 2. Every response carries CORS headers
    cors::apply_cors_headers(&mut response, origin.as_ref());

    // 3. Access log
    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path, then check the method
async fn route_request(
    method: &Method,
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    match ctx.path {
        SEND_FILES_PATH => {
            if *method != Method::POST {
                return method_not_allowed(method, "POST");
            }
            send_files::send_files(state).await
        }
        HEALTH_PATH => {
            if *method != Method::GET {
                return method_not_allowed(method, "GET");
            }
            http::build_health_response("ok")
        }
        path => match MediaCategory::match_path(path) {
            Some((category, filename)) => {
                if *method != Method::GET {
                    return method_not_allowed(method, "GET");
                }
                static_files::serve_media(ctx, &state.config.paths, category, filename).await
            }
            None => http::build_404_response(),
        },
    }
}

fn method_not_allowed(method: &Method, allow: &str) -> Response<Full<Bytes>> {
    logger::log_warning(&format!("Method not allowed: {method}"));
    http::build_405_response(allow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn test_state(root: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::default();
        config.paths.root = root.to_path_buf();
        config.logging.access_log = false;
        Arc::new(AppState::new(config).unwrap())
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn call(state: &Arc<AppState>, req: Request<()>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(state), peer()).await.unwrap()
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let root = tempfile::tempdir().unwrap();
        let state = test_state(root.path());

        let req = Request::get("/videos/clip.mp4").body(()).unwrap();
        let response = call(&state, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(body_string(response).await, r#"{"detail":"Not Found"}"#);
    }

    #[tokio::test]
    async fn test_wrong_methods() {
        let root = tempfile::tempdir().unwrap();
        let state = test_state(root.path());

        let response = call(&state, Request::get("/send-files").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "POST");

        let response = call(&state, Request::post("/images/a.jpg").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "GET");
    }

    #[tokio::test]
    async fn test_percent_decoded_filename() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("music")).unwrap();
        std::fs::write(root.path().join("music/night song.mp3"), b"ID3night").unwrap();
        let state = test_state(root.path());

        let req = Request::get("/music/night%20song.mp3").body(()).unwrap();
        let response = call(&state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "audio/mpeg");
        assert_eq!(body_string(response).await, "ID3night");
    }

    #[tokio::test]
    async fn test_encoded_slash_does_not_match_route() {
        let root = tempfile::tempdir().unwrap();
        let state = test_state(root.path());

        let req = Request::get("/images/..%2Fsecret.jpg").body(()).unwrap();
        let response = call(&state, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, r#"{"detail":"Not Found"}"#);
    }

    #[tokio::test]
    async fn test_missing_image_gets_cors_and_json() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("images")).unwrap();
        let state = test_state(root.path());

        let req = Request::get("/images/missing.jpg")
            .header("origin", "http://localhost:3000")
            .body(())
            .unwrap();
        let response = call(&state, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
        assert_eq!(response.headers()["access-control-allow-credentials"], "true");
        assert_eq!(body_string(response).await, r#"{"error":"Image not found"}"#);
    }

    #[tokio::test]
    async fn test_preflight() {
        let root = tempfile::tempdir().unwrap();
        let state = test_state(root.path());

        let req = Request::options("/send-files")
            .header("origin", "https://studio.example")
            .header("access-control-request-method", "POST")
            .body(())
            .unwrap();
        let response = call(&state, req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "https://studio.example"
        );
        assert!(response.headers()["access-control-allow-methods"]
            .to_str()
            .unwrap()
            .contains("POST"));
    }

    #[tokio::test]
    async fn test_health() {
        let root = tempfile::tempdir().unwrap();
        let state = test_state(root.path());

        let response = call(&state, Request::get("/healthz").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"status":"ok"}"#);
    }
}
