//! `/send-files` endpoint
//!
//! Relays the fixed upload bundle downstream and reports the outcome as JSON.

use crate::config::AppState;
use crate::forward::ForwardOutcome;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

/// JSON reply, tagged by `status`
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendFilesReply {
    Sent {
        target_status: u16,
        target_response: String,
    },
    Error {
        detail: String,
    },
}

impl From<ForwardOutcome> for SendFilesReply {
    fn from(outcome: ForwardOutcome) -> Self {
        Self::Sent {
            target_status: outcome.target_status,
            target_response: outcome.target_response,
        }
    }
}

/// Forward the bundle and map the result onto 200 / 500
pub async fn send_files(state: &AppState) -> Response<Full<Bytes>> {
    let files_dir = state.config.paths.files_path();

    match state.forwarder.forward(&files_dir).await {
        Ok(outcome) => {
            logger::log_forward_sent(state.forwarder.target_url(), outcome.target_status);
            http::json_response(StatusCode::OK, &SendFilesReply::from(outcome))
        }
        Err(e) => {
            let detail = e.to_string();
            logger::log_error(&format!(
                "Forward to {} failed: {detail}",
                state.forwarder.target_url()
            ));
            http::json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &SendFilesReply::Error { detail },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(root: &std::path::Path, target_url: String) -> AppState {
        let mut config = Config::default();
        config.paths.root = root.to_path_buf();
        config.forward.target_url = target_url;
        AppState::new(config).unwrap()
    }

    fn write_bundle(root: &std::path::Path) {
        let files = root.join("files");
        std::fs::create_dir_all(&files).unwrap();
        for name in ["audio.mp3", "image1.jpg", "image2.jpg", "image3.jpg"] {
            std::fs::write(files.join(name), name.as_bytes()).unwrap();
        }
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_reply_shapes() {
        let sent = serde_json::to_string(&SendFilesReply::Sent {
            target_status: 200,
            target_response: "ok".to_string(),
        })
        .unwrap();
        assert_eq!(
            sent,
            r#"{"status":"sent","target_status":200,"target_response":"ok"}"#
        );

        let error = serde_json::to_string(&SendFilesReply::Error {
            detail: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(error, r#"{"status":"error","detail":"boom"}"#);
    }

    #[tokio::test]
    async fn test_relays_downstream_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(202).set_body_string(r#"{"id":"job-7"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        write_bundle(root.path());
        let state = state_for(root.path(), format!("{}/upload", server.uri()));

        let response = send_files(&state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({
                "status": "sent",
                "target_status": 202,
                "target_response": r#"{"id":"job-7"}"#,
            })
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_500() {
        let root = tempfile::tempdir().unwrap();
        write_bundle(root.path());
        let missing = root.path().join("files").join("image3.jpg");
        std::fs::remove_file(&missing).unwrap();

        let state = state_for(root.path(), "http://127.0.0.1:9/upload".to_string());
        let response = send_files(&state).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains(&missing.display().to_string()), "{detail}");
    }
}
