//! Upload forwarding module
//!
//! Reads the fixed upload bundle and posts it to the downstream endpoint.

mod bundle;

pub use bundle::{UploadBundle, UploadPart, UPLOAD_PARTS};

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::ForwardConfig;
use crate::logger;

/// Anything that stops a bundle from reaching the downstream endpoint
///
/// The `Display` output is what clients see in the `detail` field.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid content type for part `{field}`: {source}")]
    InvalidPart {
        field: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{}", error_chain(.source))]
    Request {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Downstream reply relayed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub target_status: u16,
    pub target_response: String,
}

/// Posts upload bundles to a single target URL
pub struct Forwarder {
    client: reqwest::Client,
    target_url: String,
}

impl Forwarder {
    pub fn new(config: &ForwardConfig) -> Result<Self, ForwardError> {
        // The target is a local service; system proxy settings must not reroute it
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            target_url: config.target_url.clone(),
        })
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Load the bundle from `files_dir` and send it in one POST
    ///
    /// Any downstream status counts as delivered; only I/O and transport
    /// failures are errors.
    pub async fn forward(&self, files_dir: &Path) -> Result<ForwardOutcome, ForwardError> {
        let bundle = UploadBundle::load(files_dir).await?;
        let payload_bytes = bundle.total_bytes();
        let form = bundle.into_form()?;

        logger::log_debug(&format!(
            "[Forward] POST {} ({payload_bytes} bytes in {} parts)",
            self.target_url,
            UPLOAD_PARTS.len()
        ));

        let response = self
            .client
            .post(&self.target_url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ForwardError::Request { source })?;

        let target_status = response.status().as_u16();
        let target_response = response
            .text()
            .await
            .map_err(|source| ForwardError::Request { source })?;

        Ok(ForwardOutcome {
            target_status,
            target_response,
        })
    }
}

/// Render an error and all of its sources on one line
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
