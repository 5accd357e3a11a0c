//! Screenshot capture collaborator.
//!
//! Backed by an external headless-browser capture service; a `None` return
//! is a hard failure for the publish attempt that wanted the image.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

#[async_trait]
pub trait Screenshotter: Send + Sync {
    /// Capture `url` and return the stored file path, or `None` on any
    /// capture failure.
    async fn capture(&self, url: &str) -> Option<PathBuf>;
}

#[derive(Serialize)]
struct CaptureRequest<'a> {
    url: &'a str,
}

/// Client for an HTTP capture service returning PNG bytes.
///
/// Each capture is written to the screenshot directory under a fresh
/// filename; callers own the file's lifetime from then on.
pub struct HttpScreenshotter {
    client: reqwest::Client,
    service_url: String,
    out_dir: PathBuf,
}

impl HttpScreenshotter {
    pub fn new(service_url: String, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client should build"),
            service_url,
            out_dir: out_dir.into(),
        }
    }
}

#[async_trait]
impl Screenshotter for HttpScreenshotter {
    async fn capture(&self, url: &str) -> Option<PathBuf> {
        let resp = match self
            .client
            .post(&self.service_url)
            .json(&CaptureRequest { url })
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(url, error = %e, "screenshot capture request failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(url, status = %resp.status(), "screenshot service returned error");
            return None;
        }

        let bytes = match resp.bytes().await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                tracing::warn!(url, "screenshot service returned empty body");
                return None;
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "failed to read screenshot body");
                return None;
            }
        };

        let path = self.out_dir.join(format!("{}.png", Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to write screenshot");
            return None;
        }
        Some(path)
    }
}

/// Filename component of a capture path, for storing on a draft record.
pub fn capture_filename(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_filename_strips_directories() {
        let path = PathBuf::from("/data/screenshots/abc.png");
        assert_eq!(capture_filename(&path).as_deref(), Some("abc.png"));
    }
}
