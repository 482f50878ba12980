//! Archive download
//!
//! [`Downloader`] is the seam the pipeline fetches through; the HTTP
//! implementation streams the response to disk on the blocking pool.

use crate::error::{SetupError, SetupResult};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Fetches a URL into a local file
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` to `dest`, creating or truncating it
    async fn download(&self, url: &str, dest: &Path) -> SetupResult<()>;
}

/// HTTP(S) downloader backed by `ureq`
#[derive(Clone)]
pub struct HttpDownloader {
    agent: ureq::Agent,
    show_progress: bool,
}

impl HttpDownloader {
    /// Create a downloader. `timeout` of `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build()
            .into();

        Self {
            agent,
            show_progress: true,
        }
    }

    /// Disable the progress bar
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn fetch_blocking(&self, url: &str, dest: &Path) -> SetupResult<()> {
        let response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::StatusCode(status) => SetupError::DownloadStatus {
                url: url.to_string(),
                status,
            },
            other => SetupError::Download {
                url: url.to_string(),
                reason: other.to_string(),
            },
        })?;

        let total = response
            .headers()
            .get(ureq::http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let pb = self.progress_bar(total);
        let mut reader = pb.wrap_read(response.into_body().into_reader());

        let file = File::create(dest)
            .map_err(|e| SetupError::io(format!("creating {}", dest.display()), e))?;
        let mut writer = BufWriter::new(file);

        let bytes = std::io::copy(&mut reader, &mut writer).map_err(|e| SetupError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        writer
            .flush()
            .map_err(|e| SetupError::io(format!("writing {}", dest.display()), e))?;

        pb.finish_and_clear();
        debug!("Downloaded {} bytes to {}", bytes, dest.display());
        Ok(())
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::with_draw_target(total, ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template(
            "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        ) {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message("Downloading GraalVM");
        pb
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> SetupResult<()> {
        let downloader = self.clone();
        let url = url.to_string();
        let dest: PathBuf = dest.to_path_buf();

        tokio::task::spawn_blocking(move || downloader.fetch_blocking(&url, &dest))
            .await
            .map_err(|e| SetupError::Internal(format!("download task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn downloads_body_to_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vm-22.3.0/graalvm.tar.gz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"archive bytes".to_vec()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("graalvm.tar.gz");
        let url = format!("{}/vm-22.3.0/graalvm.tar.gz", mock_server.uri());

        HttpDownloader::default()
            .quiet()
            .download(&url, &dest)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"archive bytes");
    }

    #[tokio::test]
    async fn not_found_is_download_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("graalvm.tar.gz");
        let url = format!("{}/missing.tar.gz", mock_server.uri());

        let err = HttpDownloader::default()
            .quiet()
            .download(&url, &dest)
            .await
            .unwrap_err();

        match err {
            SetupError::DownloadStatus { status, .. } => assert_eq!(status, 404),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn server_error_is_download_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let err = HttpDownloader::default()
            .quiet()
            .download(&format!("{}/x.tar.gz", mock_server.uri()), &temp.path().join("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, SetupError::DownloadStatus { status: 500, .. }));
        assert!(err.hint().is_none());
    }

    #[tokio::test]
    async fn connection_refused_is_download_error() {
        let uri = {
            let mock_server = MockServer::start().await;
            mock_server.uri()
        };

        let temp = TempDir::new().unwrap();
        let err = HttpDownloader::new(Some(Duration::from_secs(5)))
            .quiet()
            .download(&format!("{}/x.tar.gz", uri), &temp.path().join("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, SetupError::Download { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Download);
    }
}
