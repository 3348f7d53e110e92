//! Archive sources and progress reporting.
//!
//! An [`ArchiveSource`] puts a bulk archive at a local path. The production
//! source is [`HttpArchiveSource`], which streams the response body to disk
//! without ever holding more than one network chunk in memory.

use async_trait::async_trait;
use edgar_core::{EdgarError, Result};
use futures::StreamExt;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::fmt::Debug;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Size of each write to the destination file.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Interval between progress log lines when the total size is unknown.
const UNKNOWN_TOTAL_LOG_STEP: u64 = 64 * 1024 * 1024;

/// Receives cumulative transfer progress.
///
/// `total` is the size announced by the server, when it announced one.
pub trait ProgressObserver: Send + Sync + Debug {
    /// Called once the server has accepted the request, before any byte is
    /// written.
    fn on_start(&self, _url: &str, _total: Option<u64>) {}

    /// Called after every chunk written to disk.
    fn on_progress(&self, transferred: u64, total: Option<u64>);
}

/// Something that can place a bulk archive at a local path.
#[async_trait]
pub trait ArchiveSource: Send + Sync + Debug {
    /// Returns the name of this source.
    fn name(&self) -> &str;

    /// Writes the archive behind `url` to `destination`, truncating any
    /// existing file, and returns the number of bytes written.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64>;
}

/// Downloads archives over HTTP.
///
/// A single attempt is made per archive. No request timeout is configured:
/// bulk archives take minutes to transfer, and an unresponsive server blocks
/// the call until the process is terminated.
#[derive(Debug)]
pub struct HttpArchiveSource {
    client: reqwest::Client,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl HttpArchiveSource {
    /// Create a source sending the given user agent.
    ///
    /// SEC refuses requests without an identifying agent. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns [`EdgarError::InvalidParameter`] if the agent is blank or the
    /// client cannot be built with it.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Self::client_builder(user_agent)?
            .build()
            .map_err(|e| EdgarError::InvalidParameter(format!("HTTP client: {}", e)))?;
        Ok(Self::with_client(client))
    }

    /// Client builder carrying the fixed request headers.
    ///
    /// Useful to adjust transport settings before handing the client to
    /// [`HttpArchiveSource::with_client`].
    ///
    /// # Errors
    /// Returns [`EdgarError::InvalidParameter`] if the agent is blank.
    pub fn client_builder(user_agent: &str) -> Result<reqwest::ClientBuilder> {
        if user_agent.trim().is_empty() {
            return Err(EdgarError::InvalidParameter(
                "User agent must not be blank".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/zip, */*"));

        Ok(reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers))
    }

    /// Create a source around a pre-configured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            observer: None,
        }
    }

    /// Attach a progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

#[async_trait]
impl ArchiveSource for HttpArchiveSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, destination), fields(destination = %destination.display()))]
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        debug!("Requesting archive");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EdgarError::Network(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EdgarError::Network(format!(
                "Failed to fetch {}: HTTP {}",
                url, status
            )));
        }

        let total = response.content_length();
        if let Some(observer) = &self.observer {
            observer.on_start(url, total);
        }
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EdgarError::filesystem(parent, e))?;
        }
        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| EdgarError::filesystem(destination, e))?;

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| EdgarError::Network(format!("{}: {}", url, e)))?;
            for piece in chunk.chunks(CHUNK_SIZE) {
                file.write_all(piece)
                    .await
                    .map_err(|e| EdgarError::filesystem(destination, e))?;
                written += piece.len() as u64;
                if let Some(observer) = &self.observer {
                    observer.on_progress(written, total);
                }
            }
        }

        file.flush()
            .await
            .map_err(|e| EdgarError::filesystem(destination, e))?;

        info!(bytes = written, "Archive downloaded");
        Ok(written)
    }
}

/// Copies archives that already exist on disk.
///
/// Accepts `file://` URLs and bare paths. Lets a mirror be rebuilt from
/// archives obtained out of band.
#[derive(Debug, Default)]
pub struct LocalArchiveSource;

impl LocalArchiveSource {
    /// Create a local source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArchiveSource for LocalArchiveSource {
    fn name(&self) -> &str {
        "local"
    }

    #[instrument(skip(self, destination), fields(destination = %destination.display()))]
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        let source = Path::new(url.strip_prefix("file://").unwrap_or(url));

        if source == destination {
            let meta = tokio::fs::metadata(source)
                .await
                .map_err(|e| EdgarError::filesystem(source, e))?;
            return Ok(meta.len());
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EdgarError::filesystem(parent, e))?;
        }
        let bytes = tokio::fs::copy(source, destination)
            .await
            .map_err(|e| EdgarError::filesystem(source, e))?;

        debug!(bytes, "Archive copied");
        Ok(bytes)
    }
}

/// Progress observer that reports through `tracing`.
///
/// Logs every 10% when the total is known, every 64 MiB otherwise. One
/// observer can be shared by consecutive downloads: each download relabels
/// the log lines with the file name of its URL.
#[derive(Debug)]
pub struct LogProgress {
    label: Mutex<String>,
    next_mark: AtomicU64,
}

impl LogProgress {
    /// Create an observer tagging its log lines with `label` until the
    /// first download starts.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Mutex::new(label.into()),
            next_mark: AtomicU64::new(0),
        }
    }

    /// Label of the current download.
    #[must_use]
    pub fn label(&self) -> String {
        self.label
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Last path segment of `url`, or the whole URL if it has none.
fn archive_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(url)
}

impl ProgressObserver for LogProgress {
    fn on_start(&self, url: &str, total: Option<u64>) {
        let name = archive_name(url);
        *self.label.lock().unwrap_or_else(PoisonError::into_inner) = name.to_string();
        self.next_mark.store(0, Ordering::Relaxed);
        info!(archive = name, url, ?total, "Download started");
    }

    fn on_progress(&self, transferred: u64, total: Option<u64>) {
        let mark = self.next_mark.load(Ordering::Relaxed);
        match total {
            Some(total) if total > 0 => {
                let percent = transferred.saturating_mul(100) / total;
                if percent >= mark {
                    self.next_mark
                        .store(percent - percent % 10 + 10, Ordering::Relaxed);
                    info!(
                        archive = %self.label(),
                        transferred,
                        total,
                        "Download {}% complete",
                        percent.min(100)
                    );
                }
            }
            _ => {
                if transferred >= mark {
                    self.next_mark
                        .store(transferred + UNKNOWN_TOTAL_LOG_STEP, Ordering::Relaxed);
                    info!(archive = %self.label(), transferred, "Download in progress");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    #[derive(Debug, Default)]
    struct RecordingObserver {
        started: Mutex<Vec<(String, Option<u64>)>>,
        events: Mutex<Vec<(u64, Option<u64>)>>,
    }

    impl ProgressObserver for RecordingObserver {
        fn on_start(&self, url: &str, total: Option<u64>) {
            self.started.lock().unwrap().push((url.to_string(), total));
        }

        fn on_progress(&self, transferred: u64, total: Option<u64>) {
            self.events.lock().unwrap().push((transferred, total));
        }
    }

    /// Serve a single HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (format!("http://{}/companyfacts.zip", addr), handle)
    }

    fn test_source() -> HttpArchiveSource {
        let client = HttpArchiveSource::client_builder("Test/1.0 (test@example.com)")
            .unwrap()
            .no_proxy()
            .build()
            .unwrap();
        HttpArchiveSource::with_client(client)
    }

    #[tokio::test]
    async fn test_fetch_streams_body_to_disk() {
        let body: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let (url, server) = serve_once("200 OK", body.clone()).await;

        let tmp = tempfile::tempdir().unwrap();
        let destination = tmp.path().join("nested").join("archive.zip");
        std::fs::create_dir_all(destination.parent().unwrap()).unwrap();
        std::fs::write(&destination, b"stale content that is longer than nothing").unwrap();

        let observer = Arc::new(RecordingObserver::default());
        let source = test_source().with_observer(observer.clone());

        let written = source.fetch(&url, &destination).await.unwrap();
        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&destination).unwrap(), body);

        let request = server.await.unwrap();
        assert!(request.contains("user-agent: test/1.0 (test@example.com)"));

        assert_eq!(
            *observer.started.lock().unwrap(),
            vec![(url.clone(), Some(20_000))]
        );
        let events = observer.events.lock().unwrap();
        assert_eq!(events.last(), Some(&(20_000, Some(20_000))));
        let mut previous = 0;
        for (transferred, _) in events.iter() {
            assert!(*transferred > previous);
            assert!(transferred - previous <= CHUNK_SIZE as u64);
            previous = *transferred;
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let (url, server) = serve_once("404 Not Found", b"missing".to_vec()).await;

        let tmp = tempfile::tempdir().unwrap();
        let destination = tmp.path().join("archive.zip");

        let err = test_source().fetch(&url, &destination).await.unwrap_err();
        match err {
            EdgarError::Network(message) => {
                assert!(message.contains("404"));
                assert!(message.contains("Not Found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!destination.exists());
        server.await.unwrap();
    }

    #[test]
    fn test_blank_user_agent_rejected() {
        assert!(matches!(
            HttpArchiveSource::new(" "),
            Err(EdgarError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_local_source_copies() {
        let tmp = tempfile::tempdir().unwrap();
        let upstream = tmp.path().join("upstream.zip");
        std::fs::write(&upstream, b"PK archive bytes").unwrap();

        let destination = tmp.path().join("mirror").join("submissions.zip");
        let url = format!("file://{}", upstream.display());

        let source = LocalArchiveSource::new();
        assert_eq!(source.fetch(&url, &destination).await.unwrap(), 16);
        assert_eq!(std::fs::read(&destination).unwrap(), b"PK archive bytes");

        // Same path is left alone
        let bytes = source
            .fetch(destination.to_str().unwrap(), &destination)
            .await
            .unwrap();
        assert_eq!(bytes, 16);
    }

    #[tokio::test]
    async fn test_local_source_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = LocalArchiveSource::new()
            .fetch("/definitely/not/here.zip", &tmp.path().join("out.zip"))
            .await
            .unwrap_err();
        assert!(matches!(err, EdgarError::Filesystem(_)));
    }

    #[test]
    fn test_log_progress_labels_each_download() {
        let progress = LogProgress::new("edgar");
        assert_eq!(progress.label(), "edgar");

        progress.on_start(
            "https://www.sec.gov/Archives/edgar/daily-index/xbrl/companyfacts.zip",
            Some(10),
        );
        assert_eq!(progress.label(), "companyfacts.zip");

        progress.on_start(
            "https://www.sec.gov/Archives/edgar/daily-index/bulkdata/submissions.zip?x=1",
            None,
        );
        assert_eq!(progress.label(), "submissions.zip");

        assert_eq!(archive_name("http://host/"), "http://host/");
    }

    #[test]
    fn test_log_progress_thresholds() {
        let progress = LogProgress::new("facts");
        progress.on_progress(5, Some(100));
        assert_eq!(progress.next_mark.load(Ordering::Relaxed), 10);
        progress.on_progress(9, Some(100));
        assert_eq!(progress.next_mark.load(Ordering::Relaxed), 10);
        progress.on_progress(47, Some(100));
        assert_eq!(progress.next_mark.load(Ordering::Relaxed), 50);

        progress.on_start("file:///next.zip", None);
        assert_eq!(progress.next_mark.load(Ordering::Relaxed), 0);
        assert_eq!(progress.label(), "next.zip");

        let unknown = LogProgress::new("subs");
        unknown.on_progress(1, None);
        assert_eq!(
            unknown.next_mark.load(Ordering::Relaxed),
            1 + UNKNOWN_TOTAL_LOG_STEP
        );
    }
}
