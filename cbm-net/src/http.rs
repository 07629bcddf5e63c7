// cbm-net/src/http.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use cbm_common::error::{CbmError, Result};
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use tokio::fs::File as TokioFile;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error};

use crate::validation::validate_url;

const DOWNLOAD_TIMEOUT_SECS: u64 = 1800;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_STRING: &str = "cbm build manager (Rust)";

pub fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(CbmError::from)
}

/// Streams remote artifacts to local files.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Downloads `url` into `dest`.
    ///
    /// `on_progress` receives the completed percentage after every chunk, but
    /// only when the server declares a content length. A failed transfer
    /// leaves whatever was written at `dest`.
    pub async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        on_progress: Option<&mut (dyn FnMut(f64) + Send)>,
    ) -> Result<PathBuf> {
        let url = validate_url(url)?;
        debug!("Fetching {} -> {}", url, dest.display());

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            debug!("HTTP request failed for {url}: {e}");
            CbmError::from(e)
        })?;
        let status = response.status();
        debug!("Received HTTP status: {} for {}", status, url);
        if !status.is_success() {
            error!("HTTP error {} for URL {}", status, url);
            return Err(CbmError::HttpStatus(status.as_u16(), url.to_string()));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CbmError::DownloadError(format!(
                    "Failed to create download directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let mut file = TokioFile::create(dest).await.map_err(|e| {
            CbmError::DownloadError(format!("Failed to create {}: {}", dest.display(), e))
        })?;

        let total = response.content_length().filter(|len| *len > 0);
        let written = write_stream(response.bytes_stream(), &mut file, total, on_progress).await?;
        debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(dest.to_path_buf())
    }
}

/// Copies a chunk stream into `writer`, reporting percent progress against
/// `total` after each chunk. Returns the number of bytes written.
/// Local write failures surface as [`CbmError::DownloadError`].
pub async fn write_stream<S, B, E, W>(
    stream: S,
    writer: &mut W,
    total: Option<u64>,
    mut on_progress: Option<&mut (dyn FnMut(f64) + Send)>,
) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<CbmError>,
    W: AsyncWrite + Unpin,
{
    futures::pin_mut!(stream);
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::into)?;
        let bytes = chunk.as_ref();
        writer
            .write_all(bytes)
            .await
            .map_err(|e| CbmError::DownloadError(format!("Failed to write chunk: {e}")))?;
        written += bytes.len() as u64;

        if let (Some(total), Some(callback)) = (total, on_progress.as_deref_mut()) {
            let percent = (written as f64 / total as f64 * 100.0).min(100.0);
            callback(percent);
        }
    }
    writer
        .flush()
        .await
        .map_err(|e| CbmError::DownloadError(format!("Failed to flush download: {e}")))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use cbm_common::error::ErrorKind;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use super::*;

    fn chunks(parts: &[&str]) -> impl Stream<Item = std::io::Result<Vec<u8>>> {
        futures::stream::iter(
            parts
                .iter()
                .map(|p| Ok(p.as_bytes().to_vec()))
                .collect::<Vec<std::io::Result<Vec<u8>>>>(),
        )
    }

    /// Serves a single canned HTTP response on a loopback port.
    async fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/firefox-1.0.zip")
    }

    fn loopback_fetcher() -> Fetcher {
        Fetcher::with_client(Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_ends_at_100() {
        let mut sink = Vec::new();
        let mut seen = Vec::new();
        let mut record = |p: f64| seen.push(p);
        let written = write_stream(
            chunks(&["abcd", "ef", "", "ghij"]),
            &mut sink,
            Some(10),
            Some(&mut record),
        )
        .await
        .unwrap();

        assert_eq!(written, 10);
        assert_eq!(sink, b"abcdefghij");
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last().copied(), Some(100.0));
    }

    #[tokio::test]
    async fn progress_is_silent_without_declared_size() {
        let mut sink = Vec::new();
        let mut calls = 0usize;
        let mut record = |_: f64| calls += 1;
        write_stream(chunks(&["abc", "def"]), &mut sink, None, Some(&mut record))
            .await
            .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(sink, b"abcdef");
    }

    #[tokio::test]
    async fn stream_errors_abort_and_keep_partial_output() {
        let mut sink = Vec::new();
        let stream = futures::stream::iter(vec![
            Ok(b"abc".to_vec()),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            Ok(b"def".to_vec()),
        ]);
        let err = write_stream(stream, &mut sink, Some(6), None).await.unwrap_err();
        assert!(matches!(err, CbmError::Io(_)));
        assert_eq!(sink, b"abc");
    }

    /// Writer that rejects every write, like a full disk.
    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no space left on device",
            )))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn local_write_failures_are_transport_errors() {
        let err = write_stream(chunks(&["abc"]), &mut FullDisk, Some(3), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CbmError::DownloadError(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn fetch_writes_body_and_reports_completion() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\nConnection: close\r\n\r\n0123456789"
                .to_vec(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("downloads").join("firefox-1.0.zip");

        let mut last = None;
        let mut record = |p: f64| last = Some(p);
        let path = loopback_fetcher()
            .fetch(&url, &dest, Some(&mut record))
            .await
            .unwrap();

        assert_eq!(path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"0123456789");
        assert_eq!(last, Some(100.0));
    }

    #[tokio::test]
    async fn fetch_surfaces_http_status() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec(),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.zip");

        let err = loopback_fetcher().fetch(&url, &dest, None).await.unwrap_err();
        assert!(matches!(err, CbmError::HttpStatus(404, _)));
        assert!(!dest.exists());
    }
}
