//! Blocking HTTP fetch for mmpack: repository indices and package
//! archives, with retry and SHA-256 verification.
//!
//! The solver and executor are single-threaded and synchronous, so this
//! crate deliberately uses a blocking `reqwest` client instead of an
//! async one: there is no suspension point anywhere in the executor's
//! call graph.

pub mod checksum;
pub mod progress;
pub mod retry;

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use mmpack_core::error::{Error, Result};
use progress::ProgressSink;
use reqwest::blocking::Client;
use tracing::debug;

/// A blocking HTTP client used for both index refresh and archive
/// download.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Build a downloader with mmpack's default timeouts.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("mmpack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Io {
                path: std::path::PathBuf::from("<http client>"),
                source: std::io::Error::other(source),
            })?;
        Ok(Self { client })
    }

    /// Fetch a UTF-8 document (a repository index, typically) and
    /// return its body, retrying transient failures.
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        retry::with_retry(|| self.get_text_once(url))
    }

    fn get_text_once(&self, url: &str) -> Result<String> {
        debug!(url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(http_error)?;
        response.text().map_err(http_error)
    }

    /// Download `url` to `dest`, verifying the result's SHA-256 against
    /// `expected_sha256`. `name` is used only for error messages and
    /// progress display. Retries transient failures; a checksum
    /// mismatch after a successful download is NOT retried, since a
    /// repeat fetch of the same URL would reproduce it.
    pub fn download_verified(
        &self,
        url: &str,
        dest: &Path,
        name: &str,
        expected_sha256: &str,
        progress: &dyn ProgressSink,
    ) -> Result<()> {
        retry::with_retry(|| self.download_once(url, dest, progress))?;
        checksum::verify_file(dest, name, expected_sha256)
    }

    /// Download `url` to `dest` with retry, but without checksum
    /// verification — used for `mmpack source`, where the index carries
    /// no recorded hash for the companion source archive.
    pub fn download(&self, url: &str, dest: &Path, progress: &dyn ProgressSink) -> Result<()> {
        retry::with_retry(|| self.download_once(url, dest, progress))
    }

    fn download_once(&self, url: &str, dest: &Path, progress: &dyn ProgressSink) -> Result<()> {
        debug!(url, dest = %dest.display(), "downloading");
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(http_error)?;

        let total = response.content_length();
        progress.start(url, total);

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut file = File::create(dest).map_err(|e| Error::io(dest, e))?;
        let mut downloaded: u64 = 0;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = std::io::Read::read(&mut response, &mut buf).map_err(|e| Error::io(dest, e))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n]).map_err(|e| Error::io(dest, e))?;
            downloaded += n as u64;
            progress.advance(downloaded);
        }
        progress.finish();
        Ok(())
    }
}

fn http_error(source: reqwest::Error) -> Error {
    Error::Io {
        path: source
            .url()
            .map(|u| std::path::PathBuf::from(u.as_str()))
            .unwrap_or_default(),
        source: std::io::Error::other(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress::NullSink;

    #[test]
    fn fetch_text_returns_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/index.yaml")
            .with_status(200)
            .with_body("packages: []\n")
            .create();

        let downloader = Downloader::new().unwrap();
        let body = downloader
            .fetch_text(&format!("{}/index.yaml", server.url()))
            .unwrap();

        mock.assert();
        assert_eq!(body, "packages: []\n");
    }

    #[test]
    fn download_verified_rejects_bad_checksum() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/pkg.mpk")
            .with_status(200)
            .with_body("not the right bytes")
            .create();

        let downloader = Downloader::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg.mpk");

        let err = downloader
            .download_verified(
                &format!("{}/pkg.mpk", server.url()),
                &dest,
                "pkg",
                "0000000000000000000000000000000000000000000000000000000000000000",
                &NullSink,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Integrity { .. }));
    }

    #[test]
    fn download_verified_accepts_matching_checksum() {
        let body = b"archive-bytes";
        let digest = {
            use sha2::{Digest, Sha256};
            let mut hasher = Sha256::new();
            hasher.update(body);
            hex::encode(hasher.finalize())
        };

        let mut server = mockito::Server::new();
        server
            .mock("GET", "/pkg.mpk")
            .with_status(200)
            .with_body(body.to_vec())
            .create();

        let downloader = Downloader::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg.mpk");

        downloader
            .download_verified(
                &format!("{}/pkg.mpk", server.url()),
                &dest,
                "pkg",
                &digest,
                &NullSink,
            )
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }
}
