//! Archive download with a bounded timeout.
//!
//! Supports `https`/`http` URLs through a blocking reqwest client and
//! `file://` URLs read straight from disk (local archives, CI fixtures).
//! Fetching is the one retryable step of the pipeline; retries are left to
//! the caller, nothing here retries on its own.

use std::io::Read;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::core::errors::InstallError;

/// Download the archive at `url`, bounded by `timeout`.
pub fn fetch_archive(url: &str, timeout: Duration) -> Result<Vec<u8>, InstallError> {
    let parsed = Url::parse(url).map_err(|e| InstallError::Fetch {
        url: url.to_string(),
        reason: format!("invalid URL: {}", e),
    })?;

    if parsed.scheme() == "file" {
        return fetch_local(url, &parsed);
    }

    tracing::info!("fetching {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| InstallError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| fetch_error(url, timeout, e))?;

    if !response.status().is_success() {
        return Err(InstallError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let progress = byte_progress(response.content_length());

    let mut bytes = Vec::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = response
            .read(&mut buffer)
            .map_err(|e| InstallError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&buffer[..n]);
        progress.inc(n as u64);
    }
    progress.finish_and_clear();

    tracing::debug!("fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes)
}

/// Read a `file://` archive from disk.
fn fetch_local(url: &str, parsed: &Url) -> Result<Vec<u8>, InstallError> {
    let path = parsed.to_file_path().map_err(|_| InstallError::Fetch {
        url: url.to_string(),
        reason: "invalid file:// path".to_string(),
    })?;

    std::fs::read(&path).map_err(|e| InstallError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Map a reqwest failure, distinguishing timeouts.
fn fetch_error(url: &str, timeout: Duration, e: reqwest::Error) -> InstallError {
    if e.is_timeout() {
        InstallError::FetchTimeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        InstallError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

/// A byte progress bar when the total size is known, hidden otherwise.
fn byte_progress(content_length: Option<u64>) -> ProgressBar {
    match content_length {
        Some(total) if total > 0 => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} downloading [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb
        }
        _ => ProgressBar::hidden(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_file_url() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("archive.tar.gz");
        std::fs::write(&path, b"not really a tarball").unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let bytes = fetch_archive(url.as_str(), Duration::from_secs(5)).unwrap();
        assert_eq!(bytes, b"not really a tarball");
    }

    #[test]
    fn test_fetch_missing_file_is_fetch_error() {
        let tmp = TempDir::new().unwrap();
        let url = Url::from_file_path(tmp.path().join("missing.tar.gz")).unwrap();

        let err = fetch_archive(url.as_str(), Duration::from_secs(5)).unwrap_err();
        assert_eq!(err.kind(), "FetchError");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_fetch_invalid_url() {
        let err = fetch_archive("not a url", Duration::from_secs(5)).unwrap_err();
        assert_eq!(err.kind(), "FetchError");
    }
}
