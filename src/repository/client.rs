// src/repository/client.rs

//! HTTP client for source archives and repository manifests
//!
//! One GET per call: no retries and no timeout, so a stalled server blocks
//! the caller. Only a `200 OK` response is accepted.

use crate::error::{Error, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Stream an HTTP response body into a file
fn stream_response_to_file(mut response: Response, file: &mut File) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::DownloadError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;
    }

    Ok(downloaded)
}

/// Blocking HTTP client wrapper
pub struct RepositoryClient {
    client: Client,
}

impl RepositoryClient {
    /// Create a new client without a request timeout
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None)
            .user_agent(concat!("srcpm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Download `url` into `dest_path`, truncating any previous content
    ///
    /// Returns the number of bytes written. Every failure, including a
    /// status other than 200, is reported as [`Error::DownloadError`].
    pub fn download_file(&self, url: &str, dest_path: &Path) -> Result<u64> {
        info!("Downloading {} to {}", url, dest_path.display());

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Request to {url} failed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let mut file = File::create(dest_path).map_err(|e| {
            Error::DownloadError(format!("Failed to create file {}: {e}", dest_path.display()))
        })?;

        let bytes = stream_response_to_file(response, &mut file)?;
        debug!("Wrote {} bytes to {}", bytes, dest_path.display());
        Ok(bytes)
    }
}
