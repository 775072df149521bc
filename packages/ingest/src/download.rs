//! Source CSV download.
//!
//! Streams the published Australian postcodes CSV to the local `data/`
//! directory.

use std::path::Path;

use futures::StreamExt as _;
use tokio::io::AsyncWriteExt as _;

use crate::IngestError;

/// Default URL of the Australian postcodes CSV.
pub const DEFAULT_DATA_URL: &str = "https://raw.githubusercontent.com/matthewproctor/australianpostcodes/refs/heads/master/australian_postcodes.csv";

/// Environment variable overriding [`DEFAULT_DATA_URL`].
pub const DATA_URL_ENV: &str = "DATA_URL";

/// Returns the CSV URL, honoring `DATA_URL`.
#[must_use]
pub fn data_url() -> String {
    std::env::var(DATA_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_URL.to_string())
}

fn io_error(path: &Path, source: std::io::Error) -> IngestError {
    IngestError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Downloads the CSV from `url` to `dest`, returning the byte count.
///
/// Streams the body rather than buffering it in memory.
///
/// # Errors
///
/// Returns an error if the HTTP request fails, the response is not
/// successful, or the local file cannot be written.
pub async fn download_csv(url: &str, dest: &Path) -> Result<u64, IngestError> {
    log::info!("Downloading {url}");
    log::info!("  -> {}", dest.display());

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;
    }

    let client = reqwest::Client::builder()
        .user_agent("australian-postcodes/0.1")
        .build()?;

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(IngestError::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| io_error(dest, e))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| io_error(dest, e))?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| io_error(dest, e))?;

    #[allow(clippy::cast_precision_loss)]
    let mb = downloaded as f64 / 1_048_576.0;
    log::info!("  download complete: {mb:.1} MB");

    Ok(downloaded)
}
