use crate::domain::{PacError, Result};
use log::debug;
use reqwest::ClientBuilder;
use tracing::info;
use url::Url;

/// Reads a PAC source from a file path, a `file://` URL or an `http(s)://` URL.
///
/// HTTP downloads never go through a proxy.
pub async fn load_pac_source(location: &str) -> Result<String> {
    let source = match Url::parse(location) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => download(&url).await?,
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| PacError::SourceLoad(format!("{} is not a local path", url)))?;
            read_file(&path.to_string_lossy()).await?
        }
        _ => read_file(location).await?,
    };
    info!("Loaded PAC file from {} ({} bytes)", location, source.len());
    Ok(source)
}

async fn download(url: &Url) -> Result<String> {
    debug!("Attempting to download PAC file at {}", url);
    ClientBuilder::new()
        .no_proxy()
        .build()
        .map_err(|e| PacError::SourceLoad(format!("HTTP client error: {}", e)))?
        .get(url.clone())
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| PacError::SourceLoad(format!("PAC download error: {}", e)))?
        .text()
        .await
        .map_err(|e| PacError::SourceLoad(format!("PAC read error: {}", e)))
}

async fn read_file(path: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PacError::SourceLoad(format!("{}: {}", path, e)))
}
