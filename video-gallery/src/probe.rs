//! Byte-size probing for local and remote media locators
//!
//! Determines the size of a picked video without downloading it: local
//! paths (with or without a `file://` prefix) are stat'ed directly, remote
//! http(s) locators are probed with a HEAD request and the declared
//! Content-Length. Probing performs no retries; a failure aborts the
//! current admission attempt and is surfaced to the caller.

/// Errors that can occur while probing a media size
#[derive(Debug)]
pub enum ProbeError {
    /// The size could not be determined (e.g. missing Content-Length)
    SizeUnavailable(String),
    IoError(std::io::Error),
    #[cfg(feature = "remote")]
    HttpError(reqwest::Error),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::SizeUnavailable(msg) => write!(f, "Size unavailable: {}", msg),
            ProbeError::IoError(e) => write!(f, "IO error: {}", e),
            #[cfg(feature = "remote")]
            ProbeError::HttpError(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::IoError(err)
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::HttpError(err)
    }
}

/// Seam for size probing so the upload coordinator can be tested with fakes
#[allow(async_fn_in_trait)]
pub trait SizeProbe {
    /// Determine the byte size of the resource behind `locator`
    async fn probe(&self, locator: &str) -> Result<u64, ProbeError>;
}

/// Default probe: filesystem metadata for local paths, HEAD for http(s)
#[derive(Debug, Clone, Default)]
pub struct MediaSizeProbe {
    #[cfg(feature = "remote")]
    client: reqwest::Client,
}

impl MediaSizeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "remote")]
    async fn probe_remote(&self, locator: &str) -> Result<u64, ProbeError> {
        let response = self.client.head(locator).send().await?;
        match response.content_length() {
            Some(size) => Ok(size),
            None => Err(ProbeError::SizeUnavailable(
                "Content-Length header not available".to_string(),
            )),
        }
    }

    #[cfg(not(feature = "remote"))]
    async fn probe_remote(&self, locator: &str) -> Result<u64, ProbeError> {
        Err(ProbeError::SizeUnavailable(format!(
            "remote probing not enabled for {}",
            locator
        )))
    }
}

/// Strips a `file://` prefix; returns None for http(s) locators
fn local_path(locator: &str) -> Option<&str> {
    if let Some(path) = locator.strip_prefix("file://") {
        return Some(path);
    }
    if locator.starts_with("http://") || locator.starts_with("https://") {
        return None;
    }
    Some(locator)
}

impl SizeProbe for MediaSizeProbe {
    async fn probe(&self, locator: &str) -> Result<u64, ProbeError> {
        if let Some(path) = local_path(locator) {
            let metadata = tokio::fs::metadata(path).await?;
            return Ok(metadata.len());
        }

        self.probe_remote(locator).await
    }
}
