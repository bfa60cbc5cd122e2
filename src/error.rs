//! Error types shared across the loader, extractor and exporters.
//!
//! [`ScrapeError::LoadTimeout`] and [`ScrapeError::Exhausted`] are stop
//! signals that the collection loop turns into a graceful
//! [`StopReason`](crate::collect::StopReason). Browser launch failures
//! ([`ScrapeError::ResourceAcquisition`]) and configuration errors abort
//! the run.

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("marker element `{selector}` did not appear within {waited:?}")]
    LoadTimeout { selector: String, waited: Duration },

    #[error("no more snapshots to replay")]
    Exhausted,

    #[error("could not start browser session: {0}")]
    ResourceAcquisition(String),

    #[error("browser protocol error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_selector() {
        let err = ScrapeError::LoadTimeout {
            selector: "span[slot='authorName']".to_string(),
            waited: Duration::from_secs(20),
        };
        let msg = err.to_string();
        assert!(msg.contains("span[slot='authorName']"));
        assert!(msg.contains("20s"));
    }
}
