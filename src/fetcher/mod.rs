pub mod chrome;

pub use chrome::ChromeFetcher;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::PageRequest;

/// Rendered content of one listing page.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub html: String,
}

/// Transport/session-layer failures. Field-level extraction gaps are not
/// errors and never surface here.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("listing container did not appear within {0}s")]
    Timeout(u64),

    #[error("response looks like a block or captcha page")]
    BlockedOrCaptcha,

    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Blocks are terminal; timeouts and transport failures may be retried
    /// under the attempt ceiling.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::BlockedOrCaptcha)
    }
}

#[async_trait]
pub trait PageFetcher {
    async fn fetch(&self, request: &PageRequest) -> Result<PageContent, FetchError>;
}
