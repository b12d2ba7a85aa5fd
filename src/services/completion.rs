use async_trait::async_trait;

use crate::error::CompletionError;
use crate::models::CompletionRequest;

/// Something that can turn a prepared conversation into a reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
