pub mod http;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::prompts::{
    Prompt, PromptCreateParams, PromptListParams, PromptRetrieveParams,
    PromptUpdateMetadataParams,
};

pub use http::HttpPromptGateway;

/// Errors from calls to the hosted prompt storage API.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("prompt not found: {0}")]
    NotFound(String),

    #[error("storage API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Operations the front end needs from the hosted prompt storage service.
#[async_trait]
pub trait PromptGateway: Send + Sync {
    /// At most `limit` prompts starting at `offset`. An empty page means
    /// there is nothing further.
    async fn list(&self, params: &PromptListParams) -> GatewayResult<Vec<Prompt>>;

    async fn retrieve(&self, id: &str, params: PromptRetrieveParams) -> GatewayResult<Prompt>;

    /// Returns the id of the new prompt.
    async fn create(&self, params: &PromptCreateParams) -> GatewayResult<String>;

    async fn update_metadata(&self, params: &PromptUpdateMetadataParams) -> GatewayResult<()>;

    async fn categories(&self) -> GatewayResult<Vec<String>>;

    /// Fetch every id concurrently. Any single failure fails the batch.
    async fn retrieve_many(&self, ids: &[String]) -> GatewayResult<Vec<Prompt>> {
        let params = PromptRetrieveParams::default();
        try_join_all(ids.iter().map(|id| self.retrieve(id, params))).await
    }
}
