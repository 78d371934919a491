use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::{GatewayError, GatewayResult, PromptGateway};
use crate::prompts::{
    Prompt, PromptCreateParams, PromptListParams, PromptRetrieveParams,
    PromptUpdateMetadataParams,
};

const USER_AGENT: &str = "sps-frontend";

/// Everything but RFC 3986 unreserved characters is escaped inside a path
/// segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// [`PromptGateway`] backed by the hosted storage REST API.
pub struct HttpPromptGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpPromptGateway {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header("User-Agent", USER_AGENT);
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    /// Turn a non-2xx response into a `Status` error carrying the body.
    async fn check(resp: Response) -> GatewayResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// `/prompt/{id}` with `id` escaped as a single path segment. Dot segments
/// cannot name a prompt and would be normalised away by the URL parser.
fn prompt_path(id: &str) -> Option<String> {
    if id.is_empty() || id.chars().all(|c| c == '.') {
        return None;
    }
    Some(format!("/prompt/{}", utf8_percent_encode(id, PATH_SEGMENT)))
}

/// The create endpoint answers with the bare id, either as plain text or as
/// a JSON string.
fn parse_created_id(body: &str) -> GatewayResult<String> {
    let body = body.trim();
    let id = match serde_json::from_str::<String>(body) {
        Ok(id) => id,
        Err(_) => body.to_string(),
    };
    if id.is_empty() {
        return Err(GatewayError::Decode("create returned an empty id".into()));
    }
    Ok(id)
}

#[async_trait]
impl PromptGateway for HttpPromptGateway {
    async fn list(&self, params: &PromptListParams) -> GatewayResult<Vec<Prompt>> {
        tracing::debug!(
            offset = params.offset,
            limit = params.limit,
            category = ?params.category,
            "fetching prompts"
        );
        let resp = self
            .authorize(self.client.get(self.url("/prompts")))
            .query(params)
            .send()
            .await?;
        let prompts: Vec<Prompt> = Self::check(resp).await?.json().await?;
        tracing::debug!(count = prompts.len(), "retrieved prompts");
        Ok(prompts)
    }

    async fn retrieve(&self, id: &str, params: PromptRetrieveParams) -> GatewayResult<Prompt> {
        let Some(path) = prompt_path(id) else {
            return Err(GatewayError::NotFound(id.to_string()));
        };
        let resp = self
            .authorize(self.client.get(self.url(&path)))
            .query(&params)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(id.to_string()));
        }
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn create(&self, params: &PromptCreateParams) -> GatewayResult<String> {
        let resp = self
            .authorize(self.client.post(self.url("/prompt")))
            .json(params)
            .send()
            .await?;
        let body = Self::check(resp).await?.text().await?;
        let id = parse_created_id(&body)?;
        tracing::info!(id = %id, "created prompt");
        Ok(id)
    }

    async fn update_metadata(&self, params: &PromptUpdateMetadataParams) -> GatewayResult<()> {
        let resp = self
            .authorize(self.client.put(self.url("/prompt/metadata")))
            .json(params)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(params.id.clone()));
        }
        Self::check(resp).await?;
        Ok(())
    }

    async fn categories(&self) -> GatewayResult<Vec<String>> {
        let resp = self
            .authorize(self.client.get(self.url("/prompt/categories")))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}
