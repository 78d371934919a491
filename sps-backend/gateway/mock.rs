use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{GatewayError, GatewayResult, PromptGateway};
use crate::prompts::{
    Prompt, PromptCreateParams, PromptListParams, PromptMetadata, PromptRetrieveParams,
    PromptUpdateMetadataParams,
};

pub fn make_prompt(id: &str) -> Prompt {
    Prompt {
        id: id.to_string(),
        content: format!("content of {id}"),
        version: 1,
        parent: id.to_string(),
        branched: Some(false),
        archived: Some(false),
        created_at: 1_710_892_800,
        metadata: None,
    }
}

pub fn make_categorized(id: &str, category: &str) -> Prompt {
    let mut prompt = make_prompt(id);
    prompt.metadata = Some(PromptMetadata {
        name: Some(format!("prompt {id}")),
        category: Some(category.to_string()),
        ..Default::default()
    });
    prompt
}

pub fn make_page(prefix: &str, len: usize) -> Vec<Prompt> {
    (0..len).map(|i| make_prompt(&format!("{prefix}-{i}"))).collect()
}

/// In-memory stand-in for the hosted API.
///
/// `list` serves scripted pages first (in order), then falls back to
/// slicing `prompts`. When a gate is installed every `list` call waits for
/// a permit before answering.
#[derive(Default)]
pub struct MockGateway {
    prompts: StdMutex<Vec<Prompt>>,
    pages: StdMutex<VecDeque<Result<Vec<Prompt>, String>>>,
    gate: Option<Arc<Semaphore>>,
    list_params: StdMutex<Vec<PromptListParams>>,
    retrieve_count: AtomicUsize,
    created: StdMutex<Vec<PromptCreateParams>>,
    updated: StdMutex<Vec<PromptUpdateMetadataParams>>,
}

impl MockGateway {
    pub fn with_prompts(prompts: Vec<Prompt>) -> Self {
        Self {
            prompts: StdMutex::new(prompts),
            ..Default::default()
        }
    }

    pub fn with_pages(pages: Vec<Result<Vec<Prompt>, String>>) -> Self {
        Self {
            pages: StdMutex::new(pages.into()),
            ..Default::default()
        }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_params.lock().unwrap().len()
    }

    pub fn list_params(&self) -> Vec<PromptListParams> {
        self.list_params.lock().unwrap().clone()
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_count.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<PromptCreateParams> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<PromptUpdateMetadataParams> {
        self.updated.lock().unwrap().clone()
    }
}

#[async_trait]
impl PromptGateway for MockGateway {
    async fn list(&self, params: &PromptListParams) -> GatewayResult<Vec<Prompt>> {
        self.list_params.lock().unwrap().push(params.clone());

        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(|e| GatewayError::Decode(e.to_string()))?;
            permit.forget();
        }

        if let Some(page) = self.pages.lock().unwrap().pop_front() {
            return page.map_err(|body| GatewayError::Status { status: 500, body });
        }

        let prompts = self.prompts.lock().unwrap();
        Ok(prompts
            .iter()
            .filter(|p| match &params.category {
                Some(category) => p.category() == Some(category.as_str()),
                None => true,
            })
            .skip(params.offset as usize)
            .take(params.limit as usize)
            .cloned()
            .collect())
    }

    async fn retrieve(&self, id: &str, _params: PromptRetrieveParams) -> GatewayResult<Prompt> {
        self.retrieve_count.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn create(&self, params: &PromptCreateParams) -> GatewayResult<String> {
        let mut created = self.created.lock().unwrap();
        created.push(params.clone());
        let id = format!("new-{}", created.len());

        let mut prompt = make_prompt(&id);
        prompt.content = params.content.clone();
        prompt.metadata = Some(PromptMetadata {
            name: params.name.clone(),
            description: params.description.clone(),
            category: params.category.clone(),
            tags: params.tags.clone(),
        });
        self.prompts.lock().unwrap().push(prompt);
        Ok(id)
    }

    async fn update_metadata(&self, params: &PromptUpdateMetadataParams) -> GatewayResult<()> {
        let mut prompts = self.prompts.lock().unwrap();
        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == params.id)
            .ok_or_else(|| GatewayError::NotFound(params.id.clone()))?;
        prompt.metadata = Some(PromptMetadata {
            name: params.name.clone(),
            description: params.description.clone(),
            category: params.category.clone(),
            tags: params.tags.clone(),
        });
        self.updated.lock().unwrap().push(params.clone());
        Ok(())
    }

    async fn categories(&self) -> GatewayResult<Vec<String>> {
        let mut categories: Vec<String> = self
            .prompts
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.category().map(String::from))
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}
