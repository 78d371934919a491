use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::AppState;
use crate::config::Config;
use crate::gateway::{HttpPromptGateway, PromptGateway};
use crate::pagination::{LoadOutcome, PaginatedList};
use crate::prompts::validation::CreatePromptForm;
use crate::prompts::{Prompt, PromptListParams, PromptRetrieveParams};
use crate::storage::{ApiKeyStore, FileStore, KeyValueStore, SavedPromptIds};

/// Everything a command needs, wired from [`Config`].
pub struct Services {
    pub api_url: String,
    pub page_size: u32,
    pub http_client: reqwest::Client,
    pub gateway: Arc<dyn PromptGateway>,
    pub saved_ids: SavedPromptIds,
    pub api_keys: ApiKeyStore,
}

impl Services {
    pub fn build(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        let gateway: Arc<dyn PromptGateway> = Arc::new(HttpPromptGateway::new(
            http_client.clone(),
            config.api_url.clone(),
            config.api_key,
        ));

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
        tracing::debug!(data_dir = %config.data_dir.display(), "using local profile");

        Ok(Self {
            api_url: config.api_url,
            page_size: config.page_size,
            http_client,
            gateway,
            saved_ids: SavedPromptIds::new(store.clone()),
            api_keys: ApiKeyStore::new(store),
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            gateway: self.gateway.clone(),
            saved_ids: self.saved_ids.clone(),
            api_keys: self.api_keys.clone(),
        }
    }
}

fn format_row(prompt: &Prompt) -> String {
    let date = prompt
        .created_date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  v{}  {:<12}  {}  {}",
        prompt.id,
        prompt.version,
        prompt.category().unwrap_or("-"),
        date,
        prompt.name().unwrap_or("Prompt missing name"),
    )
}

fn format_detail(prompt: &Prompt) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", prompt.name().unwrap_or("Prompt missing name")));
    if let Some(description) = prompt.metadata.as_ref().and_then(|m| m.description.as_deref()) {
        out.push_str(&format!("{description}\n"));
    }
    out.push_str(&format!("id:       {}\n", prompt.id));
    out.push_str(&format!("version:  {}\n", prompt.version));
    match prompt.parent_id() {
        Some(parent) => out.push_str(&format!("parent:   {parent}\n")),
        None => out.push_str("parent:   parent == this.prompt\n"),
    }
    if let Some(date) = prompt.created_date() {
        out.push_str(&format!("created:  {date}\n"));
    }
    if let Some(category) = prompt.category() {
        out.push_str(&format!("category: {category}\n"));
    }
    let mut status = if prompt.archived.unwrap_or(false) {
        "ARCHIVED".to_string()
    } else {
        "ACTIVE".to_string()
    };
    if prompt.branched.unwrap_or(false) {
        status.push_str(" | BRANCHED");
    }
    out.push_str(&format!("status:   {status}\n"));
    if let Some(tags) = prompt.metadata.as_ref().and_then(|m| m.tags.as_ref()) {
        if !tags.is_empty() {
            out.push_str(&format!("tags:     [ {} ]\n", tags.join(" | ")));
        }
    }
    out.push('\n');
    out.push_str(&prompt.content);
    out
}

pub fn read_stdin() -> Result<String> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("failed to read prompt content from stdin")?;
    Ok(content)
}

pub async fn list_prompts(
    services: &Services,
    offset: u32,
    limit: u32,
    category: Option<String>,
) -> Result<()> {
    let params = PromptListParams::new(offset, limit, category);
    let prompts = services
        .gateway
        .list(&params)
        .await
        .context("failed to list prompts")?;
    for prompt in &prompts {
        println!("{}", format_row(prompt));
    }
    Ok(())
}

pub async fn show_prompt(services: &Services, id: &str) -> Result<()> {
    let prompt = services
        .gateway
        .retrieve(id, PromptRetrieveParams::default())
        .await
        .with_context(|| format!("failed to load prompt {id}"))?;
    println!("{}", format_detail(&prompt));
    Ok(())
}

pub async fn create_prompt(services: &Services, form: CreatePromptForm) -> Result<()> {
    let params = form.validate()?;
    let id = services
        .gateway
        .create(&params)
        .await
        .context("failed to create prompt")?;
    services.saved_ids.add(&id);
    println!("{id}");
    Ok(())
}

pub async fn list_categories(services: &Services) -> Result<()> {
    let categories = services
        .gateway
        .categories()
        .await
        .context("failed to list categories")?;
    for category in categories {
        println!("{category}");
    }
    Ok(())
}

pub fn list_saved_ids(services: &Services) {
    for id in services.saved_ids.list() {
        println!("{id}");
    }
}

pub async fn show_saved_prompts(services: &Services) -> Result<()> {
    let ids = services.saved_ids.list();
    if ids.is_empty() {
        println!("No saved prompts");
        return Ok(());
    }
    let prompts = services
        .gateway
        .retrieve_many(&ids)
        .await
        .context("failed to fetch saved prompts")?;
    for prompt in &prompts {
        println!("{}", format_row(prompt));
    }
    Ok(())
}

pub fn list_keys(services: &Services) {
    let keys = services.api_keys.list();
    if keys.is_empty() {
        println!("No API keys");
        return;
    }
    for key in keys {
        println!(
            "{}  {}  {}  {}",
            key.id,
            key.name,
            key.created_at.date_naive(),
            key.key
        );
    }
}

pub fn create_key(services: &Services, name: &str) -> Result<()> {
    let key = services.api_keys.generate(name)?;
    println!("{}  {}", key.name, key.key);
    Ok(())
}

/// Drive a [`PaginatedList`] from the terminal: print the first page, then
/// keep signalling "near end" until the list is exhausted or `pages` pages
/// have been shown.
pub async fn browse(services: &Services, category: Option<String>, pages: usize) -> Result<()> {
    let list = PaginatedList::new(services.gateway.clone(), services.page_size, category);
    let first_page = services
        .gateway
        .list(&list.cursor().params())
        .await
        .context("failed to load first page")?;
    if first_page.is_empty() {
        println!("+--[ No More Prompts ]--+");
        return Ok(());
    }
    list.initialize(first_page);
    let mut printed = print_new_items(&list, 0);
    let mut shown = 1;

    while shown < pages && list.has_more() {
        match list.notify_near_end().await {
            Ok(LoadOutcome::Appended(_)) => {
                printed = print_new_items(&list, printed);
                shown += 1;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("error loading more prompts: {e}");
                break;
            }
        }
    }

    if !list.has_more() {
        println!("+--[ No More Prompts ]--+");
    }
    Ok(())
}

fn print_new_items(list: &PaginatedList, already_printed: usize) -> usize {
    let items = list.items();
    for prompt in items.iter().skip(already_printed) {
        println!("{}", format_row(prompt));
    }
    items.len()
}
