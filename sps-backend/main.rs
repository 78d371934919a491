mod api;
mod commands;
mod config;
mod gateway;
mod pagination;
mod prompts;
mod scrape;
mod storage;

use std::error::Error;

use axum::body::Body;
use axum::extract::Request;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sentry::integrations::tower::{NewSentryLayer, SentryHttpLayer};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::commands::Services;

#[derive(Parser)]
#[command(name = "sps", about = "Front end for the system prompt storage service")]
enum Cli {
    /// Start the HTTP server (default when no subcommand is given)
    #[command(alias = "run")]
    Serve,
    /// Read and create prompts on the storage service
    #[command(subcommand)]
    Prompts(PromptsCommand),
    /// Manage the locally kept "My Prompts" list
    #[command(subcommand)]
    Saved(SavedCommand),
    /// Manage locally generated API keys
    #[command(subcommand)]
    Keys(KeysCommand),
    /// Page through prompts the way the infinite-scroll list does
    Browse {
        #[arg(long)]
        category: Option<String>,
        /// Stop after this many pages
        #[arg(long, default_value_t = 3)]
        pages: usize,
    },
    /// Seed the store with rules scraped from cursor.directory
    Scrape {
        #[arg(long, default_value = scrape::DEFAULT_SOURCE_URL)]
        source: String,
        /// Sections to scrape (defaults to all known sections)
        #[arg(long = "section")]
        sections: Vec<String>,
    },
}

#[derive(Subcommand)]
enum PromptsCommand {
    /// List one page of prompts
    List {
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = prompts::DEFAULT_LIST_LIMIT)]
        limit: u32,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show a single prompt with metadata
    Show { id: String },
    /// Create a prompt and keep its id
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// Up to three tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Prompt text; read from stdin when omitted
        #[arg(long)]
        content: Option<String>,
    },
    /// List the categories in use
    Categories,
}

#[derive(Subcommand)]
enum SavedCommand {
    /// Print kept ids
    List,
    /// Print kept prompts resolved against the service
    Show,
    Add { id: String },
    Remove { id: String },
}

#[derive(Subcommand)]
enum KeysCommand {
    List,
    Create { name: String },
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    // Default to Serve when no subcommand is given, but still allow --help
    // and --version to work.
    let args: Vec<String> = std::env::args().collect();
    let cli = if args.len() <= 1 { Cli::Serve } else { Cli::parse() };

    let config = config::Config::from_env();
    init_tracing();
    let _guard = sentry::init((
        config.sentry_dsn.clone().unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            send_default_pii: false,
            traces_sample_rate: 0.2,
            enable_logs: true,
            ..Default::default()
        },
    ));

    let port = config.port;
    let services = Services::build(config)?;

    match cli {
        Cli::Serve => run_server(services, port).await?,
        Cli::Prompts(cmd) => match cmd {
            PromptsCommand::List {
                offset,
                limit,
                category,
            } => commands::list_prompts(&services, offset, limit, category).await?,
            PromptsCommand::Show { id } => commands::show_prompt(&services, &id).await?,
            PromptsCommand::Create {
                title,
                description,
                category,
                tags,
                content,
            } => {
                let content = match content {
                    Some(content) => content,
                    None => commands::read_stdin()?,
                };
                let form = prompts::validation::CreatePromptForm {
                    content,
                    title,
                    description,
                    category,
                    tags,
                };
                commands::create_prompt(&services, form).await?
            }
            PromptsCommand::Categories => commands::list_categories(&services).await?,
        },
        Cli::Saved(cmd) => match cmd {
            SavedCommand::List => commands::list_saved_ids(&services),
            SavedCommand::Show => commands::show_saved_prompts(&services).await?,
            SavedCommand::Add { id } => services.saved_ids.add(&id),
            SavedCommand::Remove { id } => services.saved_ids.remove(&id),
        },
        Cli::Keys(cmd) => match cmd {
            KeysCommand::List => commands::list_keys(&services),
            KeysCommand::Create { name } => commands::create_key(&services, &name)?,
            KeysCommand::Delete { id } => services.api_keys.remove(&id),
        },
        Cli::Browse { category, pages } => commands::browse(&services, category, pages).await?,
        Cli::Scrape { source, sections } => {
            let sections = if sections.is_empty() {
                scrape::SECTIONS.iter().map(|s| s.to_string()).collect()
            } else {
                sections
            };
            let report = scrape::seed(
                &services.http_client,
                services.gateway.as_ref(),
                &source,
                &sections,
            )
            .await;
            println!(
                "created {} prompts from {} sections ({} failed)",
                report.created,
                report.sections,
                report.failed_sections.len()
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sps=info,tower_http=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true).with_bracketed_fields(false))
        .with(sentry::integrations::tracing::layer().event_filter(
            |metadata| match *metadata.level() {
                tracing::Level::ERROR => sentry::integrations::tracing::EventFilter::Event,
                tracing::Level::WARN | tracing::Level::INFO => {
                    sentry::integrations::tracing::EventFilter::Breadcrumb
                }
                _ => sentry::integrations::tracing::EventFilter::Ignore,
            },
        ))
        .init();
}

async fn run_server(services: Services, port: u16) -> Result<(), Box<dyn Error>> {
    let app = api::create_app(services.app_state())
        .layer(SentryHttpLayer::new().enable_transaction())
        .layer(NewSentryLayer::<Request<Body>>::new_from_top());

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(api_url = %services.api_url, "forwarding to prompt storage API");
    println!("Listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
