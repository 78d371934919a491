//! Seeds the prompt store with community rules scraped from cursor.directory.

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use crate::gateway::PromptGateway;
use crate::prompts::PromptCreateParams;

pub const DEFAULT_SOURCE_URL: &str = "https://cursor.directory/rules";

pub const SECTIONS: &[&str] = &[
    "typescript",
    "next.js",
    "python",
    "react",
    "php",
    "javascript",
    "tailwindcss",
    "node.js",
    "graphql",
    "testing",
    "supabase",
    "rust",
    "swift",
    "vite",
    "fastapi",
    "browser-api",
];

const RULE_SELECTOR: &str = "code.text-sm.block.pr-3";

#[derive(Debug, Default, PartialEq)]
pub struct SeedReport {
    pub sections: usize,
    pub created: usize,
    pub failed_sections: Vec<String>,
}

pub async fn fetch_rules(client: &reqwest::Client, source_url: &str, section: &str) -> Result<Vec<String>> {
    let url = format!("{}/{section}", source_url.trim_end_matches('/'));
    let html = client
        .get(&url)
        .timeout(std::time::Duration::from_secs(30))
        .send()
        .await
        .context("failed to fetch page")?
        .error_for_status()
        .with_context(|| format!("page returned error status: {url}"))?
        .text()
        .await
        .context("failed to read page body")?;

    parse_rules(&html)
}

/// Text of every rule block on a section page.
pub fn parse_rules(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(RULE_SELECTOR)
        .map_err(|e| anyhow::anyhow!("invalid rule selector '{}': {:?}", RULE_SELECTOR, e))?;

    Ok(document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect())
}

fn rule_params(section: &str, rule: String) -> PromptCreateParams {
    PromptCreateParams {
        content: rule,
        name: Some(section.to_string()),
        tags: Some(vec![section.to_string()]),
        ..Default::default()
    }
}

async fn seed_section(
    client: &reqwest::Client,
    gateway: &dyn PromptGateway,
    source_url: &str,
    section: &str,
) -> Result<usize> {
    let rules = fetch_rules(client, source_url, section).await?;
    tracing::info!(section, count = rules.len(), "scraped rules");

    let mut created = 0;
    for rule in rules {
        let id = gateway
            .create(&rule_params(section, rule))
            .await
            .with_context(|| format!("failed to store rule for {section}"))?;
        tracing::debug!(section, id = %id, "stored rule");
        created += 1;
    }
    Ok(created)
}

/// Scrape each section and create one prompt per rule. A failing section is
/// logged and skipped; rules it stored before failing stay stored.
pub async fn seed(
    client: &reqwest::Client,
    gateway: &dyn PromptGateway,
    source_url: &str,
    sections: &[String],
) -> SeedReport {
    let mut report = SeedReport {
        sections: sections.len(),
        ..Default::default()
    };

    for section in sections {
        match seed_section(client, gateway, source_url, section).await {
            Ok(created) => report.created += created,
            Err(e) => {
                tracing::error!(section = %section, error = ?e, "failed to seed rules");
                report.failed_sections.push(section.clone());
            }
        }
    }

    tracing::info!(
        created = report.created,
        failed = report.failed_sections.len(),
        "seeding finished"
    );
    report
}
