use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PromptCreateParams;

pub const CATEGORIES: &[&str] = &[
    "typescript",
    "next.js",
    "python",
    "sql",
    "go",
    "ai",
    "rust",
    "java",
    "kotlin",
    "c#",
    "c++",
    "c",
    "php",
    "other",
];

pub const MAX_TAGS: usize = 3;

/// Raw input of the "create prompt" form, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePromptForm {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Field-level validation failures, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, thiserror::Error)]
#[error("invalid fields: {}", join_fields(.errors))]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.errors
    }
}

fn join_fields(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors.keys().cloned().collect::<Vec<_>>().join(", ")
}

pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
}

impl CreatePromptForm {
    /// Check every field and build the create request. Nothing is sent
    /// anywhere until this succeeds.
    pub fn validate(self) -> Result<PromptCreateParams, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.content.trim().is_empty() {
            errors.add("content", "Prompt content is required");
        }
        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "Description is required");
        }

        let category = self.category.trim();
        if category.is_empty() {
            errors.add("category", "Category is required");
        } else if !CATEGORIES.contains(&category) {
            errors.add(
                "category",
                format!("Category must be one of: {}", CATEGORIES.join(", ")),
            );
        }

        let tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.iter().any(|t| !is_valid_tag(t)) {
            errors.add(
                "tags",
                "Tags can only contain letters, numbers, spaces, and hyphens",
            );
        }
        if tags.len() > MAX_TAGS {
            errors.add("tags", format!("Maximum of {MAX_TAGS} tags allowed"));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PromptCreateParams {
            content: self.content,
            name: Some(self.title),
            description: Some(self.description),
            category: Some(category.to_string()),
            tags: if tags.is_empty() { None } else { Some(tags) },
            parent: None,
            branched: Some(false),
        })
    }
}
