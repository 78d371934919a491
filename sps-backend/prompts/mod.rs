pub mod validation;

use serde::{Deserialize, Serialize};

/// Page size used when a list request carries no `limit`.
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// A stored prompt as returned by the hosted storage API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub content: String,
    pub version: i64,
    /// Id of the prompt this one was branched from. Equal to `id` for a
    /// root prompt; use [`Prompt::parent_id`] instead of reading it directly.
    pub parent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    /// Unix timestamp in seconds.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PromptMetadata>,
}

impl Prompt {
    /// A prompt whose parent points at itself has no lineage.
    pub fn is_root(&self) -> bool {
        self.parent.is_empty() || self.parent == self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            Some(&self.parent)
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.name.as_deref())
    }

    pub fn category(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.category.as_deref())
    }

    pub fn created_date(&self) -> Option<chrono::NaiveDate> {
        chrono::DateTime::from_timestamp(self.created_at, 0).map(|dt| dt.date_naive())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category of the prompt, e.g. `rust` or `typescript`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptListParams {
    pub offset: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PromptListParams {
    pub fn new(offset: u32, limit: u32, category: Option<String>) -> Self {
        Self {
            offset,
            limit,
            category: category.filter(|c| !c.is_empty()),
        }
    }
}

impl Default for PromptListParams {
    fn default() -> Self {
        Self::new(0, DEFAULT_LIST_LIMIT, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PromptRetrieveParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<bool>,
}

impl Default for PromptRetrieveParams {
    fn default() -> Self {
        Self { metadata: Some(true) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptCreateParams {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// `None` for a new prompt with no lineage.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branched: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptUpdateMetadataParams {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl PromptUpdateMetadataParams {
    pub fn from_metadata(id: impl Into<String>, metadata: PromptMetadata) -> Self {
        Self {
            id: id.into(),
            name: metadata.name,
            description: metadata.description,
            category: metadata.category,
            tags: metadata.tags,
        }
    }
}
