//! Off-ledger token metadata.

use async_trait::async_trait;
use gem_sol::Address;
use serde::Deserialize;

use crate::error::GemError;

/// A token held by a wallet, as reported by the metadata service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub mint: Address,
    /// Verified collection the token belongs to, if any.
    pub collection: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataFile {
    pub uri: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetadataProperties {
    #[serde(default)]
    pub files: Vec<MetadataFile>,
}

/// The JSON document a token's metadata uri points to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenMetadata {
    pub image: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub properties: MetadataProperties,
}

impl TokenMetadata {
    pub fn from_json(json: &str) -> Result<Self, GemError> {
        serde_json::from_str(json).map_err(|e| GemError::Metadata(e.to_string()))
    }

    /// Value of the attribute named `trait_type`, rendered as text.
    pub fn attribute(&self, trait_type: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|a| a.trait_type == trait_type)
            .map(|a| match &a.value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    /// The `Generation` trait, if present and numeric.
    pub fn generation(&self) -> Option<u32> {
        self.attribute("Generation")?.trim().parse().ok()
    }

    pub fn class_label(&self) -> Option<String> {
        self.attribute("Class")
    }

    /// First `video/mp4` file.
    pub fn video(&self) -> Option<&str> {
        self.properties
            .files
            .iter()
            .find(|f| f.mime_type.as_deref() == Some("video/mp4"))
            .map(|f| f.uri.as_str())
    }
}

/// Lookup of a wallet's tokens and their off-ledger attributes.
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn find_tokens_by_owner(&self, owner: &Address) -> Result<Vec<TokenRecord>, GemError>;

    async fn load_metadata(&self, mint: &Address) -> Result<TokenMetadata, GemError>;
}
