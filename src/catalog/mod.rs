//! The attraction catalog: loaded once at startup, read-only afterwards.
//!
//! Failing to load it is fatal; nothing in the reward logic can run without it.

use crate::model::Attraction;
use crate::providers::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const EMBEDDED_CATALOG: &str = include_str!("../../data/attractions.toml");

/// Startup-time catalog load failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("attraction source failed: {0}")]
    Source(#[from] ProviderError),

    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("attraction catalog is empty")]
    Empty,
}

/// Where the catalog comes from. Called exactly once, at startup.
#[async_trait]
pub trait AttractionSource: Send + Sync {
    async fn all_attractions(&self) -> Result<Vec<Attraction>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    attractions: Vec<Attraction>,
}

fn parse_catalog(content: &str) -> Result<Vec<Attraction>, CatalogError> {
    let file: CatalogFile = toml::from_str(content)?;
    Ok(file.attractions)
}

/// The catalog bundled with the crate (`data/attractions.toml`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedAttractionSource;

#[async_trait]
impl AttractionSource for EmbeddedAttractionSource {
    async fn all_attractions(&self) -> Result<Vec<Attraction>, CatalogError> {
        parse_catalog(EMBEDDED_CATALOG)
    }
}

/// A catalog read from a TOML file with `[[attractions]]` tables.
#[derive(Debug, Clone)]
pub struct TomlAttractionSource {
    path: PathBuf,
}

impl TomlAttractionSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl AttractionSource for TomlAttractionSource {
    async fn all_attractions(&self) -> Result<Vec<Attraction>, CatalogError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CatalogError::Read {
                path: self.path.clone(),
                source,
            })?;
        parse_catalog(&content)
    }
}

/// An in-memory list, mostly for tests and embedding.
#[async_trait]
impl AttractionSource for Vec<Attraction> {
    async fn all_attractions(&self) -> Result<Vec<Attraction>, CatalogError> {
        Ok(self.clone())
    }
}

/// Immutable, ordered set of attractions. Cheap to clone and shared without locking.
#[derive(Debug, Clone)]
pub struct AttractionCatalog {
    attractions: Arc<[Attraction]>,
}

impl AttractionCatalog {
    /// Loads the catalog from `source`. An empty catalog is an error.
    pub async fn load(source: &dyn AttractionSource) -> Result<Self, CatalogError> {
        let attractions = source.all_attractions().await?;
        if attractions.is_empty() {
            return Err(CatalogError::Empty);
        }
        info!(attractions = attractions.len(), "Attraction catalog loaded");
        Ok(Self {
            attractions: attractions.into(),
        })
    }

    pub fn from_attractions(attractions: Vec<Attraction>) -> Self {
        Self {
            attractions: attractions.into(),
        }
    }

    /// All attractions, in catalog order.
    pub fn list(&self) -> &[Attraction] {
        &self.attractions
    }

    pub fn len(&self) -> usize {
        self.attractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attractions.is_empty()
    }
}
