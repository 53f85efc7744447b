//! Local drug-name catalog used for autocomplete.
//!
//! Loaded once at startup from a JSON array of names. The catalog is advisory:
//! names outside it can still be searched and analyzed.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

/// Default number of suggestions returned for one input.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot read drug catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Drug catalog {path} is not a JSON array of names: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DrugCatalog {
    names: Vec<String>,
}

impl DrugCatalog {
    /// Build a catalog: names trimmed, blanks dropped, case-insensitive
    /// duplicates removed keeping the first spelling.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .filter_map(|n| {
                let trimmed = n.as_ref().trim();
                (!trimmed.is_empty() && seen.insert(trimmed.to_lowercase()))
                    .then(|| trimmed.to_string())
            })
            .collect();
        Self { names }
    }

    /// Load from a JSON file. A missing file yields an empty catalog.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Drug catalog not found, autocomplete disabled");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let raw: Vec<String> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Malformed {
                path: path.display().to_string(),
                source,
            })?;

        let catalog = Self::new(raw);
        tracing::info!(path = %path.display(), names = catalog.len(), "Drug catalog loaded");
        Ok(catalog)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Suggest catalog names for the drug currently being typed.
    ///
    /// Only the text after the last comma is matched, so a comma-separated
    /// list can be completed one entry at a time.
    pub fn suggest(&self, input: &str, limit: usize) -> Vec<&str> {
        let fragment = input.rsplit(',').next().unwrap_or("").trim();
        if fragment.is_empty() {
            return Vec::new();
        }
        let needle = fragment.to_lowercase();
        self.names
            .iter()
            .filter(|n| n.to_lowercase().contains(&needle))
            .take(limit)
            .map(String::as_str)
            .collect()
    }
}
