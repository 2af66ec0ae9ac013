//! Static city list used for autocomplete.
//!
//! The list is a CSV-like text resource (`city,country[,state]` after a
//! header row). It is loaded at most once per process, on the first
//! non-empty autocomplete query. A failed load is logged and leaves an empty
//! catalog, which makes autocomplete fall back to the search history.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Catalog source returned HTTP {0}")]
    Status(u16),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityCatalog {
    entries: Vec<String>,
}

impl CityCatalog {
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .skip(1)
            .filter_map(|row| {
                let mut fields = row.split(',').map(str::trim);
                let city = fields.next().filter(|f| !f.is_empty())?;
                let country = fields.next().filter(|f| !f.is_empty())?;
                let state = fields.next().filter(|f| !f.is_empty());

                Some(match state {
                    Some(state) => format!("{}, {}, {}", city, state, country),
                    None => format!("{}, {}", city, country),
                })
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<String>> for CityCatalog {
    fn from(entries: Vec<String>) -> Self {
        Self { entries }
    }
}

/// Lazily loads the catalog from a file path or an `http(s)://` URL.
pub struct CatalogLoader {
    source: Option<String>,
    catalog: OnceCell<Arc<CityCatalog>>,
}

impl CatalogLoader {
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            catalog: OnceCell::new(),
        }
    }

    /// A loader that never loads anything.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// The catalog, loading it on first use.
    pub async fn get(&self) -> Arc<CityCatalog> {
        self.catalog
            .get_or_init(|| async {
                match self.load().await {
                    Ok(catalog) => {
                        tracing::info!("Loaded city catalog with {} entries", catalog.entries.len());
                        Arc::new(catalog)
                    }
                    Err(e) => {
                        tracing::warn!("City catalog unavailable, using search history: {}", e);
                        Arc::new(CityCatalog::default())
                    }
                }
            })
            .await
            .clone()
    }

    /// The catalog if a load already finished.
    #[cfg(test)]
    pub fn loaded(&self) -> Option<Arc<CityCatalog>> {
        self.catalog.get().cloned()
    }

    async fn load(&self) -> Result<CityCatalog, CatalogError> {
        let Some(source) = self.source.as_deref() else {
            return Ok(CityCatalog::default());
        };

        let text = if source.starts_with("http://") || source.starts_with("https://") {
            let client = Client::builder()
                .user_agent("WeatherAssistant/1.0")
                .timeout(Duration::from_secs(30))
                .build()?;
            let response = client.get(source).send().await?;
            if !response.status().is_success() {
                return Err(CatalogError::Status(response.status().as_u16()));
            }
            response.text().await?
        } else {
            tokio::fs::read_to_string(source).await?
        };

        Ok(CityCatalog::parse(&text))
    }
}
