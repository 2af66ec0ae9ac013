use crate::catalog::CityCatalog;

/// Maximum catalog suggestions returned for one query.
pub const CATALOG_SUGGESTION_LIMIT: usize = 10;

/// How suggestions are matched, chosen by whether a catalog is available.
///
/// The two modes are intentionally different: the catalog can hold tens of
/// thousands of names, so it is matched by prefix and capped; the history is
/// at most five names, so it is matched anywhere and never capped.
#[derive(Debug, Clone, Copy)]
pub enum MatchPolicy<'a> {
    /// Case-insensitive prefix match, at most `limit` results.
    PrefixBounded { catalog: &'a [String], limit: usize },
    /// Case-insensitive substring match, every hit.
    SubstringUnbounded { history: &'a [String] },
}

impl<'a> MatchPolicy<'a> {
    pub fn select(catalog: &'a CityCatalog, history: &'a [String]) -> Self {
        if catalog.is_empty() {
            Self::SubstringUnbounded { history }
        } else {
            Self::PrefixBounded {
                catalog: catalog.entries(),
                limit: CATALOG_SUGGESTION_LIMIT,
            }
        }
    }

    pub fn suggest(&self, query: &str) -> Vec<String> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        match self {
            Self::PrefixBounded { catalog, limit } => catalog
                .iter()
                .filter(|entry| entry.to_lowercase().starts_with(&query))
                .take(*limit)
                .cloned()
                .collect(),
            Self::SubstringUnbounded { history } => history
                .iter()
                .filter(|entry| entry.to_lowercase().contains(&query))
                .cloned()
                .collect(),
        }
    }
}
