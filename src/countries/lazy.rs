use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use super::{CountryCatalog, CountrySource};
use crate::error::BuildError;

/// Country catalog built on first access.
///
/// Concurrent first callers block until the single build finishes; nobody
/// observes a partially built catalog. A failed build leaves the cell empty
/// so a later call retries.
pub struct LazyCatalog {
    cell: OnceCell<CountryCatalog>,
    source: Option<Arc<dyn CountrySource>>,
}

impl LazyCatalog {
    /// Catalog that builds from `source` on first use
    pub fn deferred(source: Arc<dyn CountrySource>) -> Self {
        Self {
            cell: OnceCell::new(),
            source: Some(source),
        }
    }

    /// Catalog that is already built
    pub fn ready(catalog: CountryCatalog) -> Self {
        Self {
            cell: OnceCell::with_value(catalog),
            source: None,
        }
    }

    pub fn get(&self) -> Result<&CountryCatalog, BuildError> {
        self.cell.get_or_try_init(|| {
            let source = self
                .source
                .as_ref()
                .ok_or_else(|| BuildError::Snapshot("catalog has no source".to_string()))?;
            info!("Building country catalog on first use...");
            CountryCatalog::build(source.countries()?)
        })
    }

    pub fn is_built(&self) -> bool {
        self.cell.get().is_some()
    }
}
