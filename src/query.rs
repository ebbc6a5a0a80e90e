use std::path::{Path, PathBuf};

use crate::util::join_select;

/// Per-call options.
///
/// Not every operation reads every field: `select`, `filter`, `typed` and `dir`
/// only affect data downloads and the table list (`select`/`filter`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub(crate) catalog: Option<String>,
    pub(crate) select: Vec<String>,
    pub(crate) filter: Option<String>,
    pub(crate) typed: bool,
    pub(crate) dir: Option<PathBuf>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog for this call only, e.g. `dataderden.cbs.nl`.
    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Columns to return (`$select`).
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Row filter in OData syntax (`$filter`), passed through unchanged.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Download `TypedDataSet` instead of `UntypedDataSet`.
    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    /// Directory to export every downloaded resource to.
    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn catalog_override(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub(crate) fn data_set_name(&self) -> &'static str {
        if self.typed {
            "TypedDataSet"
        } else {
            "UntypedDataSet"
        }
    }

    pub(crate) fn other_data_set_name(&self) -> &'static str {
        if self.typed {
            "UntypedDataSet"
        } else {
            "TypedDataSet"
        }
    }

    /// `$select` and `$filter` parameters, in that order.
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let select = join_select(&self.select);
        if !select.is_empty() {
            params.push(("$select", select));
        }
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            params.push(("$filter", filter.to_string()));
        }
        params
    }
}
