use indexmap::IndexMap;
use std::collections::HashMap;

use crate::record::{Record, Value};

/// Sub-resources that are never used to translate dimension keys.
const NOT_DIMENSIONS: [&str; 5] = [
    "TableInfos",
    "TypedDataSet",
    "UntypedDataSet",
    "DataProperties",
    "CategoryGroups",
];

/// Every downloaded sub-resource of one table, in the order the table root
/// listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableBundle {
    tables: IndexMap<String, Vec<Record>>,
}

impl TableBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, records: Vec<Record>) {
        self.tables.insert(name.into(), records);
    }

    pub fn get(&self, name: &str) -> Option<&[Record]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, Vec<Record>> {
        self.tables
    }

    /// Takes the data rows out of the bundle and replaces dimension keys with
    /// their titles.
    ///
    /// A row field named like a dimension table (`Periods`, `Sex`, ...) holds a
    /// `Key` of that table; it is replaced by the entry's `Title`. Keys without a
    /// matching entry are left as they are. `TypedDataSet` is preferred when both
    /// data sets are present.
    pub fn into_data(mut self) -> Vec<Record> {
        let mut rows = self
            .tables
            .shift_remove("TypedDataSet")
            .or_else(|| self.tables.shift_remove("UntypedDataSet"))
            .unwrap_or_default();

        let titles: Vec<(String, HashMap<String, Value>)> = self
            .tables
            .iter()
            .filter(|(name, _)| !NOT_DIMENSIONS.contains(&name.as_str()))
            .map(|(name, entries)| (name.clone(), title_lookup(entries)))
            .collect();

        for row in &mut rows {
            for (dimension, lookup) in &titles {
                if let Some(value) = row.get_mut(dimension) {
                    let title = value.as_str().and_then(|key| lookup.get(key));
                    if let Some(title) = title {
                        *value = title.clone();
                    }
                }
            }
        }

        rows
    }
}

fn title_lookup(entries: &[Record]) -> HashMap<String, Value> {
    entries
        .iter()
        .filter_map(|entry| {
            let key = entry.get("Key")?.as_str()?;
            let title = entry.get("Title")?;
            Some((key.to_string(), title.clone()))
        })
        .collect()
}
