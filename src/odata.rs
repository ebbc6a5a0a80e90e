use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::record::{Record, record_from_json};

/// One page of an OData entity set.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Page {
    #[serde(default)]
    value: Option<Vec<IndexMap<String, JsonValue>>>,
    // v3 JSON light uses `odata.nextLink`, v4 `@odata.nextLink`.
    #[serde(default, rename = "odata.nextLink")]
    next_link: Option<String>,
    #[serde(default, rename = "@odata.nextLink")]
    next_link_v4: Option<String>,
}

impl Page {
    pub(crate) fn parse(url: &str, body: &str) -> Result<Page> {
        serde_json::from_str::<Page>(body).map_err(|e| Error::Parse {
            url: url.to_string(),
            reason: format!("invalid JSON: {}", e),
        })
    }

    pub(crate) fn into_records(self, url: &str) -> Result<(Vec<Record>, Option<String>)> {
        let value = self.value.ok_or_else(|| Error::Parse {
            url: url.to_string(),
            reason: "response has no `value` array".to_string(),
        })?;
        let records = value.into_iter().map(record_from_json).collect();
        let next_link = self
            .next_link
            .filter(|l| !l.trim().is_empty())
            .or(self.next_link_v4.filter(|l| !l.trim().is_empty()));
        Ok((records, next_link))
    }
}

/// Entry of a table root listing: `{"name": "TableInfos", "url": "https://..."}`.
///
/// Only the name is kept; sub-resource URLs are rebuilt from the table URL so
/// they honour the selected catalog and scheme.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResourceLink {
    pub(crate) name: String,
}

impl ResourceLink {
    pub(crate) fn from_record(url: &str, record: &Record) -> Result<ResourceLink> {
        let name = record
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::Parse {
                url: url.to_string(),
                reason: "table listing entry without `name`".to_string(),
            })?;
        Ok(ResourceLink {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    #[test]
    fn parses_v3_page_with_next_link() {
        let body = r#"{
            "odata.metadata": "https://opendata.cbs.nl/ODataCatalog/$metadata#Tables",
            "value": [{"ID": 1, "Identifier": "82070ENG"}],
            "odata.nextLink": "https://opendata.cbs.nl/ODataCatalog/Tables?$skip=1"
        }"#;
        let (records, next) = Page::parse("u", body).unwrap().into_records("u").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Identifier"], Value::from("82070ENG"));
        assert_eq!(
            next.as_deref(),
            Some("https://opendata.cbs.nl/ODataCatalog/Tables?$skip=1")
        );
    }

    #[test]
    fn accepts_v4_next_link() {
        let body = r#"{"value": [], "@odata.nextLink": "Tables?$skip=10"}"#;
        let (records, next) = Page::parse("u", body).unwrap().into_records("u").unwrap();
        assert!(records.is_empty());
        assert_eq!(next.as_deref(), Some("Tables?$skip=10"));
    }

    #[test]
    fn page_with_both_next_link_spellings_is_accepted() {
        let body = r#"{
            "value": [{"ID": 1}],
            "odata.nextLink": "Tables?$skip=1",
            "@odata.nextLink": "Tables?$skip=1"
        }"#;
        let (records, next) = Page::parse("u", body).unwrap().into_records("u").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(next.as_deref(), Some("Tables?$skip=1"));
    }

    #[test]
    fn missing_value_is_a_parse_error() {
        let page = Page::parse("u", r#"{"Identifier": "82070ENG"}"#).unwrap();
        assert!(matches!(page.into_records("u"), Err(Error::Parse { .. })));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Page::parse("u", "<feed xmlns=\"http://www.w3.org/2005/Atom\">").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn resource_link_requires_name() {
        let mut record = Record::new();
        record.insert("url".into(), Value::from("https://x/TableInfos"));
        assert!(ResourceLink::from_record("u", &record).is_err());

        record.insert("name".into(), Value::from("TableInfos"));
        let link = ResourceLink::from_record("u", &record).unwrap();
        assert_eq!(link.name, "TableInfos");
    }
}
