/// Base URL for a catalog: `https://opendata.cbs.nl`.
///
/// A catalog given with a scheme (`http://127.0.0.1:8080`) is used as is.
pub(crate) fn catalog_base(catalog: &str, use_https: bool) -> String {
    let catalog = catalog.trim().trim_end_matches('/');
    if catalog.contains("://") {
        return catalog.to_string();
    }
    let scheme = if use_https { "https" } else { "http" };
    format!("{}://{}", scheme, catalog)
}

pub(crate) fn urljoin(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    // Relative continuation links are resolved against the page URL.
    if let Ok(base_url) = reqwest::Url::parse(base) {
        if let Ok(joined) = base_url.join(path) {
            return joined.to_string();
        }
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

pub(crate) fn join_select(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_base_adds_scheme() {
        assert_eq!(catalog_base("opendata.cbs.nl", true), "https://opendata.cbs.nl");
        assert_eq!(catalog_base("dataderden.cbs.nl/", false), "http://dataderden.cbs.nl");
        assert_eq!(catalog_base("http://127.0.0.1:8080/", true), "http://127.0.0.1:8080");
    }

    #[test]
    fn urljoin_keeps_absolute_links() {
        let next = "https://opendata.cbs.nl/ODataFeed/odata/82070ENG/TypedDataSet?$skiptoken=10";
        assert_eq!(urljoin("https://opendata.cbs.nl/x", next), next);
    }

    #[test]
    fn urljoin_resolves_relative_links() {
        assert_eq!(
            urljoin(
                "https://opendata.cbs.nl/ODataApi/odata/82070ENG/TypedDataSet",
                "TypedDataSet?$skip=100"
            ),
            "https://opendata.cbs.nl/ODataApi/odata/82070ENG/TypedDataSet?$skip=100"
        );
        assert_eq!(
            urljoin("https://opendata.cbs.nl/ODataCatalog/Tables", "/ODataCatalog/Tables?$skip=2"),
            "https://opendata.cbs.nl/ODataCatalog/Tables?$skip=2"
        );
    }

    #[test]
    fn select_is_comma_joined() {
        let cols = vec!["Periods".to_string(), " Sex ".to_string(), String::new()];
        assert_eq!(join_select(&cols), "Periods,Sex");
    }

    #[test]
    fn parses_bool_settings() {
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }
}
