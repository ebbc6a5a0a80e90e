use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use std::collections::HashSet;
use std::time::Duration;

use crate::bundle::TableBundle;
use crate::catalog;
use crate::config::{DEFAULT_TIMEOUT, load_config};
use crate::error::{Error, Result, format_odata_error};
use crate::export::save_resource;
use crate::odata::{Page, ResourceLink};
use crate::query::Query;
use crate::record::Record;
use crate::util::{catalog_base, urljoin};

const CATALOG_TABLES: &str = "ODataCatalog/Tables";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalog host such as `opendata.cbs.nl`, or a base URL with a scheme.
    ///
    /// `None` falls back to the process-wide default catalog.
    pub catalog_url: Option<String>,
    /// Use `https://` for catalogs given without a scheme.
    pub use_https: bool,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: None,
            use_https: true,
            verify: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// OData service a table is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Service {
    /// `ODataApi/odata`
    #[default]
    Api,
    /// `ODataFeed/odata`, the bulk feed meant for large tables.
    Feed,
}

impl Service {
    pub fn path(self) -> &'static str {
        match self {
            Service::Api => "ODataApi/odata",
            Service::Feed => "ODataFeed/odata",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    catalog: Option<String>,
    use_https: bool,

    service: Service,
    timeout: Duration,
    progress: bool,

    http: HttpClient,
}

impl Client {
    /// Creates a client using environment variables and/or `.cbsodatarc`.
    ///
    /// This is equivalent to `Client::new(None, None, None)`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit arguments
    /// - environment variables `CBSODATA_CATALOG_URL` / `CBSODATA_USE_HTTPS` /
    ///   `CBSODATA_VERIFY` / `CBSODATA_TIMEOUT`
    /// - config file from `CBSODATA_RC` or `.cbsodatarc`
    pub fn new(
        catalog_url: Option<String>,
        use_https: Option<bool>,
        verify: Option<bool>,
    ) -> Result<Self> {
        let cfg = load_config(catalog_url, use_https, verify)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("cbsodata-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("cbsodata-rs")),
        );

        let mut builder = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(cfg.timeout);

        if !cfg.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            catalog: cfg.catalog_url,
            use_https: cfg.use_https,
            service: Service::default(),
            timeout: cfg.timeout,
            progress: false,
            http,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shows a spinner with the number of downloaded records on stderr.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_service(mut self, service: Service) -> Self {
        self.service = service;
        self
    }

    /// The catalog a call with `query` goes to.
    ///
    /// The query's own catalog wins, then a [`catalog::scoped`] override on the
    /// current thread, then the catalog this client was configured with, then
    /// the process-wide default.
    pub fn resolve_catalog(&self, query: &Query) -> String {
        query
            .catalog
            .clone()
            .or_else(catalog::active_catalog)
            .or_else(|| self.catalog.clone())
            .unwrap_or_else(catalog::default_catalog)
    }

    fn table_url(&self, table_id: &str, query: &Query) -> String {
        format!(
            "{}/{}/{}",
            catalog_base(&self.resolve_catalog(query), self.use_https),
            self.service.path(),
            table_id.trim()
        )
    }

    /// Lists the tables of a catalog.
    ///
    /// `select` and `filter` of the query are applied by the service.
    pub fn get_table_list(&self, query: &Query) -> Result<Vec<Record>> {
        let url = format!(
            "{}/{}",
            catalog_base(&self.resolve_catalog(query), self.use_https),
            CATALOG_TABLES
        );
        self.fetch_all(&url, &query.params(), None, "Tables")
    }

    /// Table information (`TableInfos`) of one table.
    pub fn get_info(&self, table_id: &str, query: &Query) -> Result<Record> {
        let url = format!("{}/TableInfos", self.table_url(table_id, query));
        let infos = self.fetch_all(&url, &[], Some(table_id), "TableInfos")?;
        infos.into_iter().next().ok_or_else(|| Error::NotFound {
            table_id: table_id.to_string(),
            url,
        })
    }

    /// A named metadata sub-resource of a table, e.g. `DataProperties`,
    /// `CategoryGroups` or a dimension such as `Periods`.
    pub fn get_meta(&self, table_id: &str, name: &str, query: &Query) -> Result<Vec<Record>> {
        let url = format!("{}/{}", self.table_url(table_id, query), name);
        self.fetch_all(&url, &[], Some(table_id), name)
    }

    /// Downloads every sub-resource listed by the table root.
    ///
    /// Only the data set matching `query.typed` is downloaded, with the query's
    /// `select`/`filter` applied. With `query.dir` set, each sub-resource is also
    /// written to `{dir}/{name}.jsonl`.
    pub fn download_data(&self, table_id: &str, query: &Query) -> Result<TableBundle> {
        let table_url = self.table_url(table_id, query);
        let listing = self.fetch_all(&table_url, &[], Some(table_id), table_id)?;
        let links = listing
            .iter()
            .map(|r| ResourceLink::from_record(&table_url, r))
            .collect::<Result<Vec<_>>>()?;

        let skip = query.other_data_set_name();
        let data_params = query.params();

        let mut bundle = TableBundle::new();
        for link in links.iter().filter(|l| l.name != skip) {
            let url = format!("{}/{}", table_url, link.name);
            let params: &[(&str, String)] = if link.name == query.data_set_name() {
                &data_params
            } else {
                &[]
            };
            let records = self.fetch_all(&url, params, Some(table_id), &link.name)?;

            if let Some(dir) = &query.dir {
                save_resource(dir, &link.name, &records)?;
            }
            bundle.insert(link.name.clone(), records);
        }

        Ok(bundle)
    }

    /// Data rows of a table, with dimension keys replaced by their titles.
    pub fn get_data(&self, table_id: &str, query: &Query) -> Result<Vec<Record>> {
        Ok(self.download_data(table_id, query)?.into_data())
    }

    /// Follows continuation links from `url` and concatenates every page.
    fn fetch_all(
        &self,
        url: &str,
        params: &[(&str, String)],
        table_id: Option<&str>,
        label: &str,
    ) -> Result<Vec<Record>> {
        let pb = self.spinner(label);
        let result = self.fetch_pages(url, params, table_id, pb.as_ref());
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        result
    }

    fn fetch_pages(
        &self,
        url: &str,
        params: &[(&str, String)],
        table_id: Option<&str>,
        pb: Option<&ProgressBar>,
    ) -> Result<Vec<Record>> {
        let mut first_params = vec![("$format", "json".to_string())];
        first_params.extend(params.iter().cloned());

        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(url.to_string());
        let mut pages = 0usize;

        while let Some(page_url) = next.take() {
            if !seen.insert(page_url.clone()) {
                return Err(Error::Parse {
                    url: page_url,
                    reason: "continuation link points to an earlier page".to_string(),
                });
            }

            // Continuation links already carry the query string.
            let page_params: Vec<(&str, String)> = if pages == 0 {
                first_params.clone()
            } else if page_url.contains("$format") || page_url.contains("%24format") {
                Vec::new()
            } else {
                vec![("$format", "json".to_string())]
            };

            let page = self.get_page(&page_url, &page_params, table_id)?;
            let (mut values, next_link) = page.into_records(&page_url)?;
            pages += 1;
            log::debug!("page {} of {}: {} record(s)", pages, url, values.len());
            if let Some(pb) = pb {
                pb.inc(values.len() as u64);
            }
            records.append(&mut values);

            next = next_link.map(|link| urljoin(&page_url, &link));
        }

        Ok(records)
    }

    fn get_page(
        &self,
        url: &str,
        params: &[(&str, String)],
        table_id: Option<&str>,
    ) -> Result<Page> {
        let network = |source: reqwest::Error| Error::Network {
            url: url.to_string(),
            source,
        };

        let request = self
            .http
            .get(url)
            .query(params)
            .timeout(self.timeout)
            .build()
            .map_err(network)?;
        let full_url = request.url().to_string();
        log::info!("Download {}", full_url);

        let resp = self.http.execute(request).map_err(network)?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let text = resp.text().map_err(network)?;

        if !status.is_success() {
            return Err(format_odata_error(status, &full_url, table_id, &text));
        }

        if content_type.contains("xml") && text.trim_start().starts_with('<') {
            return Err(Error::Parse {
                url: full_url,
                reason: format!("expected JSON, got {}", content_type),
            });
        }

        Page::parse(&full_url, &text)
    }

    fn spinner(&self, label: &str) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}: {pos} record(s) [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}
