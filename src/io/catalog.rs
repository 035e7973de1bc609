use crate::types::{ProductId, So2Error, So2Result};
use serde_json::{json, Value};
use std::time::Duration;

/// Outcome of an existence check against the product catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogLookup {
    /// At least one document carries the identity
    Found { count: u64 },
    /// Zero hits, or the catalog could not be queried
    NotFoundOrUnknown,
}

impl CatalogLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, CatalogLookup::Found { .. })
    }
}

/// Read-only existence query used for product deduplication
pub trait Catalog {
    fn lookup(&self, index: &str, id: &ProductId) -> CatalogLookup;
}

/// Elasticsearch-backed catalog (GRQ)
pub struct HttpCatalog {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> So2Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| So2Error::Catalog(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.base_url, index)
    }

    /// Exact-match hit count for the identity, or an error on transport/status failure
    pub fn count(&self, index: &str, id: &ProductId) -> So2Result<u64> {
        let url = self.search_url(index);
        let query = existence_query(id);
        log::info!("querying: {} with {}", url, query);

        let response = self
            .client
            .post(&url)
            .json(&query)
            .send()
            .map_err(|e| So2Error::Catalog(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(So2Error::Catalog(format!(
                "HTTP request failed with status: {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| So2Error::Catalog(format!("Failed to decode response: {}", e)))?;

        Ok(hit_count(&body))
    }
}

impl Catalog for HttpCatalog {
    fn lookup(&self, index: &str, id: &ProductId) -> CatalogLookup {
        match self.count(index, id) {
            Ok(0) => CatalogLookup::NotFoundOrUnknown,
            Ok(count) => CatalogLookup::Found { count },
            Err(e) => {
                // Fail open: an unreachable catalog must not block generation
                log::warn!("Catalog lookup for {} failed, treating as not found: {}", id, e);
                CatalogLookup::NotFoundOrUnknown
            }
        }
    }
}

/// Term query on `id.raw`, first hit only
pub fn existence_query(id: &ProductId) -> Value {
    json!({
        "query": { "bool": { "must": [ { "term": { "id.raw": id.as_str() } } ] } },
        "from": 0,
        "size": 1
    })
}

/// Read `hits.total`, which is a bare integer on older clusters and
/// `{ "value": n, "relation": .. }` on newer ones.
pub fn hit_count(body: &Value) -> u64 {
    match body.get("hits").and_then(|hits| hits.get("total")) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existence_query_shape() {
        let query = existence_query(&ProductId::new("AST_L1T-SO-a_b-v1.0"));
        assert_eq!(
            query["query"]["bool"]["must"][0]["term"]["id.raw"],
            "AST_L1T-SO-a_b-v1.0"
        );
        assert_eq!(query["from"], 0);
        assert_eq!(query["size"], 1);
    }

    #[test]
    fn test_hit_count_variants() {
        assert_eq!(hit_count(&json!({"hits": {"total": 3}})), 3);
        assert_eq!(hit_count(&json!({"hits": {"total": {"value": 2, "relation": "eq"}}})), 2);
        assert_eq!(hit_count(&json!({"hits": {}})), 0);
        assert_eq!(hit_count(&json!({})), 0);
    }

    #[test]
    fn test_search_url_trims_trailing_slash() {
        let catalog = HttpCatalog::new("http://grq:9200/").unwrap();
        assert_eq!(
            catalog.search_url("grq_v1.0_AST_L1T-SO"),
            "http://grq:9200/grq_v1.0_AST_L1T-SO/_search"
        );
    }

    #[test]
    fn test_unreachable_catalog_fails_open() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let catalog = HttpCatalog::new("http://127.0.0.1:9").unwrap();
        let lookup = catalog.lookup("idx", &ProductId::new("x"));
        assert_eq!(lookup, CatalogLookup::NotFoundOrUnknown);
    }
}
