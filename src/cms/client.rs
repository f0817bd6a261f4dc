//! HTTP client for the content store query API

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{CmsError, ContentSource, QueryParams};
use crate::config::CmsConfig;

/// Query client bound to one project, dataset and API version.
///
/// Construct one per process and hand it to whatever needs content; it holds
/// no per-request state beyond the connection pool.
pub struct CmsClient {
    http: Client,
    config: CmsConfig,
    warned_unconfigured: AtomicBool,
}

impl CmsClient {
    /// Create a new client from configuration
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let http = Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
            warned_unconfigured: AtomicBool::new(false),
        })
    }

    /// Whether queries will actually reach a store
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Build the query endpoint URL, including bound parameters
    pub fn query_url(&self, groq: &str, params: &QueryParams) -> Result<Url, CmsError> {
        let host = match &self.config.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => {
                let api = if self.config.use_cdn { "apicdn" } else { "api" };
                format!("https://{}.{}.sanity.io", self.config.project_id, api)
            }
        };

        let version = self.config.api_version.trim_start_matches('v');
        let base = format!("{}/v{}/data/query/{}", host, version, self.config.dataset);
        let mut url = Url::parse(&base).map_err(|e| CmsError::Url(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", groq);
            for (name, value) in params {
                pairs.append_pair(&format!("${}", name), &value.to_string());
            }
            pairs.append_pair("perspective", "published");
        }

        Ok(url)
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn query(
        &self,
        groq: &str,
        params: &QueryParams,
    ) -> Result<serde_json::Value, CmsError> {
        if !self.is_configured() {
            if !self.warned_unconfigured.swap(true, Ordering::Relaxed) {
                tracing::warn!("Content store is not configured; every section will be empty");
            }
            return Ok(serde_json::Value::Null);
        }

        let url = self.query_url(groq, params)?;
        let start = std::time::Instant::now();

        let mut request = self.http.get(url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            "Query finished with {} in {}ms",
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(CmsError::from_response(status.as_u16(), &body));
        }

        let mut envelope: serde_json::Value = serde_json::from_str(&body)?;
        Ok(envelope
            .get_mut("result")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CmsConfig {
        CmsConfig {
            project_id: "abc123".to_string(),
            ..CmsConfig::default()
        }
    }

    #[test]
    fn test_query_url() {
        let client = CmsClient::new(&config()).unwrap();
        let mut params = QueryParams::new();
        params.insert("slug".to_string(), serde_json::json!("hello-world"));

        let url = client
            .query_url(r#"*[_type == "post"][0]"#, &params)
            .unwrap();

        assert_eq!(url.host_str(), Some("abc123.api.sanity.io"));
        assert_eq!(url.path(), "/v2024-02-02/data/query/production");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0].0, "query");
        assert_eq!(pairs[0].1, r#"*[_type == "post"][0]"#);
        assert_eq!(pairs[1], ("$slug".to_string(), "\"hello-world\"".to_string()));
        assert_eq!(pairs[2], ("perspective".to_string(), "published".to_string()));
    }

    #[test]
    fn test_query_url_uses_cdn_and_host_override() {
        let mut cfg = config();
        cfg.use_cdn = true;
        let client = CmsClient::new(&cfg).unwrap();
        let url = client.query_url("*", &QueryParams::new()).unwrap();
        assert_eq!(url.host_str(), Some("abc123.apicdn.sanity.io"));

        cfg.api_host = Some("http://127.0.0.1:9999/".to_string());
        cfg.api_version = "v2021-10-21".to_string();
        let client = CmsClient::new(&cfg).unwrap();
        let url = client.query_url("*", &QueryParams::new()).unwrap();
        assert_eq!(url.port(), Some(9999));
        assert_eq!(url.path(), "/v2021-10-21/data/query/production");
    }

    #[tokio::test]
    async fn test_unconfigured_client_returns_null() {
        let client = CmsClient::new(&CmsConfig::default()).unwrap();
        let value = client.query("*", &QueryParams::new()).await.unwrap();
        assert!(value.is_null());
    }
}
