// src/app/catalog/tmdb.rs
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{CatalogApi, RawCredits, SearchHit};
use crate::app::error::LookupError;
use crate::config::AppConfig;

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Blocking HTTP transport for the TMDB v3 API.
#[derive(Debug, Clone)]
pub struct TmdbApi {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    image_base_url: String,
}

impl TmdbApi {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, LookupError> {
        let http = Client::builder()
            .user_agent(concat!("moviecat/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.read_timeout_secs))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| LookupError::Network(format!("http client: {e}")))?;

        Ok(Self {
            http,
            api_key: cfg.tmdb_api_key.clone().filter(|k| !k.trim().is_empty()),
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            image_base_url: cfg.image_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        let key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("GET {url}");

        let body = self
            .http
            .get(&url)
            .query(&[("api_key", key)])
            .query(params)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())?;

        serde_json::from_slice(&body).map_err(|e| LookupError::Malformed(format!("{path}: {e}")))
    }
}

impl CatalogApi for TmdbApi {
    fn search_movies(&self, query: &str, year: Option<&str>) -> Result<Vec<SearchHit>, LookupError> {
        let mut params = vec![("query", query)];
        if let Some(y) = year {
            params.push(("primary_release_year", y));
        }
        let page: SearchPage = self.get_json("search/movie", &params)?;
        Ok(page.results)
    }

    fn movie_credits(&self, tmdb_id: u64) -> Result<RawCredits, LookupError> {
        self.get_json(&format!("movie/{tmdb_id}/credits"), &[])
    }

    fn poster_bytes(&self, poster_path: &str) -> Result<Vec<u8>, LookupError> {
        let sep = if poster_path.starts_with('/') { "" } else { "/" };
        let url = format!("{}{sep}{poster_path}", self.image_base_url);
        debug!("GET {url}");
        let bytes = self
            .http
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_without_a_request() {
        let cfg = AppConfig {
            tmdb_api_key: Some("   ".into()),
            api_base_url: "http://127.0.0.1:9".into(),
            ..AppConfig::default()
        };
        let api = TmdbApi::from_config(&cfg).unwrap();
        assert!(!api.has_api_key());
        assert!(matches!(
            api.search_movies("Alien", None),
            Err(LookupError::MissingApiKey)
        ));
    }

    #[test]
    fn search_page_tolerates_missing_fields() {
        let page: SearchPage = serde_json::from_str(
            r#"{"results":[{"id":348,"title":"Alien","release_date":"1979-05-25"},{"title":null}]}"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, 348);
        assert!(page.results[1].genre_ids.is_empty());

        let empty: SearchPage = serde_json::from_str("{}").unwrap();
        assert!(empty.results.is_empty());
    }
}
