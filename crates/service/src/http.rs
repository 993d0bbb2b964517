use serde::Serialize;
use tracing::{debug, warn};

use crate::client::SearchService;
use crate::error::ServiceError;
use crate::protocol::{
    DETAIL_PATH, DetailQuery, DetailRecord, LOCATION_PATH, LocationPage, LocationQuery, endpoint,
    parse_detail_body, parse_location_body,
};

/// Native client for the search backend.
#[derive(Debug, Clone)]
pub struct HttpSearchService {
    base_uri: String,
    http: reqwest::Client,
}

impl HttpSearchService {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self::with_client(base_uri, reqwest::Client::new())
    }

    pub fn with_client(base_uri: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_uri: base_uri.into(),
            http,
        }
    }

    async fn get_text<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<String, ServiceError> {
        let url = endpoint(&self.base_uri, path);
        debug!(%url, "GET");
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "search service error");
            return Err(ServiceError::Status(status.as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))
    }
}

impl SearchService for HttpSearchService {
    async fn locations(&self, query: &LocationQuery) -> Result<LocationPage, ServiceError> {
        let body = self.get_text(LOCATION_PATH, query).await?;
        let page = parse_location_body(&body)?;
        debug!(name = %query.name, results = page.list.len(), "locations");
        Ok(page)
    }

    async fn detail(&self, query: &DetailQuery) -> Result<Option<DetailRecord>, ServiceError> {
        let body = self.get_text(DETAIL_PATH, query).await?;
        parse_detail_body(&body)
    }
}
