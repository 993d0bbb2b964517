use gloo_net::http::Request;
use service::{
    DETAIL_PATH, DetailQuery, DetailRecord, LOCATION_PATH, LocationPage, LocationQuery,
    SearchService, ServiceError, endpoint, parse_detail_body, parse_location_body,
};

/// Browser client for the search backend, on top of `fetch`.
#[derive(Debug, Clone)]
pub struct FetchSearchService {
    base_uri: String,
}

impl FetchSearchService {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
        }
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String, ServiceError> {
        let url = endpoint(&self.base_uri, path);
        let resp = Request::get(&url)
            .query(query.iter().map(|(k, v)| (*k, v.as_str())))
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        if !resp.ok() {
            return Err(ServiceError::Status(resp.status()));
        }
        resp.text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))
    }
}

impl SearchService for FetchSearchService {
    async fn locations(&self, query: &LocationQuery) -> Result<LocationPage, ServiceError> {
        let params = [
            ("name", query.name.clone()),
            ("page", query.page.to_string()),
            ("size", query.size.to_string()),
        ];
        let body = self.get_text(LOCATION_PATH, &params).await?;
        parse_location_body(&body)
    }

    async fn detail(&self, query: &DetailQuery) -> Result<Option<DetailRecord>, ServiceError> {
        let body = self
            .get_text(DETAIL_PATH, &[("name", query.name.clone())])
            .await?;
        parse_detail_body(&body)
    }
}
