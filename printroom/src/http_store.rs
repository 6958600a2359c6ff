//! `HttpStore`: the dashboard backend behind the core's store contracts.
//!
//! Endpoints, all JSON, relative to `api.base_url`:
//! - `GET /orders` with the filter as query parameters
//! - `PATCH /orders/{id}` with `{"status_printed": ...}`
//! - `GET /folders?order_number=...`
//! - `GET /files?folder_id=...`
//!
//! Listings may be a bare array or wrapped as `{"data": [...]}`.

use async_trait::async_trait;
use printroom_core::contract::{
    DesignFile, FileQuery, FileStore, Folder, FolderQuery, Order, OrderFilter, OrderStore,
    PrintStatus, StoreError,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{error, info};

use crate::load_config::ApiSection;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

/// Query parameters for an order listing. Empty filter fields are omitted.
pub fn order_query(filter: &OrderFilter) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(number) = &filter.order_number {
        pairs.push(("order_number", number.clone()));
    }
    if !filter.production_status.is_empty() {
        pairs.push(("production_status", filter.production_status.join(",")));
    }
    if let Some(status) = filter.status_printed {
        pairs.push(("status_printed", status.as_str().to_string()));
    }
    pairs
}

pub struct HttpStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(api: &ApiSection) -> Self {
        info!(base_url = %api.base_url, token_set = api.token.is_some(), "Initialized HttpStore");
        Self::new(&api.base_url, api.token.clone())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn list<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = self.url(path);
        info!(url = %url, ?query, "GET");
        let response = self
            .authorized(self.client.get(&url).query(query))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            error!(status = %status, url = %url, "Backend returned error. Response body: {body}");
            return Err(format!("GET {url} returned {status}").into());
        }
        let listing: Listing<T> = response.json().await?;
        let items = listing.into_vec();
        info!(url = %url, count = items.len(), "Listing received");
        Ok(items)
    }
}

#[async_trait]
impl OrderStore for HttpStore {
    async fn query_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, StoreError> {
        self.list("orders", &order_query(&filter)).await
    }

    async fn update_print_status(
        &self,
        order_id: String,
        status: PrintStatus,
    ) -> Result<(), StoreError> {
        let url = self.url(&format!("orders/{order_id}"));
        info!(url = %url, status = status.as_str(), "PATCH");
        let response = self
            .authorized(self.client.patch(&url))
            .json(&serde_json::json!({ "status_printed": status }))
            .send()
            .await?;
        let status_code = response.status();
        if !status_code.is_success() {
            error!(status = %status_code, url = %url, order_id = %order_id, "Failed to update print status");
            return Err(format!("PATCH {url} returned {status_code}").into());
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for HttpStore {
    async fn get_folders(&self, query: FolderQuery) -> Result<Vec<Folder>, StoreError> {
        let pairs: Vec<(&'static str, String)> = query
            .order_number
            .map(|number| ("order_number", number))
            .into_iter()
            .collect();
        self.list("folders", &pairs).await
    }

    async fn get_files(&self, query: FileQuery) -> Result<Vec<DesignFile>, StoreError> {
        self.list("files", &[("folder_id", query.folder_id)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printroom_core::orders::pending_print_filter;

    #[test]
    fn pending_filter_becomes_query_pairs() {
        let pairs = order_query(&pending_print_filter());
        assert_eq!(
            pairs,
            vec![
                ("production_status", "design,printing".to_string()),
                ("status_printed", "not_printed".to_string()),
            ]
        );
    }

    #[test]
    fn empty_filter_has_no_pairs() {
        assert!(order_query(&OrderFilter::default()).is_empty());
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let store = HttpStore::new("https://dashboard.example/api/", None);
        assert_eq!(store.url("/orders"), "https://dashboard.example/api/orders");
        assert_eq!(store.url("files"), "https://dashboard.example/api/files");
    }

    #[test]
    fn listings_accept_bare_and_wrapped_arrays() {
        let bare: Listing<Folder> =
            serde_json::from_str(r#"[{"id": "F1", "folder_name": "ID Card Depan"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);
        let wrapped: Listing<Folder> = serde_json::from_str(
            r#"{"data": [{"id": "F1", "folder_name": "A"}, {"id": "F2", "folder_name": "B"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.into_vec().len(), 2);
    }
}
