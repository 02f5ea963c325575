// API client module: talks to the Premiumize.me REST API.
//
// Each endpoint method builds an `ApiRequest` (path, query and form body)
// and funnels it through `send_request`, which injects the API key, skips
// the network in dry-run mode, and validates the decoded JSON against the
// response type's declared shape. The client keeps no state between calls.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;
use url::form_urlencoded::{self, Serializer};

use crate::config::Config;
use crate::error::{ApiError, ValidationIssue};
use crate::logging::RequestLogger;
use crate::transport::{HttpTransport, Method, PreparedRequest, Transport};
use crate::types::{
    ApiResponse, CacheCheckResult, FolderListing, FolderMutationResult, ItemDetails,
    ItemListAllResult, ServiceCatalog, TransferCreated, TransferList,
};

/// Inclusive bounds for folder names and search queries, in characters.
pub const MIN_TEXT_LEN: usize = 1;
pub const MAX_TEXT_LEN: usize = 100;

/// An endpoint call before authentication: relative path (which may
/// already carry a query string) and an optional form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub form: Option<Vec<(String, String)>>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            form: None,
        }
    }

    /// GET with query parameters; the `?` is only added when there are any.
    pub fn get_with_query(path: &str, params: &[(&str, &str)]) -> Self {
        if params.is_empty() {
            return Self::get(path);
        }
        let query = Serializer::new(String::new()).extend_pairs(params).finish();
        Self::get(format!("{path}?{query}"))
    }

    pub fn post_form(path: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            form: Some(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }
}

/// Client for the Premiumize.me API. Cheap to clone; configuration is
/// read-only after construction.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: String,
    dry_run: bool,
    logger: RequestLogger,
}

impl ApiClient {
    pub fn new(config: &Config, transport: Arc<dyn Transport>, logger: RequestLogger) -> Self {
        Self {
            transport,
            base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            dry_run: config.dry_run,
            logger,
        }
    }

    /// Client backed by reqwest, with request logging at the configured verbosity.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = HttpTransport::new()?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            RequestLogger::new(config.verbose),
        ))
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Absolute, authenticated request for `request`.
    pub fn prepare(&self, request: &ApiRequest) -> PreparedRequest {
        let url = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));
        PreparedRequest {
            method: request.method,
            url: self.authenticate(&url),
            body: request.form.as_ref().map(|fields| {
                Serializer::new(String::new())
                    .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                    .finish()
            }),
        }
    }

    fn authenticate(&self, url: &str) -> String {
        let separator = if url.contains('?') { '&' } else { '?' };
        let key: String = form_urlencoded::byte_serialize(self.api_key.as_bytes()).collect();
        format!("{url}{separator}apikey={key}")
    }

    /// Send `request` and return the body decoded as `T`, validated
    /// against `T::SHAPE` and `T`'s own invariants.
    pub async fn send_request<T: ApiResponse>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let prepared = self.prepare(&request);
        self.logger.request(&prepared);

        let body = if self.dry_run {
            self.logger.dry_run(&prepared);
            T::SHAPE.minimal()
        } else {
            let response = self.transport.execute(&prepared).await?;
            self.logger.response(&prepared, &response);
            if !response.is_success() {
                return Err(ApiError::Http {
                    status: response.status,
                    status_text: response.status_text,
                });
            }
            serde_json::from_str::<Value>(&response.body)
                .map_err(|e| ApiError::Parse(e.to_string()))?
        };

        decode(body)
    }

    // ─── services ───────────────────────────────────────────────────────

    pub async fn services_list(&self) -> Result<ServiceCatalog, ApiError> {
        self.send_request(ApiRequest::get("services/list")).await
    }

    // ─── cache ──────────────────────────────────────────────────────────

    /// Look up `urls` in the cache. An empty list answers immediately
    /// with empty arrays.
    pub async fn cache_check<S: AsRef<str>>(&self, urls: &[S]) -> Result<CacheCheckResult, ApiError> {
        if urls.is_empty() {
            return Ok(CacheCheckResult::empty());
        }
        let query = urls
            .iter()
            .map(|url| {
                let encoded: String =
                    form_urlencoded::byte_serialize(url.as_ref().as_bytes()).collect();
                format!("items[]={encoded}")
            })
            .collect::<Vec<_>>()
            .join("&");
        self.send_request(ApiRequest::get(format!("cache/check?{query}")))
            .await
    }

    // ─── folder ─────────────────────────────────────────────────────────

    pub async fn folder_list(
        &self,
        folder_id: Option<&str>,
        include_breadcrumbs: bool,
    ) -> Result<FolderListing, ApiError> {
        let mut params = Vec::new();
        if let Some(id) = folder_id {
            params.push(("id", id));
        }
        if include_breadcrumbs {
            params.push(("include_breadcrumbs", "true"));
        }
        self.send_request(ApiRequest::get_with_query("folder/list", &params))
            .await
    }

    pub async fn folder_create(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<FolderMutationResult, ApiError> {
        check_length("folder name", name)?;
        let mut fields = vec![("name", name)];
        if let Some(parent) = parent_id {
            fields.push(("parent_id", parent));
        }
        self.send_request(ApiRequest::post_form("folder/create", &fields))
            .await
    }

    pub async fn folder_rename(&self, id: &str, name: &str) -> Result<FolderMutationResult, ApiError> {
        check_length("folder name", name)?;
        self.send_request(ApiRequest::post_form(
            "folder/rename",
            &[("id", id), ("name", name)],
        ))
        .await
    }

    pub async fn folder_delete(&self, id: &str) -> Result<FolderMutationResult, ApiError> {
        self.send_request(ApiRequest::post_form("folder/delete", &[("id", id)]))
            .await
    }

    pub async fn folder_search(&self, query: &str) -> Result<FolderListing, ApiError> {
        check_length("search query", query)?;
        self.send_request(ApiRequest::get_with_query("folder/search", &[("q", query)]))
            .await
    }

    // ─── item ───────────────────────────────────────────────────────────

    pub async fn item_listall(&self) -> Result<ItemListAllResult, ApiError> {
        self.send_request(ApiRequest::get("item/listall")).await
    }

    pub async fn item_details(&self, id: &str) -> Result<ItemDetails, ApiError> {
        self.send_request(ApiRequest::get_with_query("item/details", &[("id", id)]))
            .await
    }

    // ─── transfer ───────────────────────────────────────────────────────

    pub async fn transfer_list(&self) -> Result<TransferList, ApiError> {
        self.send_request(ApiRequest::get("transfer/list")).await
    }

    /// Queue a download of `url`, optionally into `folder_id`.
    pub async fn transfer_create(
        &self,
        url: &str,
        folder_id: Option<&str>,
    ) -> Result<TransferCreated, ApiError> {
        let mut fields = vec![("src", url)];
        if let Some(folder) = folder_id {
            fields.push(("folder_id", folder));
        }
        self.send_request(ApiRequest::post_form("transfer/create", &fields))
            .await
    }
}

fn check_length(what: &str, value: &str) -> Result<(), ApiError> {
    let len = value.chars().count();
    if (MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len) {
        Ok(())
    } else {
        Err(ApiError::Precondition(format!(
            "{what} must be between {MIN_TEXT_LEN} and {MAX_TEXT_LEN} characters (got {len})"
        )))
    }
}

/// Validate and decode a response body.
///
/// A body that fails its shape but is an error envelope
/// (`{"status": "error", "message": ...}`) is reported as a logical error.
fn decode<T: ApiResponse>(body: Value) -> Result<T, ApiError> {
    let issues = T::SHAPE.validate(&body);
    if !issues.is_empty() {
        if let Some(message) = error_envelope(&body) {
            return Err(ApiError::Logical { message });
        }
        warn!(issues = issues.len(), "response failed shape validation");
        return Err(ApiError::Validation(issues));
    }

    let value: T = serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(vec![ValidationIssue::new("", e.to_string())]))?;

    let issues = value.invariant_issues();
    if !issues.is_empty() {
        return Err(ApiError::Validation(issues));
    }
    Ok(value)
}

fn error_envelope(body: &Value) -> Option<String> {
    if body.get("status").and_then(Value::as_str) != Some("error") {
        return None;
    }
    Some(
        body.get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message provided")
            .to_string(),
    )
}
