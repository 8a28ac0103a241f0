// src/api/client.rs
//! HTTP client for the two Notion endpoints this engine consumes:
//! workspace search and block-children listing.
//!
//! Handles authentication headers and response decoding. Business logic
//! (filtering, classification, retries) lives with the callers.

use super::pagination::{fetch_all_pages, PaginatedResponse};
use crate::error::{AppError, NotionErrorCode};
use crate::model::{Block, Page};
use crate::types::{ApiToken, NotionId};
use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

const NOTION_VERSION: &str = "2022-06-28";
const API_BASE_URL: &str = "https://api.notion.com/v1";

/// A thin wrapper around a reqwest Client with Notion API authentication.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(token: &ApiToken) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(token)?)
            .build()?;
        Ok(Self { client })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(token: &ApiToken) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", token.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to the specified endpoint path.
    async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Makes a POST request with a JSON body to the specified endpoint path.
    async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }
}

/// Error body shape the Notion API returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
struct NotionApiErrorResponse {
    code: String,
    message: String,
}

/// Decodes a response into the expected type, or into a typed API error.
async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to parse response from {}: {}", url, e);
            AppError::MalformedResponse(format!("{} (from {})", e, url))
        });
    }

    if let Ok(api_error) = serde_json::from_str::<NotionApiErrorResponse>(&body) {
        return Err(AppError::NotionService {
            code: NotionErrorCode::from_api_response(&api_error.code),
            message: api_error.message,
            status,
        });
    }

    Err(AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}", status, url),
        status,
    })
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn search_pages(&self) -> Result<Vec<Page>, AppError> {
        let client = self.clone();
        fetch_all_pages(|page_size, cursor| {
            let client = client.clone();
            async move {
                let mut body = serde_json::json!({
                    "filter": { "property": "object", "value": "page" },
                    "sort": { "direction": "descending", "timestamp": "last_edited_time" },
                    "page_size": page_size,
                });
                if let Some(cursor) = cursor {
                    body["start_cursor"] = serde_json::json!(cursor);
                }
                let response = client.post("search", &body).await?;
                decode_response::<PaginatedResponse<Page>>(response).await
            }
        })
        .await
    }

    async fn list_children(&self, parent: &NotionId) -> Result<Vec<Block>, AppError> {
        let client = self.clone();
        let endpoint = format!("blocks/{}/children", parent.as_hyphenated());
        fetch_all_pages(|page_size, cursor| {
            let client = client.clone();
            let mut endpoint = format!("{}?page_size={}", endpoint, page_size);
            if let Some(cursor) = &cursor {
                endpoint.push_str(&format!("&start_cursor={}", cursor));
            }
            async move {
                let response = client.get(&endpoint).await?;
                decode_response::<PaginatedResponse<Block>>(response).await
            }
        })
        .await
    }
}
