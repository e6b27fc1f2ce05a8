use super::error::ApiError;
use super::interceptor::{ErrorInterceptor, ErrorSink, TracingErrorSink};
use crate::core::config::ApiConfig;
use crate::core::envelope::{ApiEnvelope, ErrorBody, PaginationMeta};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Payload of a successful envelope with its optional paging metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: Option<PaginationMeta>,
}

pub struct ApiClientBuilder {
    config: ApiConfig,
    sink: Arc<dyn ErrorSink>,
}

impl ApiClientBuilder {
    /// Where failed responses with a structured error are reported.
    pub fn error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url = parse_base_url(&self.config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(concat!("etf-helper/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(ApiError::Transport)?;

        Ok(ApiClient {
            http,
            base_url,
            interceptor: ErrorInterceptor::new(self.sink),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

/// HTTP client for the ETF API. Cheap to clone; configuration is fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    interceptor: ErrorInterceptor,
}

impl ApiClient {
    /// Client that logs API errors through `tracing`.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::builder(config).build()
    }

    pub fn builder(config: &ApiConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config: config.clone(),
            sink: Arc::new(TracingErrorSink),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` against the base URL, keeping any path prefix the base has.
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidQuery(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    pub async fn get<T>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path, query)?;
        self.execute(self.http.request(Method::GET, url)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        self.execute(self.http.request(Method::POST, url).json(body))
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        self.execute(self.http.request(Method::PUT, url).json(body))
            .await
    }

    pub async fn delete<T>(&self, path: &str) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        self.execute(self.http.request(Method::DELETE, url)).await
    }

    async fn execute<T>(&self, request: RequestBuilder) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        self.interceptor.intercept(self.send(request).await)
    }

    #[instrument(name = "ApiRequest", skip_all)]
    async fn send<T>(&self, request: RequestBuilder) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        debug!(url = %response.url(), %status, "Received API response");

        let body = response.text().await.map_err(ApiError::Transport)?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                error: ErrorBody::extract(&body),
                body,
            });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(ApiError::Decode)?;
        match envelope {
            ApiEnvelope::Success { data, meta } => Ok(ApiResponse { data, meta }),
            ApiEnvelope::Failure { error } => Err(ApiError::Application(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::interceptor::RecordingErrorSink;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> (ApiClient, Arc<RecordingErrorSink>) {
        let sink = Arc::new(RecordingErrorSink::new());
        let config = ApiConfig {
            base_url: server.uri(),
            timeout_secs: 5,
        };
        let client = ApiClient::builder(&config)
            .error_sink(sink.clone())
            .build()
            .unwrap();
        (client, sink)
    }

    #[test_log::test(tokio::test)]
    async fn test_get_success_with_meta() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/items"))
            .and(query_param("page", "2"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [1, 2, 3],
                "meta": {"page": 2, "limit": 3, "total": 9, "total_pages": 3}
            })))
            .mount(&server)
            .await;
        let (client, sink) = client_for(&server).await;

        let response: ApiResponse<Vec<u32>> = client
            .get("/api/items", &[("page", "2".to_string())])
            .await
            .unwrap();

        assert_eq!(response.data, vec![1, 2, 3]);
        assert_eq!(response.meta.unwrap().total_pages, 3);
        assert!(sink.entries().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_structured_error_is_logged_once_and_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/etfs/999999"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "success": false,
                "error": {"code": "NOT_FOUND", "message": "ETF not found"}
            })))
            .mount(&server)
            .await;
        let (client, sink) = client_for(&server).await;

        let result = client.get::<serde_json::Value>("/api/etfs/999999", &[]).await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.error_info().unwrap().message, "ETF not found");

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("NOT_FOUND"));
        assert!(entries[0].contains("ETF not found"));
    }

    #[test_log::test(tokio::test)]
    async fn test_unstructured_error_is_not_logged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/etfs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;
        let (client, sink) = client_for(&server).await;

        let err = client
            .get::<serde_json::Value>("/api/etfs", &[])
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, error, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(error.is_none());
                assert_eq!(body, "Internal Server Error");
            }
            other => panic!("Expected status error, got {other:?}"),
        }
        assert!(sink.entries().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_failure_envelope_with_ok_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/etfs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": {"code": "BAD_REQUEST", "message": "unknown sort key"}
            })))
            .mount(&server)
            .await;
        let (client, sink) = client_for(&server).await;

        let err = client
            .get::<serde_json::Value>("/api/etfs", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Application(ref info) if info.code == "BAD_REQUEST"));
        assert_eq!(sink.entries(), vec!["[API Error] BAD_REQUEST: unknown sort key"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_undecodable_body_is_not_logged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let (client, sink) = client_for(&server).await;

        let err = client
            .get::<serde_json::Value>("/health", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
        assert!(sink.entries().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_transport_failure_is_not_logged() {
        let sink = Arc::new(RecordingErrorSink::new());
        let config = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
        };
        let client = ApiClient::builder(&config)
            .error_sink(sink.clone())
            .build()
            .unwrap();

        let err = client
            .get::<serde_json::Value>("/health", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
        assert!(sink.entries().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/portfolio"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"etfCode": "069500", "quantity": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"id": "p9"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let (client, _) = client_for(&server).await;

        let response: ApiResponse<serde_json::Value> = client
            .post("/api/portfolio", &json!({"etfCode": "069500", "quantity": 3}))
            .await
            .unwrap();

        assert_eq!(response.data["id"], "p9");
        assert!(response.meta.is_none());
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/v1/".to_string(),
            timeout_secs: 1,
        };
        let client = ApiClient::new(&config).unwrap();

        let url = client
            .url("/api/etfs", &[("search", "KODEX 200".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/v1/api/etfs?search=KODEX+200"
        );
        assert_eq!(
            client.url("health", &[]).unwrap().as_str(),
            "http://localhost:8000/v1/health"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        for base_url in ["not a url", "ftp://example.com"] {
            let config = ApiConfig {
                base_url: base_url.to_string(),
                timeout_secs: 1,
            };
            let err = ApiClient::new(&config).unwrap_err();
            assert!(matches!(err, ApiError::InvalidBaseUrl { .. }), "{base_url}");
        }
    }
}
